//! Procedural texture generators.
//!
//! Every texture of the chamber is synthesized at runtime into an off-screen
//! [`surface::DrawingSurface`]:
//!
//! - `hieroglyph` paints the glyph rows covering the walls
//! - `stone` scatters grain over the floor
//! - `smoke` renders the radial sprite used by the incense planes
//!
//! Generators take their randomness from the caller so tests can seed it.
//! If a surface cannot be acquired the generator yields `None` and the
//! consuming material falls back to its flat colour.

pub mod hieroglyph;
pub mod smoke;
pub mod stone;
pub mod surface;

use image::RgbaImage;
use rand::RngCore;

pub use hieroglyph::HieroglyphStyle;
pub use smoke::SmokeSprite;
pub use stone::StoneStyle;

/// How the sampler treats UVs outside `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    Clamp,
}

/// A generated raster plus the sampling parameters it was designed for.
/// Read-only once generated.
#[derive(Clone, Debug)]
pub struct ProceduralTexture {
    pub image: RgbaImage,
    pub wrap: Wrap,
    /// UV multiplier, i.e. how often the image tiles across a surface.
    pub repeat: [f32; 2],
    pub anisotropy: u16,
}

impl ProceduralTexture {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// A style that knows how to paint itself.
pub trait TextureGenerator {
    fn generate(&self, rng: &mut dyn RngCore) -> Option<ProceduralTexture>;
}
