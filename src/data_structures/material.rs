//! CPU side material description.
//!
//! [`MaterialParams`] is what props declare: colours written as sRGB hex
//! literals, PBR-ish factors and an optional procedural map. The GPU
//! counterpart lives in [`crate::data_structures::model::Material`].

use std::{
    ops::Deref,
    sync::{Arc, OnceLock},
};

use crate::{data_structures::texture::Texture, procedural::ProceduralTexture};

/// An sRGB colour as written in hex literals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Colour {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Colour {
    pub const WHITE: Colour = Colour::hex(0xffffff);

    /// `Colour::hex(0x3a2a18)` is `#3a2a18`.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as f32 / 255.0,
            g: ((rgb >> 8) & 0xff) as f32 / 255.0,
            b: (rgb & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_rgba8(self, alpha: f32) -> [u8; 4] {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [to_u8(self.r), to_u8(self.g), to_u8(self.b), to_u8(alpha)]
    }

    /// Linear-light components, which is what shaders and clear colours expect.
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let [r, g, b] = self.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Front,
    Double,
}

/// Lit materials respond to the scene lights, unlit ones only to fog.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    Lit,
    Unlit,
}

/// A generated map and its GPU upload.
///
/// Clones share both the raster and the uploaded texture, so any number of
/// materials can sample one map while keeping their own uniforms.
#[derive(Clone, Debug)]
pub struct MapHandle {
    source: Arc<ProceduralTexture>,
    upload: Arc<OnceLock<Texture>>,
}

impl MapHandle {
    pub fn new(source: ProceduralTexture) -> Self {
        Self {
            source: Arc::new(source),
            upload: Arc::new(OnceLock::new()),
        }
    }

    /// The uploaded texture, uploading it on first use.
    pub fn upload_with(&self, upload: impl FnOnce(&ProceduralTexture) -> Texture) -> Texture {
        self.upload.get_or_init(|| upload(&self.source)).clone()
    }

    pub fn is_uploaded(&self) -> bool {
        self.upload.get().is_some()
    }

    pub fn shares_upload_with(&self, other: &MapHandle) -> bool {
        Arc::ptr_eq(&self.upload, &other.upload)
    }
}

impl From<ProceduralTexture> for MapHandle {
    fn from(source: ProceduralTexture) -> Self {
        Self::new(source)
    }
}

impl Deref for MapHandle {
    type Target = ProceduralTexture;

    fn deref(&self) -> &ProceduralTexture {
        &self.source
    }
}

#[derive(Clone, Debug)]
pub struct MaterialParams {
    pub colour: Colour,
    pub emissive: Colour,
    pub emissive_intensity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_write: bool,
    pub side: Side,
    pub shading: Shading,
    /// `None` renders the flat colour.
    pub map: Option<MapHandle>,
}

impl MaterialParams {
    /// A lit material with the usual defaults: roughness 1, no metal, opaque.
    pub fn standard(colour: Colour) -> Self {
        Self {
            colour,
            emissive: Colour::hex(0x000000),
            emissive_intensity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            opacity: 1.0,
            transparent: false,
            depth_write: true,
            side: Side::Front,
            shading: Shading::Lit,
            map: None,
        }
    }

    /// An unlit material: colour times map, fogged but not shaded.
    pub fn basic(colour: Colour) -> Self {
        Self {
            shading: Shading::Unlit,
            ..Self::standard(colour)
        }
    }

    pub fn roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }

    pub fn metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness;
        self
    }

    pub fn emissive(mut self, emissive: Colour, intensity: f32) -> Self {
        self.emissive = emissive;
        self.emissive_intensity = intensity;
        self
    }

    pub fn transparent(mut self, opacity: f32) -> Self {
        self.transparent = true;
        self.opacity = opacity;
        self
    }

    pub fn double_sided(mut self) -> Self {
        self.side = Side::Double;
        self
    }

    pub fn without_depth_write(mut self) -> Self {
        self.depth_write = false;
        self
    }

    /// Attaches a generated map. An absent texture keeps the flat colour.
    pub fn with_map(self, map: Option<ProceduralTexture>) -> Self {
        self.with_shared_map(map.map(MapHandle::new))
    }

    /// Like [`Self::with_map`], sampling a map other materials may use too.
    pub fn with_shared_map(mut self, map: Option<MapHandle>) -> Self {
        if map.is_none() {
            log::warn!("procedural map unavailable, falling back to a flat colour");
        }
        self.map = map;
        self
    }

    pub fn has_map(&self) -> bool {
        self.map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_literal_is_split_into_channels() {
        let colour = Colour::hex(0x3a2a18);
        assert_eq!(colour.to_rgba8(1.0), [0x3a, 0x2a, 0x18, 0xff]);
    }

    #[test]
    fn linear_conversion_keeps_black_and_white() {
        assert_eq!(Colour::hex(0x000000).to_linear(), [0.0, 0.0, 0.0]);
        let [r, g, b] = Colour::WHITE.to_linear();
        assert!((r - 1.0).abs() < 1e-6 && (g - 1.0).abs() < 1e-6 && (b - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.5);
    }

    #[test]
    fn missing_map_keeps_flat_colour() {
        let material = MaterialParams::standard(Colour::hex(0x4b3521))
            .roughness(0.75)
            .with_map(None);
        assert!(!material.has_map());
        assert_eq!(material.colour, Colour::hex(0x4b3521));
        assert_eq!(material.roughness, 0.75);
    }

    #[test]
    fn cloned_materials_share_their_map() {
        let map = MapHandle::new(ProceduralTexture {
            image: image::RgbaImage::new(4, 4),
            wrap: crate::procedural::Wrap::Clamp,
            repeat: [1.0, 1.0],
            anisotropy: 1,
        });
        let a = MaterialParams::basic(Colour::WHITE).with_shared_map(Some(map.clone()));
        let mut b = a.clone();
        b.opacity = 0.5;
        let (a, b) = (a.map.unwrap(), b.map.unwrap());
        assert!(a.shares_upload_with(&b));
        assert!(a.shares_upload_with(&map));
        assert!(!a.is_uploaded());
        assert_eq!(a.width(), 4);
    }
}
