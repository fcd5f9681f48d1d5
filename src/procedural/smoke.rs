//! Soft radial sprite for the incense planes. Not random at all.

use rand::RngCore;

use crate::procedural::{
    ProceduralTexture, TextureGenerator, Wrap,
    surface::{DrawingSurface, GradientStop},
};

#[derive(Clone, Debug)]
pub struct SmokeSprite {
    pub size: u32,
    pub inner_radius: f32,
    pub stops: Vec<GradientStop>,
}

impl Default for SmokeSprite {
    fn default() -> Self {
        Self {
            size: 256,
            inner_radius: 10.0,
            stops: vec![
                GradientStop::new(0.0, 255, 255, 255, 0.6),
                GradientStop::new(0.4, 200, 200, 200, 0.4),
                GradientStop::new(1.0, 80, 80, 80, 0.0),
            ],
        }
    }
}

impl SmokeSprite {
    pub fn render(&self) -> Option<ProceduralTexture> {
        let mut surface = DrawingSurface::acquire(self.size, self.size)?;
        let half = self.size as f32 / 2.0;
        surface.fill_radial_gradient([half, half], self.inner_radius, half, &self.stops);
        Some(ProceduralTexture {
            image: surface.into_image(),
            wrap: Wrap::Clamp,
            repeat: [1.0, 1.0],
            anisotropy: 1,
        })
    }
}

impl TextureGenerator for SmokeSprite {
    fn generate(&self, _: &mut dyn RngCore) -> Option<ProceduralTexture> {
        self.render()
    }
}
