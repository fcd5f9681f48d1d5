//! Stone floor grain.

use rand::{Rng, RngCore};

use crate::{
    data_structures::material::Colour,
    procedural::{ProceduralTexture, TextureGenerator, Wrap, surface::DrawingSurface},
};

#[derive(Clone, Debug)]
pub struct StoneStyle {
    pub width: u32,
    pub height: u32,
    pub background: Colour,
    pub grains: u32,
    /// Grain radius is `min_radius + rand * radius_jitter` pixels.
    pub min_radius: f32,
    pub radius_jitter: f32,
    /// Grain opacity is `min_opacity + rand * opacity_jitter`.
    pub min_opacity: f32,
    pub opacity_jitter: f32,
    /// Base grain colour in 8-bit channels and the per-channel jitter added to it.
    pub grain_base: [f32; 3],
    pub grain_jitter: [f32; 3],
}

impl Default for StoneStyle {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 1024,
            background: Colour::hex(0x1f1710),
            grains: 2200,
            min_radius: 0.4,
            radius_jitter: 2.0,
            min_opacity: 0.1,
            opacity_jitter: 0.4,
            grain_base: [110.0, 82.0, 60.0],
            grain_jitter: [20.0, 10.0, 10.0],
        }
    }
}

impl TextureGenerator for StoneStyle {
    fn generate(&self, rng: &mut dyn RngCore) -> Option<ProceduralTexture> {
        let mut surface = DrawingSurface::acquire(self.width, self.height)?;
        surface.fill(self.background);

        for _ in 0..self.grains {
            let x = rng.r#gen::<f32>() * self.width as f32;
            let y = rng.r#gen::<f32>() * self.height as f32;
            let radius = rng.r#gen::<f32>() * self.radius_jitter + self.min_radius;
            let opacity = rng.r#gen::<f32>() * self.opacity_jitter + self.min_opacity;
            let mut rgba = [0.0, 0.0, 0.0, opacity];
            for c in 0..3 {
                rgba[c] = (self.grain_base[c] + rng.r#gen::<f32>() * self.grain_jitter[c]) / 255.0;
            }
            surface.fill_circle([x, y], radius, rgba);
        }

        Some(ProceduralTexture {
            image: surface.into_image(),
            wrap: Wrap::Repeat,
            repeat: [6.0, 6.0],
            anisotropy: 8,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn floor_texture_is_square_and_tiles_six_times() {
        let texture = StoneStyle::default()
            .generate(&mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!((texture.width(), texture.height()), (1024, 1024));
        assert_eq!(texture.repeat, [6.0, 6.0]);
        assert_eq!(texture.wrap, Wrap::Repeat);
    }

    #[test]
    fn grains_only_lighten_the_dark_background() {
        let style = StoneStyle {
            width: 64,
            height: 64,
            grains: 200,
            ..Default::default()
        };
        let texture = style.generate(&mut StdRng::seed_from_u64(11)).unwrap();
        let [br, bg, bb, _] = style.background.to_rgba8(1.0);
        let mut lighter = 0;
        for pixel in texture.image.pixels() {
            let [r, g, b, a] = pixel.0;
            assert_eq!(a, 255);
            assert!(r >= br && g >= bg && b >= bb);
            if r > br {
                lighter += 1;
            }
        }
        assert!(lighter > 0);
    }

    #[test]
    fn no_grains_leaves_plain_stone() {
        let style = StoneStyle {
            width: 16,
            height: 16,
            grains: 0,
            ..Default::default()
        };
        let texture = style.generate(&mut StdRng::seed_from_u64(0)).unwrap();
        assert!(
            texture
                .image
                .pixels()
                .all(|p| p.0 == style.background.to_rgba8(1.0))
        );
    }
}
