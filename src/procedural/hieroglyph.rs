//! Hieroglyph wall texture.
//!
//! The wall is split into a grid of cells. Each cell gets one glyph, chosen
//! by cell index from a fixed set of ten, painted in a random palette colour
//! and tilted by a few degrees so the rows look hand-carved.

use rand::{Rng, RngCore};

use crate::{
    data_structures::material::Colour,
    procedural::{ProceduralTexture, TextureGenerator, Wrap, surface::DrawingSurface},
};

/// Glyph strokes in a unit em box, `[-0.5, 0.5]` on both axes, y down.
#[derive(Clone, Copy, Debug)]
pub enum Stroke {
    Line([f32; 2], [f32; 2]),
    Path(&'static [[f32; 2]]),
    Ring([f32; 2], f32),
    Dot([f32; 2], f32),
}

#[derive(Debug)]
pub struct Glyph {
    pub name: &'static str,
    pub strokes: &'static [Stroke],
}

pub const GLYPHS: [Glyph; 10] = [
    Glyph {
        name: "eye",
        strokes: &[
            Stroke::Path(&[
                [-0.45, 0.0],
                [-0.2, -0.15],
                [0.2, -0.15],
                [0.45, 0.0],
                [0.2, 0.12],
                [-0.2, 0.12],
                [-0.45, 0.0],
            ]),
            Stroke::Dot([0.0, -0.01], 0.08),
            Stroke::Line([-0.1, 0.12], [-0.15, 0.42]),
            Stroke::Path(&[[0.05, 0.12], [0.1, 0.34], [0.26, 0.38]]),
        ],
    },
    Glyph {
        name: "viper",
        strokes: &[
            Stroke::Path(&[
                [-0.45, 0.3],
                [-0.2, 0.24],
                [0.0, 0.3],
                [0.2, 0.24],
                [0.34, 0.08],
                [0.38, -0.12],
            ]),
            Stroke::Dot([0.4, -0.14], 0.07),
            Stroke::Line([0.36, -0.2], [0.3, -0.36]),
        ],
    },
    Glyph {
        name: "jackal",
        strokes: &[
            Stroke::Path(&[
                [-0.4, 0.4],
                [-0.3, 0.0],
                [0.1, -0.05],
                [0.25, -0.25],
                [0.45, -0.2],
            ]),
            Stroke::Line([0.25, -0.25], [0.2, -0.45]),
            Stroke::Line([0.1, -0.05], [0.15, 0.4]),
            Stroke::Line([-0.3, 0.0], [-0.45, -0.2]),
        ],
    },
    Glyph {
        name: "reed",
        strokes: &[
            Stroke::Line([0.0, 0.45], [0.0, -0.25]),
            Stroke::Path(&[[0.0, -0.25], [0.16, -0.45], [0.06, -0.1]]),
        ],
    },
    Glyph {
        name: "seated figure",
        strokes: &[
            Stroke::Ring([0.0, -0.32], 0.1),
            Stroke::Path(&[[0.0, -0.2], [-0.05, 0.15], [0.3, 0.15], [0.3, 0.42]]),
            Stroke::Line([-0.05, 0.15], [-0.3, 0.42]),
            Stroke::Line([0.0, -0.08], [0.25, -0.1]),
        ],
    },
    Glyph {
        name: "cobra",
        strokes: &[
            Stroke::Path(&[
                [-0.1, -0.42],
                [0.12, -0.3],
                [0.0, -0.1],
                [-0.15, 0.1],
                [0.0, 0.28],
                [0.3, 0.3],
                [0.42, 0.4],
            ]),
            Stroke::Dot([-0.1, -0.42], 0.06),
        ],
    },
    Glyph {
        name: "owl",
        strokes: &[
            Stroke::Ring([0.0, -0.22], 0.16),
            Stroke::Dot([-0.06, -0.24], 0.035),
            Stroke::Dot([0.06, -0.24], 0.035),
            Stroke::Path(&[[-0.16, -0.18], [-0.2, 0.3], [0.2, 0.3], [0.16, -0.18]]),
            Stroke::Line([-0.1, 0.3], [-0.12, 0.44]),
            Stroke::Line([0.1, 0.3], [0.12, 0.44]),
        ],
    },
    Glyph {
        name: "shrine",
        strokes: &[
            Stroke::Path(&[
                [-0.38, 0.4],
                [-0.38, -0.3],
                [0.38, -0.3],
                [0.38, 0.4],
                [-0.38, 0.4],
            ]),
            Stroke::Line([-0.42, -0.38], [0.42, -0.38]),
            Stroke::Line([0.0, 0.4], [0.0, 0.05]),
        ],
    },
    Glyph {
        name: "twisted flax",
        strokes: &[
            Stroke::Path(&[
                [0.0, -0.45],
                [0.2, -0.3],
                [-0.2, -0.1],
                [0.2, 0.1],
                [-0.2, 0.3],
                [0.0, 0.45],
            ]),
            Stroke::Line([-0.12, -0.45], [0.12, -0.45]),
        ],
    },
    Glyph {
        name: "sun",
        strokes: &[Stroke::Ring([0.0, 0.0], 0.32), Stroke::Dot([0.0, 0.0], 0.07)],
    },
];

#[derive(Clone, Debug)]
pub struct HieroglyphStyle {
    pub width: u32,
    pub height: u32,
    pub background: Colour,
    pub palette: Vec<Colour>,
    pub rows: u32,
    pub cols: u32,
    /// Glyph size relative to the cell height.
    pub glyph_scale: f32,
    /// Glyphs are tilted uniformly in `[-max_tilt, max_tilt)` degrees.
    pub max_tilt_degrees: f32,
    pub stroke_width: f32,
}

impl Default for HieroglyphStyle {
    fn default() -> Self {
        Self {
            width: 512,
            height: 1024,
            background: Colour::hex(0x3a2a18),
            palette: vec![
                Colour::hex(0xc0a070),
                Colour::hex(0xb8945c),
                Colour::hex(0xd8b47c),
                Colour::hex(0xa88455),
            ],
            rows: 22,
            cols: 6,
            glyph_scale: 0.54,
            max_tilt_degrees: 6.0,
            stroke_width: 3.0,
        }
    }
}

impl HieroglyphStyle {
    /// Glyph painted in the cell at `(row, col)`.
    pub fn glyph_for(&self, row: u32, col: u32) -> &'static Glyph {
        &GLYPHS[((row * self.cols + col) % GLYPHS.len() as u32) as usize]
    }

    fn paint_glyph(
        &self,
        surface: &mut DrawingSurface,
        glyph: &Glyph,
        centre: [f32; 2],
        size: f32,
        tilt: f32,
        rgba: [f32; 4],
    ) {
        let (sin, cos) = tilt.sin_cos();
        let place = |p: [f32; 2]| {
            let (x, y) = (p[0] * size, p[1] * size);
            [centre[0] + x * cos - y * sin, centre[1] + x * sin + y * cos]
        };
        for stroke in glyph.strokes {
            match *stroke {
                Stroke::Line(a, b) => {
                    surface.stroke_line(place(a), place(b), self.stroke_width, rgba)
                }
                Stroke::Path(points) => points.windows(2).for_each(|pair| {
                    surface.stroke_line(place(pair[0]), place(pair[1]), self.stroke_width, rgba)
                }),
                Stroke::Ring(c, r) => {
                    surface.stroke_circle(place(c), r * size, self.stroke_width, rgba)
                }
                Stroke::Dot(c, r) => surface.fill_circle(place(c), r * size, rgba),
            }
        }
    }
}

impl TextureGenerator for HieroglyphStyle {
    fn generate(&self, rng: &mut dyn RngCore) -> Option<ProceduralTexture> {
        let mut surface = DrawingSurface::acquire(self.width, self.height)?;
        surface.fill(self.background);

        let cell_w = self.width as f32 / self.cols as f32;
        let cell_h = self.height as f32 / self.rows as f32;
        let size = cell_h * self.glyph_scale;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let colour = if self.palette.is_empty() {
                    Colour::WHITE
                } else {
                    self.palette[(rng.r#gen::<f32>() * self.palette.len() as f32) as usize
                        % self.palette.len()]
                };
                let centre = [
                    col as f32 * cell_w + cell_w / 2.0,
                    row as f32 * cell_h + cell_h / 2.0,
                ];
                let tilt = (rng.r#gen::<f32>() * 2.0 * self.max_tilt_degrees
                    - self.max_tilt_degrees)
                    .to_radians();
                let rgba = [colour.r, colour.g, colour.b, 1.0];
                self.paint_glyph(
                    &mut surface,
                    self.glyph_for(row, col),
                    centre,
                    size,
                    tilt,
                    rgba,
                );
            }
        }

        Some(ProceduralTexture {
            image: surface.into_image(),
            wrap: Wrap::Repeat,
            repeat: [4.0, 2.0],
            anisotropy: 8,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn wall_texture_has_expected_shape_and_sampling() {
        let texture = HieroglyphStyle::default()
            .generate(&mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!((texture.width(), texture.height()), (512, 1024));
        assert_eq!(texture.wrap, Wrap::Repeat);
        assert_eq!(texture.repeat, [4.0, 2.0]);
        assert_eq!(texture.anisotropy, 8);
        // Cell corners stay background
        assert_eq!(texture.image.get_pixel(0, 0).0, [0x3a, 0x2a, 0x18, 0xff]);
    }

    #[test]
    fn glyph_cells_receive_palette_paint() {
        let style = HieroglyphStyle::default();
        let texture = style.generate(&mut StdRng::seed_from_u64(1)).unwrap();
        let background = style.background.to_rgba8(1.0);
        let painted = texture
            .image
            .pixels()
            .filter(|p| p.0 != background)
            .count();
        assert!(painted > 1000, "only {painted} glyph pixels");
    }

    #[test]
    fn glyphs_cycle_through_the_set_by_cell_index() {
        let style = HieroglyphStyle::default();
        assert_eq!(style.glyph_for(0, 0).name, "eye");
        assert_eq!(style.glyph_for(0, 3).name, "reed");
        // cell 10 wraps around to the first glyph
        assert_eq!(style.glyph_for(1, 4).name, "eye");
    }

    #[test]
    fn same_seed_same_wall() {
        let style = HieroglyphStyle::default();
        let a = style.generate(&mut StdRng::seed_from_u64(42)).unwrap();
        let b = style.generate(&mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a.image, b.image);
    }

    #[test]
    fn unavailable_surface_yields_no_texture() {
        let style = HieroglyphStyle {
            width: 0,
            ..Default::default()
        };
        assert!(style.generate(&mut StdRng::seed_from_u64(0)).is_none());
    }
}
