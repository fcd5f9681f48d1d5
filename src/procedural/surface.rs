//! Off-screen raster surface the procedural generators draw into.
//!
//! Pixels are straight (non-premultiplied) RGBA8. Every drawing operation
//! composites "source over" and anti-aliases by pixel coverage, which is
//! enough for the soft, hand-painted look of the chamber textures.

use image::{Rgba, RgbaImage};

use crate::data_structures::material::Colour;

/// Largest edge a surface may have. Bigger requests fail like an
/// unavailable 2D context would.
pub const MAX_SURFACE_DIMENSION: u32 = 8192;

/// A colour stop of a radial gradient. `offset` is in `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct GradientStop {
    pub offset: f32,
    pub rgba: [f32; 4],
}

impl GradientStop {
    /// Stop from 8-bit channels and a float alpha, like `rgba(200,200,200,0.4)`.
    pub const fn new(offset: f32, r: u8, g: u8, b: u8, a: f32) -> Self {
        Self {
            offset,
            rgba: [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a],
        }
    }
}

pub struct DrawingSurface {
    image: RgbaImage,
}

impl DrawingSurface {
    /// Allocates a transparent surface, or `None` if it cannot be acquired.
    pub fn acquire(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            log::warn!("cannot acquire a {width}x{height} drawing surface");
            return None;
        }
        if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
            log::warn!(
                "drawing surface {width}x{height} exceeds the {MAX_SURFACE_DIMENSION}px limit"
            );
            return None;
        }
        Some(Self {
            image: RgbaImage::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Overwrites every pixel with an opaque colour.
    pub fn fill(&mut self, colour: Colour) {
        let pixel = Rgba(colour.to_rgba8(1.0));
        self.image.pixels_mut().for_each(|p| *p = pixel);
    }

    /// Composites `rgba` (straight alpha, 0..1) onto the pixel at `(x, y)`
    /// scaled by `coverage`.
    fn blend(&mut self, x: u32, y: u32, rgba: [f32; 4], coverage: f32) {
        let src_a = rgba[3] * coverage;
        if src_a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x, y);
        let dst_a = dst.0[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let dst_c = dst.0[c] as f32 / 255.0;
            let out_c = (rgba[c] * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
            dst.0[c] = (out_c.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
        dst.0[3] = (out_a.clamp(0.0, 1.0) * 255.0).round() as u8;
    }

    /// Visits every pixel whose centre lies in the clamped bounding box and
    /// blends with the coverage returned by `shape`.
    fn cover(
        &mut self,
        min: [f32; 2],
        max: [f32; 2],
        rgba: [f32; 4],
        shape: impl Fn(f32, f32) -> f32,
    ) {
        let x0 = min[0].floor().max(0.0) as u32;
        let y0 = min[1].floor().max(0.0) as u32;
        let x1 = (max[0].ceil().max(0.0) as u32).min(self.width());
        let y1 = (max[1].ceil().max(0.0) as u32).min(self.height());
        for y in y0..y1 {
            for x in x0..x1 {
                let coverage = shape(x as f32 + 0.5, y as f32 + 0.5).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, rgba, coverage);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, centre: [f32; 2], radius: f32, rgba: [f32; 4]) {
        let reach = radius + 1.0;
        self.cover(
            [centre[0] - reach, centre[1] - reach],
            [centre[0] + reach, centre[1] + reach],
            rgba,
            |x, y| {
                let d = ((x - centre[0]).powi(2) + (y - centre[1]).powi(2)).sqrt();
                radius - d + 0.5
            },
        );
    }

    /// A segment with round caps.
    pub fn stroke_line(&mut self, from: [f32; 2], to: [f32; 2], width: f32, rgba: [f32; 4]) {
        let half = width / 2.0;
        let reach = half + 1.0;
        let min = [from[0].min(to[0]) - reach, from[1].min(to[1]) - reach];
        let max = [from[0].max(to[0]) + reach, from[1].max(to[1]) + reach];
        self.cover(min, max, rgba, |x, y| {
            half - distance_to_segment([x, y], from, to) + 0.5
        });
    }

    pub fn stroke_circle(&mut self, centre: [f32; 2], radius: f32, width: f32, rgba: [f32; 4]) {
        let half = width / 2.0;
        let reach = radius + half + 1.0;
        self.cover(
            [centre[0] - reach, centre[1] - reach],
            [centre[0] + reach, centre[1] + reach],
            rgba,
            |x, y| {
                let d = ((x - centre[0]).powi(2) + (y - centre[1]).powi(2)).sqrt();
                half - (d - radius).abs() + 0.5
            },
        );
    }

    /// Fills the whole surface with a radial gradient between the circles
    /// `(centre, inner)` and `(centre, outer)`. Outside the ramp the end
    /// stops are padded.
    pub fn fill_radial_gradient(
        &mut self,
        centre: [f32; 2],
        inner: f32,
        outer: f32,
        stops: &[GradientStop],
    ) {
        if stops.is_empty() {
            return;
        }
        let span = (outer - inner).max(f32::EPSILON);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let d = ((x as f32 + 0.5 - centre[0]).powi(2)
                    + (y as f32 + 0.5 - centre[1]).powi(2))
                .sqrt();
                let t = ((d - inner) / span).clamp(0.0, 1.0);
                let rgba = sample_stops(stops, t);
                self.blend(x, y, rgba, 1.0);
            }
        }
    }
}

/// Linear interpolation between the stops surrounding `t`.
pub fn sample_stops(stops: &[GradientStop], t: f32) -> [f32; 4] {
    let first = stops[0];
    if t <= first.offset {
        return first.rgba;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let width = (b.offset - a.offset).max(f32::EPSILON);
            let k = (t - a.offset) / width;
            let mut out = [0.0; 4];
            for c in 0..4 {
                out[c] = a.rgba[c] + (b.rgba[c] - a.rgba[c]) * k;
            }
            return out;
        }
    }
    stops[stops.len() - 1].rgba
}

fn distance_to_segment(p: [f32; 2], a: [f32; 2], b: [f32; 2]) -> f32 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len2 > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = [a[0] + ab[0] * t, a[1] + ab[1] * t];
    ((p[0] - closest[0]).powi(2) + (p[1] - closest[1]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_or_oversized_surfaces_are_unavailable() {
        assert!(DrawingSurface::acquire(0, 16).is_none());
        assert!(DrawingSurface::acquire(16, 0).is_none());
        assert!(DrawingSurface::acquire(MAX_SURFACE_DIMENSION + 1, 4).is_none());
        assert!(DrawingSurface::acquire(4, 4).is_some());
    }

    #[test]
    fn fill_then_opaque_circle_replaces_centre_only() {
        let mut surface = DrawingSurface::acquire(32, 32).unwrap();
        surface.fill(Colour::hex(0x000000));
        surface.fill_circle([16.0, 16.0], 4.0, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(surface.pixel(16, 16), [255, 255, 255, 255]);
        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn translucent_paint_mixes_with_background() {
        let mut surface = DrawingSurface::acquire(8, 8).unwrap();
        surface.fill(Colour::hex(0x000000));
        surface.stroke_line([0.0, 4.0], [8.0, 4.0], 4.0, [1.0, 1.0, 1.0, 0.5]);
        let [r, _, _, a] = surface.pixel(4, 4);
        assert_eq!(a, 255);
        assert!((120..=135).contains(&r), "got {r}");
    }

    #[test]
    fn stops_are_interpolated_and_padded() {
        let stops = [
            GradientStop::new(0.0, 255, 255, 255, 0.6),
            GradientStop::new(1.0, 0, 0, 0, 0.0),
        ];
        assert_eq!(sample_stops(&stops, -1.0), stops[0].rgba);
        assert_eq!(sample_stops(&stops, 2.0), stops[1].rgba);
        let mid = sample_stops(&stops, 0.5);
        assert!((mid[3] - 0.3).abs() < 1e-6);
    }

    #[test]
    fn segment_distance_handles_degenerate_segments() {
        assert_eq!(distance_to_segment([3.0, 4.0], [0.0, 0.0], [0.0, 0.0]), 5.0);
        assert_eq!(distance_to_segment([1.0, 1.0], [0.0, 0.0], [2.0, 0.0]), 1.0);
    }
}
