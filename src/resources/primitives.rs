//! Primitive solids built on the CPU.
//!
//! Conventions: solids are centred on the origin with Y up, planes lie in XY
//! facing +Z, the torus ring lies in XY around the Z axis. Triangles wind
//! counter-clockwise seen from outside and texture coordinates put `v = 0`
//! at the top, which is what wgpu samples.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::ModelVertex;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Plane {
        width: f32,
        height: f32,
    },
    /// A cylinder of `length` capped with two hemispheres of `radius`.
    Capsule {
        radius: f32,
        length: f32,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        radial_segments: u32,
    },
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
}

const CAPSULE_CAP_SEGMENTS: u32 = 4;
const CAPSULE_RADIAL_SEGMENTS: u32 = 8;

#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Axis aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in &self.vertices {
            for a in 0..3 {
                min[a] = min[a].min(v.position[a]);
                max[a] = max[a].max(v.position[a]);
            }
        }
        (min, max)
    }

    fn push(&mut self, position: Vector3<f32>, normal: Vector3<f32>, tex_coords: [f32; 2]) -> u32 {
        self.vertices.push(ModelVertex {
            position: position.into(),
            tex_coords,
            normal: normal.into(),
        });
        (self.vertices.len() - 1) as u32
    }

    /// Quad centred at `centre` spanned by the half extents `right` and `up`.
    /// It faces `right × up`.
    fn quad(&mut self, centre: Vector3<f32>, right: Vector3<f32>, up: Vector3<f32>) {
        let normal = right.cross(up).normalize();
        let top_left = self.push(centre - right + up, normal, [0.0, 0.0]);
        let bottom_left = self.push(centre - right - up, normal, [0.0, 1.0]);
        let bottom_right = self.push(centre + right - up, normal, [1.0, 1.0]);
        let top_right = self.push(centre + right + up, normal, [1.0, 0.0]);
        self.indices
            .extend_from_slice(&[top_left, bottom_left, top_right]);
        self.indices
            .extend_from_slice(&[bottom_left, bottom_right, top_right]);
    }

    /// Sweeps a profile around the Y axis. Each profile ring is
    /// `(radius, y, radial normal, vertical normal)` and rings go top to bottom.
    fn revolve(&mut self, rings: &[(f32, f32, f32, f32)], segments: u32) {
        let first = self.vertices.len() as u32;
        let stride = segments + 1;
        let last_ring = (rings.len().max(2) - 1) as f32;
        for (j, &(radius, y, nr, ny)) in rings.iter().enumerate() {
            for i in 0..=segments {
                let u = i as f32 / segments as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                let normal = Vector3::new(nr * sin, ny, nr * cos);
                let normal = if normal.magnitude2() > 0.0 {
                    normal.normalize()
                } else {
                    Vector3::unit_y()
                };
                self.push(
                    Vector3::new(radius * sin, y, radius * cos),
                    normal,
                    [u, j as f32 / last_ring],
                );
            }
        }
        for j in 0..rings.len().saturating_sub(1) as u32 {
            for i in 0..segments {
                let a = first + j * stride + i;
                let b = first + (j + 1) * stride + i;
                let c = b + 1;
                let d = a + 1;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
    }

    /// Flat disc at height `y` facing up or down.
    fn cap(&mut self, radius: f32, y: f32, segments: u32, facing_up: bool) {
        let normal = if facing_up {
            Vector3::unit_y()
        } else {
            -Vector3::unit_y()
        };
        let centre = self.push(Vector3::new(0.0, y, 0.0), normal, [0.5, 0.5]);
        let rim = self.vertices.len() as u32;
        for i in 0..=segments {
            let (sin, cos) = (i as f32 / segments as f32 * TAU).sin_cos();
            self.push(
                Vector3::new(radius * sin, y, radius * cos),
                normal,
                [0.5 + 0.5 * sin, 0.5 - 0.5 * cos],
            );
        }
        for i in 0..segments {
            let (p, q) = (rim + i, rim + i + 1);
            if facing_up {
                self.indices.extend_from_slice(&[centre, p, q]);
            } else {
                self.indices.extend_from_slice(&[centre, q, p]);
            }
        }
    }
}

impl Shape {
    pub fn mesh_data(&self) -> MeshData {
        let mut data = MeshData::default();
        match *self {
            Shape::Plane { width, height } => data.quad(
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(width / 2.0, 0.0, 0.0),
                Vector3::new(0.0, height / 2.0, 0.0),
            ),
            Shape::Box {
                width,
                height,
                depth,
            } => {
                let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
                let faces = [
                    ([hw, 0.0, 0.0], [0.0, 0.0, -hd], [0.0, hh, 0.0]),
                    ([-hw, 0.0, 0.0], [0.0, 0.0, hd], [0.0, hh, 0.0]),
                    ([0.0, hh, 0.0], [hw, 0.0, 0.0], [0.0, 0.0, -hd]),
                    ([0.0, -hh, 0.0], [hw, 0.0, 0.0], [0.0, 0.0, hd]),
                    ([0.0, 0.0, hd], [hw, 0.0, 0.0], [0.0, hh, 0.0]),
                    ([0.0, 0.0, -hd], [-hw, 0.0, 0.0], [0.0, hh, 0.0]),
                ];
                for (centre, right, up) in faces {
                    data.quad(centre.into(), right.into(), up.into());
                }
            }
            Shape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                let rings: Vec<_> = (0..=height_segments.max(2))
                    .map(|j| {
                        let phi = j as f32 / height_segments.max(2) as f32 * PI;
                        let (sin, cos) = phi.sin_cos();
                        (radius * sin, radius * cos, sin, cos)
                    })
                    .collect();
                data.revolve(&rings, width_segments.max(3));
            }
            Shape::Capsule { radius, length } => {
                let half = length / 2.0;
                let steps = CAPSULE_CAP_SEGMENTS;
                let hemisphere = |offset: f32, y: f32| {
                    (0..=steps).map(move |k| {
                        let phi = offset + k as f32 / steps as f32 * FRAC_PI_2;
                        let (sin, cos) = phi.sin_cos();
                        (radius * sin, y + radius * cos, sin, cos)
                    })
                };
                let rings: Vec<_> = hemisphere(0.0, half)
                    .chain(hemisphere(FRAC_PI_2, -half))
                    .collect();
                data.revolve(&rings, CAPSULE_RADIAL_SEGMENTS);
            }
            Shape::Cylinder {
                radius_top,
                radius_bottom,
                height,
                radial_segments,
            } => {
                let segments = radial_segments.max(3);
                let half = height / 2.0;
                // Side normals tilt with the taper.
                let slope = Vector3::new(height, radius_bottom - radius_top, 0.0).normalize();
                data.revolve(
                    &[
                        (radius_top, half, slope.x, slope.y),
                        (radius_bottom, -half, slope.x, slope.y),
                    ],
                    segments,
                );
                if radius_top > 0.0 {
                    data.cap(radius_top, half, segments, true);
                }
                if radius_bottom > 0.0 {
                    data.cap(radius_bottom, -half, segments, false);
                }
            }
            Shape::Torus {
                radius,
                tube,
                radial_segments,
                tubular_segments,
            } => {
                let radial = radial_segments.max(3);
                let tubular = tubular_segments.max(3);
                for j in 0..=radial {
                    for i in 0..=tubular {
                        let u = i as f32 / tubular as f32 * TAU;
                        let v = j as f32 / radial as f32 * TAU;
                        let position = Vector3::new(
                            (radius + tube * v.cos()) * u.cos(),
                            (radius + tube * v.cos()) * u.sin(),
                            tube * v.sin(),
                        );
                        let centre = Vector3::new(radius * u.cos(), radius * u.sin(), 0.0);
                        data.push(
                            position,
                            (position - centre).normalize(),
                            [i as f32 / tubular as f32, j as f32 / radial as f32],
                        );
                    }
                }
                let stride = tubular + 1;
                for j in 1..=radial {
                    for i in 1..=tubular {
                        let a = stride * j + i - 1;
                        let b = stride * (j - 1) + i - 1;
                        let c = stride * (j - 1) + i;
                        let d = stride * j + i;
                        data.indices.extend_from_slice(&[a, b, d, b, c, d]);
                    }
                }
            }
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_shapes() -> Vec<Shape> {
        vec![
            Shape::Box {
                width: 4.0,
                height: 0.6,
                depth: 1.5,
            },
            Shape::Plane {
                width: 12.0,
                height: 16.0,
            },
            Shape::Capsule {
                radius: 0.35,
                length: 3.0,
            },
            Shape::Cylinder {
                radius_top: 0.05,
                radius_bottom: 0.06,
                height: 1.2,
                radial_segments: 8,
            },
            Shape::Torus {
                radius: 0.2,
                tube: 0.05,
                radial_segments: 12,
                tubular_segments: 32,
            },
            Shape::Sphere {
                radius: 0.25,
                width_segments: 20,
                height_segments: 20,
            },
        ]
    }

    fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
        for a in 0..3 {
            assert!(
                (actual[a] - expected[a]).abs() < 1e-4,
                "{actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn indices_are_triangles_within_bounds_and_normals_are_unit() {
        for shape in all_shapes() {
            let data = shape.mesh_data();
            assert!(!data.indices.is_empty(), "{shape:?}");
            assert_eq!(data.indices.len() % 3, 0, "{shape:?}");
            let count = data.vertices.len() as u32;
            assert!(data.indices.iter().all(|&i| i < count), "{shape:?}");
            for v in &data.vertices {
                let n = Vector3::from(v.normal);
                assert!((n.magnitude() - 1.0).abs() < 1e-4, "{shape:?} {n:?}");
            }
        }
    }

    #[test]
    fn box_and_plane_extents_match_dimensions() {
        let (min, max) = Shape::Box {
            width: 4.0,
            height: 0.6,
            depth: 1.5,
        }
        .mesh_data()
        .bounds();
        assert_close(min, [-2.0, -0.3, -0.75]);
        assert_close(max, [2.0, 0.3, 0.75]);

        let plane = Shape::Plane {
            width: 12.0,
            height: 16.0,
        }
        .mesh_data();
        assert_eq!(plane.vertices.len(), 4);
        assert!(plane.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        let (min, max) = plane.bounds();
        assert_close(min, [-6.0, -8.0, 0.0]);
        assert_close(max, [6.0, 8.0, 0.0]);
    }

    #[test]
    fn capsule_height_is_length_plus_two_radii() {
        let (min, max) = Shape::Capsule {
            radius: 0.35,
            length: 3.0,
        }
        .mesh_data()
        .bounds();
        assert!((max[1] - 1.85).abs() < 1e-4);
        assert!((min[1] + 1.85).abs() < 1e-4);
        assert!(max[0] <= 0.35 + 1e-4);
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        for shape in all_shapes() {
            let data = shape.mesh_data();
            for tri in data.indices.chunks(3) {
                let p = |i: u32| Vector3::from(data.vertices[i as usize].position);
                let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
                if face.magnitude2() < 1e-12 {
                    // pole triangles collapse
                    continue;
                }
                let n = Vector3::from(data.vertices[tri[0] as usize].normal)
                    + Vector3::from(data.vertices[tri[1] as usize].normal)
                    + Vector3::from(data.vertices[tri[2] as usize].normal);
                assert!(face.dot(n) > 0.0, "{shape:?} triangle {tri:?}");
            }
        }
    }
}
