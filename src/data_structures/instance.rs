//! Prop transforms and their GPU representation.
//!
//! Every scene node owns exactly one [`Instance`] as its local transform and
//! one as its cached world transform. The world transform is packed into an
//! [`InstanceRaw`] and uploaded as a one-element instance buffer.

use std::ops::Mul;

use cgmath::{InnerSpace, Matrix3, One, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};

use crate::data_structures::model;

/// Position, rotation (as quaternion) and scale of a scene node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instance {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Instance {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(position: impl Into<Vector3<f32>>) -> Self {
        Self {
            position: position.into(),
            ..Self::new()
        }
    }

    /// Rotation from intrinsic XYZ Euler angles in radians.
    pub fn with_euler(mut self, euler: [f32; 3]) -> Self {
        self.rotation = euler_xyz(euler);
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    /// Rotates the instance so that its local +Z axis points at `target`,
    /// keeping +Y as close to world up as possible.
    pub fn look_at(&mut self, target: Vector3<f32>) {
        let up = Vector3::unit_y();
        let mut forward = target - self.position;
        if forward.magnitude2() == 0.0 {
            forward = Vector3::unit_z();
        }
        forward = forward.normalize();
        let mut side = up.cross(forward);
        if side.magnitude2() < 1e-10 {
            // Target straight above or below: nudge off the pole.
            forward.z += 0.0001;
            forward = forward.normalize();
            side = up.cross(forward);
        }
        let side = side.normalize();
        let up = forward.cross(side);
        self.rotation = Quaternion::from(Matrix3::from_cols(side, up, forward));
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        let world_matrix = self.to_matrix();
        let handedness = world_matrix.determinant().signum();
        InstanceRaw {
            model: world_matrix.into(),
            normal: Matrix3::from(self.rotation).into(),
            handedness,
        }
    }
}

/// Three.js style Euler order "XYZ": `R = Rx * Ry * Rz`.
pub fn euler_xyz(euler: [f32; 3]) -> Quaternion<f32> {
    Quaternion::from_angle_x(Rad(euler[0]))
        * Quaternion::from_angle_y(Rad(euler[1]))
        * Quaternion::from_angle_z(Rad(euler[2]))
}

impl<'a, 'b> Mul<&'b Instance> for &'a Instance {
    type Output = Instance;

    fn mul(self, rhs: &'b Instance) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Instance {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl Mul<Instance> for Instance {
    type Output = Self;

    fn mul(self, rhs: Instance) -> Self::Output {
        &self * &rhs
    }
}

impl From<Vector3<f32>> for Instance {
    fn from(position: Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw instance is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
    handedness: f32,
}

/**
 * Stride layout: the model matrix as four vec4s (locations 5-8), the
 * rotation-only normal matrix as three vec3s (9-11) and the sign of the
 * model determinant (12) for mirrored transforms.
 */
impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance once per instance instead of once per vertex
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 25]>() as wgpu::BufferAddress,
                    shader_location: 12,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Rotation;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn parent_transform_is_applied_to_child_position() {
        let parent = Instance::at([0.0, 1.0, 0.0]).with_uniform_scale(2.0);
        let child = Instance::at([0.0, 0.4, 0.0]);
        let world = &parent * &child;
        assert!(close(world.position, Vector3::new(0.0, 1.8, 0.0)));
        assert!(close(world.scale, Vector3::new(2.0, 2.0, 2.0)));
    }

    #[test]
    fn look_at_points_local_z_to_target() {
        let mut priest = Instance::at([-1.4, 0.0, 0.6]);
        let target = Vector3::new(0.0, 1.0, 0.0);
        priest.look_at(target);
        let forward = priest.rotation.rotate_vector(Vector3::unit_z());
        let expected = (target - priest.position).normalize();
        assert!(close(forward, expected), "{forward:?} != {expected:?}");
    }

    #[test]
    fn look_at_straight_up_does_not_produce_nan() {
        let mut instance = Instance::new();
        instance.look_at(Vector3::new(0.0, 5.0, 0.0));
        let forward = instance.rotation.rotate_vector(Vector3::unit_z());
        assert!(forward.x.is_finite() && forward.y.is_finite() && forward.z.is_finite());
        assert!(forward.y > 0.99);
    }

    #[test]
    fn euler_quarter_turn_about_y_maps_z_to_x() {
        let rotation = euler_xyz([0.0, std::f32::consts::FRAC_PI_2, 0.0]);
        let rotated = rotation.rotate_vector(Vector3::unit_z());
        assert!(close(rotated, Vector3::unit_x()));
    }
}
