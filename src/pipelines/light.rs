//! Scene lighting: light descriptions, the packed light uniform and its GPU
//! resources.
//!
//! Every light of the chamber plus the atmosphere (ambient, hemisphere, fog
//! and exposure) is packed into one uniform bound at group 2 of every
//! pipeline. Intensities are physical in the sense of candela for punctual
//! lights, with a smooth cutoff at `distance` and inverse power falloff with
//! exponent `decay`.

use cgmath::{InnerSpace, Rad, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::material::Colour;

pub const MAX_POINT_LIGHTS: usize = 8;

/// Fog start far beyond any far plane; the shader's smoothstep needs a non-empty range.
const NO_FOG: f32 = 1.0e30;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub colour: Colour,
    pub intensity: f32,
    /// Range after which the light contributes nothing; `0` is unbounded.
    pub distance: f32,
    pub decay: f32,
}

impl PointLight {
    pub fn new(colour: Colour, intensity: f32, distance: f32, decay: f32) -> Self {
        Self {
            colour,
            intensity,
            distance,
            decay,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub colour: Colour,
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
    /// Half angle of the outer cone.
    pub angle: Rad<f32>,
    /// Fraction of the cone over which the edge fades.
    pub penumbra: f32,
    /// World space point the cone is aimed at.
    pub target: Vector3<f32>,
}

impl SpotLight {
    pub fn cone_cosines(&self) -> (f32, f32) {
        let outer = self.angle.0.cos();
        let inner = (self.angle.0 * (1.0 - self.penumbra)).cos();
        (outer, inner)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Light {
    Point(PointLight),
    Spot(SpotLight),
}

/// A light with its resolved world position, as gathered from the scene graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub name: &'static str,
    pub position: Vector3<f32>,
    pub light: Light,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub colour: Colour,
    pub near: f32,
    pub far: f32,
}

/// Global illumination terms that are not owned by any node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atmosphere {
    pub background: Colour,
    pub fog: Fog,
    pub ambient: (Colour, f32),
    pub sky: Colour,
    pub ground: Colour,
    pub hemisphere_intensity: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    /// xyz position, w intensity
    position: [f32; 4],
    /// linear rgb, w distance
    colour: [f32; 4],
    /// x decay
    params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    position: [f32; 4],
    colour: [f32; 4],
    /// xyz normalized direction, w decay
    direction: [f32; 4],
    /// x cos(outer), y cos(inner)
    cone: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    points: [PointLightRaw; MAX_POINT_LIGHTS],
    spot: SpotLightRaw,
    ambient: [f32; 4],
    sky: [f32; 4],
    ground: [f32; 4],
    /// rgb fog colour, w fog near
    fog: [f32; 4],
    /// x fog far, y exposure, z point light count, w spot enabled
    misc: [f32; 4],
}

impl LightUniform {
    /// A dark room: nothing lit, no fog, neutral exposure.
    pub fn new() -> Self {
        Self {
            points: [PointLightRaw::default(); MAX_POINT_LIGHTS],
            spot: SpotLightRaw::default(),
            ambient: [0.0; 4],
            sky: [0.0; 4],
            ground: [0.0; 4],
            fog: [0.0, 0.0, 0.0, NO_FOG],
            misc: [NO_FOG * 2.0, 1.0, 0.0, 0.0],
        }
    }

    pub fn point_count(&self) -> usize {
        self.misc[2] as usize
    }

    pub fn has_spot(&self) -> bool {
        self.misc[3] > 0.5
    }

    pub fn exposure(&self) -> f32 {
        self.misc[1]
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.misc[1] = exposure;
    }

    pub fn set_atmosphere(&mut self, atmosphere: &Atmosphere) {
        let scaled = |colour: Colour, k: f32| {
            let [r, g, b] = colour.to_linear();
            [r * k, g * k, b * k, 0.0]
        };
        self.ambient = scaled(atmosphere.ambient.0, atmosphere.ambient.1);
        self.sky = scaled(atmosphere.sky, atmosphere.hemisphere_intensity);
        self.ground = scaled(atmosphere.ground, atmosphere.hemisphere_intensity);
        let [r, g, b] = atmosphere.fog.colour.to_linear();
        self.fog = [r, g, b, atmosphere.fog.near];
        self.misc[0] = atmosphere.fog.far;
    }

    /// Packs the punctual lights. Extra point lights beyond
    /// [`MAX_POINT_LIGHTS`] and every spot light after the first are dropped
    /// with a warning.
    pub fn set_lights(&mut self, sources: &[LightSource]) {
        let mut points = 0;
        let mut spot = false;
        for source in sources {
            let p = source.position;
            match source.light {
                Light::Point(light) => {
                    if points == MAX_POINT_LIGHTS {
                        log::warn!("Dropping point light {}: limit reached", source.name);
                        continue;
                    }
                    let [r, g, b] = light.colour.to_linear();
                    self.points[points] = PointLightRaw {
                        position: [p.x, p.y, p.z, light.intensity],
                        colour: [r, g, b, light.distance],
                        params: [light.decay, 0.0, 0.0, 0.0],
                    };
                    points += 1;
                }
                Light::Spot(light) => {
                    if spot {
                        log::warn!("Dropping spot light {}: only one is supported", source.name);
                        continue;
                    }
                    let direction = light.target - p;
                    let direction = if direction.magnitude2() > 0.0 {
                        direction.normalize()
                    } else {
                        -Vector3::unit_y()
                    };
                    let (outer, inner) = light.cone_cosines();
                    let [r, g, b] = light.colour.to_linear();
                    self.spot = SpotLightRaw {
                        position: [p.x, p.y, p.z, light.intensity],
                        colour: [r, g, b, light.distance],
                        direction: [direction.x, direction.y, direction.z, light.decay],
                        cone: [outer, inner, 0.0, 0.0],
                    };
                    spot = true;
                }
            }
        }
        for unused in &mut self.points[points..] {
            *unused = PointLightRaw::default();
        }
        if !spot {
            self.spot = SpotLightRaw::default();
        }
        self.misc[2] = points as f32;
        self.misc[3] = if spot { 1.0 } else { 0.0 };
    }
}

impl Default for LightUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;

    fn torch(x: f32) -> LightSource {
        LightSource {
            name: "torch light",
            position: Vector3::new(x, 2.3, 0.0),
            light: Light::Point(PointLight::new(Colour::hex(0xffbf5f), 20.0, 8.0, 2.5)),
        }
    }

    #[test]
    fn uniform_size_is_a_multiple_of_sixteen() {
        assert_eq!(std::mem::size_of::<LightUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<PointLightRaw>(), 48);
        assert_eq!(std::mem::size_of::<SpotLightRaw>(), 64);
    }

    #[test]
    fn points_are_packed_in_order() {
        let mut uniform = LightUniform::new();
        uniform.set_lights(&[torch(-3.8), torch(3.8)]);
        assert_eq!(uniform.point_count(), 2);
        assert_eq!(uniform.points[0].position, [-3.8, 2.3, 0.0, 20.0]);
        assert_eq!(uniform.points[1].params[0], 2.5);
        assert!(!uniform.has_spot());
    }

    #[test]
    fn surplus_point_lights_are_dropped() {
        let mut uniform = LightUniform::new();
        let many: Vec<_> = (0..MAX_POINT_LIGHTS + 3).map(|i| torch(i as f32)).collect();
        uniform.set_lights(&many);
        assert_eq!(uniform.point_count(), MAX_POINT_LIGHTS);
    }

    #[test]
    fn spot_points_at_its_target() {
        let spot = SpotLight {
            colour: Colour::hex(0xf4d7a2),
            intensity: 6.0,
            distance: 18.0,
            decay: 2.0,
            angle: Deg(24.0).into(),
            penumbra: 0.45,
            target: Vector3::new(0.0, 0.0, 0.0),
        };
        let mut uniform = LightUniform::new();
        uniform.set_lights(&[LightSource {
            name: "spot",
            position: Vector3::new(0.0, 4.8, 4.2),
            light: Light::Spot(spot),
        }]);
        assert!(uniform.has_spot());
        let [x, y, z, _] = uniform.spot.direction;
        let expected = Vector3::new(0.0, -4.8, -4.2).normalize();
        assert!((Vector3::new(x, y, z) - expected).magnitude() < 1e-5);
        let (outer, inner) = spot.cone_cosines();
        assert!(inner > outer);
    }
}
