//! GPU meshes, materials and the draw helpers used by the render pass.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        material::{MaterialParams, Shading, Side},
        texture::Texture,
    },
    resources::primitives::MeshData,
};

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Material factors as laid out in the shader's `Material` uniform.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    /// Linear rgb and opacity
    pub colour: [f32; 4],
    /// Linear emissive rgb premultiplied by its intensity
    pub emissive: [f32; 4],
    /// roughness, metalness, has_map, unlit
    pub params: [f32; 4],
    /// uv repeat in xy
    pub uv: [f32; 4],
}

impl From<&MaterialParams> for MaterialUniform {
    fn from(params: &MaterialParams) -> Self {
        let [r, g, b] = params.colour.to_linear();
        let [er, eg, eb] = params.emissive.to_linear();
        let k = params.emissive_intensity;
        let repeat = params.map.as_ref().map_or([1.0, 1.0], |map| map.repeat);
        Self {
            colour: [r, g, b, params.opacity],
            emissive: [er * k, eg * k, eb * k, 0.0],
            params: [
                params.roughness,
                params.metalness,
                if params.has_map() { 1.0 } else { 0.0 },
                if params.shading == Shading::Unlit {
                    1.0
                } else {
                    0.0
                },
            ],
            uv: [repeat[0], repeat[1], 0.0, 0.0],
        }
    }
}

/// How a material must be rasterized; selects the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Blending {
    pub transparent: bool,
    pub double_sided: bool,
    pub depth_write: bool,
}

impl From<&MaterialParams> for Blending {
    fn from(params: &MaterialParams) -> Self {
        Self {
            transparent: params.transparent,
            double_sided: params.side == Side::Double,
            depth_write: params.depth_write,
        }
    }
}

#[derive(Debug)]
pub struct Material {
    pub name: String,
    #[allow(unused)]
    pub texture: Texture,
    pub uniform: MaterialUniform,
    pub buffer: wgpu::Buffer,
    pub blending: Blending,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        params: &MaterialParams,
        texture: Texture,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let uniform = MaterialUniform::from(params);
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} material buffer")),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffer.as_entire_binding(),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            texture,
            uniform,
            buffer,
            blending: Blending::from(params),
            bind_group,
        }
    }

    /// Pushes changed factors (opacity flicker etc.) to the GPU.
    pub fn write(&mut self, queue: &wgpu::Queue, params: &MaterialParams) {
        let uniform = MaterialUniform::from(params);
        if uniform != self.uniform {
            self.uniform = uniform;
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
    pub material: usize,
}

impl Mesh {
    pub fn from_data(device: &wgpu::Device, name: &str, data: &MeshData, material: usize) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Vertex Buffer")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name} Index Buffer")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: data.indices.len() as u32,
            material,
        }
    }
}

#[derive(Debug)]
pub struct Model {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

pub trait DrawModel<'a> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a Mesh,
        material: &'a Material,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );

    fn draw_model_instanced(
        &mut self,
        model: &'a Model,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'b Mesh,
        material: &'b Material,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }

    fn draw_model_instanced(
        &mut self,
        model: &'b Model,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        for mesh in &model.meshes {
            let material = &model.materials[mesh.material];
            self.draw_mesh_instanced(
                mesh,
                material,
                instances.clone(),
                camera_bind_group,
                light_bind_group,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::material::Colour;

    #[test]
    fn flat_material_uniform_has_no_map_flag() {
        let params = MaterialParams::standard(Colour::hex(0x35281b)).roughness(0.85);
        let uniform = MaterialUniform::from(&params);
        assert_eq!(uniform.params[0], 0.85);
        assert_eq!(uniform.params[2], 0.0);
        assert_eq!(uniform.uv, [1.0, 1.0, 0.0, 0.0]);
        assert_eq!(uniform.colour[3], 1.0);
    }

    #[test]
    fn emissive_is_scaled_by_intensity() {
        let params =
            MaterialParams::standard(Colour::hex(0xffcc66)).emissive(Colour::WHITE, 1.9);
        let uniform = MaterialUniform::from(&params);
        assert!((uniform.emissive[0] - 1.9).abs() < 1e-5);
    }

    #[test]
    fn smoke_like_material_blends_without_depth_writes() {
        let params = MaterialParams::basic(Colour::hex(0xc9b8a3))
            .transparent(0.35)
            .without_depth_write()
            .double_sided();
        let blending = Blending::from(&params);
        assert!(blending.transparent && blending.double_sided && !blending.depth_write);
        assert_eq!(MaterialUniform::from(&params).params[3], 1.0);
    }
}
