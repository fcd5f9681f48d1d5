//! Render pipelines.
//!
//! All meshes share `scene.wgsl`. A material's [`Blending`] picks one of
//! eight pipeline variants: opaque or alpha blended, back-face culled or
//! double sided, with or without depth writes.

pub mod basic;
pub mod light;
pub mod transparent;

use crate::data_structures::model::Blending;

#[derive(Debug)]
pub struct Pipelines {
    variants: [wgpu::RenderPipeline; 8],
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let variants = std::array::from_fn(|idx| {
            let blending = Self::blending_of(idx);
            let cull_mode = if blending.double_sided {
                None
            } else {
                Some(wgpu::Face::Back)
            };
            if blending.transparent {
                transparent::mk_transparent_pipeline(
                    device,
                    config,
                    light_bind_group_layout,
                    camera_bind_group_layout,
                    cull_mode,
                    blending.depth_write,
                )
            } else {
                basic::mk_basic_pipeline(
                    device,
                    config,
                    light_bind_group_layout,
                    camera_bind_group_layout,
                    cull_mode,
                    blending.depth_write,
                )
            }
        });
        Self { variants }
    }

    pub fn select(&self, blending: &Blending) -> &wgpu::RenderPipeline {
        &self.variants[Self::index_of(blending)]
    }

    fn index_of(blending: &Blending) -> usize {
        (blending.transparent as usize) | (blending.double_sided as usize) << 1
            | (blending.depth_write as usize) << 2
    }

    fn blending_of(idx: usize) -> Blending {
        Blending {
            transparent: idx & 1 != 0,
            double_sided: idx & 2 != 0,
            depth_write: idx & 4 != 0,
        }
    }
}
