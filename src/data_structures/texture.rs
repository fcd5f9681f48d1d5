//! GPU textures and texture creation utilities.
//!
//! This module provides [`Texture`], a wrapper around WGPU GPU texture resources,
//! and helpers for the depth buffer, the uploaded procedural maps and the
//! plain white map bound when a material has none.

use crate::procedural::{ProceduralTexture, Wrap};

/// A GPU texture with a view and optional sampler.
///
/// Textures are used for colour maps and depth. Typically created via
/// [`from_procedural`](Self::from_procedural) or via
/// [`create_depth_texture`](Self::create_depth_texture).
#[derive(Clone, Debug)]
pub struct Texture {
    #[allow(unused)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: Option<wgpu::Sampler>,
}

impl Texture {
    /// Standard depth buffer texture format (32-bit float).
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a depth texture for depth-testing during rendering.
    ///
    /// # Arguments
    ///
    /// * `size` is [width, height] of the texture in pixels
    /// * `label` is used as a debug label for the GPU resource
    pub fn create_depth_texture(device: &wgpu::Device, size: [u32; 2], label: &str) -> Self {
        let size = wgpu::Extent3d {
            width: size[0].max(1),
            height: size[1].max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = Some(device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        }));

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// A 1x1 white map. Multiplying by it leaves the material colour untouched,
    /// so one shader serves mapped and flat materials alike.
    pub fn create_white(device: &wgpu::Device, queue: &wgpu::Queue) -> Texture {
        let image = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        Self::upload(device, queue, &image, Some("white map"), create_default_sampler(device))
    }

    /// Upload a generated map with the sampling it was generated for.
    pub fn from_procedural(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        procedural: &ProceduralTexture,
        label: &str,
    ) -> Texture {
        let address_mode = match procedural.wrap {
            Wrap::Repeat => wgpu::AddressMode::Repeat,
            Wrap::Clamp => wgpu::AddressMode::ClampToEdge,
        };
        // Anisotropic filtering requires all filters to be linear.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            anisotropy_clamp: procedural.anisotropy.max(1),
            ..Default::default()
        });
        log::debug!(
            "Uploading {label} ({}x{}, {:?})",
            procedural.width(),
            procedural.height(),
            procedural.wrap
        );
        Self::upload(device, queue, &procedural.image, Some(label), sampler)
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &image::RgbaImage,
        label: Option<&str>,
        sampler: wgpu::Sampler,
    ) -> Texture {
        let levels = mip_chain(rgba);
        let (width, height) = rgba.dimensions();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len() as u32 + 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip_level, level) in std::iter::once(rgba).chain(levels.iter()).enumerate() {
            let (width, height) = level.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &texture,
                    mip_level: mip_level as u32,
                    origin: wgpu::Origin3d::ZERO,
                },
                level,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Texture {
            texture,
            view,
            sampler: Some(sampler),
        }
    }
}

/// Every mip level below the base, each half the size of the previous one
/// down to 1x1.
///
/// Built on the CPU; WebGL has no compute or blit path for this.
pub fn mip_chain(base: &image::RgbaImage) -> Vec<image::RgbaImage> {
    let mut levels: Vec<image::RgbaImage> = Vec::new();
    loop {
        let previous = levels.last().unwrap_or(base);
        let (width, height) = previous.dimensions();
        if width <= 1 && height <= 1 {
            return levels;
        }
        let next = image::imageops::resize(
            previous,
            (width / 2).max(1),
            (height / 2).max(1),
            image::imageops::FilterType::Triangle,
        );
        levels.push(next);
    }
}

pub fn create_default_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_halves_down_to_one_texel() {
        let base = image::RgbaImage::new(512, 1024);
        let sizes: Vec<_> = mip_chain(&base).iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes.len(), 10);
        assert_eq!(sizes[0], (256, 512));
        assert_eq!(sizes[8], (1, 2));
        assert_eq!(sizes[9], (1, 1));
    }

    #[test]
    fn flat_maps_stay_flat_when_minified() {
        let base = image::RgbaImage::from_pixel(64, 64, image::Rgba([0x35, 0x28, 0x1b, 0xff]));
        for level in mip_chain(&base) {
            for pixel in level.pixels() {
                let expected = [0x35, 0x28, 0x1b, 0xff];
                assert!(pixel.0.iter().zip(expected).all(|(a, b)| a.abs_diff(b) <= 1));
            }
        }
    }

    #[test]
    fn single_texel_maps_have_no_extra_levels() {
        assert!(mip_chain(&image::RgbaImage::new(1, 1)).is_empty());
    }
}
