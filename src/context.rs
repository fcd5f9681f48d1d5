use std::sync::Arc;

use anyhow::Context as _;
use instant::Instant;
use winit::window::{Window, WindowAttributes};

use crate::{
    camera::{self, CameraResources, Projection},
    data_structures::texture,
    pipelines::{
        Pipelines,
        light::{LightResources, LightUniform},
    },
};

/// Everything a flow constructor may touch before the first frame.
#[derive(Debug, Clone)]
pub struct InitContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl From<&Context> for InitContext {
    fn from(ctx: &Context) -> Self {
        Self {
            device: ctx.device.clone(),
            queue: ctx.queue.clone(),
        }
    }
}

/// How the window hosting the scene is created and how its surface is sized.
#[derive(Clone, Debug, Default)]
pub struct SurfaceSettings {
    pub window: WindowAttributes,
    /// Device pixel ratios outside this range are clamped when sizing the surface.
    pub pixel_ratio_range: Option<(f64, f64)>,
}

impl SurfaceSettings {
    /// Surface size for a window of `width` x `height` physical pixels at
    /// `scale_factor`, ignoring the platform.
    pub fn extent(&self, width: u32, height: u32, scale_factor: f64) -> (u32, u32) {
        match self.pixel_ratio_range {
            Some(range) => clamp_pixel_ratio(width, height, scale_factor, range),
            None => (width, height),
        }
    }
}

impl From<WindowAttributes> for SurfaceSettings {
    fn from(window: WindowAttributes) -> Self {
        Self {
            window,
            pixel_ratio_range: None,
        }
    }
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: texture::Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub pipelines: Pipelines,
    /// Linear clear colour, i.e. the scene background.
    pub clear_colour: wgpu::Color,
    /// Shared clock; flows derive their elapsed time from it.
    pub clock: Instant,
    /// Device pixel ratios outside this range are clamped when sizing the surface.
    /// Set before the first configure, so the initial surface honours it.
    pub pixel_ratio_range: Option<(f64, f64)>,
}

impl Context {
    pub async fn new(
        window: Arc<Window>,
        pixel_ratio_range: Option<(f64, f64)>,
    ) -> anyhow::Result<Self> {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        // BackendBit::PRIMARY => Vulkan + Metal + DX12 + Browser WebGPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .context("Cannot open the graphics device")?;

        log::info!("Surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shader writes linear colour and relies on an sRGB surface for the
        // final encoding. Anything else comes out too dark.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("The surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        // right/left, height, forward/backward - yaw - pitch
        let camera = camera::Camera::new((0.0, 0.0, 5.0), cgmath::Deg(-90.0), cgmath::Deg(0.0));
        let projection =
            camera::Projection::new(config.width, config.height, cgmath::Deg(45.0), 0.1, 100.0);
        let camera = CameraResources::new(&device, camera, &projection);

        let depth_texture = texture::Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            "depth_texture",
        );

        let light = LightResources::new(LightUniform::new(), &device);

        let pipelines = Pipelines::new(
            &device,
            &config,
            &light.bind_group_layout,
            &camera.bind_group_layout,
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            light,
            pipelines,
            window,
            depth_texture,
            clear_colour: wgpu::Color::BLACK,
            clock: Instant::now(),
            pixel_ratio_range,
        })
    }

    /// Seconds since the context was created.
    pub fn elapsed_secs(&self) -> f32 {
        self.clock.elapsed().as_secs_f32()
    }

    pub fn set_exposure(&mut self, exposure: f32) {
        self.light.uniform.set_exposure(exposure);
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Surface size for a window of `width` x `height` physical pixels.
    ///
    /// Native surfaces have to match their window exactly, so the pixel ratio
    /// clamp only applies to the web canvas.
    pub fn surface_size(&self, width: u32, height: u32) -> (u32, u32) {
        #[cfg(target_arch = "wasm32")]
        if let Some(range) = self.pixel_ratio_range {
            return clamp_pixel_ratio(width, height, self.window.scale_factor(), range);
        }
        (width, height)
    }
}

/// Rescales a physical size rendered at `scale_factor` to one rendered at the
/// nearest ratio within `[min, max]`.
pub fn clamp_pixel_ratio(
    width: u32,
    height: u32,
    scale_factor: f64,
    (min, max): (f64, f64),
) -> (u32, u32) {
    if scale_factor <= 0.0 {
        return (width, height);
    }
    let k = scale_factor.clamp(min, max) / scale_factor;
    let rescale = |v: u32| ((v as f64 * k).round() as u32).max(1);
    (rescale(width), rescale(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_density_displays_are_capped() {
        // 1200x720 logical on a 3x display renders at 1.8x
        assert_eq!(clamp_pixel_ratio(3600, 2160, 3.0, (1.0, 1.8)), (2160, 1296));
    }

    #[test]
    fn ratios_inside_the_range_are_kept() {
        assert_eq!(clamp_pixel_ratio(1800, 1080, 1.5, (1.0, 1.8)), (1800, 1080));
    }

    #[test]
    fn settings_without_a_range_keep_the_window_size() {
        let settings = SurfaceSettings::from(WindowAttributes::default());
        assert_eq!(settings.extent(3600, 2160, 3.0), (3600, 2160));
    }

    #[test]
    fn low_density_displays_are_raised_to_one() {
        assert_eq!(clamp_pixel_ratio(600, 360, 0.5, (1.0, 1.8)), (1200, 720));
    }
}
