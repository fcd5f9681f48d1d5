//! The page hosting the chamber.
//!
//! Natively this is a fixed-size window titled after the workshop. On the
//! web the scene renders into the `canvas` element of `web/index.html`; the
//! page title and the canvas styling are applied from here so the markup
//! stays minimal.

use cgmath::Deg;
use winit::{dpi::LogicalSize, window::WindowAttributes};

use crate::{
    context::{SurfaceSettings, clamp_pixel_ratio},
    flow,
    scene::WorkshopFlow,
};

pub const TITLE: &str = "Per-nefer Embalming Workshop";

pub const DESCRIPTION: &str = "A 10-meter wide cinematic glimpse inside the sacred Per-nefer chamber, \
where embalmers labor by torchlight to prepare a noble for the journey beyond. Smoke, hieroglyphs, \
and polished stone amplify the dramatic, wide-angle realism.";

pub const META_DESCRIPTION: &str = "Cinematic wide-angle visualization of the Per-nefer embalming \
chamber with dramatic torchlight and incense.";

/// Inline style of the render surface.
pub const SURFACE_STYLE: &str = "width: min(96vw, 1200px); height: min(70vh, 720px); \
border-radius: 18px; box-shadow: 0 40px 120px rgba(0, 0, 0, 0.8); \
background: radial-gradient(circle at center, rgba(18,12,6,0.7), rgba(2,2,2,0.95));";

/// Static presentation parameters of the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageShell {
    /// Logical size of the render surface.
    pub width: u32,
    pub height: u32,
    pub pixel_ratio_range: (f64, f64),
    /// ACES filmic exposure.
    pub exposure: f32,
    pub camera_position: [f32; 3],
    pub fov: Deg<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for PageShell {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 720,
            pixel_ratio_range: (1.0, 1.8),
            exposure: 1.25,
            camera_position: [0.0, 2.6, 9.5],
            fov: Deg(36.0),
            near: 0.1,
            far: 45.0,
        }
    }
}

impl PageShell {
    pub fn window_attributes(&self) -> WindowAttributes {
        WindowAttributes::default()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(self.width, self.height))
    }

    /// The window plus the pixel ratio clamp, applied from the first configure on.
    pub fn surface_settings(&self) -> SurfaceSettings {
        SurfaceSettings {
            window: self.window_attributes(),
            pixel_ratio_range: Some(self.pixel_ratio_range),
        }
    }

    /// Backing store size of the surface for a display with `scale_factor`.
    pub fn physical_size(&self, scale_factor: f64) -> (u32, u32) {
        let physical = |v: u32| (v as f64 * scale_factor).round() as u32;
        clamp_pixel_ratio(
            physical(self.width),
            physical(self.height),
            scale_factor,
            self.pixel_ratio_range,
        )
    }
}

#[cfg(target_arch = "wasm32")]
fn decorate_document() {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        log::warn!("No document to decorate");
        return;
    };
    document.set_title(TITLE);
    match document.get_element_by_id("canvas") {
        Some(canvas) => {
            if let Err(e) = canvas.set_attribute("style", SURFACE_STYLE) {
                log::warn!("Cannot style the canvas: {e:?}");
            }
        }
        None => log::warn!("No canvas element to style"),
    }
    if let Ok(Some(meta)) = document.query_selector("meta[name=description]") {
        if let Err(e) = meta.set_attribute("content", META_DESCRIPTION) {
            log::warn!("Cannot set the page description: {e:?}");
        }
    }
    if let Some(paragraph) = document.get_element_by_id("description") {
        paragraph.set_text_content(Some(DESCRIPTION));
    }
}

/// Opens the page and renders the workshop until it is closed.
pub fn run() -> anyhow::Result<()> {
    #[cfg(target_arch = "wasm32")]
    decorate_document();

    let shell = PageShell::default();
    flow::run(shell.surface_settings(), vec![WorkshopFlow::constructor()])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    if let Err(e) = run() {
        web_sys::console::error_1(&format!("{e:#}").into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_is_rendered_at_a_clamped_density() {
        let shell = PageShell::default();
        assert_eq!(shell.physical_size(1.0), (1200, 720));
        assert_eq!(shell.physical_size(1.5), (1800, 1080));
        assert_eq!(shell.physical_size(3.0), (2160, 1296));
        assert_eq!(shell.physical_size(0.75), (1200, 720));
    }

    #[test]
    fn initial_surface_settings_carry_the_clamp() {
        let shell = PageShell::default();
        let settings = shell.surface_settings();
        assert_eq!(settings.pixel_ratio_range, Some((1.0, 1.8)));
        assert_eq!(settings.extent(3600, 2160, 3.0), (2160, 1296));
        assert_eq!(settings.extent(3600, 2160, 3.0), shell.physical_size(3.0));
    }

    #[test]
    fn page_markup_hosts_the_canvas_and_overlay() {
        let html = include_str!("../web/index.html");
        assert!(html.contains(r#"<canvas id="canvas">"#));
        assert!(html.contains(r#"<div class="floating-smoke"></div>"#));
        assert!(html.contains(r#"id="description""#));
    }

    #[test]
    fn surface_style_matches_the_logical_size() {
        let shell = PageShell::default();
        assert!(SURFACE_STYLE.contains(&format!("{}px", shell.width)));
        assert!(SURFACE_STYLE.contains(&format!("{}px", shell.height)));
        assert!(SURFACE_STYLE.contains("border-radius: 18px"));
    }
}
