#![allow(dead_code)]

#[cfg(feature = "integration-tests")]
use per_nefer::{
    context::Context,
    flow::{GraphicsFlow, ImageTestResult, Out},
    render::Render,
};

/// Counts redraws so validations can wait for the first frames to settle.
#[derive(Debug, Default)]
pub(crate) struct FrameCounter(pub(crate) u32);

impl FrameCounter {
    pub(crate) fn frame(&self) -> u32 {
        self.0
    }

    pub(crate) fn progress(&mut self) {
        self.0 += 1;
    }
}

#[cfg(feature = "integration-tests")]
pub(crate) type Validation = Box<
    dyn Fn(
        &Context,
        &mut FrameCounter,
        &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error>,
>;

/// Wraps any flow over `()` so it can be validated frame by frame.
#[cfg(feature = "integration-tests")]
pub(crate) struct TestRender<F> {
    pub(crate) inner: F,
    pub(crate) setup: Box<dyn Fn(&mut Context)>,
    pub(crate) validate: Validation,
}

#[cfg(feature = "integration-tests")]
impl<F: GraphicsFlow<()>> TestRender<F> {
    pub(crate) fn new(inner: F, setup: impl Fn(&mut Context) + 'static, validate: Validation) -> Self {
        Self {
            inner,
            setup: Box::new(setup),
            validate,
        }
    }
}

#[cfg(feature = "integration-tests")]
impl<F: GraphicsFlow<()>> GraphicsFlow<FrameCounter> for TestRender<F> {
    fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<FrameCounter> {
        if let Out::Configure(configure) = self.inner.on_init(ctx, &mut ()) {
            configure(ctx);
        }
        (self.setup)(ctx);
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, state: &mut FrameCounter, elapsed: f32) -> Out<FrameCounter> {
        match self.inner.on_update(ctx, &mut (), elapsed) {
            Out::Configure(configure) => {
                state.progress();
                Out::Configure(configure)
            }
            _ => Out::Mutate(Box::new(FrameCounter::progress)),
        }
    }

    fn on_render(&self) -> Render<'_> {
        self.inner.on_render()
    }

    fn render_to_texture(
        &self,
        ctx: &Context,
        state: &mut FrameCounter,
        texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        (self.validate)(ctx, state, texture)
    }
}

/// A flow that draws nothing.
#[cfg(feature = "integration-tests")]
pub(crate) struct Empty;

#[cfg(feature = "integration-tests")]
impl GraphicsFlow<()> for Empty {
    fn on_init(&mut self, _: &mut Context, _: &mut ()) -> Out<()> {
        Out::Empty
    }

    fn on_update(&mut self, _: &Context, _: &mut (), _: f32) -> Out<()> {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        Render::None
    }

    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut (),
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}

pub(crate) fn to_rgba8(colour: wgpu::Color) -> image::Rgba<u8> {
    let f_to_u8 = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    image::Rgba([
        f_to_u8(colour.r),
        f_to_u8(colour.g),
        f_to_u8(colour.b),
        f_to_u8(colour.a),
    ])
}

#[macro_export]
macro_rules! golden_image_test {
    ($build:expr) => {{
        use crate::common::test_utils::FrameCounter;
        use per_nefer::flow::{FlowConstructor, GraphicsFlow};
        let constructor: FlowConstructor<FrameCounter> = Box::new(|ctx| {
            Box::pin(async move {
                let g_flow: Box<dyn GraphicsFlow<FrameCounter>> = Box::new(($build)(ctx));
                g_flow
            })
        });

        per_nefer::flow::run(
            per_nefer::page::PageShell::default().window_attributes(),
            vec![constructor],
        )
        .expect("Failed to run flow for integration test.");
    }};
}
