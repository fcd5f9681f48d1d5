//! The embalming chamber.
//!
//! [`WorkshopScene`] owns every prop and free-standing light of the chamber
//! together with its atmosphere. [`WorkshopFlow`] drives it as a flow: the
//! atmosphere and lights are pushed into the context once, the animated props
//! are updated and their buffers rewritten every frame.

use cgmath::{Deg, Vector3};
use rand::Rng;

use crate::{
    camera::{Camera, Projection},
    context::Context,
    data_structures::{
        instance::Instance,
        material::Colour,
        scene_graph::{ContainerNode, LightNode, SceneNode},
    },
    flow::{FlowConstructor, GraphicsFlow, Out},
    page,
    pipelines::light::{Atmosphere, Fog, Light, LightSource, PointLight, SpotLight},
    props::{
        Floor, HieroglyphWall, Priest, Prop, PropKind, Sarcophagus, SmokeColumn, Torch,
    },
    render::Render,
};

#[cfg(feature = "integration-tests")]
use crate::flow::ImageTestResult;

pub const FOCUS_POINT: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Animated props are updated kind by kind in this order.
const UPDATE_ORDER: [PropKind; 3] = [PropKind::Torch, PropKind::Priest, PropKind::SmokeColumn];

pub fn atmosphere() -> Atmosphere {
    Atmosphere {
        background: Colour::hex(0x09060c),
        fog: Fog {
            colour: Colour::hex(0x07060b),
            near: 12.0,
            far: 24.0,
        },
        ambient: (Colour::hex(0x30201a), 0.18),
        // Warm sky over a dark earthen ground, standing in for a sunset environment.
        sky: Colour::hex(0xffc48a),
        ground: Colour::hex(0x2b1a10),
        hemisphere_intensity: 0.35,
    }
}

/// Counts and positions of the props, in composition order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Census {
    pub entries: Vec<(PropKind, Vector3<f32>)>,
}

impl Census {
    pub fn count(&self, kind: PropKind) -> usize {
        self.entries.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn positions(&self, kind: PropKind) -> Vec<Vector3<f32>> {
        self.entries
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, position)| *position)
            .collect()
    }
}

pub struct WorkshopScene {
    pub atmosphere: Atmosphere,
    pub props: Vec<Box<dyn Prop>>,
    /// Lights that belong to no prop: the overhead lamp and the spot.
    pub lights: ContainerNode,
}

impl WorkshopScene {
    pub fn compose<R: Rng>(rng: &mut R) -> Self {
        let mut props: Vec<Box<dyn Prop>> = vec![
            Box::new(HieroglyphWall::new([0.0, 2.5, -6.0], None, 10.0, 5.0, rng)),
            Box::new(HieroglyphWall::new(
                [-5.0, 2.5, 0.0],
                Some([0.0, std::f32::consts::FRAC_PI_2, 0.0]),
                12.0,
                5.0,
                rng,
            )),
            Box::new(HieroglyphWall::new(
                [5.0, 2.5, 0.0],
                Some([0.0, -std::f32::consts::FRAC_PI_2, 0.0]),
                12.0,
                5.0,
                rng,
            )),
            Box::new(Floor::new(rng)),
            Box::new(Sarcophagus::new()),
            Box::new(Priest::new([-1.4, 0.0, 0.6], Some(FOCUS_POINT), None)),
            Box::new(Priest::new(
                [1.4, 0.0, 0.5],
                Some(FOCUS_POINT),
                Some(Colour::hex(0xc7ad82)),
            )),
            Box::new(Priest::new(
                [0.0, 0.0, -1.2],
                Some(FOCUS_POINT),
                Some(Colour::hex(0xa9926d)),
            )),
            Box::new(Torch::new([-3.8, 1.2, -4.8], 28.0)),
            Box::new(Torch::new([3.8, 1.2, -4.6], 24.0)),
            Box::new(Torch::new([-3.5, 1.2, 4.5], 18.0)),
            Box::new(Torch::new([3.5, 1.2, 4.4], 18.0)),
        ];

        for (count, spread, height, position) in [
            (16, 1.4, 3.5, [0.0, 1.6, 0.0]),
            (12, 1.2, 2.4, [-2.6, 1.4, -0.6]),
        ] {
            let mut smoke = SmokeColumn::new(count, spread, height, position, rng);
            smoke.mount();
            props.push(Box::new(smoke));
        }

        let lights = ContainerNode::new("lights", Instance::new())
            .with_child(LightNode::new(
                "overhead light",
                Light::Point(PointLight::new(Colour::hex(0xffdfaa), 6.0, 12.0, 2.0)),
                Instance::at([0.0, 3.5, 1.0]),
            ))
            .with_child(LightNode::new(
                "spot light",
                Light::Spot(SpotLight {
                    colour: Colour::hex(0xf4d7a2),
                    intensity: 6.0,
                    distance: 18.0,
                    decay: 2.0,
                    angle: Deg(24.0).into(),
                    penumbra: 0.45,
                    target: Vector3::new(0.0, 0.0, 0.0),
                }),
                Instance::at([0.0, 4.8, 4.2]),
            ));

        let mut scene = Self {
            atmosphere: atmosphere(),
            props,
            lights,
        };
        scene.update(0.0);
        scene.update_world_transforms();
        log::info!(
            "Composed the workshop: {} props, {} nodes",
            scene.props.len(),
            scene.node_count()
        );
        scene
    }

    /// Advances every animated prop to `t` seconds.
    pub fn update(&mut self, t: f32) {
        for kind in UPDATE_ORDER {
            self.props
                .iter_mut()
                .filter(|prop| prop.kind() == kind)
                .for_each(|prop| prop.update(t));
        }
    }

    pub fn update_world_transforms(&mut self) {
        self.props
            .iter_mut()
            .for_each(|prop| prop.node_mut().update_world_transform_all());
        self.lights.update_world_transform_all();
    }

    pub fn census(&self) -> Census {
        Census {
            entries: self
                .props
                .iter()
                .map(|prop| (prop.kind(), prop.position()))
                .collect(),
        }
    }

    /// Every light in world space, the prop lights first.
    pub fn light_sources(&self) -> Vec<LightSource> {
        let mut sources = Vec::new();
        self.props
            .iter()
            .for_each(|prop| prop.node().collect_lights(&mut sources));
        self.lights.collect_lights(&mut sources);
        sources
    }

    pub fn node_count(&self) -> usize {
        self.props
            .iter()
            .map(|prop| prop.node().count_nodes())
            .sum::<usize>()
            + self.lights.count_nodes()
    }

    pub fn write_to_buffers(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.props
            .iter_mut()
            .for_each(|prop| prop.node_mut().write_to_buffers(queue, device));
    }

    pub fn render(&self) -> Render<'_> {
        Render::split(
            self.props
                .iter()
                .flat_map(|prop| prop.node().get_render())
                .collect(),
        )
    }
}

/// Runs the workshop: a fixed camera and a continuously animated scene.
pub struct WorkshopFlow {
    scene: WorkshopScene,
}

impl WorkshopFlow {
    pub fn new(scene: WorkshopScene) -> Self {
        Self { scene }
    }

    pub fn scene(&self) -> &WorkshopScene {
        &self.scene
    }

    pub fn constructor() -> FlowConstructor<()> {
        Box::new(|_ctx| {
            Box::pin(async move {
                let scene = WorkshopScene::compose(&mut rand::thread_rng());
                Box::new(WorkshopFlow::new(scene)) as Box<dyn GraphicsFlow<()>>
            })
        })
    }
}

impl GraphicsFlow<()> for WorkshopFlow {
    fn on_init(&mut self, ctx: &mut Context, _: &mut ()) -> Out<()> {
        let shell = page::PageShell::default();
        // right/left, height, forward/backward - yaw - pitch
        ctx.camera.camera = Camera::new(shell.camera_position, Deg(-90.0), Deg(0.0));
        ctx.projection = Projection::new(
            ctx.config.width,
            ctx.config.height,
            shell.fov,
            shell.near,
            shell.far,
        );
        self.scene.write_to_buffers(&ctx.queue, &ctx.device);

        let atmosphere = self.scene.atmosphere;
        let lights = self.scene.light_sources();
        let exposure = shell.exposure;
        Out::Configure(Box::new(move |ctx| {
            ctx.clear_colour = atmosphere.background.to_wgpu();
            ctx.light.uniform.set_atmosphere(&atmosphere);
            ctx.light.uniform.set_lights(&lights);
            ctx.set_exposure(exposure);
            ctx.light.write(&ctx.queue);
        }))
    }

    fn on_update(&mut self, ctx: &Context, _: &mut (), elapsed: f32) -> Out<()> {
        self.scene.update(elapsed);
        self.scene.update_world_transforms();
        self.scene.write_to_buffers(&ctx.queue, &ctx.device);
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        self.scene.render()
    }

    #[cfg(feature = "integration-tests")]
    fn render_to_texture(
        &self,
        _: &Context,
        _: &mut (),
        _: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
    ) -> Result<ImageTestResult, anyhow::Error> {
        Ok(ImageTestResult::Passed)
    }
}
