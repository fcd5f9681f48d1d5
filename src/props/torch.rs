//! Wall torch with a flickering flame.
//!
//! The flame breathes in scale with a per-torch phase (its x position, so
//! neighbouring torches never pulse in sync) and flickers in opacity.

use cgmath::Vector3;

use crate::{
    data_structures::{
        instance::Instance,
        material::{Colour, MaterialParams},
        scene_graph::{ContainerNode, LightNode, MeshNode, SceneNode},
    },
    pipelines::light::{Light, PointLight},
    props::{Prop, PropKind},
    resources::primitives::Shape,
};

pub const DEFAULT_INTENSITY: f32 = 20.0;

const FLAME: usize = 2;
const FLAME_NAME: &str = "torch flame";
const FLAME_HEIGHT: f32 = 1.1;

pub struct Torch {
    group: ContainerNode,
    phase: f32,
}

impl Torch {
    pub fn new(position: impl Into<Vector3<f32>>, intensity: f32) -> Self {
        let position = position.into();
        let group = ContainerNode::new("torch", Instance::at(position))
            .with_child(MeshNode::new(
                "torch handle",
                Shape::Cylinder {
                    radius_top: 0.05,
                    radius_bottom: 0.06,
                    height: 1.2,
                    radial_segments: 8,
                },
                MaterialParams::standard(Colour::hex(0x3b2914)).roughness(0.85),
                Instance::new(),
            ))
            .with_child(MeshNode::new(
                "torch ring",
                Shape::Torus {
                    radius: 0.2,
                    tube: 0.05,
                    radial_segments: 12,
                    tubular_segments: 32,
                },
                MaterialParams::standard(Colour::hex(0x5a492c)).roughness(0.6),
                Instance::at([0.0, 0.75, 0.0]),
            ))
            .with_child(MeshNode::new(
                FLAME_NAME,
                Shape::Sphere {
                    radius: 0.25,
                    width_segments: 20,
                    height_segments: 20,
                },
                MaterialParams::standard(Colour::hex(0xffcc66))
                    .emissive(Colour::hex(0xff9b2f), 1.9)
                    .transparent(0.8),
                Instance::at([0.0, FLAME_HEIGHT, 0.0]).with_uniform_scale(1.2),
            ))
            .with_child(LightNode::new(
                "torch light",
                Light::Point(PointLight::new(
                    Colour::hex(0xffbf5f),
                    intensity,
                    8.0,
                    2.5,
                )),
                Instance::at([0.0, FLAME_HEIGHT, 0.0]),
            ));
        Self {
            group,
            phase: position.x,
        }
    }

    pub fn flame(&self) -> Option<&dyn SceneNode> {
        self.group
            .children
            .get(FLAME)
            .map(|node| node.as_ref())
            .filter(|node| node.name() == FLAME_NAME)
    }

    pub fn flame_scale(&self, t: f32) -> f32 {
        1.0 + (t * 12.0 + self.phase).sin() * 0.08
    }

    pub fn flame_opacity(t: f32) -> f32 {
        0.75 + (t * 10.0).sin() * 0.12
    }
}

impl Prop for Torch {
    fn kind(&self) -> PropKind {
        PropKind::Torch
    }

    fn node(&self) -> &dyn SceneNode {
        &self.group
    }

    fn node_mut(&mut self) -> &mut dyn SceneNode {
        &mut self.group
    }

    fn update(&mut self, t: f32) {
        let scale = self.flame_scale(t);
        let Some(flame) = self
            .group
            .children
            .get_mut(FLAME)
            .filter(|node| node.name() == FLAME_NAME)
        else {
            return;
        };
        flame.local_mut().set_uniform_scale(scale);
        if let Some(material) = flame.material_mut() {
            material.opacity = Torch::flame_opacity(t);
        }
    }
}
