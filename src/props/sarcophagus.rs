use crate::{
    data_structures::{
        instance::Instance,
        material::{Colour, MaterialParams},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
    props::{Prop, PropKind},
    resources::primitives::Shape,
};

/// The bier with the wrapped body and a thin shroud above it.
pub struct Sarcophagus {
    group: ContainerNode,
}

impl Sarcophagus {
    pub fn new() -> Self {
        let group = ContainerNode::new("sarcophagus", Instance::at([0.0, 1.0, 0.0]))
            .with_child(MeshNode::new(
                "sarcophagus base",
                Shape::Box {
                    width: 4.0,
                    height: 0.6,
                    depth: 1.5,
                },
                MaterialParams::standard(Colour::hex(0x5a3b24))
                    .roughness(0.6)
                    .metalness(0.15),
                Instance::new(),
            ))
            .with_child(MeshNode::new(
                "sarcophagus body",
                Shape::Capsule {
                    radius: 0.35,
                    length: 3.0,
                },
                MaterialParams::standard(Colour::hex(0xc4aa7a))
                    .roughness(0.55)
                    .metalness(0.25),
                Instance::at([0.0, 0.4, 0.0]),
            ))
            .with_child(MeshNode::new(
                "sarcophagus wrapping",
                Shape::Capsule {
                    radius: 0.34,
                    length: 2.6,
                },
                MaterialParams::standard(Colour::hex(0xdbc49a))
                    .roughness(0.7)
                    .metalness(0.1),
                Instance::at([0.0, 0.7, 0.0]),
            ))
            .with_child(MeshNode::new(
                "shroud",
                Shape::Plane {
                    width: 3.5,
                    height: 1.2,
                },
                MaterialParams::standard(Colour::hex(0xd0b48c))
                    .transparent(0.2)
                    .double_sided(),
                Instance::at([0.0, 0.95, 0.0]),
            ));
        Self { group }
    }
}

impl Default for Sarcophagus {
    fn default() -> Self {
        Self::new()
    }
}

impl Prop for Sarcophagus {
    fn kind(&self) -> PropKind {
        PropKind::Sarcophagus
    }

    fn node(&self) -> &dyn SceneNode {
        &self.group
    }

    fn node_mut(&mut self) -> &mut dyn SceneNode {
        &mut self.group
    }
}
