use cgmath::Vector3;

use crate::{
    data_structures::{
        instance::Instance,
        material::{Colour, MaterialParams},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
    props::{Prop, PropKind},
    resources::primitives::Shape,
};

pub const DEFAULT_ROBE: Colour = Colour::hex(0xb79c73);

/// An embalmer: head, dark body and a pale apron. Turns to face its focus
/// point every frame.
pub struct Priest {
    group: ContainerNode,
    pub focus: Option<Vector3<f32>>,
}

impl Priest {
    pub fn new(
        position: impl Into<Vector3<f32>>,
        focus: Option<Vector3<f32>>,
        robe: Option<Colour>,
    ) -> Self {
        let group = ContainerNode::new("priest", Instance::at(position))
            .with_child(MeshNode::new(
                "priest head",
                Shape::Capsule {
                    radius: 0.28,
                    length: 0.8,
                },
                MaterialParams::standard(robe.unwrap_or(DEFAULT_ROBE)).roughness(0.3),
                Instance::at([0.0, 1.1, 0.0]),
            ))
            .with_child(MeshNode::new(
                "priest body",
                Shape::Box {
                    width: 0.5,
                    height: 1.0,
                    depth: 0.35,
                },
                MaterialParams::standard(Colour::hex(0x2a1c10)).roughness(0.85),
                Instance::at([0.0, 0.5, 0.0]),
            ))
            .with_child(MeshNode::new(
                "priest apron",
                Shape::Box {
                    width: 0.4,
                    height: 0.2,
                    depth: 0.2,
                },
                MaterialParams::standard(Colour::hex(0xd4c6a5)).roughness(0.9),
                Instance::at([0.0, 0.16, 0.18]),
            ));
        Self { group, focus }
    }
}

impl Prop for Priest {
    fn kind(&self) -> PropKind {
        PropKind::Priest
    }

    fn node(&self) -> &dyn SceneNode {
        &self.group
    }

    fn node_mut(&mut self) -> &mut dyn SceneNode {
        &mut self.group
    }

    fn update(&mut self, _t: f32) {
        if let Some(focus) = self.focus {
            self.group.local.look_at(focus);
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Quaternion, Rotation};

    use super::*;

    #[test]
    fn priest_faces_the_focus_point() {
        let focus = Vector3::new(0.0, 1.0, 0.0);
        let mut priest = Priest::new([1.4, 0.0, 0.5], Some(focus), Some(Colour::hex(0xc7ad82)));
        priest.update(0.0);
        let local = priest.node().local();
        let forward = local.rotation.rotate_vector(Vector3::unit_z());
        let expected = (focus - local.position).normalize();
        assert!((forward - expected).magnitude() < 1e-4);
    }

    #[test]
    fn priest_without_focus_never_turns() {
        let mut priest = Priest::new([0.0, 0.0, -1.2], None, None);
        priest.update(3.0);
        assert_eq!(priest.node().local().rotation, Quaternion::new(1.0, 0.0, 0.0, 0.0));
        let head = priest.node().find("priest head").unwrap();
        assert_eq!(head.material().unwrap().colour, DEFAULT_ROBE);
    }
}
