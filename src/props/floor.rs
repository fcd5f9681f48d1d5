use std::f32::consts::FRAC_PI_2;

use rand::RngCore;

use crate::{
    data_structures::{
        instance::Instance,
        material::{Colour, MaterialParams},
        scene_graph::{MeshNode, SceneNode},
    },
    procedural::{StoneStyle, TextureGenerator},
    props::{Prop, PropKind},
    resources::primitives::Shape,
};

/// Stone floor: a 12x16 plane laid flat at the origin.
pub struct Floor {
    mesh: MeshNode,
}

impl Floor {
    pub fn new<R: RngCore>(rng: &mut R) -> Self {
        let map = StoneStyle::default().generate(rng);
        let material = MaterialParams::standard(Colour::hex(0x35281b))
            .roughness(0.85)
            .with_map(map);
        let mesh = MeshNode::new(
            "floor",
            Shape::Plane {
                width: 12.0,
                height: 16.0,
            },
            material,
            Instance::new().with_euler([-FRAC_PI_2, 0.0, 0.0]),
        );
        Self { mesh }
    }
}

impl Prop for Floor {
    fn kind(&self) -> PropKind {
        PropKind::Floor
    }

    fn node(&self) -> &dyn SceneNode {
        &self.mesh
    }

    fn node_mut(&mut self) -> &mut dyn SceneNode {
        &mut self.mesh
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Rotation, Vector3};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn floor_faces_up_with_tiled_stone() {
        let floor = Floor::new(&mut StdRng::seed_from_u64(3));
        let normal = floor
            .node()
            .local()
            .rotation
            .rotate_vector(Vector3::unit_z());
        assert!((normal - Vector3::unit_y()).magnitude() < 1e-5);
        let map = floor.node().material().unwrap().map.as_ref().unwrap();
        assert_eq!(map.repeat, [6.0, 6.0]);
    }
}
