use cgmath::Vector3;
use rand::RngCore;

use crate::{
    data_structures::{
        instance::Instance,
        material::{Colour, MaterialParams},
        scene_graph::{MeshNode, SceneNode},
    },
    procedural::{HieroglyphStyle, TextureGenerator},
    props::{Prop, PropKind},
    resources::primitives::Shape,
};

/// A plane covered in carved glyphs. Every wall paints its own texture.
pub struct HieroglyphWall {
    mesh: MeshNode,
}

impl HieroglyphWall {
    pub fn new<R: RngCore>(
        position: impl Into<Vector3<f32>>,
        rotation: Option<[f32; 3]>,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Self {
        let map = HieroglyphStyle::default().generate(rng);
        let material = MaterialParams::standard(Colour::hex(0x4b3521))
            .emissive(Colour::hex(0x120b06), 0.45)
            .roughness(0.75)
            .metalness(0.05)
            .double_sided()
            .with_map(map);
        let mut local = Instance::at(position);
        if let Some(euler) = rotation {
            local = local.with_euler(euler);
        }
        let mesh = MeshNode::new("hieroglyph wall", Shape::Plane { width, height }, material, local);
        Self { mesh }
    }
}

impl Prop for HieroglyphWall {
    fn kind(&self) -> PropKind {
        PropKind::Wall
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
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::data_structures::material::Side;

    #[test]
    fn wall_is_double_sided_and_mapped() {
        let wall = HieroglyphWall::new([0.0, 2.5, -6.0], None, 10.0, 5.0, &mut StdRng::seed_from_u64(1));
        let material = wall.node().material().unwrap();
        assert_eq!(material.side, Side::Double);
        assert_eq!(material.emissive_intensity, 0.45);
        assert!(material.has_map());
        assert_eq!(wall.position(), Vector3::new(0.0, 2.5, -6.0));
    }
}
