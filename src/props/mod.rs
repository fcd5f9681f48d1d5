//! Props of the embalming chamber.
//!
//! A prop owns one subtree of the scene graph. Static props (floor, walls,
//! sarcophagus) never change after composition; animated props (torches,
//! priests, smoke columns) mutate their own nodes in [`Prop::update`], which
//! the scene calls once per redraw with the elapsed seconds.

pub mod floor;
pub mod priest;
pub mod sarcophagus;
pub mod smoke;
pub mod torch;
pub mod wall;

use cgmath::Vector3;

use crate::data_structures::scene_graph::SceneNode;

pub use floor::Floor;
pub use priest::Priest;
pub use sarcophagus::Sarcophagus;
pub use smoke::SmokeColumn;
pub use torch::Torch;
pub use wall::HieroglyphWall;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropKind {
    Floor,
    Wall,
    Sarcophagus,
    Torch,
    Priest,
    SmokeColumn,
}

impl PropKind {
    pub fn is_animated(self) -> bool {
        matches!(
            self,
            PropKind::Torch | PropKind::Priest | PropKind::SmokeColumn
        )
    }
}

pub trait Prop {
    fn kind(&self) -> PropKind;

    fn node(&self) -> &dyn SceneNode;

    fn node_mut(&mut self) -> &mut dyn SceneNode;

    /// Where the prop stands, i.e. the local position of its root node.
    fn position(&self) -> Vector3<f32> {
        self.node().local().position
    }

    /// Per-frame update with the seconds elapsed since start. Must only
    /// depend on `t`, never on the previous frame.
    fn update(&mut self, _t: f32) {}
}
