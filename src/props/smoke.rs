//! Incense smoke: a column of soft sprite planes drifting upwards.
//!
//! Each plane follows a [`SmokeParticle`] descriptor rolled once when the
//! column is built. Positions are recomputed from the descriptor and the
//! elapsed time every frame, so the smoke never accumulates error.

use std::f32::consts::{PI, TAU};

use cgmath::Vector3;
use rand::Rng;

use crate::{
    data_structures::{
        instance::Instance,
        material::{Colour, MapHandle, MaterialParams},
        scene_graph::{ContainerNode, MeshNode, SceneNode},
    },
    procedural::SmokeSprite,
    props::{Prop, PropKind},
    resources::primitives::Shape,
};

const PARTICLE_NAME: &str = "smoke particle";

/// Fixed animation parameters of one smoke plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmokeParticle {
    pub position: Vector3<f32>,
    /// Rotation about the plane normal.
    pub roll: f32,
    pub scale: f32,
    pub speed: f32,
    pub drift: Vector3<f32>,
}

/// Where a particle is at some moment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticlePose {
    pub position: Vector3<f32>,
    pub scale: f32,
    pub opacity: f32,
}

impl SmokeParticle {
    pub fn random<R: Rng>(spread: f32, height: f32, rng: &mut R) -> Self {
        let angle = rng.r#gen::<f32>() * TAU;
        let radius = rng.r#gen::<f32>() * spread;
        let height = rng.r#gen::<f32>() * height;
        let scale = rng.r#gen::<f32>() * 0.7 + 0.4;
        let speed = rng.r#gen::<f32>() * 0.3 + 0.25;
        let drift = Vector3::new(
            (rng.r#gen::<f32>() - 0.5) * 0.2,
            rng.r#gen::<f32>() * 0.25 + 0.12,
            (rng.r#gen::<f32>() - 0.5) * 0.2,
        );
        let roll = rng.r#gen::<f32>() * PI;
        Self {
            position: Vector3::new(angle.cos() * radius, height, angle.sin() * radius),
            roll,
            scale,
            speed,
            drift,
        }
    }

    /// Pose of the `index`th particle of a column `t` seconds in.
    pub fn pose(&self, index: usize, t: f32) -> ParticlePose {
        let i = index as f32;
        let oscillation = (t * self.speed + i).sin() * 0.35;
        ParticlePose {
            position: Vector3::new(
                self.position.x + self.drift.x * t + oscillation * 0.15,
                self.position.y + self.drift.y * t * 0.35,
                self.position.z + self.drift.z * t + (t + i).cos() * 0.05,
            ),
            scale: self.scale * (1.0 + (t * 0.5 + i).sin() * 0.1),
            opacity: 0.25 + (t * 0.3 + i).sin() * 0.06,
        }
    }
}

pub struct SmokeColumn {
    group: ContainerNode,
    count: usize,
    spread: f32,
    height: f32,
    particles: Vec<SmokeParticle>,
    /// One raster and one upload for every plane of the column.
    sprite: Option<MapHandle>,
}

impl SmokeColumn {
    /// Rolls `count` particles. Nothing is in the graph until [`Self::mount`].
    pub fn new<R: Rng>(
        count: usize,
        spread: f32,
        height: f32,
        position: impl Into<Vector3<f32>>,
        rng: &mut R,
    ) -> Self {
        Self {
            group: ContainerNode::new("smoke column", Instance::at(position)),
            count,
            spread,
            height,
            particles: roll_particles(count, spread, height, rng),
            sprite: SmokeSprite::default().render().map(MapHandle::new),
        }
    }

    pub fn particles(&self) -> &[SmokeParticle] {
        &self.particles
    }

    pub fn is_mounted(&self) -> bool {
        !self.group.children.is_empty()
    }

    /// Creates one sprite plane per particle under the column.
    pub fn mount(&mut self) {
        self.group.children.clear();
        for (index, particle) in self.particles.iter().enumerate() {
            let pose = particle.pose(index, 0.0);
            let material = MaterialParams::basic(Colour::hex(0xc9b8a3))
                .transparent(0.35)
                .without_depth_write()
                .double_sided()
                .with_shared_map(self.sprite.clone());
            let local = Instance::at(pose.position)
                .with_euler([0.0, 0.0, particle.roll])
                .with_uniform_scale(pose.scale);
            self.group.add_child(Box::new(MeshNode::new(
                PARTICLE_NAME,
                Shape::Plane {
                    width: 1.4,
                    height: 1.6,
                },
                material,
                local,
            )));
        }
    }

    /// Rerolls the particles if any of the generating inputs changed.
    /// A mounted column is remounted with the new particles.
    pub fn reconfigure<R: Rng>(&mut self, count: usize, spread: f32, height: f32, rng: &mut R) -> bool {
        if count == self.count && spread == self.spread && height == self.height {
            return false;
        }
        self.count = count;
        self.spread = spread;
        self.height = height;
        self.particles = roll_particles(count, spread, height, rng);
        if self.is_mounted() {
            self.mount();
        }
        true
    }
}

fn roll_particles<R: Rng>(count: usize, spread: f32, height: f32, rng: &mut R) -> Vec<SmokeParticle> {
    (0..count)
        .map(|_| SmokeParticle::random(spread, height, &mut *rng))
        .collect()
}

impl Prop for SmokeColumn {
    fn kind(&self) -> PropKind {
        PropKind::SmokeColumn
    }

    fn node(&self) -> &dyn SceneNode {
        &self.group
    }

    fn node_mut(&mut self) -> &mut dyn SceneNode {
        &mut self.group
    }

    fn update(&mut self, t: f32) {
        for (index, particle) in self.particles.iter().enumerate() {
            let Some(node) = self.group.children.get_mut(index) else {
                continue;
            };
            let pose = particle.pose(index, t);
            let local = node.local_mut();
            local.position = pose.position;
            local.set_uniform_scale(pose.scale);
            if let Some(material) = node.material_mut() {
                material.opacity = pose.opacity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn column(count: usize) -> SmokeColumn {
        SmokeColumn::new(count, 1.4, 3.5, [0.0, 1.6, 0.0], &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn particles_stay_within_the_column() {
        let smoke = column(64);
        for particle in smoke.particles() {
            let radial = Vector3::new(particle.position.x, 0.0, particle.position.z);
            assert!(radial.magnitude() <= 1.4 + 1e-5);
            assert!((0.0..=3.5).contains(&particle.position.y));
            assert!((0.4..=1.1).contains(&particle.scale));
            assert!((0.25..=0.55).contains(&particle.speed));
            assert!((0.12..=0.37).contains(&particle.drift.y));
            assert!((0.0..=PI).contains(&particle.roll));
        }
    }

    #[test]
    fn first_particle_starts_at_its_descriptor() {
        let mut smoke = column(16);
        smoke.mount();
        smoke.update(0.0);
        let start = smoke.particles()[0];
        let node = &smoke.node().get_children()[0];
        let position = node.local().position;
        assert!((position.x - start.position.x).abs() < 1e-6);
        assert!((position.y - start.position.y).abs() < 1e-6);
        assert!((position.z - (start.position.z + 0.05)).abs() < 1e-6);
        assert!((node.material().unwrap().opacity - 0.25).abs() < 1e-6);
    }

    #[test]
    fn opacity_is_phased_by_index() {
        let mut smoke = column(12);
        smoke.mount();
        smoke.update(0.0);
        for (i, node) in smoke.node().get_children().iter().enumerate() {
            let expected = 0.25 + (i as f32).sin() * 0.06;
            assert!((node.material().unwrap().opacity - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn unmounted_particles_are_skipped() {
        let mut smoke = column(8);
        smoke.update(4.0);
        assert!(!smoke.is_mounted());
        assert_eq!(smoke.node().count_nodes(), 1);
    }

    #[test]
    fn empty_column_mounts_nothing() {
        let mut smoke = column(0);
        smoke.mount();
        smoke.update(1.0);
        assert!(smoke.node().get_children().is_empty());
    }

    #[test]
    fn reconfigure_only_rerolls_on_change() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut smoke = column(6);
        smoke.mount();
        let before = smoke.particles().to_vec();
        assert!(!smoke.reconfigure(6, 1.4, 3.5, &mut rng));
        assert_eq!(before, smoke.particles());
        assert!(smoke.reconfigure(9, 1.4, 3.5, &mut rng));
        assert_eq!(smoke.node().get_children().len(), 9);
    }

    #[test]
    fn smoke_is_unlit_and_does_not_write_depth() {
        let mut smoke = column(1);
        smoke.mount();
        let material = smoke.node().get_children()[0].material().unwrap().clone();
        assert!(material.transparent && !material.depth_write);
        assert_eq!(material.opacity, 0.35);
        assert!(material.has_map());
    }

    #[test]
    fn planes_share_one_sprite_but_not_their_opacity() {
        let mut smoke = column(4);
        smoke.mount();
        smoke.update(2.0);
        let planes = smoke.node().get_children();
        let first = planes[0].material().unwrap();
        let sprite = first.map.as_ref().unwrap();
        for plane in &planes[1..] {
            let material = plane.material().unwrap();
            assert!(material.map.as_ref().unwrap().shares_upload_with(sprite));
            assert_ne!(material.opacity, first.opacity);
        }
    }
}
