use cgmath::{InnerSpace, Rotation, Vector3};
use per_nefer::{
    data_structures::scene_graph::SceneNode,
    props::{Prop, PropKind, SmokeColumn, Torch},
    scene::{FOCUS_POINT, WorkshopScene},
};
use rand::{SeedableRng, rngs::StdRng};

fn snapshot(node: &dyn SceneNode, out: &mut Vec<(Vector3<f32>, Vector3<f32>, Option<f32>)>) {
    let world = node.world();
    out.push((world.position, world.scale, node.material().map(|m| m.opacity)));
    for child in node.get_children() {
        snapshot(child.as_ref(), out);
    }
}

fn scene_snapshot(scene: &WorkshopScene) -> Vec<(Vector3<f32>, Vector3<f32>, Option<f32>)> {
    let mut out = Vec::new();
    for prop in &scene.props {
        snapshot(prop.node(), &mut out);
    }
    out
}

#[test]
fn updates_depend_only_on_elapsed_time() {
    let mut scene = WorkshopScene::compose(&mut StdRng::seed_from_u64(9));
    scene.update(3.25);
    scene.update_world_transforms();
    let first = scene_snapshot(&scene);

    scene.update(7.0);
    scene.update(3.25);
    scene.update_world_transforms();
    assert_eq!(first, scene_snapshot(&scene));
}

#[test]
fn smoke_rises_over_time() {
    let mut smoke = SmokeColumn::new(10, 1.2, 2.4, [-2.6, 1.4, -0.6], &mut StdRng::seed_from_u64(1));
    smoke.mount();
    smoke.update(0.0);
    let start: Vec<f32> = smoke.node().get_children().iter().map(|n| n.local().position.y).collect();
    smoke.update(20.0);
    for (particle, (child, y0)) in smoke
        .particles()
        .iter()
        .zip(smoke.node().get_children().iter().zip(start))
    {
        let risen = child.local().position.y - y0;
        assert!((risen - particle.drift.y * 20.0 * 0.35).abs() < 1e-4);
        assert!(risen > 0.0);
    }
}

#[test]
fn torch_flame_flickers_within_bounds() {
    let mut torch = Torch::new([3.8, 1.2, -4.6], 24.0);
    for step in 0..200 {
        let t = step as f32 * 0.037;
        torch.update(t);
        let flame = torch.flame().unwrap();
        let scale = flame.local().scale.x;
        let opacity = flame.material().unwrap().opacity;
        assert!((0.92 - 1e-6..=1.08 + 1e-6).contains(&scale));
        assert!((0.63 - 1e-6..=0.87 + 1e-6).contains(&opacity));
    }
}

#[test]
fn priests_face_the_sarcophagus() {
    let mut scene = WorkshopScene::compose(&mut StdRng::seed_from_u64(4));
    scene.update(1.0);
    for prop in scene.props.iter().filter(|p| p.kind() == PropKind::Priest) {
        let local = prop.node().local();
        let forward = local.rotation.rotate_vector(Vector3::unit_z());
        let expected = (FOCUS_POINT - local.position).normalize();
        assert!((forward - expected).magnitude() < 1e-4);
    }
}

#[test]
fn static_props_never_change() {
    let mut scene = WorkshopScene::compose(&mut StdRng::seed_from_u64(4));
    let before: Vec<_> = scene
        .props
        .iter()
        .filter(|p| !p.kind().is_animated())
        .map(|p| *p.node().local())
        .collect();
    scene.update(12.0);
    let after: Vec<_> = scene
        .props
        .iter()
        .filter(|p| !p.kind().is_animated())
        .map(|p| *p.node().local())
        .collect();
    assert_eq!(before, after);
}
