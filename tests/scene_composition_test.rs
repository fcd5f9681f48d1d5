use cgmath::{InnerSpace, Vector3};
use per_nefer::{
    data_structures::material::{Colour, MaterialParams},
    pipelines::light::{Light, LightUniform},
    props::PropKind,
    scene::{WorkshopScene, atmosphere},
};
use rand::{SeedableRng, rngs::StdRng};

fn scene() -> WorkshopScene {
    WorkshopScene::compose(&mut StdRng::seed_from_u64(2024))
}

fn assert_positions(actual: Vec<Vector3<f32>>, expected: &[[f32; 3]]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((*a - Vector3::from(*e)).magnitude() < 1e-6, "{a:?} != {e:?}");
    }
}

#[test]
fn every_prop_is_present() {
    let census = scene().census();
    assert_eq!(census.count(PropKind::Torch), 4);
    assert_eq!(census.count(PropKind::Priest), 3);
    assert_eq!(census.count(PropKind::Sarcophagus), 1);
    assert_eq!(census.count(PropKind::Floor), 1);
    assert_eq!(census.count(PropKind::Wall), 3);
    assert_eq!(census.count(PropKind::SmokeColumn), 2);
    assert_eq!(census.entries.len(), 14);
}

#[test]
fn props_stand_at_their_literal_positions() {
    let census = scene().census();
    assert_positions(
        census.positions(PropKind::Torch),
        &[
            [-3.8, 1.2, -4.8],
            [3.8, 1.2, -4.6],
            [-3.5, 1.2, 4.5],
            [3.5, 1.2, 4.4],
        ],
    );
    assert_positions(
        census.positions(PropKind::Priest),
        &[[-1.4, 0.0, 0.6], [1.4, 0.0, 0.5], [0.0, 0.0, -1.2]],
    );
    assert_positions(
        census.positions(PropKind::Wall),
        &[[0.0, 2.5, -6.0], [-5.0, 2.5, 0.0], [5.0, 2.5, 0.0]],
    );
    assert_positions(
        census.positions(PropKind::SmokeColumn),
        &[[0.0, 1.6, 0.0], [-2.6, 1.4, -0.6]],
    );
    assert_positions(census.positions(PropKind::Sarcophagus), &[[0.0, 1.0, 0.0]]);
    assert_positions(census.positions(PropKind::Floor), &[[0.0, 0.0, 0.0]]);
}

#[test]
fn smoke_columns_are_mounted_with_their_particle_counts() {
    let scene = scene();
    let columns: Vec<usize> = scene
        .props
        .iter()
        .filter(|prop| prop.kind() == PropKind::SmokeColumn)
        .map(|prop| prop.node().get_children().len())
        .collect();
    assert_eq!(columns, [16, 12]);
}

#[test]
fn lights_are_packed_with_the_atmosphere() {
    let scene = scene();
    let sources = scene.light_sources();
    let intensities: Vec<f32> = sources
        .iter()
        .filter_map(|source| match source.light {
            Light::Point(point) => Some(point.intensity),
            Light::Spot(_) => None,
        })
        .collect();
    assert_eq!(intensities, [28.0, 24.0, 18.0, 18.0, 6.0]);

    let mut uniform = LightUniform::new();
    uniform.set_atmosphere(&scene.atmosphere);
    uniform.set_lights(&sources);
    assert_eq!(uniform.point_count(), 5);
    assert!(uniform.has_spot());
}

#[test]
fn atmosphere_uses_the_chamber_palette() {
    let atmosphere = atmosphere();
    assert_eq!(atmosphere.background, Colour::hex(0x09060c));
    assert_eq!(atmosphere.fog.colour, Colour::hex(0x07060b));
    assert_eq!((atmosphere.fog.near, atmosphere.fog.far), (12.0, 24.0));
    assert_eq!(atmosphere.ambient, (Colour::hex(0x30201a), 0.18));
}

#[test]
fn maps_fall_back_to_flat_colour() {
    let material = MaterialParams::standard(Colour::hex(0x35281b)).with_map(None);
    assert!(!material.has_map());
    assert_eq!(material.colour, Colour::hex(0x35281b));
}

#[test]
fn transparent_props_are_limited_to_flames_shroud_and_smoke() {
    let scene = scene();
    let mut names = Vec::new();
    fn walk(node: &dyn per_nefer::data_structures::scene_graph::SceneNode, out: &mut Vec<&'static str>) {
        if node.material().is_some_and(|m| m.transparent) {
            out.push(node.name());
        }
        for child in node.get_children() {
            walk(child.as_ref(), out);
        }
    }
    for prop in &scene.props {
        walk(prop.node(), &mut names);
    }
    names.sort_unstable();
    names.dedup();
    assert_eq!(names, ["shroud", "smoke particle", "torch flame"]);
}
