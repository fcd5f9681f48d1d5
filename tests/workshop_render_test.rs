#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn chamber_is_drawn_over_the_background() {
    use crate::common::test_utils::TestRender;
    use per_nefer::{
        context::InitContext,
        flow::ImageTestResult,
        scene::{WorkshopFlow, WorkshopScene, atmosphere},
    };
    use rand::{SeedableRng, rngs::StdRng};

    golden_image_test!(|_: InitContext| {
        let scene = WorkshopScene::compose(&mut StdRng::seed_from_u64(42));
        TestRender::new(
            WorkshopFlow::new(scene),
            |_| {},
            Box::new(|_, state: &mut FrameCounter, texture| {
                // Meshes are uploaded on the first update, give them a few frames.
                if state.frame() < 3 {
                    return Ok(ImageTestResult::Waiting);
                }
                // The surface may be BGRA, accept the background in either order.
                let [r, g, b, _] = atmosphere().background.to_rgba8(1.0);
                let near = |pixel: &image::Rgba<u8>, [x, y, z]: [u8; 3]| {
                    pixel[0].abs_diff(x) <= 8 && pixel[1].abs_diff(y) <= 8 && pixel[2].abs_diff(z) <= 8
                };
                let drawn = texture
                    .pixels()
                    .filter(|pixel| !near(pixel, [r, g, b]) && !near(pixel, [b, g, r]))
                    .count();
                if drawn > 0 {
                    Ok(ImageTestResult::Passed)
                } else {
                    Ok(ImageTestResult::Failed)
                }
            }),
        )
    });
}
