use anyhow::{anyhow, Result};
use approx::assert_relative_eq;
use bounce_scene::frame::{FIXED_TIME_STEP, MAX_SUB_STEPS};
use bounce_scene::viewport::Viewport;
use bounce_scene::{AnimationHost, FrameSync, SceneRenderer, SceneWorld};
use glam::Vec3;
use std::cell::Cell;

#[derive(Default)]
struct CountingHost {
    requests: Cell<u32>,
}

impl AnimationHost for CountingHost {
    fn request_frame(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// Records what the scene looked like at each render call.
#[derive(Default)]
struct RecordingRenderer {
    renders: u32,
    visuals_in_sync: bool,
    world_times: Vec<f32>,
    camera_positions: Vec<Vec3>,
}

impl SceneRenderer for RecordingRenderer {
    fn render(&mut self, scene: &SceneWorld) -> Result<()> {
        self.renders += 1;
        self.visuals_in_sync = scene.objects().iter().all(|object| {
            let body = scene.world.body(object.body()).unwrap();
            let mesh = scene.scene.mesh(object.visual()).unwrap();
            mesh.transform.position == body.position
        });
        self.world_times.push(scene.world.time());
        self.camera_positions.push(scene.camera.position());
        Ok(())
    }
}

struct FailingRenderer;

impl SceneRenderer for FailingRenderer {
    fn render(&mut self, _scene: &SceneWorld) -> Result<()> {
        Err(anyhow!("device lost"))
    }
}

fn scene() -> SceneWorld {
    SceneWorld::new(Viewport::new(800.0, 600.0, 1.0))
}

#[test]
fn test_tick_requests_exactly_one_frame() {
    let host = CountingHost::default();
    let mut scene = scene();
    let mut renderer = RecordingRenderer::default();
    let mut frame_sync = FrameSync::new();

    for _ in 0..5 {
        frame_sync.tick(&host, &mut scene, &mut renderer).unwrap();
    }

    assert_eq!(host.requests.get(), 5);
    assert_eq!(renderer.renders, 5);
    assert_eq!(frame_sync.frame_count(), 5);
}

#[test]
fn test_first_tick_runs_a_single_step() {
    let host = CountingHost::default();
    let mut scene = scene();
    let mut renderer = RecordingRenderer::default();
    let mut frame_sync = FrameSync::new();

    let substeps = frame_sync.tick(&host, &mut scene, &mut renderer).unwrap();

    assert_eq!(substeps, 1);
    assert_relative_eq!(scene.world.time(), FIXED_TIME_STEP);
}

#[test]
fn test_visuals_match_bodies_when_rendered() {
    let mut scene = scene();
    let mut renderer = RecordingRenderer::default();
    let mut frame_sync = FrameSync::new();

    for _ in 0..30 {
        frame_sync
            .advance(FIXED_TIME_STEP, &mut scene, &mut renderer)
            .unwrap();
        assert!(renderer.visuals_in_sync);
    }

    let sphere = scene.objects()[0];
    let body_y = scene.world.body(sphere.body()).unwrap().position.y;
    assert!(body_y < 3.0, "Sphere should have fallen, at {}", body_y);
}

#[test]
fn test_physics_steps_before_render() {
    let mut scene = scene();
    let mut renderer = RecordingRenderer::default();
    let mut frame_sync = FrameSync::new();

    frame_sync.advance(0.0, &mut scene, &mut renderer).unwrap();

    assert!(renderer.world_times[0] > 0.0);
}

#[test]
fn test_long_frame_is_capped() {
    let mut scene = scene();
    let mut renderer = RecordingRenderer::default();
    let mut frame_sync = FrameSync::new();

    let substeps = frame_sync
        .advance(FIXED_TIME_STEP * 10.5, &mut scene, &mut renderer)
        .unwrap();

    assert_eq!(substeps, MAX_SUB_STEPS);
    assert_relative_eq!(scene.world.time(), FIXED_TIME_STEP * MAX_SUB_STEPS as f32, epsilon = 1e-6);

    // The dropped time is not made up on the next frame.
    let substeps = frame_sync
        .advance(FIXED_TIME_STEP * 0.25, &mut scene, &mut renderer)
        .unwrap();
    assert_eq!(substeps, 0);
}

#[test]
fn test_controls_update_after_render() {
    let mut scene = scene();
    let mut renderer = RecordingRenderer::default();
    let mut frame_sync = FrameSync::new();
    let initial = scene.camera.position();

    scene.controls.rotate_left(1.0);
    frame_sync
        .advance(FIXED_TIME_STEP, &mut scene, &mut renderer)
        .unwrap();

    assert_eq!(renderer.camera_positions[0], initial);
    assert!(scene.camera.position().distance(initial) > 1e-3);
}

#[test]
fn test_render_error_propagates() {
    let mut scene = scene();
    let mut frame_sync = FrameSync::new();
    let initial = scene.camera.position();
    scene.controls.rotate_left(1.0);

    let result = frame_sync.advance(FIXED_TIME_STEP, &mut scene, &mut FailingRenderer);

    assert!(result.is_err());
    assert_eq!(frame_sync.frame_count(), 0);
    assert_eq!(scene.camera.position(), initial);
}
