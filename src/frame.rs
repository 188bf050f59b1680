//! Per-frame synchronization between the physics world and the scene.
//!
//! Each tick schedules the next one, steps physics by the measured wall-clock
//! delta, copies body positions onto meshes, renders, then advances the
//! camera controls.

use crate::scene::SceneWorld;
use anyhow::Result;
use std::time::Instant;

pub const FIXED_TIME_STEP: f32 = 1.0 / 60.0;
pub const MAX_SUB_STEPS: u32 = 3;

/// Whatever drives the loop; asked for exactly one more frame per tick.
pub trait AnimationHost {
    fn request_frame(&self);
}

impl AnimationHost for winit::window::Window {
    fn request_frame(&self) {
        self.request_redraw();
    }
}

/// Draws the current state of a scene.
pub trait SceneRenderer {
    fn render(&mut self, scene: &SceneWorld) -> Result<()>;
}

/// Wall-clock delta timer. The first `delta` returns zero.
#[derive(Default)]
pub struct Clock {
    last: Option<Instant>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last = Some(now);
        dt
    }
}

#[derive(Default)]
pub struct FrameSync {
    clock: Clock,
    frame_count: u64,
}

impl FrameSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Runs one frame using the wall clock for `dt`.
    pub fn tick<H, R>(&mut self, host: &H, scene: &mut SceneWorld, renderer: &mut R) -> Result<u32>
    where
        H: AnimationHost + ?Sized,
        R: SceneRenderer + ?Sized,
    {
        host.request_frame();
        let dt = self.clock.delta();
        self.advance(dt, scene, renderer)
    }

    /// Steps, syncs, renders and updates controls for a given `dt`.
    /// Returns the number of physics sub-steps taken.
    pub fn advance<R>(&mut self, dt: f32, scene: &mut SceneWorld, renderer: &mut R) -> Result<u32>
    where
        R: SceneRenderer + ?Sized,
    {
        let substeps = scene.world.step(FIXED_TIME_STEP, dt, MAX_SUB_STEPS);
        if substeps == MAX_SUB_STEPS && dt > FIXED_TIME_STEP * MAX_SUB_STEPS as f32 {
            log::debug!("Frame took {:.1} ms, simulation is lagging", dt * 1000.0);
        }

        scene.sync_visuals();
        renderer.render(scene)?;
        scene.controls.update(&mut scene.camera);

        self.frame_count += 1;
        Ok(substeps)
    }
}
