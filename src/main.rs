//! Interactive viewer for the bouncing-sphere scene.
//!
//! This module handles:
//! - Command-line argument parsing
//! - Window creation and the winit event loop
//! - Forwarding resize and pointer input to the scene
//! - Driving `FrameSync` from redraw requests
//!
//! # Event Handling
//! - Left drag: orbit the camera
//! - Right drag: pan
//! - Mouse wheel: dolly
//! - Q/Escape: exit
//! - Window resize / scale change: resize renderer and camera
//!
//! With `--save-frame` the scene is simulated without a window and a single
//! rendered frame is written to a PNG.

use anyhow::{anyhow, Result};
use bounce_scene::{
    capture,
    controls::PointerButton,
    frame::FIXED_TIME_STEP,
    gpu::GpuContext,
    viewport::Viewport,
    FrameSync, RenderOutput, Renderer, SceneRenderer, SceneWorld,
};
use clap::Parser;
use glam::Vec2;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use winit::{
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowBuilder},
};

#[derive(Parser, Debug)]
#[command(name = "bounce_scene")]
#[command(about = "A sphere bouncing on a floor, physics synced to a wgpu scene")]
struct Args {
    /// Initial window width in logical pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Render one frame without a window and save it as PNG
    #[arg(long)]
    save_frame: Option<PathBuf>,

    /// Frames to simulate before --save-frame captures
    #[arg(long, default_value = "60")]
    frames: u32,
}

/// GPU context plus the renderer drawing into it.
struct View {
    gpu: GpuContext,
    renderer: Renderer,
}

impl SceneRenderer for View {
    fn render(&mut self, scene: &SceneWorld) -> Result<()> {
        match self.renderer.render(&self.gpu, scene) {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.renderer.reconfigure(&self.gpu);
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => Err(anyhow!("GPU out of memory")),
            Err(e) => {
                log::warn!("Render error: {:?}", e);
                Ok(())
            }
        }
    }
}

#[derive(Default)]
struct PointerState {
    position: Vec2,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(output_path) = &args.save_frame {
        return run_headless(output_path, args.width, args.height, args.frames);
    }

    run_windowed(&args)
}

fn run_headless(output_path: &Path, width: u32, height: u32, frames: u32) -> Result<()> {
    log::info!("Running headless, saving frame to {}", output_path.display());

    let gpu = pollster::block_on(GpuContext::new())?;
    let viewport = Viewport::new(width as f64, height as f64, 1.0);
    let mut scene = SceneWorld::new(viewport);
    let renderer = Renderer::new(&gpu, RenderOutput::Offscreen { width, height }, viewport, &scene)?;
    let mut view = View { gpu, renderer };

    let mut frame_sync = FrameSync::new();
    for _ in 0..frames.max(1) {
        frame_sync.advance(FIXED_TIME_STEP, &mut scene, &mut view)?;
    }

    let (out_width, out_height) = view.renderer.output_size();
    let pixels = view
        .renderer
        .capture_frame(&view.gpu)
        .ok_or_else(|| anyhow!("Frame capture failed"))?;
    capture::save_png(output_path, &pixels, out_width, out_height)
}

fn run_windowed(args: &Args) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let window = Arc::new(create_window(&event_loop, args.width, args.height)?);

    let (gpu, surface) = pollster::block_on(GpuContext::for_window(window.clone()))?;
    let viewport = Viewport::from_physical(window.inner_size(), window.scale_factor());
    let mut scene = SceneWorld::new(viewport);
    let renderer = Renderer::new(
        &gpu,
        RenderOutput::Surface {
            surface,
            size: window.inner_size(),
        },
        viewport,
        &scene,
    )?;
    let mut view = View { gpu, renderer };
    let mut frame_sync = FrameSync::new();
    let mut pointer = PointerState::default();

    let failure: Arc<Mutex<Option<anyhow::Error>>> = Arc::new(Mutex::new(None));
    let failure_in_loop = failure.clone();

    window.request_redraw();
    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Wait);

        let Event::WindowEvent { event, .. } = event else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(physical_size) => {
                handle_resize(&window, &mut scene, &mut view, physical_size);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                handle_resize(&window, &mut scene, &mut view, window.inner_size());
            }
            WindowEvent::MouseInput { state, button, .. } => {
                handle_mouse_input(&mut scene, &pointer, state, button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                handle_cursor_moved(&window, &mut scene, &mut pointer, position);
            }
            WindowEvent::MouseWheel { delta, .. } => handle_mouse_wheel(&mut scene, delta),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyQ | KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => elwt.exit(),
            WindowEvent::RedrawRequested => {
                if let Err(e) = frame_sync.tick(&*window, &mut scene, &mut view) {
                    stop_with_error(elwt, &failure_in_loop, e);
                }
            }
            _ => {}
        }
    })?;

    let error = failure.lock().map_err(|_| anyhow!("Failure slot poisoned"))?.take();
    match error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn create_window(event_loop: &EventLoop<()>, width: u32, height: u32) -> Result<Window> {
    let window = WindowBuilder::new()
        .with_title("Bounce Scene")
        .with_inner_size(LogicalSize::new(width, height))
        .build(event_loop)?;
    Ok(window)
}

fn stop_with_error(
    elwt: &EventLoopWindowTarget<()>,
    failure: &Arc<Mutex<Option<anyhow::Error>>>,
    error: anyhow::Error,
) {
    log::error!("Frame loop stopped: {:#}", error);
    if let Ok(mut slot) = failure.lock() {
        *slot = Some(error);
    }
    elwt.exit();
}

fn handle_resize(window: &Window, scene: &mut SceneWorld, view: &mut View, physical_size: PhysicalSize<u32>) {
    let viewport = Viewport::from_physical(physical_size, window.scale_factor());
    scene.resize(viewport);
    view.renderer.resize(&view.gpu, viewport, physical_size);
}

fn handle_mouse_input(scene: &mut SceneWorld, pointer: &PointerState, state: ElementState, button: MouseButton) {
    match state {
        ElementState::Pressed => {
            let button = match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Right => PointerButton::Secondary,
                _ => PointerButton::Other,
            };
            scene.controls.pointer_down(button, pointer.position);
        }
        ElementState::Released => scene.controls.pointer_up(),
    }
}

fn handle_cursor_moved(
    window: &Window,
    scene: &mut SceneWorld,
    pointer: &mut PointerState,
    position: PhysicalPosition<f64>,
) {
    let logical = position.to_logical::<f32>(window.scale_factor());
    pointer.position = Vec2::new(logical.x, logical.y);

    let client_height = scene.viewport().client_height as f32;
    scene
        .controls
        .pointer_move(pointer.position, client_height, &scene.camera);
}

fn handle_mouse_wheel(scene: &mut SceneWorld, delta: MouseScrollDelta) {
    let scroll_amount = match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
    };
    scene.controls.wheel(scroll_amount);
}
