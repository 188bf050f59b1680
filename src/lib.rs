pub mod body;
pub mod camera;
pub mod capture;
pub mod contact;
pub mod controls;
pub mod frame;
pub mod gpu;
pub mod light;
pub mod mesh;
pub mod renderer;
pub mod scene;
pub mod viewport;
pub mod world;

pub use frame::{AnimationHost, FrameSync, SceneRenderer};
pub use renderer::{RenderOutput, Renderer};
pub use scene::{PhysicsObject, SceneWorld};
