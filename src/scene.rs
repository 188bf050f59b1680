//! Scene construction: the bouncing sphere on a floor.
//!
//! `SceneWorld` owns both halves of every object. Meshes live in the
//! `RenderScene`, bodies in the physics `World`, and each `PhysicsObject`
//! only holds the two handles that tie them together.

use crate::body::{Body, BodyHandle};
use crate::camera::Camera;
use crate::contact::ContactMaterial;
use crate::controls::OrbitControls;
use crate::light::{AmbientLight, DirectionalLight};
use crate::mesh::{Color, Geometry, Mesh, MeshHandle, StandardMaterial};
use crate::viewport::Viewport;
use crate::world::World;
use glam::{Quat, Vec3};

const CAMERA_POSITION: Vec3 = Vec3::new(-3.0, 3.0, 3.0);
const BACKGROUND_COLOR: u32 = 0x1680af;
const TONE_MAPPING_EXPOSURE: f32 = 1.0;

const AMBIENT_INTENSITY: f32 = 0.7;
const DIRECTIONAL_INTENSITY: f32 = 0.2;
const DIRECTIONAL_POSITION: Vec3 = Vec3::new(5.0, 5.0, 5.0);
const SHADOW_EXTENT: f32 = 7.0;
const SHADOW_FAR: f32 = 15.0;
const SHADOW_MAP_SIZE: u32 = 1024;

const GRAVITY: [f32; 3] = [0.0, -9.82, 0.0];
const FRICTION: f32 = 0.1;
const RESTITUTION: f32 = 0.7;

const SPHERE_RADIUS: f32 = 0.5;
const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_MASS: f32 = 1.0;
const SPHERE_SPAWN: [f32; 3] = [0.0, 3.0, 0.0];
const FLOOR_SIZE: f32 = 10.0;
const FLOOR_COLOR: u32 = 0x777777;
const METALNESS: f32 = 0.3;
const ROUGHNESS: f32 = 0.4;

/// One logical entity: a mesh and the rigid body driving it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PhysicsObject {
    visual: MeshHandle,
    body: BodyHandle,
}

impl PhysicsObject {
    pub fn visual(&self) -> MeshHandle {
        self.visual
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

/// CPU-side description of everything the renderer draws.
pub struct RenderScene {
    pub background: Color,
    pub exposure: f32,
    pub shadows_enabled: bool,
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    meshes: Vec<Mesh>,
}

impl RenderScene {
    pub fn new(background: Color) -> Self {
        Self {
            background,
            exposure: 1.0,
            shadows_enabled: false,
            ambient: AmbientLight::new(Color::WHITE, 0.0),
            directional: DirectionalLight::new(Color::WHITE, 0.0),
            meshes: Vec::new(),
        }
    }

    pub fn add(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        MeshHandle(self.meshes.len() - 1)
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn mesh_mut(&mut self, handle: MeshHandle) -> Option<&mut Mesh> {
        self.meshes.get_mut(handle.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }
}

pub struct SceneWorld {
    pub camera: Camera,
    pub controls: OrbitControls,
    pub scene: RenderScene,
    pub world: World,
    viewport: Viewport,
    objects: Vec<PhysicsObject>,
}

impl SceneWorld {
    pub fn new(viewport: Viewport) -> Self {
        let mut camera = Camera::new(viewport.aspect());
        camera.set_position(CAMERA_POSITION);
        let mut controls = OrbitControls::new(&mut camera);
        controls.enable_damping = true;

        let mut scene = RenderScene::new(Color::from_hex(BACKGROUND_COLOR));
        scene.exposure = TONE_MAPPING_EXPOSURE;
        scene.shadows_enabled = true;
        scene.ambient = AmbientLight::new(Color::WHITE, AMBIENT_INTENSITY);
        scene.directional = create_directional_light();

        let mut world = World::new();
        world.set_gravity(GRAVITY);
        world.set_default_contact_material(ContactMaterial {
            friction: FRICTION,
            restitution: RESTITUTION,
        });

        let mut scene_world = Self {
            camera,
            controls,
            scene,
            world,
            viewport,
            objects: Vec::new(),
        };

        let (sphere_mesh, sphere_body) = create_sphere();
        scene_world.add_object(sphere_mesh, sphere_body);
        let (floor_mesh, floor_body) = create_floor();
        scene_world.add_object(floor_mesh, floor_body);

        log::info!(
            "Scene built: {} objects, viewport {}x{} @{}x",
            scene_world.objects.len(),
            viewport.client_width,
            viewport.client_height,
            viewport.pixel_ratio()
        );
        scene_world
    }

    /// Registers the mesh with the render scene and the body with the world.
    pub fn add_object(&mut self, mesh: Mesh, body: Body) -> PhysicsObject {
        let object = PhysicsObject {
            visual: self.scene.add(mesh),
            body: self.world.add_body(body),
        };
        self.objects.push(object);
        object
    }

    pub fn objects(&self) -> &[PhysicsObject] {
        &self.objects
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Copies each body's position onto its mesh. Orientation is left alone.
    pub fn sync_visuals(&mut self) {
        for object in &self.objects {
            let Some(body) = self.world.body(object.body) else {
                continue;
            };
            if let Some(mesh) = self.scene.mesh_mut(object.visual) {
                mesh.transform.position = body.position;
            }
        }
    }

    /// Applies a new viewport to the camera. Empty viewports are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            log::debug!("Ignoring resize to empty viewport {:?}", viewport);
            return;
        }
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        self.camera.update_projection_matrix();
    }
}

fn create_directional_light() -> DirectionalLight {
    let mut light = DirectionalLight::new(Color::WHITE, DIRECTIONAL_INTENSITY);
    light.position = DIRECTIONAL_POSITION;
    light.cast_shadow = true;
    light.shadow.map_size = SHADOW_MAP_SIZE;
    light.shadow.far = SHADOW_FAR;
    light.shadow.left = -SHADOW_EXTENT;
    light.shadow.right = SHADOW_EXTENT;
    light.shadow.top = SHADOW_EXTENT;
    light.shadow.bottom = -SHADOW_EXTENT;
    light
}

fn create_sphere() -> (Mesh, Body) {
    let mut mesh = Mesh::new(
        Geometry::Sphere {
            radius: SPHERE_RADIUS,
            width_segments: SPHERE_SEGMENTS,
            height_segments: SPHERE_SEGMENTS,
        },
        StandardMaterial {
            color: Color::WHITE,
            metalness: METALNESS,
            roughness: ROUGHNESS,
        },
    );
    mesh.cast_shadow = true;
    mesh.transform.position.y = SPHERE_RADIUS;

    (mesh, Body::new_sphere(SPHERE_SPAWN, SPHERE_RADIUS, SPHERE_MASS))
}

fn create_floor() -> (Mesh, Body) {
    let horizontal = Quat::from_axis_angle(Vec3::X, -std::f32::consts::FRAC_PI_2);

    let mut mesh = Mesh::new(
        Geometry::Plane {
            width: FLOOR_SIZE,
            height: FLOOR_SIZE,
        },
        StandardMaterial {
            color: Color::from_hex(FLOOR_COLOR),
            metalness: METALNESS,
            roughness: ROUGHNESS,
        },
    );
    mesh.receive_shadow = true;
    mesh.transform.rotation = horizontal;

    (mesh, Body::new_plane([0.0, 0.0, 0.0]).with_orientation(horizontal))
}
