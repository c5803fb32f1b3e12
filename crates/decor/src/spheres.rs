use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use vitrine_common::{Color, NodeId, Transform};
use vitrine_scene::{Geometry, Material, Node, PhongMaterial, Scene};

/// An element with a per-frame update.
///
/// `animate` sets an absolute pose from `time` alone, so calling it twice
/// with the same time is harmless.
pub trait Animated {
    /// The scene node this element drives.
    fn node(&self) -> NodeId;

    /// Pose the node for `time`. Does nothing if the node has been removed.
    fn animate(&self, scene: &mut Scene, time: f32);
}

const ORBIT_RADIUS: f32 = 30.0;
const BOUNCE_HEIGHT: f32 = 20.0;
const BOUNCE_FLOOR: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BouncingSphereOptions {
    pub radius: f32,
    pub color: Color,
    pub emissive: Color,
}

impl Default for BouncingSphereOptions {
    fn default() -> Self {
        Self {
            radius: 5.0,
            color: Color::WHITE,
            emissive: Color::from_hex(0x333333),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinningSphereOptions {
    pub radius: f32,
    pub color: Color,
    pub emissive: Color,
    pub position: Vec3,
    /// Angular speed about each axis, radians per unit of time.
    pub speed: Vec3,
}

impl Default for SpinningSphereOptions {
    fn default() -> Self {
        Self {
            radius: 0.05,
            color: Color::WHITE,
            emissive: Color::from_hex(0x333333),
            position: Vec3::new(0.5, -0.3, 0.0),
            speed: Vec3::new(0.5, 1.0, 0.3),
        }
    }
}

fn add_faceted_sphere(scene: &mut Scene, radius: f32, color: Color, emissive: Color) -> Node {
    let geometry = scene.add_geometry(Geometry::icosahedron(radius, 0));
    let material = scene.add_material(Material::Phong(PhongMaterial {
        color,
        emissive,
        flat_shading: true,
    }));
    Node::mesh(geometry, material)
}

/// Position and XYZ Euler rotation of the bouncing sphere at `time`.
///
/// The sphere circles the Y axis at radius 30 while hopping twice per lap;
/// its height `|cos 2t| * 20 + 5` never drops below 5.
pub fn bouncing_pose(time: f32) -> (Vec3, Vec3) {
    let position = Vec3::new(
        time.cos() * ORBIT_RADIUS,
        (time * 2.0).cos().abs() * BOUNCE_HEIGHT + BOUNCE_FLOOR,
        time.sin() * ORBIT_RADIUS,
    );
    let rotation = Vec3::new(0.0, FRAC_PI_2 - time, time * 8.0);
    (position, rotation)
}

/// A sphere orbiting and bouncing around the middle of the room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BouncingSphere {
    mesh: NodeId,
}

impl Animated for BouncingSphere {
    fn node(&self) -> NodeId {
        self.mesh
    }

    fn animate(&self, scene: &mut Scene, time: f32) {
        let (position, rotation) = bouncing_pose(time);
        let Some(node) = scene.get(self.mesh) else {
            return;
        };
        let transform = Transform {
            position,
            ..node.transform
        }
        .with_euler(rotation.x, rotation.y, rotation.z);
        scene.set_transform(self.mesh, transform);
    }
}

pub fn create_bouncing_sphere(scene: &mut Scene, options: &BouncingSphereOptions) -> BouncingSphere {
    let node = add_faceted_sphere(scene, options.radius, options.color, options.emissive)
        .with_name("bouncing-sphere");
    let mesh = scene.add(node);
    tracing::debug!(node = %mesh.short(), radius = options.radius, "bouncing sphere created");
    BouncingSphere { mesh }
}

/// A small sphere turning in place at fixed per-axis speeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinningSphere {
    mesh: NodeId,
    speed: Vec3,
}

impl SpinningSphere {
    pub fn speed(&self) -> Vec3 {
        self.speed
    }
}

impl Animated for SpinningSphere {
    fn node(&self) -> NodeId {
        self.mesh
    }

    fn animate(&self, scene: &mut Scene, time: f32) {
        scene.set_rotation(self.mesh, self.speed * time);
    }
}

pub fn create_spinning_sphere(scene: &mut Scene, options: &SpinningSphereOptions) -> SpinningSphere {
    let node = add_faceted_sphere(scene, options.radius, options.color, options.emissive)
        .with_name("spinning-sphere")
        .with_position(options.position);
    let mesh = scene.add(node);
    tracing::debug!(node = %mesh.short(), speed = ?options.speed, "spinning sphere created");
    SpinningSphere {
        mesh,
        speed: options.speed,
    }
}
