use glam::Vec3;
use serde::{Deserialize, Serialize};
use vitrine_common::{Color, NodeId};
use vitrine_scene::{Node, PointLight, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingOptions {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    /// Zero disables attenuation.
    pub decay: f32,
    pub position: Vec3,
}

impl Default for LightingOptions {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x7a7a6b),
            intensity: 2.5,
            distance: 250.0,
            decay: 0.0,
            position: Vec3::new(0.0, 60.0, 0.0),
        }
    }
}

/// Hang a single warm point light over the room.
pub fn create_lighting(scene: &mut Scene, options: &LightingOptions) -> NodeId {
    let light = PointLight {
        color: options.color,
        intensity: options.intensity,
        distance: options.distance,
        decay: options.decay,
    };
    let id = scene.add(
        Node::light(light)
            .with_name("point-light")
            .with_position(options.position),
    );
    tracing::debug!(node = %id.short(), color = %options.color, "point light added");
    id
}
