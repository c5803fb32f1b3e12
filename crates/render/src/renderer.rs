use std::fmt::Write;
use vitrine_common::NodeId;
use vitrine_scene::{NodeKind, PerspectiveCamera, Scene};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a camera, then produces output.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of `scene` as seen from `camera`.
    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Produces a human-readable, indented description of the scene graph.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_node(&self, out: &mut String, scene: &Scene, id: NodeId, depth: usize) {
        let Some(node) = scene.get(id) else {
            return;
        };
        let indent = "  ".repeat(depth + 1);
        let name = node.name.as_deref().unwrap_or("node");
        let p = node.transform.position;
        let _ = write!(
            out,
            "{indent}[{}] {name} pos=({:.2}, {:.2}, {:.2})",
            id.short(),
            p.x,
            p.y,
            p.z
        );

        match &node.kind {
            NodeKind::Mesh(mesh) => {
                let faces = scene
                    .resources()
                    .geometry(mesh.geometry)
                    .map(|g| g.face_count())
                    .unwrap_or(0);
                let material = scene
                    .resources()
                    .material(mesh.material)
                    .map(|m| m.kind_name())
                    .unwrap_or("released");
                let _ = writeln!(out, " mesh faces={faces} material={material}");
            }
            NodeKind::PointLight(light) => {
                let _ = writeln!(
                    out,
                    " light color={} intensity={:.2} distance={:.1}",
                    light.color, light.intensity, light.distance
                );
            }
        }

        for child in scene.children(id) {
            self.write_node(out, scene, *child, depth + 1);
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        let _span = tracing::trace_span!("debug_render", nodes = scene.node_count()).entered();
        let mut out = String::new();
        out.push_str("=== Scene ===\n");
        let _ = writeln!(
            out,
            "Nodes: {} (top-level {}), textures: {}",
            scene.node_count(),
            scene.roots().len(),
            scene.resources().texture_count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees
        );

        for id in scene.roots() {
            self.write_node(&mut out, scene, *id, 0);
        }

        out
    }
}
