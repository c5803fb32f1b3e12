//! Scene graph collaborator: node hierarchy, resource registry, perspective
//! camera and ray casting.
//!
//! # Invariants
//! - A node belongs to at most one parent; removing a node removes its subtree.
//! - Structural mutations and resource releases are recorded in the event log;
//!   transform changes are not.
//! - A resource id is released at most once.

pub mod camera;
pub mod geometry;
pub mod raycast;
pub mod resources;
pub mod scene;

pub use camera::PerspectiveCamera;
pub use geometry::Geometry;
pub use raycast::{Intersection, Ray};
pub use resources::{
    BasicMaterial, ColorSpace, GeometryId, Material, MaterialId, PhongMaterial,
    RefractionMaterial, RefractionUniforms, ResourceId, Resources, Side, StandardMaterial,
    Texture, TextureId, WrapMode,
};
pub use scene::{Mesh, Node, NodeKind, PointLight, Scene, SceneError, SceneEvent};

pub fn crate_info() -> &'static str {
    "vitrine-scene v0.1.0"
}
