use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vitrine_common::{Color, NodeId, Transform};

use crate::geometry::Geometry;
use crate::resources::{
    GeometryId, Material, MaterialId, ResourceId, Resources, Texture, TextureId,
};

/// An event record produced by every structural mutation of the scene.
///
/// Transform changes are not recorded, so a per-frame animation loop never
/// grows the log.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Node was added, top-level when `parent` is `None`.
    Added { id: NodeId, parent: Option<NodeId> },
    /// Node was removed (directly or as part of a removed subtree).
    Removed { id: NodeId },
    /// A geometry, material or texture was released.
    Released(ResourceId),
}

/// Errors from scene operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is not a mesh")]
    NotAMesh(NodeId),
    #[error("material {0:?} not found")]
    MaterialNotFound(MaterialId),
}

/// Renderable surface: a geometry drawn with a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mesh {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

/// Omnidirectional light. `distance` 0 means unlimited range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub distance: f32,
    pub decay: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Mesh(Mesh),
    PointLight(PointLight),
}

/// A node in the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::default(),
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(geometry: GeometryId, material: MaterialId) -> Self {
        Self::new(NodeKind::Mesh(Mesh { geometry, material }))
    }

    pub fn light(light: PointLight) -> Self {
        Self::new(NodeKind::PointLight(light))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(m) => Some(m),
            NodeKind::PointLight(_) => None,
        }
    }
}

/// Container of renderable objects.
///
/// Nodes are kept in a BTreeMap for deterministic iteration; top-level nodes
/// additionally keep their insertion order. The scene also owns the resource
/// registry that meshes reference by id.
#[derive(Debug, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    resources: Resources,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes at any depth.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Top-level nodes in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Children of `id`, empty if the node does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(Node::children).unwrap_or(&[])
    }

    /// Read-only access to all nodes.
    pub fn nodes(&self) -> &BTreeMap<NodeId, Node> {
        &self.nodes
    }

    /// Add a top-level node. Returns its id.
    pub fn add(&mut self, mut node: Node) -> NodeId {
        let id = NodeId::new();
        node.parent = None;
        node.children.clear();
        self.nodes.insert(id, node);
        self.roots.push(id);
        self.event_log.push(SceneEvent::Added { id, parent: None });
        id
    }

    /// Add a node as a child of `parent`. Its transform is relative to the parent.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        let id = NodeId::new();
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::NodeNotFound(parent))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.insert(id, node);
        self.event_log.push(SceneEvent::Added {
            id,
            parent: Some(parent),
        });
        Ok(id)
    }

    /// Remove a node together with its subtree. Returns the removed node.
    ///
    /// Resources referenced by the removed meshes stay registered; release
    /// them explicitly.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let parent = self.nodes.get(&id)?.parent;
        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(&parent) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }

        let mut removed = None;
        let subtree = self.descendants(id);
        tracing::trace!(node = %id.short(), nodes = subtree.len(), "removing subtree");
        for node_id in subtree {
            let taken = self.nodes.remove(&node_id);
            self.event_log.push(SceneEvent::Removed { id: node_id });
            if node_id == id {
                removed = taken;
            }
        }
        removed
    }

    /// `id` followed by every node below it, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get(&next) {
                out.push(next);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Replace a node's transform. Returns false if the node is gone.
    pub fn set_transform(&mut self, id: NodeId, new: Transform) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = new;
                true
            }
            None => false,
        }
    }

    /// Absolute position relative to the parent.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        let new = Transform {
            position,
            ..node.transform
        };
        self.set_transform(id, new)
    }

    /// Absolute XYZ Euler rotation relative to the parent.
    pub fn set_rotation(&mut self, id: NodeId, euler: Vec3) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        let new = node.transform.with_euler(euler.x, euler.y, euler.z);
        self.set_transform(id, new)
    }

    /// Local-to-world matrix, composed through every ancestor.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id)
            .map(|m| m.transform_point3(Vec3::ZERO))
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.resources.insert_geometry(geometry)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.resources.insert_material(material)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.resources.insert_texture(texture)
    }

    /// Release a geometry. Returns false if it was already released.
    pub fn release_geometry(&mut self, id: GeometryId) -> bool {
        self.release(ResourceId::Geometry(id))
    }

    /// Release a material. Textures it samples are not released.
    pub fn release_material(&mut self, id: MaterialId) -> bool {
        self.release(ResourceId::Material(id))
    }

    pub fn release_texture(&mut self, id: TextureId) -> bool {
        self.release(ResourceId::Texture(id))
    }

    fn release(&mut self, id: ResourceId) -> bool {
        let released = match id {
            ResourceId::Geometry(g) => self.resources.remove_geometry(g).is_some(),
            ResourceId::Material(m) => self.resources.remove_material(m).is_some(),
            ResourceId::Texture(t) => self.resources.remove_texture(t).is_some(),
        };
        if released {
            tracing::trace!(?id, "resource released");
            self.event_log.push(SceneEvent::Released(id));
        }
        released
    }

    /// Material of a mesh node.
    pub fn mesh_material(&self, id: NodeId) -> Result<&Material, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        let mesh = node.as_mesh().ok_or(SceneError::NotAMesh(id))?;
        self.resources
            .material(mesh.material)
            .ok_or(SceneError::MaterialNotFound(mesh.material))
    }

    pub fn mesh_material_mut(&mut self, id: NodeId) -> Result<&mut Material, SceneError> {
        let node = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?;
        let mesh = *node.as_mesh().ok_or(SceneError::NotAMesh(id))?;
        self.resources
            .material_mut(mesh.material)
            .ok_or(SceneError::MaterialNotFound(mesh.material))
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }
}
