use glam::Vec3;
use vitrine_common::NodeId;

use crate::resources::{Material, Side};
use crate::scene::{NodeKind, Scene};

/// Half-line in world space. `direction` is always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to a triangle, either face (Möller–Trumbore).
    pub fn intersect_triangle(&self, [a, b, c]: [Vec3; 3]) -> Option<f32> {
        const EPSILON: f32 = 1e-7;
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }

    /// Like [`intersect_triangle`](Self::intersect_triangle), but only faces
    /// covered by `side` are hit.
    pub fn intersect_triangle_side(&self, tri: [Vec3; 3], side: Side) -> Option<f32> {
        let [a, b, c] = tri;
        let front = self.direction.dot((b - a).cross(c - a)) < 0.0;
        match (side, front) {
            (Side::Double, _) | (Side::Front, true) | (Side::Back, false) => {
                self.intersect_triangle(tri)
            }
            _ => None,
        }
    }
}

/// A ray hit against a mesh node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

impl Scene {
    /// Hit-test `ray` against the mesh at `id`, and its whole subgraph when
    /// `recursive` is set. Hits are sorted nearest first; lights never hit.
    /// A mesh is only hit on the faces its material covers, so a front-sided
    /// plane seen from behind is missed.
    pub fn intersect_object(&self, ray: &Ray, id: NodeId, recursive: bool) -> Vec<Intersection> {
        let targets = if recursive {
            self.descendants(id)
        } else if self.contains(id) {
            vec![id]
        } else {
            Vec::new()
        };

        let mut hits = Vec::new();
        for node_id in targets {
            if let Some(hit) = self.intersect_mesh(ray, node_id) {
                hits.push(hit);
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn intersect_mesh(&self, ray: &Ray, id: NodeId) -> Option<Intersection> {
        let node = self.get(id)?;
        let NodeKind::Mesh(mesh) = node.kind else {
            return None;
        };
        let geometry = self.resources().geometry(mesh.geometry)?;
        let side = self
            .resources()
            .material(mesh.material)
            .map(Material::side)
            .unwrap_or_default();
        let world = self.world_matrix(id)?;

        geometry
            .triangles()
            .into_iter()
            .filter_map(|tri| {
                ray.intersect_triangle_side(tri.map(|v| world.transform_point3(v)), side)
            })
            .min_by(|a, b| a.total_cmp(b))
            .map(|distance| Intersection {
                node: id,
                distance,
                point: ray.at(distance),
            })
    }
}
