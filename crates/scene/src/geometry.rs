use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Primitive shapes understood by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Rectangle in the local XY plane, centered on the origin, facing +Z.
    Plane { width: f32, height: f32 },
    /// Faceted sphere. Detail 0 is the bare 20-face icosahedron; every level
    /// splits each face into four.
    Icosahedron { radius: f32, detail: u32 },
}

// Unit-scale icosahedron; vertices are normalized onto the sphere on use.
const PHI: f32 = 1.618_034;

#[rustfmt::skip]
const ICO_VERTICES: [[f32; 3]; 12] = [
    [-1.0,  PHI,  0.0], [ 1.0,  PHI,  0.0], [-1.0, -PHI,  0.0], [ 1.0, -PHI,  0.0],
    [ 0.0, -1.0,  PHI], [ 0.0,  1.0,  PHI], [ 0.0, -1.0, -PHI], [ 0.0,  1.0, -PHI],
    [ PHI,  0.0, -1.0], [ PHI,  0.0,  1.0], [-PHI,  0.0, -1.0], [-PHI,  0.0,  1.0],
];

#[rustfmt::skip]
const ICO_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

impl Geometry {
    pub fn plane(width: f32, height: f32) -> Self {
        Self::Plane { width, height }
    }

    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        Self::Icosahedron { radius, detail }
    }

    pub fn face_count(&self) -> usize {
        match self {
            Self::Plane { .. } => 2,
            Self::Icosahedron { detail, .. } => 20 * 4usize.pow(*detail),
        }
    }

    /// Triangle list in local space.
    pub fn triangles(&self) -> Vec<[Vec3; 3]> {
        match *self {
            Self::Plane { width, height } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                let a = Vec3::new(-hw, -hh, 0.0);
                let b = Vec3::new(hw, -hh, 0.0);
                let c = Vec3::new(hw, hh, 0.0);
                let d = Vec3::new(-hw, hh, 0.0);
                vec![[a, b, c], [c, d, a]]
            }
            Self::Icosahedron { radius, detail } => {
                let mut faces: Vec<[Vec3; 3]> = ICO_FACES
                    .iter()
                    .map(|f| f.map(|i| Vec3::from_array(ICO_VERTICES[i]).normalize()))
                    .collect();
                for _ in 0..detail {
                    faces = faces.iter().flat_map(|f| subdivide(*f)).collect();
                }
                faces
                    .into_iter()
                    .map(|f| f.map(|v| v * radius))
                    .collect()
            }
        }
    }
}

/// Split a unit-sphere triangle into four, pushing the new midpoints back
/// onto the sphere.
fn subdivide([a, b, c]: [Vec3; 3]) -> [[Vec3; 3]; 4] {
    let ab = ((a + b) * 0.5).normalize();
    let bc = ((b + c) * 0.5).normalize();
    let ca = ((c + a) * 0.5).normalize();
    [[a, ab, ca], [ab, b, bc], [ca, bc, c], [ab, bc, ca]]
}
