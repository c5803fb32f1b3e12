use glam::Vec2;
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vitrine_common::Color;

use crate::geometry::Geometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometryId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// Any releasable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceId {
    Geometry(GeometryId),
    Material(MaterialId),
    Texture(TextureId),
}

/// How texture coordinates outside `0..1` are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Which faces of a surface are drawn and hit by rays. The front face is the
/// one whose vertices wind counter-clockwise towards the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Linear,
    Srgb,
}

/// A decoded RGBA image plus its sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub image: RgbaImage,
    pub wrap: WrapMode,
    pub repeat: Vec2,
    pub color_space: ColorSpace,
    pub anisotropy: u8,
}

impl Texture {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            wrap: WrapMode::ClampToEdge,
            repeat: Vec2::ONE,
            color_space: ColorSpace::Linear,
            anisotropy: 1,
        }
    }

    /// Repeat-wrapped texture tiled `repeat` times along both axes.
    pub fn tiled(image: RgbaImage, repeat: f32) -> Self {
        Self {
            wrap: WrapMode::Repeat,
            repeat: Vec2::splat(repeat),
            ..Self::new(image)
        }
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn with_anisotropy(mut self, anisotropy: u8) -> Self {
        self.anisotropy = anisotropy;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Unlit material. `version` is bumped whenever the GPU copy must be refreshed.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicMaterial {
    pub color: Color,
    pub map: Option<TextureId>,
    pub transparent: bool,
    pub opacity: f32,
    pub side: Side,
    pub version: u32,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            map: None,
            transparent: false,
            opacity: 1.0,
            side: Side::Front,
            version: 0,
        }
    }
}

impl BasicMaterial {
    pub fn mark_needs_update(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Physically based material with optional texture maps.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardMaterial {
    pub map: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    pub roughness_map: Option<TextureId>,
    pub ao_map: Option<TextureId>,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            map: None,
            normal_map: None,
            roughness_map: None,
            ao_map: None,
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhongMaterial {
    pub color: Color,
    pub emissive: Color,
    pub flat_shading: bool,
}

/// Time-varying inputs of the water refraction shader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefractionUniforms {
    pub time: f32,
    pub distortion: Option<TextureId>,
}

/// Refractive surface: samples the scene behind it through a render target
/// of `texture_width` x `texture_height`, perturbed by the distortion map.
#[derive(Debug, Clone, PartialEq)]
pub struct RefractionMaterial {
    pub color: Color,
    pub texture_width: u32,
    pub texture_height: u32,
    pub uniforms: RefractionUniforms,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Basic(BasicMaterial),
    Standard(StandardMaterial),
    Phong(PhongMaterial),
    Refraction(RefractionMaterial),
}

impl Material {
    pub fn as_basic(&self) -> Option<&BasicMaterial> {
        match self {
            Self::Basic(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_basic_mut(&mut self) -> Option<&mut BasicMaterial> {
        match self {
            Self::Basic(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_refraction(&self) -> Option<&RefractionMaterial> {
        match self {
            Self::Refraction(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_refraction_mut(&mut self) -> Option<&mut RefractionMaterial> {
        match self {
            Self::Refraction(m) => Some(m),
            _ => None,
        }
    }

    /// Faces the material covers. Only basic materials can change it.
    pub fn side(&self) -> Side {
        match self {
            Self::Basic(m) => m.side,
            _ => Side::Front,
        }
    }

    /// Every texture the material samples.
    pub fn textures(&self) -> Vec<TextureId> {
        match self {
            Self::Basic(m) => m.map.into_iter().collect(),
            Self::Standard(m) => [m.map, m.normal_map, m.roughness_map, m.ao_map]
                .into_iter()
                .flatten()
                .collect(),
            Self::Phong(_) => Vec::new(),
            Self::Refraction(m) => m.uniforms.distortion.into_iter().collect(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Basic(_) => "basic",
            Self::Standard(_) => "standard",
            Self::Phong(_) => "phong",
            Self::Refraction(_) => "refraction",
        }
    }
}

/// Registry of geometries, materials and textures addressed by typed ids.
///
/// Ids come from a single counter and are never reused, so a stale id can
/// never alias a newer resource.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    geometries: BTreeMap<GeometryId, Geometry>,
    materials: BTreeMap<MaterialId, Material>,
    textures: BTreeMap<TextureId, Texture>,
    next_id: u64,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn insert_geometry(&mut self, geometry: Geometry) -> GeometryId {
        let id = GeometryId(self.next());
        self.geometries.insert(id, geometry);
        id
    }

    pub fn insert_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.next());
        self.materials.insert(id, material);
        id
    }

    pub fn insert_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.next());
        self.textures.insert(id, texture);
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(&id)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(&id)
    }

    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(&id)
    }

    pub fn remove_geometry(&mut self, id: GeometryId) -> Option<Geometry> {
        self.geometries.remove(&id)
    }

    pub fn remove_material(&mut self, id: MaterialId) -> Option<Material> {
        self.materials.remove(&id)
    }

    pub fn remove_texture(&mut self, id: TextureId) -> Option<Texture> {
        self.textures.remove(&id)
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_never_reused() {
        let mut res = Resources::new();
        let a = res.insert_geometry(Geometry::plane(1.0, 1.0));
        res.remove_geometry(a);
        let b = res.insert_geometry(Geometry::plane(1.0, 1.0));
        assert_ne!(a, b);
        assert!(res.geometry(a).is_none());
    }

    #[test]
    fn remove_twice_returns_none() {
        let mut res = Resources::new();
        let id = res.insert_texture(Texture::new(RgbaImage::new(2, 2)));
        assert!(res.remove_texture(id).is_some());
        assert!(res.remove_texture(id).is_none());
        assert_eq!(res.texture_count(), 0);
    }

    #[test]
    fn tiled_texture_repeats() {
        let t = Texture::tiled(RgbaImage::new(4, 4), 4.0);
        assert_eq!(t.wrap, WrapMode::Repeat);
        assert_eq!(t.repeat, Vec2::splat(4.0));
    }

    #[test]
    fn material_texture_listing() {
        let mut res = Resources::new();
        let t1 = res.insert_texture(Texture::new(RgbaImage::new(1, 1)));
        let t2 = res.insert_texture(Texture::new(RgbaImage::new(1, 1)));
        let m = Material::Standard(StandardMaterial {
            map: Some(t1),
            ao_map: Some(t2),
            ..StandardMaterial::default()
        });
        assert_eq!(m.textures(), vec![t1, t2]);

        let mut basic = BasicMaterial::default();
        basic.mark_needs_update();
        assert_eq!(basic.version, 1);
    }
}
