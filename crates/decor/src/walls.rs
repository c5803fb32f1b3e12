use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::path::PathBuf;

use glam::Vec3;
use vitrine_assets::{AssetError, TextureLoader};
use vitrine_common::{NodeId, Transform};
use vitrine_scene::{ColorSpace, Geometry, Material, Node, Scene, StandardMaterial, Texture};

/// Edge length of each wall. Slightly over 100 so the seams overlap.
pub const WALL_SIZE: f32 = 100.1;

/// Paths of the four wall maps and how often they tile across a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallTextures {
    pub albedo: PathBuf,
    pub normal: PathBuf,
    pub roughness: PathBuf,
    pub ambient_occlusion: PathBuf,
    pub repeat: f32,
}

impl Default for WallTextures {
    fn default() -> Self {
        Self {
            albedo: "textures/concrete/colour.jpeg".into(),
            normal: "textures/concrete/normal.jpeg".into(),
            roughness: "textures/concrete/roughness.jpeg".into(),
            ambient_occlusion: "textures/concrete/ao.jpg".into(),
            repeat: 4.0,
        }
    }
}

/// Enclose a 100-unit box standing on the origin with five concrete walls:
/// ceiling, floor, back, right and left. Returns them in that order.
///
/// All four maps are loaded before the scene is touched, so a failed load
/// leaves the scene unchanged.
pub fn create_walls(
    scene: &mut Scene,
    loader: &dyn TextureLoader,
    textures: &WallTextures,
) -> Result<Vec<NodeId>, AssetError> {
    let _span = tracing::debug_span!("create_walls").entered();

    let albedo = loader.load(&textures.albedo)?;
    let normal = loader.load(&textures.normal)?;
    let roughness = loader.load(&textures.roughness)?;
    let ao = loader.load(&textures.ambient_occlusion)?;

    let rep = textures.repeat;
    let material = StandardMaterial {
        map: Some(scene.add_texture(Texture::tiled(albedo, rep).with_color_space(ColorSpace::Srgb))),
        normal_map: Some(scene.add_texture(Texture::tiled(normal, rep))),
        roughness_map: Some(scene.add_texture(Texture::tiled(roughness, rep))),
        ao_map: Some(scene.add_texture(Texture::tiled(ao, rep))),
        roughness: 1.0,
        metalness: 0.0,
    };
    let material = scene.add_material(Material::Standard(material));
    let geometry = scene.add_geometry(Geometry::plane(WALL_SIZE, WALL_SIZE));

    let mut top = Transform::from_position(Vec3::new(0.0, 100.0, 0.0));
    top.rotate_x(FRAC_PI_2);

    let mut bottom = Transform::default();
    bottom.rotate_x(-FRAC_PI_2);

    let back = Transform::from_position(Vec3::new(0.0, 50.0, -50.0));

    let mut right = Transform::from_position(Vec3::new(50.0, 50.0, 0.0));
    right.rotate_y(-FRAC_PI_2);

    let mut left = Transform::from_position(Vec3::new(-50.0, 50.0, 0.0));
    left.rotate_y(FRAC_PI_2);

    let walls = [
        ("wall-top", top),
        ("wall-bottom", bottom),
        ("wall-back", back),
        ("wall-right", right),
        ("wall-left", left),
    ]
    .into_iter()
    .map(|(name, transform)| {
        scene.add(
            Node::mesh(geometry, material)
                .with_name(name)
                .with_transform(transform),
        )
    })
    .collect();

    Ok(walls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use vitrine_assets::MemoryTextureLoader;
    use vitrine_scene::WrapMode;

    fn loader_for(textures: &WallTextures) -> MemoryTextureLoader {
        MemoryTextureLoader::new()
            .with(textures.albedo.clone(), RgbaImage::new(4, 4))
            .with(textures.normal.clone(), RgbaImage::new(4, 4))
            .with(textures.roughness.clone(), RgbaImage::new(4, 4))
            .with(textures.ambient_occlusion.clone(), RgbaImage::new(4, 4))
    }

    #[test]
    fn five_walls_on_empty_scene() {
        let textures = WallTextures::default();
        let mut scene = Scene::new();
        let walls = create_walls(&mut scene, &loader_for(&textures), &textures).unwrap();

        assert_eq!(walls.len(), 5);
        assert_eq!(scene.roots().len(), 5);
        assert_eq!(scene.node_count(), 5);

        let top = scene.world_position(walls[0]).unwrap();
        assert_eq!(top.y, 100.0);
        assert_eq!(scene.get(walls[0]).unwrap().name.as_deref(), Some("wall-top"));
    }

    #[test]
    fn walls_enclose_the_origin() {
        let textures = WallTextures::default();
        let mut scene = Scene::new();
        let walls = create_walls(&mut scene, &loader_for(&textures), &textures).unwrap();
        let center = Vec3::new(0.0, 50.0, 0.0);

        // Every wall faces the inside of the box.
        for id in &walls {
            let node = scene.get(*id).unwrap();
            let normal = node.transform.rotation * Vec3::Z;
            let to_center = center - node.transform.position;
            assert!(normal.dot(to_center) > 0.0, "{:?} faces outward", node.name);
        }

        let expected = [
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::ZERO,
            Vec3::new(0.0, 50.0, -50.0),
            Vec3::new(50.0, 50.0, 0.0),
            Vec3::new(-50.0, 50.0, 0.0),
        ];
        for (id, want) in walls.iter().zip(expected) {
            assert_eq!(scene.world_position(*id).unwrap(), want);
        }
    }

    #[test]
    fn walls_share_one_geometry_and_material() {
        let textures = WallTextures::default();
        let mut scene = Scene::new();
        let walls = create_walls(&mut scene, &loader_for(&textures), &textures).unwrap();

        let first = *scene.get(walls[0]).unwrap().as_mesh().unwrap();
        for id in &walls {
            assert_eq!(*scene.get(*id).unwrap().as_mesh().unwrap(), first);
        }
        assert_eq!(scene.resources().geometry_count(), 1);
        assert_eq!(scene.resources().material_count(), 1);

        let Material::Standard(material) = scene.mesh_material(walls[0]).unwrap() else {
            panic!("walls use a standard material");
        };
        assert_eq!((material.roughness, material.metalness), (1.0, 0.0));

        let albedo = scene.resources().texture(material.map.unwrap()).unwrap();
        assert_eq!(albedo.color_space, ColorSpace::Srgb);
        for id in scene.mesh_material(walls[0]).unwrap().textures() {
            let tex = scene.resources().texture(id).unwrap();
            assert_eq!(tex.wrap, WrapMode::Repeat);
            assert_eq!(tex.repeat, glam::Vec2::splat(4.0));
        }
    }

    #[test]
    fn missing_map_propagates_and_leaves_scene_untouched() {
        let textures = WallTextures::default();
        let loader = MemoryTextureLoader::new().with(textures.albedo.clone(), RgbaImage::new(1, 1));
        let mut scene = Scene::new();
        let err = create_walls(&mut scene, &loader, &textures).unwrap_err();
        assert!(matches!(err, AssetError::NotFound(_)));
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.resources().texture_count(), 0);
    }
}
