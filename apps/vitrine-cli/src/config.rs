use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vitrine_decor::{BouncingSphereOptions, LightingOptions, SpinningSphereOptions, WallTextures};
use vitrine_input::SurfaceRect;
use vitrine_refractor::RefractiveLabelConfig;
use vitrine_scene::PerspectiveCamera;

/// Everything the demo builds, read from an optional YAML file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneFile {
    /// Directory texture paths are resolved against.
    pub texture_root: Option<PathBuf>,
    pub label: RefractiveLabelConfig,
    pub bouncing_sphere: BouncingSphereOptions,
    pub spinning_sphere: SpinningSphereOptions,
    pub lighting: LightingOptions,
    pub walls: WallTextures,
    pub camera: PerspectiveCamera,
    pub surface: SurfaceRect,
}

impl SceneFile {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scene file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing scene file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Texture directory: the configured one, else the scene file's directory,
    /// else the working directory.
    pub fn texture_root(&self, scene_file: Option<&Path>) -> PathBuf {
        if let Some(root) = &self.texture_root {
            return root.clone();
        }
        scene_file
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
