use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vitrine_common::{Color, Extent2};

/// Options for a [`RefractorText`](crate::RefractorText).
///
/// Every field has a default, so a partial YAML or struct-update literal
/// overrides only the fields it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefractiveLabelConfig {
    pub text: String,
    /// Refractor position in its parent's space.
    pub position: Vec3,
    /// Label position relative to the refractor.
    pub text_position: Vec3,
    pub refractor_size: Extent2,
    pub text_size: Extent2,
    /// Refraction tint.
    pub color: Color,
    pub texture_width: u32,
    pub texture_height: u32,
    pub distortion_map: PathBuf,
    /// TrueType/OpenType face for the label glyphs. The bundled DejaVu Sans
    /// is used when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for RefractiveLabelConfig {
    fn default() -> Self {
        Self {
            text: "REFRACTION".into(),
            position: Vec3::new(0.0, 50.0, 0.0),
            text_position: Vec3::new(30.0, 30.0, 0.01),
            refractor_size: Extent2::new(90.0, 90.0),
            text_size: Extent2::new(15.0, 6.0),
            color: Color::from_hex(0xcbcbcb),
            texture_width: 1024,
            texture_height: 1024,
            distortion_map: "textures/waterdudv.jpg".into(),
            font_path: None,
        }
    }
}
