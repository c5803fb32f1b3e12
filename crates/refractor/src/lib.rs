//! Refractive plane with a clickable text label.
//!
//! [`RefractorText`] adds a water-like refraction surface to a shared scene,
//! parents a procedurally drawn text card under it, and can wire pointer
//! handlers that highlight the card on hover and report clicks.
//!
//! # Invariants
//! - The label is always a child of the refractor; removing the refractor
//!   removes both.
//! - Hover state is written only by the pointer-move handler.
//! - Every resource the label creates is released exactly once, by `dispose`
//!   or, for replaced text rasters, by `update_text`.
//! - A distortion map that arrives after `dispose` is discarded.
//! - The label is only hovered or clicked from in front of it.

mod config;
mod label;
mod text;

pub use config::RefractiveLabelConfig;
pub use label::{
    CameraRef, HOVER_COLOR, InteractionHandlers, LABEL_ANISOTROPY, LabelState, RefractorText,
    SceneRef,
};
pub use text::{FONT_PX, LETTER_SPACING, RASTER_HEIGHT, RASTER_WIDTH, TextRasterizer};

use vitrine_scene::SceneError;

/// Errors from label operations.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("label is not initialized")]
    NotReady,
    #[error("label has been disposed")]
    Disposed,
    #[error("could not load font: {0}")]
    Font(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

pub fn crate_info() -> &'static str {
    "vitrine-refractor v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("refractor"));
    }
}
