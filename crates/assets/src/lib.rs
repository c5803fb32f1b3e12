//! Texture loading for the scene helpers.
//!
//! Two paths: a blocking [`TextureLoader::load`] used where a missing file is
//! the caller's problem, and [`TextureLoader::load_async`] which hands back a
//! [`PendingTexture`] to be polled from the render thread. A pending load can
//! be cancelled; a late completion is then dropped on the floor.

mod loader;
mod pending;

pub use loader::{FsTextureLoader, MemoryTextureLoader, TextureLoader};
pub use pending::{LoadStatus, PendingTexture, TextureSender};

use std::path::PathBuf;

/// Errors from texture loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("texture not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture load for {0} was abandoned before completing")]
    Disconnected(PathBuf),
}

pub fn crate_info() -> &'static str {
    "vitrine-assets v0.1.0"
}
