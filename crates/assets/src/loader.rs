use image::{ImageError, RgbaImage};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::AssetError;
use crate::pending::PendingTexture;

/// Source of decoded RGBA textures, addressed by relative path.
pub trait TextureLoader {
    /// Load and decode, blocking the caller.
    fn load(&self, path: &Path) -> Result<RgbaImage, AssetError>;

    /// Start a load without blocking. The default resolves immediately.
    fn load_async(&self, path: &Path) -> PendingTexture {
        PendingTexture::resolved(path, self.load(path))
    }
}

/// Loads textures from disk, resolving relative paths against `root`.
#[derive(Debug, Clone)]
pub struct FsTextureLoader {
    root: PathBuf,
}

impl FsTextureLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl Default for FsTextureLoader {
    fn default() -> Self {
        Self::new(".")
    }
}

fn decode_file(path: &Path) -> Result<RgbaImage, AssetError> {
    match image::open(path) {
        Ok(img) => Ok(img.to_rgba8()),
        Err(ImageError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
            Err(AssetError::NotFound(path.to_path_buf()))
        }
        Err(ImageError::IoError(source)) => Err(AssetError::Io {
            path: path.to_path_buf(),
            source,
        }),
        Err(source) => Err(AssetError::Decode {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl TextureLoader for FsTextureLoader {
    fn load(&self, path: &Path) -> Result<RgbaImage, AssetError> {
        let full = self.resolve(path);
        let _span = tracing::debug_span!("texture_load", path = %full.display()).entered();
        decode_file(&full)
    }

    /// Decodes on a worker thread; the result is picked up by polling.
    fn load_async(&self, path: &Path) -> PendingTexture {
        let full = self.resolve(path);
        let (sender, pending) = PendingTexture::channel(path);
        let spawned = std::thread::Builder::new()
            .name("texture-load".into())
            .spawn(move || {
                if !sender.is_live() {
                    return;
                }
                let result = decode_file(&full);
                if !sender.complete(result) {
                    tracing::debug!(path = %full.display(), "texture load finished after cancel");
                }
            });
        if let Err(e) = spawned {
            // The sender went down with the closure, so polling reports Disconnected.
            tracing::error!(path = %path.display(), "failed to spawn texture loader: {e}");
        }
        pending
    }
}

/// In-memory loader keyed by path. Loads resolve immediately.
#[derive(Debug, Clone, Default)]
pub struct MemoryTextureLoader {
    images: HashMap<PathBuf, RgbaImage>,
}

impl MemoryTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, image: RgbaImage) {
        self.images.insert(path.into(), image);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, image: RgbaImage) -> Self {
        self.insert(path, image);
        self
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl TextureLoader for MemoryTextureLoader {
    fn load(&self, path: &Path) -> Result<RgbaImage, AssetError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_path_buf()))
    }
}
