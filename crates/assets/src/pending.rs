use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::AssetError;

type LoadResult = Result<RgbaImage, AssetError>;

/// Outcome of polling a [`PendingTexture`].
#[derive(Debug)]
pub enum LoadStatus {
    Pending,
    Ready(RgbaImage),
    Failed(AssetError),
    Cancelled,
}

/// Handle to a texture fetch running in the background.
///
/// Polling never blocks. Once `Ready` or `Failed` has been returned the
/// result is gone and further polls report `Failed(Disconnected)`.
#[derive(Debug)]
pub struct PendingTexture {
    path: PathBuf,
    receiver: Option<Receiver<LoadResult>>,
    live: Arc<AtomicBool>,
}

/// Completion side of a [`PendingTexture`].
#[derive(Debug)]
pub struct TextureSender {
    sender: Sender<LoadResult>,
    live: Arc<AtomicBool>,
}

impl TextureSender {
    /// Whether the receiving side still wants the result.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Deliver the result. Returns false if the load was cancelled or the
    /// pending handle is gone.
    pub fn complete(self, result: LoadResult) -> bool {
        if !self.is_live() {
            return false;
        }
        self.sender.send(result).is_ok()
    }
}

impl PendingTexture {
    /// A pending load and the handle that completes it.
    pub fn channel(path: impl Into<PathBuf>) -> (TextureSender, PendingTexture) {
        let (sender, receiver) = mpsc::channel();
        let live = Arc::new(AtomicBool::new(true));
        let pending = PendingTexture {
            path: path.into(),
            receiver: Some(receiver),
            live: Arc::clone(&live),
        };
        (TextureSender { sender, live }, pending)
    }

    /// A load that has already finished.
    pub fn resolved(path: impl Into<PathBuf>, result: LoadResult) -> Self {
        let (sender, pending) = Self::channel(path);
        sender.complete(result);
        pending
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_cancelled(&self) -> bool {
        !self.live.load(Ordering::Acquire)
    }

    /// Stop waiting. Any result delivered afterwards is discarded.
    pub fn cancel(&mut self) {
        self.live.store(false, Ordering::Release);
        self.receiver = None;
    }

    pub fn poll(&mut self) -> LoadStatus {
        let Some(receiver) = &self.receiver else {
            return LoadStatus::Cancelled;
        };
        match receiver.try_recv() {
            Ok(Ok(image)) => LoadStatus::Ready(image),
            Ok(Err(err)) => LoadStatus::Failed(err),
            Err(TryRecvError::Empty) => LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                LoadStatus::Failed(AssetError::Disconnected(self.path.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_completed() {
        let (sender, mut pending) = PendingTexture::channel("a.png");
        assert!(matches!(pending.poll(), LoadStatus::Pending));
        assert!(sender.complete(Ok(RgbaImage::new(2, 3))));
        match pending.poll() {
            LoadStatus::Ready(img) => assert_eq!(img.dimensions(), (2, 3)),
            other => panic!("expected ready, got {other:?}"),
        }
        assert!(matches!(
            pending.poll(),
            LoadStatus::Failed(AssetError::Disconnected(_))
        ));
    }

    #[test]
    fn failure_is_reported() {
        let mut pending =
            PendingTexture::resolved("gone.jpg", Err(AssetError::NotFound("gone.jpg".into())));
        assert!(matches!(
            pending.poll(),
            LoadStatus::Failed(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn cancel_drops_late_result() {
        let (sender, mut pending) = PendingTexture::channel("slow.png");
        pending.cancel();
        assert!(pending.is_cancelled());
        assert!(!sender.is_live());
        assert!(!sender.complete(Ok(RgbaImage::new(1, 1))));
        assert!(matches!(pending.poll(), LoadStatus::Cancelled));
    }

    #[test]
    fn dropped_sender_disconnects() {
        let (sender, mut pending) = PendingTexture::channel("x.png");
        drop(sender);
        assert!(matches!(
            pending.poll(),
            LoadStatus::Failed(AssetError::Disconnected(_))
        ));
    }
}
