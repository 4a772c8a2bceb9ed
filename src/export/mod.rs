//! PNG export of the composed canvas, plus sharing.

mod share;

use std::ffi::OsStr;
use std::path::PathBuf;

use image::RgbaImage;
use thiserror::Error;

use crate::compositor::{encode_png, Compositor, RenderError};
use crate::net::{Fetch, FetchError};
use crate::storage::{MemeStorage, StorageError};

pub use share::{ShareBackend, ShareError, ShareResult, WlCopyShare};

pub const LOCAL_SHARE_TITLE: &str = "Check out this meme I made!";
pub const REMOTE_SHARE_TITLE: &str = "Check out this programming meme!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareRequest {
    /// The live canvas, serialized at share time.
    LocalCanvas,
    /// An already-published image; never serialized locally.
    RemoteUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    OpenedInViewer,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),
    #[error("remote image could not be decoded: {0}")]
    Decode(#[source] image::ImageError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Share(#[from] ShareError),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Anything that can hand over the current canvas pixels.
pub trait CanvasSnapshot {
    fn snapshot(&mut self) -> Result<RgbaImage, RenderError>;
}

impl CanvasSnapshot for Compositor {
    fn snapshot(&mut self) -> Result<RgbaImage, RenderError> {
        Compositor::snapshot(self)
    }
}

pub struct ExportAdapter<S, B> {
    storage: S,
    backend: B,
}

impl<S: MemeStorage, B: ShareBackend> ExportAdapter<S, B> {
    pub const fn new(storage: S, backend: B) -> Self {
        Self { storage, backend }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn serialize(canvas: &mut dyn CanvasSnapshot) -> ExportResult<Vec<u8>> {
        let image = canvas.snapshot()?;
        encode_png(&image).map_err(ExportError::Encode)
    }

    /// Saves the canvas as `meme.png` in the download directory.
    pub fn download(&self, canvas: &mut dyn CanvasSnapshot) -> ExportResult<PathBuf> {
        let png = Self::serialize(canvas)?;
        Ok(self.storage.save_download(&png)?)
    }

    /// Saves a gallery image as `meme.png`, re-encoded as PNG.
    pub fn download_remote(&self, fetch: &dyn Fetch, url: &str) -> ExportResult<PathBuf> {
        let bytes = fetch.get(url)?;
        let image = image::load_from_memory(&bytes)
            .map_err(ExportError::Decode)?
            .to_rgba8();
        let png = encode_png(&image).map_err(ExportError::Encode)?;
        Ok(self.storage.save_download(&png)?)
    }

    pub fn share(
        &self,
        request: &ShareRequest,
        canvas: &mut dyn CanvasSnapshot,
    ) -> ExportResult<ShareOutcome> {
        match request {
            ShareRequest::LocalCanvas => {
                let png = Self::serialize(canvas)?;
                let path = self.storage.save_share_file(&png)?;
                if self.backend.can_share_files() {
                    match self.backend.share_file(&path, LOCAL_SHARE_TITLE) {
                        Ok(()) => return Ok(ShareOutcome::Shared),
                        Err(err) => tracing::warn!(?err, "file share failed; opening viewer"),
                    }
                }
                self.backend.open(path.as_os_str())?;
                Ok(ShareOutcome::OpenedInViewer)
            }
            ShareRequest::RemoteUrl(url) => {
                if self.backend.can_share_urls() {
                    match self.backend.share_url(url, REMOTE_SHARE_TITLE) {
                        Ok(()) => return Ok(ShareOutcome::Shared),
                        Err(err) => tracing::warn!(?err, url = %url, "link share failed; opening viewer"),
                    }
                }
                self.backend.open(OsStr::new(url))?;
                Ok(ShareOutcome::OpenedInViewer)
            }
        }
    }
}
