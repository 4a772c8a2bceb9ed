use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const MEME_FILE_NAME: &str = "meme.png";
const DOWNLOADS_SUBDIR: &str = "Downloads";
const RUNTIME_SUBDIR: &str = "memeforge";
const DEFAULT_FALLBACK_TEMP_DIR: &str = "/tmp/memeforge";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Where exported PNG bytes end up.
pub trait MemeStorage {
    /// Writes the user-visible `meme.png`, replacing any previous one.
    fn save_download(&self, png: &[u8]) -> StorageResult<PathBuf>;
    /// Writes a scratch copy for handing to other applications.
    fn save_share_file(&self, png: &[u8]) -> StorageResult<PathBuf>;
}

#[derive(Debug, Clone)]
pub struct DownloadStorage {
    download_dir: PathBuf,
    temp_dir: PathBuf,
}

impl DownloadStorage {
    pub const fn with_paths(download_dir: PathBuf, temp_dir: PathBuf) -> Self {
        Self {
            download_dir,
            temp_dir,
        }
    }

    /// `download_override` comes from the config file and wins over the environment.
    pub fn with_default_paths(download_override: Option<&Path>) -> StorageResult<Self> {
        let download_dir = match download_override {
            Some(dir) => dir.to_path_buf(),
            None => default_download_dir()?,
        };
        Ok(Self::with_paths(download_dir, default_runtime_temp_dir()))
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn download_path(&self) -> PathBuf {
        self.download_dir.join(MEME_FILE_NAME)
    }

    pub fn share_path(&self) -> PathBuf {
        self.temp_dir.join(MEME_FILE_NAME)
    }
}

impl MemeStorage for DownloadStorage {
    fn save_download(&self, png: &[u8]) -> StorageResult<PathBuf> {
        let target = self.download_path();
        write_overwrite(&target, png)?;
        tracing::info!(path = %target.display(), bytes = png.len(), "meme saved");
        Ok(target)
    }

    fn save_share_file(&self, png: &[u8]) -> StorageResult<PathBuf> {
        let target = self.share_path();
        write_overwrite(&target, png)?;
        Ok(target)
    }
}

fn write_overwrite(destination: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(destination, bytes)?;
    Ok(())
}

fn default_download_dir() -> StorageResult<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_DOWNLOAD_DIR").filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").map_err(|_| StorageError::MissingHomeDirectory)?;
    Ok(PathBuf::from(home).join(DOWNLOADS_SUBDIR))
}

fn default_runtime_temp_dir() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR")
        .map(|dir| PathBuf::from(dir).join(RUNTIME_SUBDIR))
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_FALLBACK_TEMP_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_path_uses_fixed_file_name() {
        let storage =
            DownloadStorage::with_paths(PathBuf::from("/home/test/Downloads"), PathBuf::from("/tmp"));
        assert_eq!(
            storage.download_path(),
            PathBuf::from("/home/test/Downloads/meme.png")
        );
        assert_eq!(storage.share_path(), PathBuf::from("/tmp/meme.png"));
    }

    #[test]
    fn override_directory_wins() {
        let storage = DownloadStorage::with_default_paths(Some(Path::new("/srv/memes")))
            .expect("override needs no environment");
        assert_eq!(storage.download_dir(), Path::new("/srv/memes"));
    }

    #[test]
    fn save_download_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = DownloadStorage::with_paths(
            dir.path().join("nested/downloads"),
            dir.path().join("runtime"),
        );

        let first = storage.save_download(b"first").expect("first save");
        let second = storage.save_download(b"second").expect("second save");
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"second");

        let shared = storage.save_share_file(b"share").expect("share copy");
        assert!(shared.starts_with(dir.path().join("runtime")));
        assert_eq!(fs::read(shared).unwrap(), b"share");
    }
}
