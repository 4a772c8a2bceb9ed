use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

const WL_COPY_COMMAND: &str = "wl-copy";
const XDG_OPEN_COMMAND: &str = "xdg-open";
const MIME_IMAGE_PNG: &str = "image/png";

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("failed to open file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to run command: {command}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} exited with non-zero status: {status}")]
    CommandFailed { command: String, status: String },
}

pub type ShareResult<T> = std::result::Result<T, ShareError>;

/// Platform share capability plus the open-in-viewer fallback.
pub trait ShareBackend {
    fn can_share_files(&self) -> bool;
    fn can_share_urls(&self) -> bool;
    fn share_file(&self, path: &Path, title: &str) -> ShareResult<()>;
    fn share_url(&self, url: &str, title: &str) -> ShareResult<()>;
    fn open(&self, target: &OsStr) -> ShareResult<()>;
}

/// Shares by placing content on the Wayland clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct WlCopyShare;

impl WlCopyShare {
    fn available(&self) -> bool {
        std::env::var_os("WAYLAND_DISPLAY").is_some() && command_on_path(WL_COPY_COMMAND)
    }
}

fn command_on_path(command: &str) -> bool {
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths).any(|dir| dir.join(command).is_file())
    })
}

fn check_status(command: &str, status: std::process::ExitStatus) -> ShareResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(ShareError::CommandFailed {
            command: command.to_string(),
            status: status.to_string(),
        })
    }
}

fn command_io(command: &str) -> impl FnOnce(io::Error) -> ShareError + '_ {
    move |source| ShareError::CommandIo {
        command: command.to_string(),
        source,
    }
}

impl ShareBackend for WlCopyShare {
    fn can_share_files(&self) -> bool {
        self.available()
    }

    fn can_share_urls(&self) -> bool {
        self.available()
    }

    fn share_file(&self, path: &Path, title: &str) -> ShareResult<()> {
        let file = File::open(path).map_err(|source| ShareError::OpenFile {
            path: path.to_path_buf(),
            source,
        })?;
        let status = Command::new(WL_COPY_COMMAND)
            .args(["--type", MIME_IMAGE_PNG])
            .stdin(Stdio::from(file))
            .status()
            .map_err(command_io(WL_COPY_COMMAND))?;
        check_status(WL_COPY_COMMAND, status)?;
        tracing::info!(title, path = %path.display(), "meme image copied for sharing");
        Ok(())
    }

    fn share_url(&self, url: &str, title: &str) -> ShareResult<()> {
        let status = Command::new(WL_COPY_COMMAND)
            .arg(url)
            .status()
            .map_err(command_io(WL_COPY_COMMAND))?;
        check_status(WL_COPY_COMMAND, status)?;
        tracing::info!(title, url, "meme link copied for sharing");
        Ok(())
    }

    fn open(&self, target: &OsStr) -> ShareResult<()> {
        open_with(XDG_OPEN_COMMAND, target)?;
        tracing::info!(opened = %target.to_string_lossy(), "opened in default viewer");
        Ok(())
    }
}

/// Runs an opener to completion; `xdg-open` exits once the handler has taken over.
fn open_with(command: &str, target: &OsStr) -> ShareResult<()> {
    let status = Command::new(command)
        .arg(target)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(command_io(command))?;
    check_status(command, status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_names_the_command() {
        let err = ShareError::CommandFailed {
            command: WL_COPY_COMMAND.to_string(),
            status: "exit status 1".to_string(),
        };
        assert!(err.to_string().contains("wl-copy"));
    }

    #[test]
    fn missing_file_is_reported_before_running_anything() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.png");
        let err = WlCopyShare
            .share_file(&missing, "title")
            .expect_err("missing file must fail");
        assert!(matches!(err, ShareError::OpenFile { path, .. } if path == missing));
    }

    #[test]
    fn opener_waits_for_exit_and_reports_failure_status() {
        let target = OsStr::new("https://i.redd.it/meme.png");
        open_with("true", target).expect("successful opener");

        let err = open_with("false", target).expect_err("failing opener must be reported");
        assert!(matches!(err, ShareError::CommandFailed { ref command, .. } if command == "false"));
    }

    #[test]
    fn missing_opener_is_reported_as_io_error() {
        let err = open_with("memeforge-definitely-not-installed", OsStr::new("meme.png"))
            .expect_err("missing opener");
        assert!(matches!(err, ShareError::CommandIo { .. }));
    }

    #[test]
    fn command_lookup_ignores_unknown_binaries() {
        assert!(!command_on_path("memeforge-definitely-not-installed"));
    }
}
