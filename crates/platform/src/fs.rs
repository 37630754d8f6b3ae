#![allow(clippy::module_name_repetitions)]

//! Filesystem helpers used by the installers
//!
//! Directory replacement is done with plain renames, so the staged tree must
//! live on the same filesystem as the target. Callers stage inside the
//! target's parent directory.

use pbo_errors::{Error, PlatformError};
use std::io::ErrorKind;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tokio::fs;

/// Result type for filesystem operations
pub type Result<T> = std::result::Result<T, Error>;

fn fs_failed(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    PlatformError::FilesystemOperationFailed {
        operation: operation.to_string(),
        message: format!("{}: {err}", path.display()),
    }
    .into()
}

async fn exists_no_follow(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_failed("stat", path, &e)),
    }
}

/// Swap `staged` into place at `target`
///
/// An existing `target` is first moved to `<scratch>/previous`. If the final
/// rename fails the previous tree is moved back, so on error `target` is
/// exactly what it was before the call. On success the previous tree is left
/// in `scratch` for the caller to discard.
///
/// # Errors
///
/// Returns an error if either rename fails.
pub async fn replace_dir(staged: &Path, target: &Path, scratch: &Path) -> Result<()> {
    let backup = scratch.join("previous");
    let had_previous = exists_no_follow(target).await?;

    if had_previous {
        fs::rename(target, &backup)
            .await
            .map_err(|e| fs_failed("move previous install aside", target, &e))?;
    }

    if let Err(e) = fs::rename(staged, target).await {
        if had_previous {
            // Best effort: the original error is what gets reported
            let _ = fs::rename(&backup, target).await;
        }
        return Err(fs_failed("move staged tree into place", target, &e));
    }

    Ok(())
}

/// Point `link` at `target`, replacing any file or link already there
///
/// # Errors
///
/// Returns an error if `link` is a directory or the link cannot be created.
pub async fn link_binary(target: &Path, link: &Path) -> Result<()> {
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| fs_failed("create link directory", parent, &e))?;
    }

    match fs::symlink_metadata(link).await {
        Ok(meta) if meta.is_dir() => {
            return Err(PlatformError::FilesystemOperationFailed {
                operation: "link binary".to_string(),
                message: format!("{} is a directory", link.display()),
            }
            .into());
        }
        Ok(_) => fs::remove_file(link)
            .await
            .map_err(|e| fs_failed("remove stale link", link, &e))?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(fs_failed("stat", link, &e)),
    }

    fs::symlink(target, link)
        .await
        .map_err(|e| fs_failed("link binary", link, &e))
}

/// Remove a file, link or directory tree
///
/// Returns `false` when nothing existed at `path`.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub async fn remove_path(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(fs_failed("stat", path, &e)),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path).await
    } else {
        fs::remove_file(path).await
    };
    result.map_err(|e| fs_failed("remove", path, &e))?;
    Ok(true)
}

/// Check whether a path exists, not following symlinks
///
/// # Errors
///
/// Returns an error on any stat failure other than not-found.
pub async fn exists(path: &Path) -> Result<bool> {
    exists_no_follow(path).await
}

/// Whether the current process runs as root
pub fn is_root() -> bool {
    std::fs::metadata("/proc/self").is_ok_and(|meta| meta.uid() == 0)
}
