//! Portable runtime installation
//!
//! The archive is downloaded and unpacked inside a scratch directory next to
//! the install directory. The previous install is only touched once the new
//! tree has been verified to contain the expected binary.

use pbo_errors::{ResolveError, UserFacingError};
use pbo_events::{EventEmitter, EventSender};
use pbo_net::NetClient;
use pbo_platform::fs;
use pbo_types::PortableFallback;
use std::path::{Path, PathBuf};

use crate::archive::{extract_tar_gz, ExtractFailure};

const ARCHIVE_NAME: &str = "runtime.tar.gz";
const UNPACK_DIR: &str = "unpacked";

/// Where the runtime goes and where its binary is exposed
pub struct FallbackTarget<'a> {
    pub url: &'a str,
    pub extract_dir: &'a Path,
    pub bin_dir: &'a Path,
    pub link_name: &'a str,
}

/// Download, verify and install a portable runtime
///
/// Returns the path of the exposed binary link.
///
/// # Errors
///
/// Returns `DownloadFailed`, `EmptyArchive`, `UnidentifiableArchiveLayout`
/// or `FallbackInstallFailed`. On every error the previous install at
/// `extract_dir` is unchanged.
pub async fn install_portable(
    net: &NetClient,
    tx: &EventSender,
    capability: &str,
    fallback: &PortableFallback,
    target: &FallbackTarget<'_>,
) -> Result<PathBuf, ResolveError> {
    let staging_failed = |message: String| ResolveError::FallbackInstallFailed {
        capability: capability.to_string(),
        message,
    };
    let layout_failed = |message: String| ResolveError::UnidentifiableArchiveLayout {
        capability: capability.to_string(),
        message,
    };

    let parent = target
        .extract_dir
        .parent()
        .ok_or_else(|| staging_failed(format!("{} has no parent", target.extract_dir.display())))?;
    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| staging_failed(format!("{}: {e}", parent.display())))?;

    // Removed on drop, including when the caller's future is cancelled
    let scratch = tempfile::Builder::new()
        .prefix(".pbo-runtime-")
        .tempdir_in(parent)
        .map_err(|e| staging_failed(format!("{}: {e}", parent.display())))?;

    let archive = scratch.path().join(ARCHIVE_NAME);
    let downloaded = pbo_net::download_file(net, target.url, &archive, tx)
        .await
        .map_err(|e| ResolveError::DownloadFailed {
            capability: capability.to_string(),
            url: target.url.to_string(),
            message: e.user_message().into_owned(),
        })?;

    if downloaded.size == 0 {
        return Err(ResolveError::EmptyArchive {
            capability: capability.to_string(),
            url: target.url.to_string(),
        });
    }

    let unpack_dir = scratch.path().join(UNPACK_DIR);
    let top_level = {
        let archive = archive.clone();
        let unpack_dir = unpack_dir.clone();
        tokio::task::spawn_blocking(move || extract_tar_gz(&archive, &unpack_dir))
            .await
            .map_err(|e| staging_failed(format!("extraction task failed: {e}")))?
    }
    .map_err(|failure| match failure {
        ExtractFailure::Layout(message) => layout_failed(message),
        ExtractFailure::Filesystem(message) => staging_failed(message),
    })?;

    let staged = unpack_dir.join(&top_level);
    if !tokio::fs::metadata(staged.join(&fallback.binary))
        .await
        .is_ok_and(|meta| meta.is_file())
    {
        return Err(layout_failed(format!(
            "{} not found under top-level directory {}",
            fallback.binary,
            top_level.display()
        )));
    }

    tx.emit_debug(format!(
        "verified {} in {}",
        fallback.binary,
        top_level.display()
    ));

    fs::replace_dir(&staged, target.extract_dir, scratch.path())
        .await
        .map_err(|e| staging_failed(e.user_message().into_owned()))?;

    let link = target.bin_dir.join(target.link_name);
    fs::link_binary(&target.extract_dir.join(&fallback.binary), &link)
        .await
        .map_err(|e| staging_failed(e.user_message().into_owned()))?;

    Ok(link)
}
