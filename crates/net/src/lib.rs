#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for pbo
//!
//! This crate handles the HTTP downloads of the game archive and the
//! portable Java runtime.

mod client;
mod download;

pub use client::{NetClient, NetConfig};
pub use download::{Download, DownloadResult};

use pbo_errors::Error;
use pbo_events::EventSender;
use std::path::Path;

/// Download a file with progress reporting
///
/// # Errors
///
/// Returns an error if the URL is invalid, the download fails, or there are
/// I/O errors while writing the file.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    tx: &EventSender,
) -> Result<DownloadResult, Error> {
    let download = Download::new(url)?;
    download.execute(client, dest, tx).await
}
