//! Host identity discovery from os-release

use pbo_errors::{Error, PlatformError};
use pbo_types::PlatformIdentity;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Read the first os-release file that exists
///
/// Missing files fall through to the next candidate. When none exist the
/// identity is `unknown`, which classifies as the unknown family. Any other
/// read failure is reported.
pub async fn load_identity(paths: &[PathBuf]) -> Result<PlatformIdentity, Error> {
    for path in paths {
        if let Some(identity) = read_identity(path).await? {
            return Ok(identity);
        }
    }
    Ok(PlatformIdentity::unknown())
}

async fn read_identity(path: &Path) -> Result<Option<PlatformIdentity>, Error> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(PlatformIdentity::parse_os_release(&contents))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) if e.kind() == ErrorKind::InvalidData => {
            Err(PlatformError::InvalidDescriptor {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into())
        }
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_existing_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let second = dir.path().join("os-release");
        std::fs::write(&second, "ID=linuxmint\nID_LIKE=\"ubuntu debian\"\n").unwrap();

        let identity = load_identity(&[missing, second]).await.unwrap();
        assert_eq!(identity.id, "linuxmint");
        assert_eq!(identity.id_like, vec!["ubuntu", "debian"]);
    }

    #[tokio::test]
    async fn test_no_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let identity = load_identity(&[dir.path().join("nope")]).await.unwrap();
        assert_eq!(identity, PlatformIdentity::unknown());
    }

    #[tokio::test]
    async fn test_non_utf8_is_invalid_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x49]).unwrap();
        let err = load_identity(&[path]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Platform(PlatformError::InvalidDescriptor { .. })
        ));
    }
}
