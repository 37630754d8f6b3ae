//! Portable runtime archive extraction

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

/// Why an archive could not be unpacked
#[derive(Debug)]
pub(crate) enum ExtractFailure {
    /// Not a readable gzip tar, or no usable top-level directory
    Layout(String),
    /// Writing the extracted tree failed
    Filesystem(String),
}

fn is_corrupt(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof
    )
}

fn first_component(path: &Path) -> Option<PathBuf> {
    path.components().find_map(|component| match component {
        Component::Normal(name) => Some(PathBuf::from(name)),
        _ => None,
    })
}

/// Unpack a gzip tar into `dest`
///
/// Returns the archive's top-level directory name, taken from the first
/// file entry's leading path component. Pax metadata entries are not
/// unpacked. Entries that would land outside `dest` are skipped.
pub(crate) fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<PathBuf, ExtractFailure> {
    let file = File::open(archive)
        .map_err(|e| ExtractFailure::Filesystem(format!("{}: {e}", archive.display())))?;
    std::fs::create_dir_all(dest)
        .map_err(|e| ExtractFailure::Filesystem(format!("{}: {e}", dest.display())))?;

    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);

    let entries = tar
        .entries()
        .map_err(|e| ExtractFailure::Layout(e.to_string()))?;

    let mut top_level = None;
    for entry in entries {
        let mut entry = entry.map_err(|e| ExtractFailure::Layout(e.to_string()))?;
        if matches!(
            entry.header().entry_type(),
            EntryType::XGlobalHeader | EntryType::XHeader
        ) {
            continue;
        }

        if top_level.is_none() {
            let path = entry
                .path()
                .map_err(|e| ExtractFailure::Layout(e.to_string()))?;
            top_level = first_component(&path);
        }

        entry.unpack_in(dest).map_err(|e| {
            if is_corrupt(&e) {
                ExtractFailure::Layout(e.to_string())
            } else {
                ExtractFailure::Filesystem(e.to_string())
            }
        })?;
    }

    top_level.ok_or_else(|| ExtractFailure::Layout("archive contains no entries".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn write_archive(path: &Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_top_level_from_first_entry() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("jre.tar.gz");
        write_archive(
            &archive,
            &[
                ("jdk-17.0.2+8-jre/bin/java", b"#!/bin/sh\n"),
                ("jdk-17.0.2+8-jre/release", b"JAVA_VERSION=\"17.0.2\"\n"),
            ],
        );

        let dest = dir.path().join("out");
        let top = extract_tar_gz(&archive, &dest).unwrap();
        assert_eq!(top, PathBuf::from("jdk-17.0.2+8-jre"));
        assert!(dest.join("jdk-17.0.2+8-jre/bin/java").is_file());
    }

    #[test]
    fn test_pax_global_header_is_not_top_level() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("jre.tar.gz");
        let file = File::create(&archive).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

        let pax: &[u8] = b"16 comment=0123\n";
        let mut header = tar::Header::new_ustar();
        header.set_entry_type(EntryType::XGlobalHeader);
        header.set_size(pax.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "pax_global_header", pax)
            .unwrap();

        let java: &[u8] = b"#!/bin/sh\n";
        let mut header = tar::Header::new_ustar();
        header.set_size(java.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(&mut header, "jdk-17-jre/bin/java", java)
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        let dest = dir.path().join("out");
        let top = extract_tar_gz(&archive, &dest).unwrap();
        assert_eq!(top, PathBuf::from("jdk-17-jre"));
        assert!(dest.join("jdk-17-jre/bin/java").is_file());
        assert!(!dest.join("pax_global_header").exists());
    }

    #[test]
    fn test_garbage_is_layout_failure() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("jre.tar.gz");
        std::fs::write(&archive, b"<html>not a tarball</html>").unwrap();

        let result = extract_tar_gz(&archive, &dir.path().join("out"));
        assert!(matches!(result, Err(ExtractFailure::Layout(_))));
    }
}
