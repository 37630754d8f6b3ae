//! Game archive extraction and tree preparation
//!
//! Everything here is blocking and runs inside `spawn_blocking`.

use pbo_errors::InstallError;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Extensions removed from the extracted tree, compared case-insensitively
pub const WINDOWS_EXTENSIONS: &[&str] = &["exe", "bat", "cmd", "msi"];

/// Extracted game tree ready to be moved into place
#[derive(Debug)]
pub(crate) struct PreparedTree {
    /// Directory that becomes the install directory
    pub root: PathBuf,
    pub entries: usize,
    pub stripped: usize,
    /// Relative to `root`
    pub jar: PathBuf,
    /// Relative to `root`
    pub icon: Option<PathBuf>,
}

fn fs_error(operation: &str, path: &Path, err: &io::Error) -> InstallError {
    InstallError::FilesystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Extract `archive` into `dest` and prepare the tree
pub(crate) fn prepare_tree(
    archive: &Path,
    dest: &Path,
    jar: Option<&str>,
) -> Result<PreparedTree, InstallError> {
    let entries = extract_zip(archive, dest)?;
    let root = content_root(dest)?;
    let stripped = strip_windows_files(&root)?;
    let jar = locate_jar(&root, jar)?;
    let icon = locate_icon(&root)?;
    Ok(PreparedTree {
        root,
        entries,
        stripped,
        jar,
        icon,
    })
}

/// Unpack a zip, refusing entries that would escape `dest`
///
/// Returns the number of files written.
pub(crate) fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, InstallError> {
    let extraction_failed = |message: String| InstallError::ExtractionFailed { message };

    let file = File::open(archive).map_err(|e| fs_error("open archive", archive, &e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| extraction_failed(e.to_string()))?;
    fs::create_dir_all(dest).map_err(|e| fs_error("create directory", dest, &e))?;

    let mut written = 0;
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| extraction_failed(e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(extraction_failed(format!(
                "entry {} escapes the extraction directory",
                entry.name()
            )));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| fs_error("create directory", &out_path, &e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| fs_error("create directory", parent, &e))?;
        }
        let mut out = File::create(&out_path).map_err(|e| fs_error("create file", &out_path, &e))?;
        io::copy(&mut entry, &mut out).map_err(|e| extraction_failed(e.to_string()))?;

        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|e| fs_error("set permissions", &out_path, &e))?;
        }
        written += 1;
    }

    Ok(written)
}

/// The single top-level directory, or `dest` itself
pub(crate) fn content_root(dest: &Path) -> Result<PathBuf, InstallError> {
    let mut children = fs::read_dir(dest)
        .map_err(|e| fs_error("read directory", dest, &e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| fs_error("read directory", dest, &e))?;

    if children.len() == 1 {
        let only = children.remove(0);
        if only.file_type().is_ok_and(|kind| kind.is_dir()) {
            return Ok(only.path());
        }
    }
    Ok(dest.to_path_buf())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| ext.eq_ignore_ascii_case(want)))
}

/// Delete every Windows executable under `root`, returning how many
pub(crate) fn strip_windows_files(root: &Path) -> Result<usize, InstallError> {
    let mut removed = 0;
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).map_err(|e| fs_error("read directory", &dir, &e))? {
            let entry = entry.map_err(|e| fs_error("read directory", &dir, &e))?;
            let path = entry.path();
            let kind = entry
                .file_type()
                .map_err(|e| fs_error("stat", &path, &e))?;

            if kind.is_dir() {
                pending.push(path);
            } else if kind.is_file() && has_extension(&path, WINDOWS_EXTENSIONS) {
                fs::remove_file(&path).map_err(|e| fs_error("remove", &path, &e))?;
                removed += 1;
            }
        }
    }

    Ok(removed)
}

/// Regular files at the top of `root` with one of `extensions`, sorted
fn top_level_files(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>, InstallError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| fs_error("read directory", root, &e))? {
        let entry = entry.map_err(|e| fs_error("read directory", root, &e))?;
        let path = entry.path();
        if entry.file_type().is_ok_and(|kind| kind.is_file()) && has_extension(&path, extensions)
        {
            names.push(PathBuf::from(entry.file_name()));
        }
    }
    names.sort();
    Ok(names)
}

/// The configured jar, or the first `*.jar` at the top of the tree
pub(crate) fn locate_jar(root: &Path, configured: Option<&str>) -> Result<PathBuf, InstallError> {
    let not_found = || InstallError::GameJarNotFound {
        path: root.display().to_string(),
    };

    if let Some(jar) = configured {
        let relative = PathBuf::from(jar);
        return if root.join(&relative).is_file() {
            Ok(relative)
        } else {
            Err(InstallError::GameJarNotFound {
                path: root.join(relative).display().to_string(),
            })
        };
    }

    top_level_files(root, &["jar"])?
        .into_iter()
        .next()
        .ok_or_else(not_found)
}

/// A png whose name mentions "icon", else the first png
pub(crate) fn locate_icon(root: &Path) -> Result<Option<PathBuf>, InstallError> {
    let pngs = top_level_files(root, &["png"])?;
    let icon = pngs
        .iter()
        .find(|name| name.to_string_lossy().to_lowercase().contains("icon"))
        .or_else(|| pngs.first())
        .cloned();
    Ok(icon)
}
