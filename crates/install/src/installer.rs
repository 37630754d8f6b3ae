//! Game installer

use pbo_config::constants::LAUNCHER_NAME;
use pbo_errors::{Error, InstallError};
use pbo_events::{AppEvent, EventEmitter, FailureContext, InstallEvent};
use pbo_net::NetClient;
use pbo_platform::{fs, Platform, PlatformContext};
use pbo_types::Satisfied;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::context::{InstallContext, InstallLayout, UninstallContext};
use crate::desktop::{desktop_entry, launcher_script, refresh_caches};
use crate::result::{InstallReport, UninstallReport};
use crate::tree::{prepare_tree, PreparedTree};

const ARCHIVE_NAME: &str = "game.zip";
const EXTRACT_DIR: &str = "extracted";

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> Error {
    InstallError::FilesystemError {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Installs and removes the game
pub struct Installer {
    platform: Platform,
    net: NetClient,
}

impl Installer {
    pub fn new(platform: Platform, net: NetClient) -> Self {
        Self { platform, net }
    }

    /// Download, prepare and register the game
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails or is empty, the archive
    /// cannot be extracted, no jar is found, or the tree cannot be moved
    /// into place. Desktop cache refresh failures are only reported.
    pub async fn install(
        &self,
        context: &InstallContext,
        java: &Satisfied,
    ) -> Result<InstallReport, Error> {
        let tx = context.event_sender.clone();
        tx.emit(AppEvent::Install(InstallEvent::Started {
            install_dir: context.layout.install_dir.clone(),
        }));

        let result = self.install_inner(context, java).await;
        match &result {
            Ok(report) => tx.emit(AppEvent::Install(InstallEvent::Completed {
                install_dir: report.install_dir.clone(),
            })),
            Err(e) => tx.emit(AppEvent::Install(InstallEvent::Failed {
                failure: FailureContext::from_error(e),
            })),
        }
        result
    }

    async fn install_inner(
        &self,
        context: &InstallContext,
        java: &Satisfied,
    ) -> Result<InstallReport, Error> {
        let tx = &context.event_sender;
        let layout = &context.layout;
        let install_dir = &layout.install_dir;
        let parent = install_dir.parent().ok_or_else(|| InstallError::Failed {
            message: format!("{} has no parent directory", install_dir.display()),
        })?;
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| fs_error("create directory", parent, &e))?;

        // Same filesystem as the target, removed on every exit path
        let staging = tempfile::Builder::new()
            .prefix(".pbo-install-")
            .tempdir_in(parent)
            .map_err(|e| fs_error("create staging directory", parent, &e))?;

        let archive = staging.path().join(ARCHIVE_NAME);
        let downloaded = match tx {
            Some(tx) => pbo_net::download_file(&self.net, &context.archive_url, &archive, tx).await?,
            None => {
                let (tx, _rx) = pbo_events::channel();
                pbo_net::download_file(&self.net, &context.archive_url, &archive, &tx).await?
            }
        };
        if downloaded.size == 0 {
            return Err(InstallError::EmptyDownload {
                url: context.archive_url.clone(),
            }
            .into());
        }

        let tree = {
            let archive = archive.clone();
            let dest = staging.path().join(EXTRACT_DIR);
            let jar = context.jar.clone();
            tokio::task::spawn_blocking(move || prepare_tree(&archive, &dest, jar.as_deref()))
                .await
                .map_err(|e| InstallError::ExtractionFailed {
                    message: format!("extraction task failed: {e}"),
                })??
        };
        tx.emit(AppEvent::Install(InstallEvent::Extracted {
            entries: tree.entries,
        }));
        tx.emit(AppEvent::Install(InstallEvent::WindowsFilesStripped {
            count: tree.stripped,
        }));

        self.write_launcher(&tree, install_dir, &java.path).await?;

        fs::replace_dir(&tree.root, install_dir, staging.path())
            .await
            .map_err(|e| InstallError::AtomicOperationFailed {
                message: e.to_string(),
            })?;

        let launcher = install_dir.join(LAUNCHER_NAME);
        tx.emit(AppEvent::Install(InstallEvent::LauncherWritten {
            path: launcher.clone(),
        }));

        let icon = match &tree.icon {
            Some(source) => Some(install_icon(layout, &install_dir.join(source)).await?),
            None => None,
        };

        let entry_path = layout.desktop_entry();
        let entry = desktop_entry(&context.display_name, install_dir, &launcher, icon.is_some());
        write_file(&entry_path, entry.as_bytes()).await?;
        tx.emit(AppEvent::Install(InstallEvent::DesktopEntryWritten {
            path: entry_path.clone(),
        }));

        let ctx = PlatformContext::new(tx.clone());
        refresh_caches(&self.platform, &ctx, layout).await;

        Ok(InstallReport {
            install_dir: install_dir.clone(),
            jar: tree.jar,
            launcher,
            desktop_entry: entry_path,
            icon,
            entries: tree.entries,
            stripped: tree.stripped,
            java: java.path.clone(),
        })
    }

    async fn write_launcher(
        &self,
        tree: &PreparedTree,
        install_dir: &Path,
        java: &Path,
    ) -> Result<(), Error> {
        let path = tree.root.join(LAUNCHER_NAME);
        let script = launcher_script(install_dir, java, &tree.jar);
        write_file(&path, script.as_bytes()).await?;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .await
            .map_err(|e| fs_error("set permissions", &path, &e))
    }

    /// Remove the game and, optionally, the portable runtime
    ///
    /// Paths that do not exist are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing path cannot be removed.
    pub async fn uninstall(&self, context: &UninstallContext) -> Result<UninstallReport, Error> {
        let tx = context.event_sender.clone();
        let layout = &context.layout;

        let mut report = UninstallReport::default();
        for path in uninstall_targets(context).await {
            if fs::remove_path(&path).await? {
                tx.emit(AppEvent::Install(InstallEvent::Removed { path: path.clone() }));
                report.removed.push(path);
            }
        }

        let ctx = PlatformContext::new(tx.clone());
        refresh_caches(&self.platform, &ctx, layout).await;

        tx.emit(AppEvent::Install(InstallEvent::UninstallCompleted {
            removed: report.removed.len(),
        }));
        Ok(report)
    }
}

/// Paths `uninstall` would remove, in removal order
///
/// The `java` link in `bin_dir` is only listed when it points into the
/// portable runtime; a link to a system Java is left alone.
pub async fn uninstall_targets(context: &UninstallContext) -> Vec<PathBuf> {
    let layout = &context.layout;
    let mut targets = vec![
        layout.install_dir.clone(),
        layout.desktop_entry(),
        layout.installed_icon(),
    ];

    if context.purge_runtime {
        let link = layout.bin_dir.join("java");
        if link_points_into(&link, &layout.runtime_dir).await {
            targets.push(link);
        }
        targets.push(layout.runtime_dir.clone());
    }
    targets
}

async fn link_points_into(link: &Path, dir: &Path) -> bool {
    tokio::fs::read_link(link)
        .await
        .is_ok_and(|target| target.starts_with(dir))
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| fs_error("create directory", parent, &e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| fs_error("write", path, &e))
}

async fn install_icon(layout: &InstallLayout, source: &Path) -> Result<PathBuf, Error> {
    let dest = layout.installed_icon();
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| fs_error("create directory", parent, &e))?;
    }
    tokio::fs::copy(source, &dest)
        .await
        .map_err(|e| fs_error("copy icon", &dest, &e))?;
    Ok(dest)
}
