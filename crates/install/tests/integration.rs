//! Integration tests for the game installer

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use pbo_errors::{Error, InstallError};
    use pbo_events::{AppEvent, InstallEvent};
    use pbo_install::*;
    use pbo_net::NetClient;
    use pbo_platform::Platform;
    use pbo_types::Satisfied;
    use std::io::{Cursor, Write};
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    fn game_zip(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().unix_permissions(0o644);
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn standard_game() -> Vec<u8> {
        game_zip(&[
            ("PokemonBlazeOnline/PBO.jar", b"jar"),
            ("PokemonBlazeOnline/PBO.exe", b"MZ"),
            ("PokemonBlazeOnline/Launch.BAT", b"@echo off"),
            ("PokemonBlazeOnline/PBO_icon.png", b"png"),
            ("PokemonBlazeOnline/data/maps.dat", b"maps"),
            ("PokemonBlazeOnline/data/patch.cmd", b"rem"),
        ])
    }

    struct Home {
        root: TempDir,
        layout: InstallLayout,
    }

    impl Home {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let share = root.path().join(".local/share");
            let layout = InstallLayout {
                install_dir: share.join("pokemon-blaze-online"),
                applications_dir: share.join("applications"),
                icons_dir: share.join("icons"),
                bin_dir: root.path().join(".local/bin"),
                runtime_dir: share.join("pbo/runtime/java"),
            };
            Self { root, layout }
        }

        fn context(&self, url: String) -> InstallContext {
            InstallContext::new()
                .with_layout(self.layout.clone())
                .with_archive_url(url)
                .with_display_name("Pokemon Blaze Online".to_string())
        }

        fn write_prior_install(&self) -> PathBuf {
            std::fs::create_dir_all(&self.layout.install_dir).unwrap();
            let marker = self.layout.install_dir.join("PRIOR");
            std::fs::write(&marker, "old game").unwrap();
            marker
        }

        fn share_dir(&self) -> PathBuf {
            self.root.path().join(".local/share")
        }
    }

    fn java() -> Satisfied {
        Satisfied {
            capability: "java".into(),
            path: PathBuf::from("/usr/bin/java"),
            major_version: Some(17),
            steps: Vec::new(),
        }
    }

    fn installer() -> Installer {
        Installer::new(Platform::current(), NetClient::with_defaults().unwrap())
    }

    fn assert_no_staging_left(dir: &Path) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(
                !name.to_string_lossy().starts_with(".pbo-install-"),
                "staging directory left behind: {name:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_install_game() {
        let server = MockServer::start_async().await;
        let body = standard_game();
        server
            .mock_async(|when, then| {
                when.method(GET).path("/PokemonBlazeOnline.zip");
                then.status(200).body(body.clone());
            })
            .await;

        let home = Home::new();
        let prior = home.write_prior_install();
        let (tx, mut rx) = pbo_events::channel();
        let context = home
            .context(server.url("/PokemonBlazeOnline.zip"))
            .with_event_sender(tx);

        let report = installer().install(&context, &java()).await.unwrap();
        let install_dir = &home.layout.install_dir;

        assert_eq!(report.entries, 6);
        assert_eq!(report.stripped, 3);
        assert_eq!(report.jar, PathBuf::from("PBO.jar"));
        assert!(install_dir.join("PBO.jar").is_file());
        assert!(install_dir.join("data/maps.dat").is_file());
        assert!(!install_dir.join("PBO.exe").exists());
        assert!(!install_dir.join("data/patch.cmd").exists());
        assert!(!prior.exists());

        let launcher = install_dir.join("pbo-launch.sh");
        assert_eq!(report.launcher, launcher);
        let script = std::fs::read_to_string(&launcher).unwrap();
        assert!(script.contains("exec \"/usr/bin/java\" -jar \"PBO.jar\" \"$@\""));
        let mode = std::fs::metadata(&launcher).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);

        let entry = std::fs::read_to_string(&report.desktop_entry).unwrap();
        assert_eq!(
            report.desktop_entry,
            home.layout.applications_dir.join("pokemon-blaze-online.desktop")
        );
        assert!(entry.contains("Name=Pokemon Blaze Online\n"));
        assert!(entry.contains("Icon=pokemon-blaze-online\n"));
        assert_eq!(report.icon, Some(home.layout.installed_icon()));
        assert!(home.layout.installed_icon().is_file());

        assert_no_staging_left(&home.share_dir());

        let mut completed = false;
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Install(InstallEvent::Completed { .. }) = event {
                completed = true;
            }
        }
        assert!(completed);
    }

    #[tokio::test]
    async fn test_flat_archive_without_icon() {
        let server = MockServer::start_async().await;
        let body = game_zip(&[("Game.jar", b"jar"), ("readme.txt", b"hi")]);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/flat.zip");
                then.status(200).body(body.clone());
            })
            .await;

        let home = Home::new();
        let report = installer()
            .install(&home.context(server.url("/flat.zip")), &java())
            .await
            .unwrap();

        assert_eq!(report.jar, PathBuf::from("Game.jar"));
        assert!(report.icon.is_none());
        let entry = std::fs::read_to_string(&report.desktop_entry).unwrap();
        assert!(entry.contains(&format!("Icon={FALLBACK_ICON}\n")));
    }

    #[tokio::test]
    async fn test_empty_download_leaves_prior_install() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/empty.zip");
                then.status(200).body("");
            })
            .await;

        let home = Home::new();
        let prior = home.write_prior_install();

        let err = installer()
            .install(&home.context(server.url("/empty.zip")), &java())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::EmptyDownload { .. })
        ));
        assert_eq!(std::fs::read_to_string(prior).unwrap(), "old game");
        assert!(!home.layout.desktop_entry().exists());
        assert_no_staging_left(&home.share_dir());
    }

    #[tokio::test]
    async fn test_missing_jar_leaves_prior_install() {
        let server = MockServer::start_async().await;
        let body = game_zip(&[("Game/Game.exe", b"MZ")]);
        server
            .mock_async(|when, then| {
                when.method(GET).path("/nojar.zip");
                then.status(200).body(body.clone());
            })
            .await;

        let home = Home::new();
        let prior = home.write_prior_install();

        let err = installer()
            .install(&home.context(server.url("/nojar.zip")), &java())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::GameJarNotFound { .. })
        ));
        assert!(prior.exists());
    }

    #[tokio::test]
    async fn test_corrupt_archive() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/bad.zip");
                then.status(200).body("<html>maintenance</html>");
            })
            .await;

        let home = Home::new();
        let err = installer()
            .install(&home.context(server.url("/bad.zip")), &java())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Install(InstallError::ExtractionFailed { .. })
        ));
        assert!(!home.layout.install_dir.exists());
    }

    #[tokio::test]
    async fn test_uninstall_removes_everything() {
        let server = MockServer::start_async().await;
        let body = standard_game();
        server
            .mock_async(|when, then| {
                when.method(GET).path("/PokemonBlazeOnline.zip");
                then.status(200).body(body.clone());
            })
            .await;

        let home = Home::new();
        let installer = installer();
        installer
            .install(&home.context(server.url("/PokemonBlazeOnline.zip")), &java())
            .await
            .unwrap();

        // A portable runtime with its exposed link
        let runtime_java = home.layout.runtime_dir.join("bin/java");
        std::fs::create_dir_all(runtime_java.parent().unwrap()).unwrap();
        std::fs::write(&runtime_java, "").unwrap();
        std::fs::create_dir_all(&home.layout.bin_dir).unwrap();
        let link = home.layout.bin_dir.join("java");
        std::os::unix::fs::symlink(&runtime_java, &link).unwrap();

        let keep_runtime = UninstallContext::new().with_layout(home.layout.clone());
        let report = installer.uninstall(&keep_runtime).await.unwrap();
        assert_eq!(
            report.removed,
            vec![
                home.layout.install_dir.clone(),
                home.layout.desktop_entry(),
                home.layout.installed_icon(),
            ]
        );
        assert!(runtime_java.exists());

        let purge = UninstallContext::new()
            .with_layout(home.layout.clone())
            .with_purge_runtime(true);
        let report = installer.uninstall(&purge).await.unwrap();
        assert_eq!(
            report.removed,
            vec![link.clone(), home.layout.runtime_dir.clone()]
        );
        assert!(std::fs::symlink_metadata(&link).is_err());

        let report = installer.uninstall(&purge).await.unwrap();
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_purge_keeps_foreign_java_link() {
        let home = Home::new();
        std::fs::create_dir_all(&home.layout.bin_dir).unwrap();
        let link = home.layout.bin_dir.join("java");
        std::os::unix::fs::symlink("/usr/lib/jvm/java-17/bin/java", &link).unwrap();

        let purge = UninstallContext::new()
            .with_layout(home.layout.clone())
            .with_purge_runtime(true);
        let report = installer().uninstall(&purge).await.unwrap();

        assert!(report.is_empty());
        assert!(std::fs::symlink_metadata(&link).is_ok());
    }
}
