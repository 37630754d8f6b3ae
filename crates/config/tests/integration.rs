//! Integration tests for config

#[cfg(test)]
mod tests {
    use pbo_config::*;
    use pbo_types::ColorChoice;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "PBO_COLOR",
        "PBO_INSTALL_DIR",
        "PBO_RUNTIME_DIR",
        "PBO_GAME_URL",
        "PBO_JAVA_MIN",
        "PBO_ESCALATION",
        "PBO_OS_RELEASE",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
color = "never"

[paths]
install_dir = "/srv/games/pbo"
bin_dir = "/srv/bin"

[game]
archive_url = "https://mirror.example.com/pbo.zip"
jar = "PBO.jar"

[java]
min_major = 21
allow_fallback = false

[packages]
escalation = "doas"
refresh_index = false
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.install_dir().unwrap(), PathBuf::from("/srv/games/pbo"));
        assert_eq!(config.bin_dir().unwrap(), PathBuf::from("/srv/bin"));
        assert_eq!(config.game.archive_url, "https://mirror.example.com/pbo.zip");
        assert_eq!(config.game.jar.as_deref(), Some("PBO.jar"));
        assert_eq!(config.java.min_major, 21);
        assert_eq!(config.java_fallback_version(), 21);
        assert!(!config.java.allow_fallback);
        assert_eq!(config.packages.escalation, Escalation::Doas);
        assert!(!config.packages.refresh_index);
        // Untouched sections keep their defaults
        assert_eq!(config.network.retries, 0);
        assert_eq!(config.game.display_name, "Pokemon Blaze Online");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/nonexistent/pbo.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            pbo_errors::Error::Config(pbo_errors::ConfigError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreadable_file_keeps_io_kind() {
        // Reading a directory fails with something other than NotFound
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from_file(dir.path()).await.unwrap_err();
        match err {
            pbo_errors::Error::Io { kind, path, .. } => {
                assert_ne!(kind, std::io::ErrorKind::NotFound);
                assert_eq!(path.as_deref(), Some(dir.path()));
            }
            other => panic!("expected an io error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[java]\nmin_major = \"seventeen\"\n").unwrap_err();
        assert!(matches!(
            err,
            pbo_errors::Error::Config(pbo_errors::ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("PBO_COLOR", "always");
        std::env::set_var("PBO_INSTALL_DIR", "/tmp/pbo-game");
        std::env::set_var("PBO_JAVA_MIN", "21");
        std::env::set_var("PBO_ESCALATION", "none");
        std::env::set_var("PBO_OS_RELEASE", "/tmp/os-release");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.color, ColorChoice::Always);
        assert_eq!(config.install_dir().unwrap(), PathBuf::from("/tmp/pbo-game"));
        assert_eq!(config.java.min_major, 21);
        assert_eq!(config.packages.escalation, Escalation::None);
        assert_eq!(
            config.os_release_paths(),
            vec![PathBuf::from("/tmp/os-release")]
        );

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("PBO_JAVA_MIN", "seventeen");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        clear_env();
    }

    #[test]
    fn test_default_os_release_paths() {
        let config = Config::default();
        assert_eq!(
            config.os_release_paths(),
            vec![
                PathBuf::from("/etc/os-release"),
                PathBuf::from("/usr/lib/os-release")
            ]
        );
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.java.fallback_url_template = "https://example.com/jre.tar.gz".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_fallback_below_minimum() {
        let mut config = Config::default();
        config.java.min_major = 17;
        config.java.fallback_version = Some(21);
        assert!(config.validate().is_ok());

        config.java.fallback_version = Some(11);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            pbo_errors::Error::Config(pbo_errors::ConfigError::InvalidValue { ref field, .. })
                if field == "java.fallback_version"
        ));
    }
}
