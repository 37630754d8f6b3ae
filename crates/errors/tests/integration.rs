//! Integration tests for error types

#[cfg(test)]
mod tests {
    use pbo_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://example.com".into(),
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_resolve_error_display() {
        let err = ResolveError::EmptyArchive {
            capability: "java".into(),
            url: "https://example.com/jre.tar.gz".into(),
        };
        assert_eq!(
            err.to_string(),
            "java: download from https://example.com/jre.tar.gz returned an empty archive"
        );
    }

    #[test]
    fn test_resolve_error_structure() {
        let err = ResolveError::PackageManagerInstallFailed {
            capability: "java".into(),
            family: "apt".into(),
            package: "openjdk-17-jre".into(),
            message: "exit status 100".into(),
        };
        assert_eq!(err.capability(), Some("java"));
        assert_eq!(err.family(), Some("apt"));
        assert_eq!(err.step_kind(), Some(STEP_PACKAGE_MANAGER));

        let err = ResolveError::UnsupportedFamily {
            capability: "unzip".into(),
            family: "unknown".into(),
        };
        assert_eq!(err.step_kind(), None);
        assert_eq!(err.user_code(), Some("resolve.unsupported_family"));
    }

    #[test]
    fn test_fallback_errors_report_download_step() {
        let err = ResolveError::UnidentifiableArchiveLayout {
            capability: "java".into(),
            message: "archive has no entries".into(),
        };
        assert_eq!(err.step_kind(), Some(STEP_PORTABLE_DOWNLOAD));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_version_errors_name_preceding_step() {
        let err = ResolveError::VersionParseFailure {
            capability: String::new(),
            input: "banana".into(),
            family: None,
            step: None,
        };
        assert_eq!(err.capability(), None);
        assert_eq!(err.step_kind(), None);

        let err = ResolveError::VersionTooLow {
            capability: "java".into(),
            found: 11,
            required: 17,
            family: None,
            step: None,
        }
        .after_step(Some("dnf"), STEP_PACKAGE_MANAGER);
        assert_eq!(err.capability(), Some("java"));
        assert_eq!(err.family(), Some("dnf"));
        assert_eq!(err.step_kind(), Some(STEP_PACKAGE_MANAGER));

        let err = ResolveError::EmptyArchive {
            capability: "java".into(),
            url: "https://example.com/jre".into(),
        };
        assert_eq!(err.clone().after_step(Some("apt"), STEP_PACKAGE_MANAGER), err);
    }

    #[test]
    fn test_io_error_keeps_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io_with_path(&io_err, "/opt/game");
        assert_eq!(err.user_message(), "/opt/game: denied");
        assert_eq!(err.user_code(), Some("error.io"));
    }

    #[test]
    fn test_error_clone() {
        let err: Error = InstallError::GameJarNotFound {
            path: "/tmp/x".into(),
        }
        .into();
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
