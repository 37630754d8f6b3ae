#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for pbo
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/pbo/config.toml)
//! - Environment variables
//! - CLI flags

pub mod constants;

use pbo_errors::{ConfigError, Error};
use pbo_types::ColorChoice;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub game: GameConfig,

    #[serde(default)]
    pub java: JavaConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub packages: PackagesConfig,

    #[serde(default)]
    pub platform: PlatformConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub color: ColorChoice,
}

/// Path configuration
///
/// Unset entries fall back to XDG locations under the user's home.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    pub install_dir: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
    pub bin_dir: Option<PathBuf>,
    pub applications_dir: Option<PathBuf>,
    pub icons_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

/// Game archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_game_url")]
    pub archive_url: String,
    /// Jar relative to the archive's content root; auto-detected when unset
    #[serde(default)]
    pub jar: Option<String>,
    #[serde(default = "default_display_name")]
    pub display_name: String,
}

/// Java runtime requirement and portable fallback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JavaConfig {
    #[serde(default = "default_java_min_major")]
    pub min_major: u32,
    #[serde(default = "default_java_url_template")]
    pub fallback_url_template: String,
    /// Version downloaded by the fallback; defaults to `min_major`
    #[serde(default)]
    pub fallback_version: Option<u32>,
    #[serde(default = "default_true")]
    pub allow_fallback: bool,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default)]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

/// How package-manager commands gain root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Escalation {
    /// `sudo` unless already root
    #[default]
    Auto,
    Sudo,
    Doas,
    None,
}

impl Escalation {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "auto" => Some(Self::Auto),
            "sudo" => Some(Self::Sudo),
            "doas" => Some(Self::Doas),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// Prefix command for a process running as `is_root`
    #[must_use]
    pub fn command(self, is_root: bool) -> Option<&'static str> {
        match self {
            Self::Auto if is_root => None,
            Self::Auto | Self::Sudo => Some("sudo"),
            Self::Doas => Some("doas"),
            Self::None => None,
        }
    }
}

/// Package manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesConfig {
    #[serde(default)]
    pub escalation: Escalation,
    #[serde(default = "default_true")]
    pub refresh_index: bool,
}

/// Platform detection overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlatformConfig {
    pub os_release_path: Option<PathBuf>,
    /// Machine name used instead of the build target's
    pub machine: Option<String>,
}

// Default implementations

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            archive_url: default_game_url(),
            jar: None,
            display_name: default_display_name(),
        }
    }
}

impl Default for JavaConfig {
    fn default() -> Self {
        Self {
            min_major: default_java_min_major(),
            fallback_url_template: default_java_url_template(),
            fallback_version: None,
            allow_fallback: true,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retries: 0,
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            escalation: Escalation::Auto,
            refresh_index: true,
        }
    }
}

// Default value functions for serde
fn default_game_url() -> String {
    constants::DEFAULT_GAME_URL.to_string()
}

fn default_display_name() -> String {
    constants::APP_NAME.to_string()
}

fn default_java_min_major() -> u32 {
    constants::DEFAULT_JAVA_MIN_MAJOR
}

fn default_java_url_template() -> String {
    constants::DEFAULT_JAVA_URL_TEMPLATE.to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("pbo").join("config.toml"))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound {
                path: path.display().to_string(),
            }
            .into(),
            _ => Error::io_with_path(&e, path),
        })?;

        Self::from_toml(&contents)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // PBO_COLOR
        if let Ok(color) = std::env::var("PBO_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "PBO_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // PBO_INSTALL_DIR
        if let Ok(dir) = std::env::var("PBO_INSTALL_DIR") {
            self.paths.install_dir = Some(PathBuf::from(dir));
        }

        // PBO_RUNTIME_DIR
        if let Ok(dir) = std::env::var("PBO_RUNTIME_DIR") {
            self.paths.runtime_dir = Some(PathBuf::from(dir));
        }

        // PBO_GAME_URL
        if let Ok(url) = std::env::var("PBO_GAME_URL") {
            if url.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "PBO_GAME_URL".to_string(),
                    value: url,
                }
                .into());
            }
            self.game.archive_url = url;
        }

        // PBO_JAVA_MIN
        if let Ok(min) = std::env::var("PBO_JAVA_MIN") {
            self.java.min_major = min.parse().map_err(|_| ConfigError::InvalidValue {
                field: "PBO_JAVA_MIN".to_string(),
                value: min,
            })?;
        }

        // PBO_ESCALATION
        if let Ok(escalation) = std::env::var("PBO_ESCALATION") {
            self.packages.escalation =
                Escalation::parse(&escalation).ok_or_else(|| ConfigError::InvalidValue {
                    field: "PBO_ESCALATION".to_string(),
                    value: escalation,
                })?;
        }

        // PBO_OS_RELEASE
        if let Ok(path) = std::env::var("PBO_OS_RELEASE") {
            self.platform.os_release_path = Some(PathBuf::from(path));
        }

        Ok(())
    }

    /// Reject values that cannot work at all
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> Result<(), Error> {
        if self.java.min_major == 0 {
            return Err(ConfigError::InvalidValue {
                field: "java.min_major".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if let Some(version) = self.java.fallback_version {
            // A fallback older than the minimum could never satisfy the probe
            if version < self.java.min_major {
                return Err(ConfigError::InvalidValue {
                    field: "java.fallback_version".to_string(),
                    value: version.to_string(),
                }
                .into());
            }
        }
        if !self.java.fallback_url_template.contains("{arch}") {
            return Err(ConfigError::InvalidValue {
                field: "java.fallback_url_template".to_string(),
                value: self.java.fallback_url_template.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Runtime version the portable fallback downloads
    #[must_use]
    pub fn java_fallback_version(&self) -> u32 {
        self.java.fallback_version.unwrap_or(self.java.min_major)
    }

    /// Game install directory (default `~/.local/share/pokemon-blaze-online`)
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn install_dir(&self) -> Result<PathBuf, Error> {
        configured_or(self.paths.install_dir.as_ref(), || {
            Ok(data_dir()?.join(constants::APP_ID))
        })
    }

    /// Portable Java directory (default `~/.local/share/pbo/runtime/java`)
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn runtime_dir(&self) -> Result<PathBuf, Error> {
        configured_or(self.paths.runtime_dir.as_ref(), || {
            Ok(data_dir()?
                .join(constants::DATA_SUBDIR)
                .join("runtime")
                .join("java"))
        })
    }

    /// Directory where exposed binaries are linked (default `~/.local/bin`)
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn bin_dir(&self) -> Result<PathBuf, Error> {
        configured_or(self.paths.bin_dir.as_ref(), || {
            dirs::executable_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("bin")))
                .ok_or_else(missing_home)
        })
    }

    /// Desktop entry directory (default `~/.local/share/applications`)
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn applications_dir(&self) -> Result<PathBuf, Error> {
        configured_or(self.paths.applications_dir.as_ref(), || {
            Ok(data_dir()?.join("applications"))
        })
    }

    /// Icon theme root (default `~/.local/share/icons`)
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn icons_dir(&self) -> Result<PathBuf, Error> {
        configured_or(self.paths.icons_dir.as_ref(), || {
            Ok(data_dir()?.join("icons"))
        })
    }

    /// Debug log directory (default `~/.local/state/pbo/logs`)
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn log_dir(&self) -> Result<PathBuf, Error> {
        configured_or(self.paths.log_dir.as_ref(), || {
            dirs::state_dir()
                .or_else(dirs::data_local_dir)
                .map(|dir| dir.join(constants::DATA_SUBDIR).join("logs"))
                .ok_or_else(missing_home)
        })
    }

    /// os-release candidates, configured path first
    #[must_use]
    pub fn os_release_paths(&self) -> Vec<PathBuf> {
        match &self.platform.os_release_path {
            Some(path) => vec![path.clone()],
            None => constants::OS_RELEASE_PATHS
                .iter()
                .map(PathBuf::from)
                .collect(),
        }
    }
}

fn configured_or(
    configured: Option<&PathBuf>,
    default: impl FnOnce() -> Result<PathBuf, Error>,
) -> Result<PathBuf, Error> {
    match configured {
        Some(path) => Ok(path.clone()),
        None => default(),
    }
}

fn data_dir() -> Result<PathBuf, Error> {
    dirs::data_dir().ok_or_else(missing_home)
}

fn missing_home() -> Error {
    ConfigError::MissingField {
        field: "home".to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escalation_command() {
        assert_eq!(Escalation::Auto.command(true), None);
        assert_eq!(Escalation::Auto.command(false), Some("sudo"));
        assert_eq!(Escalation::Doas.command(false), Some("doas"));
        assert_eq!(Escalation::Sudo.command(true), Some("sudo"));
        assert_eq!(Escalation::None.command(false), None);
    }

    #[test]
    fn test_fallback_version_defaults_to_min_major() {
        let mut config = Config::default();
        assert_eq!(config.java_fallback_version(), 17);
        config.java.fallback_version = Some(21);
        assert_eq!(config.java_fallback_version(), 21);
    }
}
