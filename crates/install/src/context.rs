use pbo_config::constants::APP_ID;
use pbo_config::Config;
use pbo_errors::Error;
use pbo_events::EventSender;
use serde::Serialize;
use std::path::PathBuf;

/// Where the game and its desktop integration live
#[derive(Clone, Debug, Default, Serialize)]
pub struct InstallLayout {
    pub install_dir: PathBuf,
    pub applications_dir: PathBuf,
    pub icons_dir: PathBuf,
    pub bin_dir: PathBuf,
    /// Portable Java install, removed by `--purge-runtime`
    pub runtime_dir: PathBuf,
}

impl InstallLayout {
    /// Resolve every directory from the effective configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a default directory cannot be determined.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self {
            install_dir: config.install_dir()?,
            applications_dir: config.applications_dir()?,
            icons_dir: config.icons_dir()?,
            bin_dir: config.bin_dir()?,
            runtime_dir: config.runtime_dir()?,
        })
    }

    #[must_use]
    pub fn desktop_entry(&self) -> PathBuf {
        self.applications_dir.join(format!("{APP_ID}.desktop"))
    }

    #[must_use]
    pub fn icon_theme_dir(&self) -> PathBuf {
        self.icons_dir.join("hicolor")
    }

    #[must_use]
    pub fn installed_icon(&self) -> PathBuf {
        self.icon_theme_dir()
            .join("256x256/apps")
            .join(format!("{APP_ID}.png"))
    }
}

/// Installation context
#[derive(Clone, Debug)]
pub struct InstallContext {
    pub layout: InstallLayout,
    /// Game archive location
    pub archive_url: String,
    /// Jar to launch, relative to the game root; first `*.jar` when unset
    pub jar: Option<String>,
    /// Name shown in the desktop menu
    pub display_name: String,

    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

context_builder! {
    InstallContext {
        layout: InstallLayout,
        archive_url: String,
        jar: Option<String>,
        display_name: String,
    }
}

impl InstallContext {
    /// Build from the effective configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a default directory cannot be determined.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::new()
            .with_layout(InstallLayout::from_config(config)?)
            .with_archive_url(config.game.archive_url.clone())
            .with_jar(config.game.jar.clone())
            .with_display_name(config.game.display_name.clone()))
    }
}

/// Uninstall context
#[derive(Clone, Debug)]
pub struct UninstallContext {
    pub layout: InstallLayout,
    /// Also remove the portable Java runtime and its link
    pub purge_runtime: bool,

    /// Event sender for progress reporting
    pub event_sender: Option<EventSender>,
}

context_builder! {
    UninstallContext {
        layout: InstallLayout,
        purge_runtime: bool,
    }
}
