//! System setup and initialization

use crate::error::CliError;
use pbo_config::Config;
use pbo_events::{EventEmitter, EventSender};
use pbo_install::Installer;
use pbo_net::{NetClient, NetConfig};
use pbo_platform::{LinuxProcessOperations, Platform, ProcessOperations};
use pbo_resolver::{Catalog, Resolver, ResolverSettings};
use pbo_types::{current_machine, PlatformIdentity};
use std::sync::Arc;
use tracing::{debug, info};

/// Components shared by every command
pub struct SystemSetup {
    config: Config,
    identity: PlatformIdentity,
    catalog: Catalog,
    resolver: Resolver,
    installer: Installer,
}

impl SystemSetup {
    /// Detect the platform and build the resolver and installer
    pub async fn initialize(config: Config, event_sender: EventSender) -> Result<Self, CliError> {
        info!("Initializing pbo components");

        let os_release = config.os_release_paths();
        let identity = pbo_platform::load_identity(&os_release).await?;
        if identity == PlatformIdentity::unknown() {
            event_sender.emit_warning(format!(
                "no os-release file found in {}; package managers will not be used",
                display_paths(&os_release)
            ));
        }
        debug!(id = %identity.id, id_like = ?identity.id_like, "Platform identity");

        let net = NetClient::new(NetConfig::from(&config.network))?;

        let process: Arc<dyn ProcessOperations> = Arc::new(LinuxProcessOperations::new());
        let settings = resolver_settings(&config)?;
        debug!(
            machine = %settings.machine,
            escalation = ?settings.escalation,
            bin_dir = %settings.bin_dir.display(),
            "Resolver settings"
        );

        let resolver = Resolver::new(process.clone(), net.clone(), event_sender, settings);
        let installer = Installer::new(Platform::new(process), net);

        Ok(Self {
            catalog: Catalog::from_config(&config),
            config,
            identity,
            resolver,
            installer,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn identity(&self) -> &PlatformIdentity {
        &self.identity
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn installer(&self) -> &Installer {
        &self.installer
    }
}

fn display_paths(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolver inputs from the effective configuration and the running host
fn resolver_settings(config: &Config) -> Result<ResolverSettings, CliError> {
    let machine = config
        .platform
        .machine
        .clone()
        .unwrap_or_else(|| current_machine().to_string());
    let escalation = config
        .packages
        .escalation
        .command(pbo_platform::fs::is_root())
        .map(str::to_string);

    Ok(ResolverSettings {
        bin_dir: config.bin_dir()?,
        runtime_dir: config.runtime_dir()?,
        machine,
        escalation,
        refresh_index: config.packages.refresh_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbo_config::Escalation;
    use std::path::PathBuf;

    #[test]
    fn test_settings_follow_config() {
        let mut config = Config::default();
        config.platform.machine = Some("riscv64".to_string());
        config.packages.escalation = Escalation::Doas;
        config.packages.refresh_index = false;
        config.paths.bin_dir = Some(PathBuf::from("/opt/pbo/bin"));
        config.paths.runtime_dir = Some(PathBuf::from("/opt/pbo/java"));

        let settings = resolver_settings(&config).unwrap();
        assert_eq!(settings.machine, "riscv64");
        assert_eq!(settings.escalation.as_deref(), Some("doas"));
        assert!(!settings.refresh_index);
        assert_eq!(settings.bin_dir, PathBuf::from("/opt/pbo/bin"));
        assert_eq!(settings.runtime_dir, PathBuf::from("/opt/pbo/java"));
    }

    #[test]
    fn test_no_escalation() {
        let mut config = Config::default();
        config.packages.escalation = Escalation::None;
        config.paths.bin_dir = Some(PathBuf::from("/tmp/bin"));
        config.paths.runtime_dir = Some(PathBuf::from("/tmp/java"));
        let settings = resolver_settings(&config).unwrap();
        assert!(settings.escalation.is_none());
        assert_eq!(settings.machine, current_machine());
    }

    #[tokio::test]
    async fn test_initialize_with_missing_os_release() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.platform.os_release_path = Some(dir.path().join("os-release"));
        config.paths.bin_dir = Some(dir.path().join("bin"));
        config.paths.runtime_dir = Some(dir.path().join("java"));

        let (tx, mut rx) = pbo_events::channel();
        let setup = SystemSetup::initialize(config, tx).await.unwrap();
        assert_eq!(setup.identity(), &PlatformIdentity::unknown());
        assert!(matches!(
            rx.try_recv(),
            Ok(pbo_events::AppEvent::General(pbo_events::GeneralEvent::Warning { .. }))
        ));
        assert_eq!(setup.resolver().settings().bin_dir, dir.path().join("bin"));
        assert!(setup.catalog().get("wget").is_some());
    }
}
