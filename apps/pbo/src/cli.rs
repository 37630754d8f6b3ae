//! Command line interface definition

use clap::{Parser, Subcommand, ValueEnum};
use pbo_types::ColorChoice;
use std::path::PathBuf;

/// pbo - Pokemon Blaze Online installer for Linux
#[derive(Parser)]
#[command(name = "pbo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install Pokemon Blaze Online and the Java runtime it needs")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write structured debug logs to the state directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show what would be done without changing anything
    #[arg(long, global = true)]
    pub check: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Make Java available, then download and install the game
    #[command(alias = "i")]
    Install,

    /// Remove the game and its desktop entry
    #[command(alias = "rm")]
    Uninstall {
        /// Also remove the portable Java runtime installed by pbo
        #[arg(long)]
        purge_runtime: bool,
    },

    /// Make a single command available
    Ensure {
        /// Capability to resolve
        #[arg(value_enum)]
        capability: Capability,
    },

    /// Show platform detection and the status of every capability
    Doctor,
}

/// Capabilities that can be resolved individually
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Capability {
    Java,
    Unzip,
    Curl,
    Wget,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Unzip => "unzip",
            Self::Curl => "curl",
            Self::Wget => "wget",
        }
    }
}

impl Commands {
    /// Name used in log records
    pub fn name(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall { .. } => "uninstall",
            Self::Ensure { .. } => "ensure",
            Self::Doctor => "doctor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_uninstall_purge() {
        let cli = Cli::try_parse_from(["pbo", "uninstall", "--purge-runtime"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Uninstall {
                purge_runtime: true
            }
        ));
        assert!(!cli.global.check);
    }

    #[test]
    fn test_parse_ensure_with_global_flags() {
        let cli = Cli::try_parse_from([
            "pbo", "ensure", "unzip", "--json", "--check", "--color", "never",
        ])
        .unwrap();
        match cli.command {
            Commands::Ensure { capability } => assert_eq!(capability.as_str(), "unzip"),
            _ => panic!("expected ensure"),
        }
        assert!(cli.global.json);
        assert!(cli.global.check);
        assert_eq!(cli.global.color, Some(ColorChoice::Never));
    }

    #[test]
    fn test_unknown_capability_rejected() {
        assert!(Cli::try_parse_from(["pbo", "ensure", "python"]).is_err());
    }

    #[test]
    fn test_config_path_flag() {
        let cli =
            Cli::try_parse_from(["pbo", "--config", "/tmp/pbo.toml", "doctor"]).unwrap();
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/pbo.toml")));
        assert_eq!(cli.command.name(), "doctor");
    }
}
