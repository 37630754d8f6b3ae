//! pbo - Pokemon Blaze Online installer for Linux
//!
//! Resolves the Java runtime the game needs, through the distribution's
//! package manager or a portable download, then installs the game with a
//! launcher and desktop entry.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod outcome;
mod setup;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::outcome::{CapabilityStatus, CommandOutcome, DoctorReport, InstallSummary, PreviewReport};
use crate::setup::SystemSetup;
use clap::Parser;
use pbo_config::Config;
use pbo_events::{EventReceiver, EventSender};
use pbo_install::{uninstall_targets, InstallContext, InstallLayout, UninstallContext};
use pbo_types::{CapabilityRequirement, ColorChoice, FallbackArch, PackageFamily};
use std::path::Path;
use std::process;
use tokio::select;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

/// Exit code after Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;
/// Exit code after SIGTERM
const EXIT_TERMINATED: i32 = 143;
/// Exit code after SIGHUP
const EXIT_HANGUP: i32 = 129;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    let config = match load_config(&cli.global).await {
        Ok(config) => config,
        Err(e) => {
            OutputRenderer::new(json_mode, cli.global.color.unwrap_or_default()).render_error(&e);
            process::exit(1);
        }
    };

    init_tracing(json_mode, cli.global.debug, &config);
    let renderer = OutputRenderer::new(json_mode, config.general.color);

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            renderer.render_error(&CliError::Io(e));
            process::exit(1);
        }
    };
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(stream) => stream,
        Err(e) => {
            renderer.render_error(&CliError::Io(e));
            process::exit(1);
        }
    };

    // Dropping the command future on a signal removes every scratch directory
    let code = select! {
        result = run(cli, config) => match result {
            Ok(()) => 0,
            Err(e) => {
                error!("Application error: {}", e);
                renderer.render_error(&e);
                1
            }
        },
        _ = tokio::signal::ctrl_c() => interrupted("Interrupted", EXIT_INTERRUPTED, json_mode),
        _ = terminate.recv() => interrupted("Terminated", EXIT_TERMINATED, json_mode),
        _ = hangup.recv() => interrupted("Hangup", EXIT_HANGUP, json_mode),
    };

    process::exit(code);
}

/// Report a signal that cut the command short
fn interrupted(reason: &str, code: i32, json_mode: bool) -> i32 {
    warn!(code, "{reason}");
    if !json_mode {
        eprintln!("{reason}");
    }
    code
}

/// Load configuration with precedence file < environment < CLI flags
async fn load_config(global: &GlobalArgs) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, global);
    config.validate()?;
    Ok(config)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
}

/// Main application logic
async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    info!(
        command = cli.command.name(),
        check = cli.global.check,
        "Starting pbo v{}",
        env!("CARGO_PKG_VERSION")
    );

    let (event_sender, event_receiver) = pbo_events::channel();
    let setup = SystemSetup::initialize(config, event_sender.clone()).await?;

    let color = setup.config().general.color;
    let renderer = OutputRenderer::new(cli.global.json, color);
    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, cli.global.json);

    let outcome = execute_command_with_events(
        cli.command,
        &setup,
        cli.global.check,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_outcome(&outcome)?;

    if !cli.global.json {
        show_path_reminder_if_needed(&setup.resolver().settings().bin_dir, &outcome);
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    setup: &SystemSetup,
    check: bool,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandOutcome, CliError> {
    let mut command_future = Box::pin(execute_command(command, setup, check, event_sender));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    setup: &SystemSetup,
    check: bool,
    event_sender: EventSender,
) -> Result<CommandOutcome, CliError> {
    match command {
        Commands::Install => {
            let java = setup.catalog().java().clone();
            if check {
                let mut preview = preview_capabilities(setup, &[java]).await?;
                preview.install_target = Some(InstallLayout::from_config(setup.config())?);
                return Ok(CommandOutcome::Preview(preview));
            }

            let java = setup.resolver().resolve(&java, setup.identity()).await?;
            let context =
                InstallContext::from_config(setup.config())?.with_event_sender(event_sender);
            let game = setup.installer().install(&context, &java).await?;
            Ok(CommandOutcome::Installed(InstallSummary { java, game }))
        }

        Commands::Uninstall { purge_runtime } => {
            let context = UninstallContext::new()
                .with_layout(InstallLayout::from_config(setup.config())?)
                .with_purge_runtime(purge_runtime)
                .with_event_sender(event_sender);

            if check {
                let mut removals = Vec::new();
                for path in uninstall_targets(&context).await {
                    if pbo_platform::fs::exists(&path).await? {
                        removals.push(path);
                    }
                }
                return Ok(CommandOutcome::Preview(PreviewReport {
                    removals,
                    ..PreviewReport::default()
                }));
            }

            let report = setup.installer().uninstall(&context).await?;
            Ok(CommandOutcome::Uninstalled(report))
        }

        Commands::Ensure { capability } => {
            let req = setup.catalog().get(capability.as_str()).ok_or_else(|| {
                CliError::Setup(format!("unknown capability {}", capability.as_str()))
            })?;
            if check {
                let preview = preview_capabilities(setup, &[req]).await?;
                return Ok(CommandOutcome::Preview(preview));
            }

            let satisfied = setup.resolver().resolve(&req, setup.identity()).await?;
            Ok(CommandOutcome::Ensured(satisfied))
        }

        Commands::Doctor => {
            let settings = setup.resolver().settings();
            let preview = preview_capabilities(setup, &setup.catalog().all()).await?;
            Ok(CommandOutcome::Doctor(DoctorReport {
                identity: setup.identity().clone(),
                family: PackageFamily::classify(setup.identity()),
                machine: settings.machine.clone(),
                fallback_arch: FallbackArch::from_machine("java", &settings.machine).ok(),
                escalation: settings.escalation.clone(),
                bin_dir: settings.bin_dir.clone(),
                capabilities: preview.capabilities,
            }))
        }
    }
}

/// Probe and plan every requirement without running any step
async fn preview_capabilities(
    setup: &SystemSetup,
    requirements: &[CapabilityRequirement],
) -> Result<PreviewReport, CliError> {
    let mut capabilities = Vec::with_capacity(requirements.len());
    for req in requirements {
        let preview = setup.resolver().plan(req, setup.identity()).await?;
        capabilities.push(CapabilityStatus::from_preview(req, preview));
    }
    Ok(PreviewReport {
        capabilities,
        ..PreviewReport::default()
    })
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, config: &Config) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        if let Some(file) = open_log_file(config, json_mode) {
            tracing_subscriber::fmt()
                .json()
                .with_writer(file)
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                        tracing_subscriber::EnvFilter::new("info,pbo=debug,pbo_resolver=debug")
                    }),
                )
                .init();
            return;
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Console logging stays on stderr; rendered events already cover progress
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .init();
    }
}

/// Create `<log_dir>/pbo-<timestamp>.log`
fn open_log_file(config: &Config, json_mode: bool) -> Option<std::fs::File> {
    let log_dir = match config.log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            if !json_mode {
                eprintln!("Warning: No log directory: {e}");
            }
            return None;
        }
    };
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        if !json_mode {
            eprintln!("Warning: Failed to create log directory: {e}");
        }
        return None;
    }

    let log_file = log_dir.join(format!(
        "pbo-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    match std::fs::File::create(&log_file) {
        Ok(file) => {
            if !json_mode {
                eprintln!("Debug logging enabled: {}", log_file.display());
            }
            Some(file)
        }
        Err(e) => {
            if !json_mode {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            None
        }
    }
}

/// Remind the user to add `bin_dir` to `PATH` when a resolved command lives there
fn show_path_reminder_if_needed(bin_dir: &Path, outcome: &CommandOutcome) {
    let in_bin_dir = outcome
        .resolved_paths()
        .iter()
        .any(|path| path.starts_with(bin_dir));
    if !in_bin_dir {
        return;
    }

    let path = std::env::var_os("PATH").unwrap_or_default();
    if std::env::split_paths(&path).any(|entry| entry == bin_dir) {
        return;
    }

    eprintln!();
    eprintln!("Add {} to your PATH to use the installed Java:", bin_dir.display());
    eprintln!(
        "   echo 'export PATH=\"{}:$PATH\"' >> ~/.profile",
        bin_dir.display()
    );
    eprintln!();
}
