//! Output rendering and formatting

use crate::error::CliError;
use crate::outcome::{CapabilityStatus, CommandOutcome, DoctorReport, InstallSummary, PreviewReport};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use pbo_install::UninstallReport;
use pbo_types::{ColorChoice, Satisfied};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render command result
    pub fn render_outcome(&self, outcome: &CommandOutcome) -> io::Result<()> {
        if self.json_output {
            let json = outcome.to_json().map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match outcome {
            CommandOutcome::Installed(summary) => self.render_install_summary(summary),
            CommandOutcome::Uninstalled(report) => self.render_uninstall_report(report),
            CommandOutcome::Ensured(satisfied) => self.render_satisfied(satisfied),
            CommandOutcome::Preview(preview) => self.render_preview(preview),
            CommandOutcome::Doctor(report) => self.render_doctor(report),
        }
        Ok(())
    }

    /// Render a fatal error
    ///
    /// JSON mode writes an error object to stdout; otherwise the message
    /// goes to stderr.
    pub fn render_error(&self, error: &CliError) {
        if self.json_output {
            let value = serde_json::json!({
                "type": "error",
                "data": {
                    "code": error.code(),
                    "message": error.to_string(),
                }
            });
            println!("{value}");
        } else {
            let label = self.style(Style::new().red().bold(), "Error:");
            eprintln!("{label} {error}");
        }
    }

    fn render_install_summary(&self, summary: &InstallSummary) {
        let game = &summary.game;
        println!("{}", self.style(Style::new().bold(), "Installation Summary"));
        println!();
        println!("Game:          {}", game.install_dir.display());
        println!("Jar:           {}", game.jar.display());
        println!("Launcher:      {}", game.launcher.display());
        println!("Desktop entry: {}", game.desktop_entry.display());
        match &game.icon {
            Some(icon) => println!("Icon:          {}", icon.display()),
            None => println!("Icon:          (theme default)"),
        }
        println!("Java:          {}", describe_satisfied(&summary.java));
        println!();
        println!(
            "Extracted {} files, removed {} Windows executables.",
            game.entries, game.stripped
        );
    }

    fn render_uninstall_report(&self, report: &UninstallReport) {
        if report.is_empty() {
            println!("Nothing to remove.");
            return;
        }
        println!("Removed ({}):", report.removed.len());
        for path in &report.removed {
            println!("  • {}", path.display());
        }
    }

    fn render_satisfied(&self, satisfied: &Satisfied) {
        let name = self.style(Style::new().bold(), &satisfied.capability);
        if satisfied.was_present() {
            println!("{name} is already available: {}", describe_satisfied(satisfied));
        } else {
            println!(
                "{name} is now available: {} (after {} step{})",
                describe_satisfied(satisfied),
                satisfied.steps.len(),
                if satisfied.steps.len() == 1 { "" } else { "s" }
            );
        }
    }

    fn render_preview(&self, preview: &PreviewReport) {
        println!("{}", self.style(Style::new().bold(), "Dry run: no changes made"));
        println!();

        if !preview.capabilities.is_empty() {
            self.render_capability_table(&preview.capabilities);
            for status in &preview.capabilities {
                if status.satisfied {
                    continue;
                }
                println!();
                if status.steps.is_empty() {
                    println!("{}: nothing can be tried on this system", status.name);
                } else {
                    println!("{} would be resolved by:", status.name);
                    for (index, step) in status.steps.iter().enumerate() {
                        println!("  {}. {step}", index + 1);
                    }
                }
                if let Some(reason) = &status.fallback_blocked {
                    println!("  then fail: {reason}");
                }
            }
        }

        if let Some(layout) = &preview.install_target {
            println!();
            println!("Game would be installed into {}", layout.install_dir.display());
            println!("Desktop entry: {}", layout.desktop_entry().display());
        }

        if !preview.removals.is_empty() {
            println!("Would remove ({}):", preview.removals.len());
            for path in &preview.removals {
                println!("  • {}", path.display());
            }
        } else if preview.capabilities.is_empty() && preview.install_target.is_none() {
            println!("Nothing to remove.");
        }
    }

    fn render_doctor(&self, report: &DoctorReport) {
        println!("{}", self.style(Style::new().bold(), "System"));
        println!();
        println!("Distribution:  {}", report.identity.id);
        if !report.identity.id_like.is_empty() {
            println!("Like:          {}", report.identity.id_like.join(" "));
        }
        println!("Family:        {}", report.family);
        println!("Machine:       {}", report.machine);
        match report.fallback_arch {
            Some(arch) => println!("Portable Java: {arch}"),
            None => println!("Portable Java: not published for this machine"),
        }
        println!(
            "Escalation:    {}",
            report.escalation.as_deref().unwrap_or("none")
        );
        println!("Bin dir:       {}", report.bin_dir.display());
        println!();
        self.render_capability_table(&report.capabilities);
    }

    fn render_capability_table(&self, capabilities: &[CapabilityStatus]) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Capability").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Details").add_attribute(Attribute::Bold),
            Cell::new("Steps").add_attribute(Attribute::Bold),
        ]);

        for status in capabilities {
            table.add_row(vec![
                Cell::new(&status.name),
                self.format_status(status),
                Cell::new(&status.status),
                Cell::new(status.steps.len()),
            ]);
        }

        println!("{table}");
    }

    fn format_status(&self, status: &CapabilityStatus) -> Cell {
        let cell = Cell::new(status.label());
        if !self.supports_color() {
            return cell;
        }
        match status.label() {
            "ok" => cell.fg(Color::Green),
            "fixable" => cell.fg(Color::Yellow),
            _ => cell.fg(Color::Red),
        }
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.supports_color() {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

fn describe_satisfied(satisfied: &Satisfied) -> String {
    match satisfied.major_version {
        Some(major) => format!("{} (major {major})", satisfied.path.display()),
        None => satisfied.path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_describe_with_version() {
        let satisfied = Satisfied {
            capability: "java".to_string(),
            path: PathBuf::from("/usr/bin/java"),
            major_version: Some(17),
            steps: Vec::new(),
        };
        assert_eq!(describe_satisfied(&satisfied), "/usr/bin/java (major 17)");
    }

    #[test]
    fn test_color_never_leaves_text_plain() {
        let renderer = OutputRenderer::new(false, ColorChoice::Never);
        assert_eq!(renderer.style(Style::new().bold(), "pbo"), "pbo");
        assert!(!renderer.supports_color());
    }
}
