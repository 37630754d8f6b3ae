//! Launcher script, desktop entry and desktop cache refresh

use pbo_config::constants::APP_ID;
use pbo_events::{AppEvent, EventEmitter, InstallEvent};
use pbo_platform::{Platform, PlatformContext};
use std::path::Path;

use crate::context::InstallLayout;

/// Icon name used when the archive ships no png
pub const FALLBACK_ICON: &str = "applications-games";

/// Escape `value` for use inside double quotes, in sh and desktop files
fn double_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Escape a desktop entry string value
fn desktop_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}

/// `Exec=` argument: quoted, `%` doubled, then escaped as a string value
fn exec_argument(program: &str) -> String {
    desktop_value(&double_quoted(program).replace('%', "%%"))
}

/// Shell launcher that runs the game jar from the install directory
pub(crate) fn launcher_script(install_dir: &Path, java: &Path, jar: &Path) -> String {
    format!(
        "#!/bin/sh\ncd {} || exit 1\nexec {} -jar {} \"$@\"\n",
        double_quoted(&install_dir.to_string_lossy()),
        double_quoted(&java.to_string_lossy()),
        double_quoted(&jar.to_string_lossy()),
    )
}

/// Freedesktop menu entry
pub(crate) fn desktop_entry(
    display_name: &str,
    install_dir: &Path,
    launcher: &Path,
    has_icon: bool,
) -> String {
    let icon = if has_icon { APP_ID } else { FALLBACK_ICON };
    let name = desktop_value(display_name);
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name={name}\n\
         Comment=Play {name}\n\
         Exec={}\n\
         Path={}\n\
         Icon={icon}\n\
         Terminal=false\n\
         Categories=Game;\n",
        exec_argument(&launcher.to_string_lossy()),
        desktop_value(&install_dir.to_string_lossy()),
    )
}

/// Run the desktop database and icon cache tools when available
///
/// Missing tools and failures are reported as events and never fail the
/// caller.
pub(crate) async fn refresh_caches(
    platform: &Platform,
    ctx: &PlatformContext,
    layout: &InstallLayout,
) {
    let applications = layout.applications_dir.to_string_lossy().into_owned();
    let theme = layout.icon_theme_dir().to_string_lossy().into_owned();
    let tools: [(&str, Vec<String>); 2] = [
        ("update-desktop-database", vec![applications]),
        (
            "gtk-update-icon-cache",
            vec!["-f".to_string(), "-t".to_string(), theme],
        ),
    ];

    for (tool, args) in tools {
        let skipped = |reason: String| {
            ctx.emit(AppEvent::Install(InstallEvent::CacheRefreshSkipped {
                tool: tool.to_string(),
                reason,
            }));
        };

        let Ok(path) = platform.which(tool, &[]).await else {
            skipped("not installed".to_string());
            continue;
        };

        let mut cmd = platform.command(&path.to_string_lossy());
        cmd.args(&args);
        match platform.execute_command(ctx, cmd).await {
            Ok(output) if output.success() => {}
            Ok(output) => skipped(output.failure_summary()),
            Err(e) => skipped(e.to_string()),
        }
    }
}
