//! Integration tests for the pbo CLI

use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

const PBO_ENV: &[&str] = &[
    "PBO_COLOR",
    "PBO_INSTALL_DIR",
    "PBO_RUNTIME_DIR",
    "PBO_GAME_URL",
    "PBO_JAVA_MIN",
    "PBO_ESCALATION",
    "PBO_OS_RELEASE",
    "RUST_LOG",
];

/// Scratch home with every pbo path inside it
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new(os_release: &str) -> Self {
        Self::with_config(os_release, "")
    }

    fn with_config(os_release: &str, extra: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("os-release"), os_release).unwrap();
        let config = format!(
            r#"
[paths]
install_dir = "{root}/game"
runtime_dir = "{root}/runtime/java"
bin_dir = "{root}/bin"
applications_dir = "{root}/applications"
icons_dir = "{root}/icons"
log_dir = "{root}/logs"

[packages]
escalation = "none"

[platform]
os_release_path = "{root}/os-release"
machine = "riscv64"
{extra}
"#,
            root = root.display()
        );
        std::fs::write(root.join("config.toml"), config).unwrap();
        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to execute pbo")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_pbo"));
        command
            .arg("--config")
            .arg(self.root().join("config.toml"))
            .args(args)
            .env("HOME", self.root());
        for var in PBO_ENV {
            command.env_remove(var);
        }
        command
    }

    fn run_json(&self, args: &[&str]) -> (Output, serde_json::Value) {
        let mut full = vec!["--json"];
        full.extend_from_slice(args);
        let output = self.run(&full);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let value = serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
        (output, value)
    }
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_pbo"))
        .arg("--version")
        .output()
        .expect("Failed to execute pbo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pbo"));
}

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_pbo"))
        .arg("--help")
        .output()
        .expect("Failed to execute pbo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["install", "uninstall", "ensure", "doctor"] {
        assert!(stdout.contains(command), "help lists {command}");
    }
}

#[test]
fn test_cli_invalid_capability() {
    let output = Command::new(env!("CARGO_BIN_EXE_pbo"))
        .args(["ensure", "python"])
        .output()
        .expect("Failed to execute pbo");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value"));
}

#[test]
fn test_missing_config_file_is_json_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_pbo"))
        .args(["--json", "--config", "/nonexistent/pbo.toml", "doctor"])
        .output()
        .expect("Failed to execute pbo");

    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error output is JSON");
    assert_eq!(value["type"], "error");
    assert_eq!(value["data"]["code"], "config.not_found");
}

#[test]
fn test_doctor_reports_platform() {
    let sandbox = Sandbox::new("ID=pop\nID_LIKE=\"ubuntu debian\"\n");
    let (output, value) = sandbox.run_json(&["doctor"]);

    assert!(output.status.success());
    assert_eq!(value["type"], "doctor");
    let data = &value["data"];
    assert_eq!(data["identity"]["id"], "pop");
    assert_eq!(data["family"], "apt");
    assert_eq!(data["machine"], "riscv64");
    assert!(data["fallback_arch"].is_null());
    assert!(data["escalation"].is_null());

    let names: Vec<_> = data["capabilities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["java", "unzip", "curl", "wget"]);
}

#[test]
fn test_ensure_check_on_unknown_system_plans_nothing() {
    let sandbox = Sandbox::new("ID=unknownos\n");
    let (output, value) = sandbox.run_json(&["--check", "ensure", "wget"]);

    assert!(output.status.success());
    assert_eq!(value["type"], "preview");
    let status = &value["data"]["capabilities"][0];
    assert_eq!(status["name"], "wget");
    assert_eq!(status["family"], "unknown");
    assert_eq!(status["steps"].as_array().unwrap().len(), 0);
}

#[test]
fn test_install_check_writes_nothing() {
    let sandbox = Sandbox::new("ID=fedora\n");
    let (output, value) = sandbox.run_json(&["--check", "install"]);

    assert!(output.status.success());
    assert_eq!(value["type"], "preview");
    assert_eq!(
        value["data"]["install_target"]["install_dir"],
        sandbox.root().join("game").display().to_string()
    );
    assert!(!sandbox.root().join("game").exists());
    assert!(!sandbox.root().join("applications").exists());
}

#[test]
fn test_uninstall_check_then_uninstall() {
    let sandbox = Sandbox::new("ID=arch\n");
    let game = sandbox.root().join("game");
    std::fs::create_dir_all(&game).unwrap();
    std::fs::write(game.join("pbo-launch.sh"), "#!/bin/sh\n").unwrap();
    let apps = sandbox.root().join("applications");
    std::fs::create_dir_all(&apps).unwrap();
    let entry = apps.join("pokemon-blaze-online.desktop");
    std::fs::write(&entry, "[Desktop Entry]\n").unwrap();

    let (output, value) = sandbox.run_json(&["--check", "uninstall"]);
    assert!(output.status.success());
    assert_eq!(value["data"]["removals"].as_array().unwrap().len(), 2);
    assert!(game.exists());

    let (output, value) = sandbox.run_json(&["uninstall"]);
    assert!(output.status.success());
    assert_eq!(value["type"], "uninstalled");
    assert_eq!(value["data"]["removed"].as_array().unwrap().len(), 2);
    assert!(!game.exists());
    assert!(!entry.exists());
}

#[test]
fn test_debug_writes_log_file() {
    let sandbox = Sandbox::new("ID=alpine\n");
    let (output, _) = sandbox.run_json(&["--debug", "doctor"]);
    assert!(output.status.success());

    let logs: Vec<_> = std::fs::read_dir(sandbox.root().join("logs"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("pbo-") && logs[0].ends_with(".log"));
}

#[test]
fn test_sigterm_removes_staging_directory() {
    // Accepts the download connection and never answers
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let sandbox = Sandbox::with_config(
        "ID=arch\n",
        &format!("\n[game]\narchive_url = \"http://127.0.0.1:{port}/game.zip\"\n"),
    );

    let fake_bin = sandbox.root().join("fakebin");
    std::fs::create_dir_all(&fake_bin).unwrap();
    let java = fake_bin.join("java");
    std::fs::write(
        &java,
        "#!/bin/sh\necho 'openjdk version \"17.0.2\" 2022-01-18' >&2\n",
    )
    .unwrap();
    std::fs::set_permissions(&java, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut child = sandbox
        .command(&["install"])
        .env("PATH", format!("{}:/usr/bin:/bin", fake_bin.display()))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // The staging directory exists before the download starts
    listener.set_nonblocking(true).unwrap();
    let deadline = Instant::now() + Duration::from_secs(30);
    let _connection = loop {
        match listener.accept() {
            Ok((connection, _)) => break connection,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if let Some(status) = child.try_wait().unwrap() {
                    panic!("pbo exited before downloading: {status}");
                }
                assert!(Instant::now() < deadline, "pbo never started the download");
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => panic!("accept failed: {e}"),
        }
    };
    let staged = |root: &Path| {
        std::fs::read_dir(root)
            .unwrap()
            .filter_map(Result::ok)
            .any(|entry| entry.file_name().to_string_lossy().starts_with(".pbo-install-"))
    };
    assert!(staged(sandbox.root()));

    let status = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(143));
    assert!(!staged(sandbox.root()));
}
