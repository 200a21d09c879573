//! Integration tests for graft-cli.
//!
//! Each test runs the real binary inside a temporary directory with an empty
//! config file, so user-level configuration never leaks in.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const LAYOUT: &str = r#"import "./globals.css";

export default function RootLayout({ children }) {
  return (
    <html lang="en">
      <body>{children}</body>
    </html>
  );
}
"#;

const PAGE: &str = "export default function Home() {\n  return <main />;\n}\n";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("graft.toml"), "").unwrap();
        Self { dir }
    }

    /// A Next.js app-router project in the `app/` subdirectory.
    fn with_next_project(self) -> Self {
        let app = self.project().join("src").join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("layout.tsx"), LAYOUT).unwrap();
        fs::write(app.join("page.tsx"), PAGE).unwrap();
        self
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn project(&self) -> PathBuf {
        self.path().join("app")
    }

    fn config(&self) -> PathBuf {
        self.path().join("graft.toml")
    }

    fn graft(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("graft");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.config());
        cmd
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.project().join(relative)).unwrap()
    }
}

#[test]
fn test_help_flag() {
    Workspace::new()
        .graft()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_version_flag() {
    Workspace::new()
        .graft()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_add_help_lists_flags() {
    Workspace::new()
        .graft()
        .args(["add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--kind"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--package-manager"));
}

// ── list ──────────────────────────────────────────────────────────────────────

#[test]
fn test_list_json_includes_builtin_plugins() {
    let output = Workspace::new()
        .graft()
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plugins: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = plugins
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["dataFetching", "httpClient"]);
}

#[test]
fn test_list_filters_by_kind() {
    Workspace::new()
        .graft()
        .args(["list", "--kind", "vite", "--format", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("httpClient"))
        .stdout(predicate::str::contains("dataFetching").not());
}

#[test]
fn test_list_picks_up_manifest_plugins() {
    let ws = Workspace::new();
    let plugin_dir = ws.path().join("plugins").join("toast");
    fs::create_dir_all(&plugin_dir).unwrap();
    fs::write(
        plugin_dir.join("plugin.toml"),
        r#"
[plugin]
id = "toast"
name = "Toast notifications"
kinds = ["next"]
dependencies = ["react-hot-toast"]

[[files]]
name = "Toaster"
type = "component"
path = "src/components"
content = "export function Toaster() { return null; }\n"
"#,
    )
    .unwrap();
    fs::write(
        ws.config(),
        format!("[plugins]\ndirectory = {:?}\n", ws.path().join("plugins")),
    )
    .unwrap();

    ws.graft()
        .args(["list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toast,Toast notifications,next,1,"));
}

// ── add ───────────────────────────────────────────────────────────────────────

#[test]
fn test_add_dry_run_writes_nothing() {
    let ws = Workspace::new().with_next_project();

    ws.graft()
        .args(["add", "dataFetching", "--kind", "next", "--dry-run", "--dir"])
        .arg(ws.project())
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 10 file(s) would be written"))
        .stdout(predicate::str::contains(
            "would run: npm install @tanstack/react-query @tanstack/react-query-devtools axios js-cookie",
        ))
        .stdout(predicate::str::contains("@types/js-cookie"));

    assert_eq!(ws.read("src/app/layout.tsx"), LAYOUT);
    assert!(!ws.project().join(".env").exists());
}

#[test]
fn test_add_writes_files_without_installing() {
    let ws = Workspace::new().with_next_project();

    ws.graft()
        .args(["add", "dataFetching", "-k", "next", "--no-install", "--yes", "--dir"])
        .arg(ws.project())
        .assert()
        .success()
        .stdout(predicate::str::contains("Adding React Query, Please wait !"))
        .stdout(predicate::str::contains("Package installation skipped"));

    let layout = ws.read("src/app/layout.tsx");
    assert!(layout.contains("<body><Providers>{children}</Providers></body>"));
    assert_eq!(
        ws.read(".env"),
        "NEXT_PUBLIC_BASE_URL=https://jsonplaceholder.typicode.com/"
    );
    assert!(ws.project().join("src/utils/api.ts").exists());
    assert_eq!(ws.read("src/app/page.tsx"), PAGE);
}

#[test]
fn test_add_twice_is_stable() {
    let ws = Workspace::new().with_next_project();
    let add = |ws: &Workspace| {
        ws.graft()
            .args(["add", "httpClient", "dataFetching", "-k", "next", "--no-install", "-y", "--dir"])
            .arg(ws.project())
            .assert()
            .success();
    };

    add(&ws);
    let first = ws.read("src/app/layout.tsx");
    add(&ws);

    assert_eq!(ws.read("src/app/layout.tsx"), first);
}

#[test]
fn test_add_uses_config_defaults() {
    let ws = Workspace::new().with_next_project();
    fs::write(
        ws.config(),
        "[defaults]\nproject_kind = \"next\"\ntypescript = false\n\n[install]\nenabled = false\n",
    )
    .unwrap();

    ws.graft()
        .args(["add", "httpClient", "--yes", "--dir"])
        .arg(ws.project())
        .assert()
        .success();

    assert!(ws.project().join("src/utils/api.js").exists());
}

#[test]
fn test_add_json_output_and_report_file() {
    let ws = Workspace::new().with_next_project();
    let report = ws.path().join("report.json");

    let output = ws
        .graft()
        .args(["--output-format", "json", "add", "httpClient", "-k", "next", "--dry-run"])
        .arg("--report")
        .arg(&report)
        .arg("--dir")
        .arg(ws.project())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stdout["success"], true);
    assert_eq!(stdout["phase"], "done");
    assert_eq!(stdout["project_kind"], "next");
    assert_eq!(stdout["plugins"][0]["plugin"], "httpClient");

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(report).unwrap()).unwrap();
    assert_eq!(saved["run_id"], stdout["run_id"]);
}

// ── init / config / completions ───────────────────────────────────────────────

#[test]
fn test_init_local_then_refuses_to_overwrite() {
    let ws = Workspace::new();

    ws.graft().args(["init", "--local"]).assert().success();
    let created = fs::read_to_string(ws.path().join(".graft.toml")).unwrap();
    assert!(created.contains("[defaults]"));

    ws.graft()
        .args(["init", "--local"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--force"));

    ws.graft().args(["init", "--local", "--force"]).assert().success();
}

#[test]
fn test_config_set_then_get() {
    let ws = Workspace::new();

    ws.graft()
        .args(["config", "set", "defaults.package_manager", "pnpm"])
        .assert()
        .success();

    ws.graft()
        .args(["config", "get", "defaults.package_manager"])
        .assert()
        .success()
        .stdout("pnpm\n");

    assert!(fs::read_to_string(ws.config()).unwrap().contains("package_manager = \"pnpm\""));
}

#[test]
fn test_config_env_overrides_file() {
    let ws = Workspace::new();
    fs::write(ws.config(), "[defaults]\nproject_kind = \"next\"\n").unwrap();

    ws.graft()
        .env("GRAFT__DEFAULTS__PROJECT_KIND", "react-cra")
        .args(["config", "get", "defaults.project_kind"])
        .assert()
        .success()
        .stdout("react-cra\n");
}

#[test]
fn test_completions_bash() {
    Workspace::new()
        .graft()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("graft"));
}
