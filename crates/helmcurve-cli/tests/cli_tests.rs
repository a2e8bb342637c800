//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn helmcurve() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("helmcurve").unwrap();
    cmd.env_remove("HELM_DATA_DIR").env_remove("RUST_LOG");
    cmd
}

/// Five models of increasing skill on 40 dyck instances of increasing
/// difficulty.
fn write_data_dir(root: &Path) {
    let models: Vec<String> = (0..5).map(|m| format!("m{m}")).collect();
    let tasks = json!({
        "dyck": {
            "url_param": "dyck_language_np=3:",
            "models": models,
            "url_extras": {}
        }
    });
    std::fs::write(root.join("tasks.json"), tasks.to_string()).unwrap();
    std::fs::create_dir_all(root.join("dyck")).unwrap();

    for m in 0..5usize {
        let states: Vec<_> = (0..40usize)
            .map(|i| {
                let correct =
                    ((i + 7 * m) % 11 != 0 && i < 10 + 6 * m) || (i * (m + 1)) % 9 == 0;
                json!({
                    "instance": {
                        "id": format!("q{i}"),
                        "split": "test",
                        "references": [
                            {"output": ")", "tags": ["correct"]},
                            {"output": "]", "tags": []}
                        ]
                    },
                    "train_trial_index": 0,
                    "result": {"completions": [{"text": if correct { ")" } else { "]" }}]}
                })
            })
            .collect();
        std::fs::write(
            root.join("dyck").join(format!("m{m}.json")),
            json!({ "request_states": states }).to_string(),
        )
        .unwrap();
    }

    std::fs::write(root.join("models.json"), r#"{"m3": 1000000000}"#).unwrap();
}

fn only_file_with_extension(dir: &Path, ext: &str) -> std::path::PathBuf {
    let matches: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == ext))
        .collect();
    assert_eq!(matches.len(), 1, "expected one .{ext} file in {}", dir.display());
    matches.into_iter().next().unwrap()
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    helmcurve()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created helmcurve.toml"));

    assert!(dir.path().join("helmcurve.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    helmcurve().current_dir(dir.path()).arg("init").assert().success();

    helmcurve()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn list_tasks_falls_back_to_builtin_catalog() {
    let dir = TempDir::new().unwrap();

    helmcurve()
        .current_dir(dir.path())
        .arg("list-tasks")
        .arg("--data-dir")
        .arg(dir.path().join("empty"))
        .assert()
        .success()
        .stdout(predicate::str::contains("synthetic_reasoning_induction"))
        .stdout(predicate::str::contains("entity_matching_dirty_itunes_amazon"))
        .stdout(predicate::str::contains("20 tasks"));
}

#[test]
fn list_tasks_reads_data_dir() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());

    helmcurve()
        .current_dir(dir.path())
        .arg("list-tasks")
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("dyck"))
        .stdout(predicate::str::contains("1 tasks"));
}

#[test]
fn accuracy_table() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());

    helmcurve()
        .current_dir(dir.path())
        .args(["accuracy", "--task", "dyck", "--split", "test", "--data-dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Task: dyck (test)"))
        .stdout(predicate::str::contains("m4"))
        .stdout(predicate::str::contains("40"));
}

#[test]
fn accuracy_unknown_task_fails() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());

    helmcurve()
        .current_dir(dir.path())
        .args(["accuracy", "--task", "gsm8k", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown task: gsm8k"));
}

#[test]
fn analyze_writes_json_and_html() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let out = dir.path().join("out");

    helmcurve()
        .current_dir(dir.path())
        .args([
            "analyze", "--task", "dyck", "--models", "m3,m4", "--x-axis", "raw", "--seed", "11",
            "--format", "all", "--data-dir",
        ])
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("m3"))
        .stdout(predicate::str::contains("9.00"))
        .stderr(predicate::str::contains("no parameter count"))
        .stderr(predicate::str::contains("loaded task"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(only_file_with_extension(&out, "json")).unwrap())
            .unwrap();
    assert_eq!(report["task"], "dyck");
    assert_eq!(report["instance_count"], 40);
    assert_eq!(report["settings"]["seed"], 11);
    assert_eq!(report["logistic"].as_array().unwrap().len(), 2);
    assert_eq!(report["auc"][0]["log_params"], 9.0);

    let html = std::fs::read_to_string(only_file_with_extension(&out, "html")).unwrap();
    assert!(html.contains("Agent characteristic curves"));
}

#[test]
fn analyze_binned() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());
    let out = dir.path().join("out");

    helmcurve()
        .current_dir(dir.path())
        .args([
            "analyze", "--task", "dyck", "--models", "m4", "--plot", "binned", "--x-axis", "raw",
            "--num-bins", "5", "--seed", "11", "--data-dir",
        ])
        .arg(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(only_file_with_extension(&out, "json")).unwrap())
            .unwrap();
    let points = report["binned"][0]["points"].as_array().unwrap();
    let total: u64 = points.iter().map(|p| p["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 40);
}

#[test]
fn analyze_rejects_unknown_model() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());

    helmcurve()
        .current_dir(dir.path())
        .args(["analyze", "--task", "dyck", "--models", "ghost", "--data-dir"])
        .arg(dir.path())
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn analyze_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    write_data_dir(dir.path());

    helmcurve()
        .current_dir(dir.path())
        .args(["analyze", "--task", "dyck", "--models", "m4", "--format", "sarif", "--data-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}

#[test]
fn analyze_rejects_bad_plot_kind() {
    helmcurve()
        .args(["analyze", "--task", "dyck", "--models", "m4", "--plot", "scatter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown plot type"));
}
