use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "signal-slayer-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_lines_writes_output() {
    let exe = env!("CARGO_BIN_EXE_signal-slayer-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-lines", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available lines"));
    assert!(content.contains("Central"));
}

#[test]
fn cli_runs_perfect_and_blunder_pilots_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_signal-slayer-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--lines",
            "Central",
            "--pilots",
            "perfect,blunder@1",
            "--seeds",
            "1,0x2a",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Signal Slayer Autopilot Tester"));

    let content = std::fs::read_to_string(output_path).expect("read output");
    let runs: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let runs = runs.as_array().expect("array of runs");
    assert_eq!(runs.len(), 4);
    for run in runs {
        assert_eq!(run["passed"], true);
        assert_eq!(run["line"], "Central");
    }
}

#[test]
fn cli_rejects_unknown_line() {
    let exe = env!("CARGO_BIN_EXE_signal-slayer-tester");
    let output = Command::new(exe)
        .args(["--lines", "Atlantis", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown line"));
}

#[test]
fn cli_exits_non_zero_when_runs_time_out() {
    let exe = env!("CARGO_BIN_EXE_signal-slayer-tester");
    let output_path = temp_path("timeout");
    let status = Command::new(exe)
        .args([
            "--lines",
            "Central",
            "--pilots",
            "perfect",
            "--max-ticks",
            "5",
            "--report",
            "markdown",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(!status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("did not finish within 5 ticks"));
}
