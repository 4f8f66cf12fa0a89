use std::process::Command;

fn critter_defence(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_critter-defence"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run critter-defence")
}

#[test]
fn plays_requested_waves() {
    let output = critter_defence(&["--waves", "2", "--seed", "7"]);
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("map `straight`: 10 cells"));
    assert!(stdout.contains("wave 0:"));
}

#[test]
fn same_seed_prints_same_summary() {
    let first = critter_defence(&["--preset", "serpentine", "--seed", "3"]);
    let second = critter_defence(&["--preset", "serpentine", "--seed", "3"]);
    assert!(first.status.success(), "{first:?}");
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn unknown_preset_is_an_error() {
    let output = critter_defence(&["--preset", "labyrinth"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset map `labyrinth`"));
}

#[test]
fn missing_config_file_is_an_error() {
    let output = critter_defence(&["--config", "/nonexistent/critter-defence.toml"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read configuration"));
}
