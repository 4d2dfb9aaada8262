use std::process::Command;

fn bastion() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bastion"))
}

#[test]
fn short_run_prints_a_summary() {
    let output = bastion()
        .args(["--seconds", "3", "--seed", "7", "--place", "wall@0,0"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run bastion");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Welcome to Bastion."));
    assert!(stdout.contains("main tower standing"));
    assert!(stdout.contains("wave 1"));
    assert!(stdout.contains("wall #"));
    assert!(stdout.contains("main tower #"));
}

#[test]
fn malformed_placements_are_refused_by_the_parser() {
    let output = bastion()
        .args(["--seconds", "1", "--place", "moat@1,1"])
        .output()
        .expect("failed to run bastion");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("moat"));
}

#[test]
fn zero_length_frames_are_rejected() {
    let output = bastion()
        .args(["--seconds", "1", "--frame-ms", "0"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run bastion");

    assert!(!output.status.success());
}
