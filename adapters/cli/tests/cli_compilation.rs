use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "twenty48"])
        .status()
        .expect("failed to invoke cargo check for twenty48 CLI binary");

    assert!(status.success(), "cargo check --bin twenty48 should succeed");
}

#[test]
fn scripted_game_verifies_its_replay() {
    let output = Command::new(env!("CARGO_BIN_EXE_twenty48"))
        .args([
            "--seed",
            "2048",
            "--order",
            "lifo",
            "--moves",
            "LURDLURDLLRRUUDD",
            "--verify-replay",
            "--log",
            "warn",
        ])
        .output()
        .expect("failed to run twenty48");

    assert!(output.status.success(), "scripted run should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("score:"), "summary missing from {stdout}");
    assert!(stdout.contains("replay verified"), "verification missing from {stdout}");
}

#[test]
fn unknown_move_is_rejected() {
    let status = Command::new(env!("CARGO_BIN_EXE_twenty48"))
        .args(["--moves", "LX", "--log", "off"])
        .status()
        .expect("failed to run twenty48");

    assert!(!status.success(), "invalid move list must fail");
}
