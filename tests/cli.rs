use std::{
    env,
    path::PathBuf,
    process::{Command, Output, Stdio},
};

fn bin_path() -> &'static str {
    env!("CARGO_BIN_EXE_blockscript")
}

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("manifest dir not set by cargo"));
    path.push("tests");
    path.push("scripts");
    path.push(name);
    path
}

fn blockscript(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env("BLOCKSCRIPT_NO_WAIT", "1")
        .env_remove("BLOCKSCRIPT_ECHO")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run blockscript")
}

#[test]
fn runs_a_script_and_prints_its_output() {
    let path = fixture("control_flow.bks");
    let output = blockscript(&["run", path.to_str().expect("utf-8 path")]);
    assert!(
        output.status.success(),
        "run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "small 4.0",
            "hello, world",
            "string 84.0",
            "true true",
        ]
    );
}

#[test]
fn check_reports_unclosed_block() {
    let path = fixture("unclosed_block.bks");
    let output = blockscript(&["check", path.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unmatched opening brace"), "stderr: {stderr}");
}

#[test]
fn runtime_errors_name_the_line() {
    let path = fixture("division.bks");
    let output = blockscript(&["run", path.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Division by zero (line 2)"), "stderr: {stderr}");
}

#[test]
fn rejects_unknown_extension() {
    let output = blockscript(&["run", "script.txt"]);
    assert!(!output.status.success());
}
