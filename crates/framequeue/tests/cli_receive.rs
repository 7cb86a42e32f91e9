#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn framequeue() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_framequeue"));
    cmd.arg("--log-level").arg("error").arg("--format").arg("json");
    cmd
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be json"))
        .collect()
}

#[test]
fn lines_from_stdin_until_close() {
    let mut child = framequeue()
        .arg("lines")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("lines command should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"hello\nworld\n")
        .expect("stdin should accept data");

    let output = child.wait_with_output().expect("command should finish");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let frames = json_lines(&output.stdout);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["payload"], "hello");
    assert_eq!(frames[0]["index"], 0);
    assert_eq!(frames[1]["payload"], "world");
    assert_eq!(frames[1]["kind"], "line");
}

#[test]
fn lines_with_custom_separator_and_count() {
    let mut child = framequeue()
        .args(["lines", "--separator", "\\r\\n", "--count", "1"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("lines command should start");

    let mut stdin = child.stdin.take().expect("stdin should be piped");
    stdin.write_all(b"OK\r\nignored\r\n").expect("stdin should accept data");

    let output = child.wait_with_output().expect("command should finish");
    drop(stdin);
    assert!(output.status.success());

    let frames = json_lines(&output.stdout);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["payload"], "OK");
}

#[test]
fn packets_from_stdin() {
    let mut child = framequeue()
        .args(["packets", "--header-length", "4"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("packets command should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"\x00\x00\x00\x03abc")
        .expect("stdin should accept data");

    let output = child.wait_with_output().expect("command should finish");
    assert!(output.status.success());

    let frames = json_lines(&output.stdout);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["size"], 7);
    assert_eq!(frames[0]["payload"], "00000003616263");
}

#[test]
fn idle_exit_reports_timeout() {
    let mut child = framequeue()
        .args(["lines", "--timeout", "200ms", "--idle-exit"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("lines command should start");

    // Keep stdin open so the reader stays blocked.
    let stdin = child.stdin.take().expect("stdin should be piped");
    let start = Instant::now();
    let status = child.wait().expect("command should finish");
    drop(stdin);

    assert_eq!(status.code(), Some(124));
    assert!(start.elapsed() >= Duration::from_millis(200));
}

#[test]
fn oversized_line_is_a_data_error() {
    let mut child = framequeue()
        .args(["lines", "--max-frame-size", "4"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("lines command should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"ok\ntoo long for the limit\n")
        .expect("stdin should accept data");

    let output = child.wait_with_output().expect("command should finish");
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("frame too large"));

    let frames = json_lines(&output.stdout);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["payload"], "ok");
}

#[test]
fn bad_packet_length_is_a_data_error() {
    let mut child = framequeue()
        .args(["packets", "--header-length", "1", "--length-width", "1"])
        .args(["--length-adjust", "-2"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .expect("packets command should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"\x01")
        .expect("stdin should accept data");

    let output = child.wait_with_output().expect("command should finish");
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid frame length"));
}

#[test]
fn retry_on_eof_outlives_closed_stdin() {
    let mut child = framequeue()
        .args(["lines", "--retry-on-eof", "--poll-interval", "5ms"])
        .args(["--timeout", "300ms", "--idle-exit"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("lines command should start");

    // Closing stdin would end a default run with status 0.
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"one\ntwo\n")
        .expect("stdin should accept data");

    let output = child.wait_with_output().expect("command should finish");
    assert_eq!(output.status.code(), Some(124));

    let frames = json_lines(&output.stdout);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1]["payload"], "two");
}

#[test]
fn invalid_packet_layout_is_usage_error() {
    let output = framequeue()
        .args(["packets", "--header-length", "2", "--length-width", "4"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .expect("packets command should run");

    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid packet layout"));
}
