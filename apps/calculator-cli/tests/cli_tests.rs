#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Black-box tests for the calculator-cli binary against an in-process server.

use std::net::SocketAddr;
use std::process::{Output, Stdio};

use calculator::CalculatorModule;
use rpn_transport_grpc::server::serve_tcp;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

async fn start_server() -> (SocketAddr, CancellationToken) {
    let module = CalculatorModule::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    tokio::spawn(serve_tcp(listener, module.grpc_routes().unwrap(), None, cancel.clone()));
    module.mark_serving();
    (addr, cancel)
}

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_calculator-cli"));
    cmd.env_remove("RUST_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    cmd
}

async fn run_batch(addr: SocketAddr, expression: &[&str]) -> Output {
    cli()
        .args(["--plaintext", "--addr", &addr.to_string(), "batch"])
        .args(expression)
        .stdin(Stdio::null())
        .output()
        .await
        .expect("failed to run calculator-cli")
}

async fn run_stream(addr: SocketAddr, input: &str) -> Output {
    let mut child = cli()
        .args(["--plaintext", "--addr", &addr.to_string(), "stream"])
        .stdin(Stdio::piped())
        .spawn()
        .expect("failed to spawn calculator-cli");

    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(input.as_bytes()).await.unwrap();
    drop(stdin);

    child.wait_with_output().await.unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[tokio::test]
async fn help_lists_both_modes() {
    let output = cli().arg("--help").output().await.unwrap();
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("stream"), "{text}");
    assert!(text.contains("batch"), "{text}");
    assert!(text.contains("--addr"), "{text}");
    assert!(text.contains("--plaintext"), "{text}");
}

#[tokio::test]
async fn batch_prints_result() {
    let (addr, cancel) = start_server().await;

    let output = run_batch(addr, &["5", "8", "+", "3", "-", "2", "/", "5", "*"]).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Result: 25");

    cancel.cancel();
}

#[tokio::test]
async fn batch_accepts_a_quoted_expression() {
    let (addr, cancel) = start_server().await;

    let output = run_batch(addr, &["5 8 +"]).await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Result: 13");

    cancel.cancel();
}

#[tokio::test]
async fn stream_reads_tokens_from_stdin() {
    let (addr, cancel) = start_server().await;

    let output = run_stream(addr, "5\n8\n\n+\n").await;
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "Result: 13");

    cancel.cancel();
}

#[tokio::test]
async fn invalid_expression_exits_with_failure() {
    let (addr, cancel) = start_server().await;

    let output = run_batch(addr, &["5", "5", "5", "+"]).await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("invalid expression"), "{}", stderr(&output));

    let output = run_stream(addr, "+\n").await;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("invalid expression"), "{}", stderr(&output));

    cancel.cancel();
}

#[tokio::test]
async fn malformed_token_fails_before_connecting() {
    // Nothing listens on port 1; the codec error must come first.
    let output = cli()
        .args(["--plaintext", "--addr", "127.0.0.1:1", "batch", "5", "a", "+"])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("invalid token 'a'"), "{text}");
    assert!(!text.contains("cannot reach"), "{text}");
}

#[tokio::test]
async fn unreachable_server_is_reported() {
    let output = cli()
        .args([
            "--plaintext",
            "--addr",
            "127.0.0.1:1",
            "--connect-timeout",
            "2",
            "batch",
            "1",
        ])
        .output()
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("cannot reach calculator at 127.0.0.1:1"), "{text}");
}
