use anyhow::Context;
use calculator_sdk::CalculatorClientV1;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::common::ConnectionArgs;

/// Stream stdin line by line; the call completes when stdin reaches EOF.
pub async fn run(connection: &ConnectionArgs) -> anyhow::Result<f64> {
    let client = connection.connect().await?;

    let (tx, rx) = mpsc::channel(1);
    let reader = tokio::spawn(forward_lines(BufReader::new(tokio::io::stdin()), tx));

    let result = client
        .evaluate_stream(rx)
        .await
        .context("streaming evaluation failed");
    // A failed read looks like EOF to the call, so it overrides the result.
    if reader.is_finished()
        && let Ok(Err(e)) = reader.await
    {
        return Err(e).context("failed to read tokens from stdin");
    }
    result
}

/// Forward non-blank lines to `tx` until EOF or until the receiver goes away.
async fn forward_lines<R>(input: R, tx: mpsc::Sender<String>) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        if tx.send(line).await.is_err() {
            break;
        }
    }
    Ok(())
}
