use anyhow::Context;
use calculator_sdk::{CalculatorClientV1, parse_token};
use clap::Args;

use crate::common::ConnectionArgs;

#[derive(Args)]
pub struct BatchArgs {
    /// Expression tokens, e.g. `5 8 + 3 -` (a single quoted argument works too)
    #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
    expression: Vec<String>,
}

impl BatchArgs {
    fn tokens(&self) -> Vec<String> {
        self.expression
            .iter()
            .flat_map(|arg| arg.split_whitespace())
            .map(str::to_owned)
            .collect()
    }

    pub async fn run(&self, connection: &ConnectionArgs) -> anyhow::Result<f64> {
        let tokens = self.tokens();
        // Reject malformed input before opening a connection.
        for token in &tokens {
            parse_token(token)?;
        }

        let client = connection.connect().await?;
        tracing::debug!(tokens = tokens.len(), "sending batch");
        client
            .evaluate_batch(&tokens)
            .await
            .context("batch evaluation failed")
    }
}
