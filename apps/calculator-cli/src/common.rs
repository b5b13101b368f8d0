use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use calculator_sdk::CalculatorGrpcClient;
use clap::Args;
use rpn_transport_grpc::client::{ClientTlsSettings, GrpcClientConfig, endpoint_uri};
use tracing_subscriber::EnvFilter;

#[derive(Args)]
pub struct ConnectionArgs {
    /// Server address, `host:port` or a full URI
    #[arg(short = 'a', long, global = true, default_value = "localhost:8080")]
    addr: String,

    /// Connect without TLS
    #[arg(long, global = true)]
    plaintext: bool,

    /// Extra PEM CA certificate trusted for the server certificate
    #[arg(long, global = true, conflicts_with = "plaintext")]
    ca_cert: Option<PathBuf>,

    /// Server name expected in the certificate
    #[arg(long, global = true, conflicts_with = "plaintext")]
    domain: Option<String>,

    /// Connect timeout
    #[arg(long, global = true, default_value = "10", value_name = "SECONDS")]
    connect_timeout: u64,
}

impl ConnectionArgs {
    fn client_config(&self) -> GrpcClientConfig {
        let cfg = GrpcClientConfig::new("calculator")
            .with_connect_timeout(Duration::from_secs(self.connect_timeout));
        if self.plaintext {
            cfg
        } else {
            cfg.with_tls(ClientTlsSettings {
                ca_path: self.ca_cert.clone(),
                domain: self.domain.clone(),
            })
        }
    }

    pub async fn connect(&self) -> anyhow::Result<CalculatorGrpcClient> {
        let uri = endpoint_uri(&self.addr, !self.plaintext);
        CalculatorGrpcClient::connect_with_config(uri, &self.client_config())
            .await
            .with_context(|| format!("cannot reach calculator at {}", self.addr))
    }
}

/// Diagnostics go to stderr so stdout only ever carries the result.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
