//! Server side of the transport: TLS configuration and the TCP serve loop.
//!
//! A certificate and key enable TLS. Adding a CA bundle turns on client
//! certificate verification for clients that present one; clients without a
//! certificate are still accepted.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};

/// TLS material for the gRPC listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerTlsSettings {
    /// PEM-encoded server certificate chain.
    pub cert_path: PathBuf,
    /// PEM-encoded private key matching `cert_path`.
    pub key_path: PathBuf,
    /// PEM-encoded CA used to verify client certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_path: Option<PathBuf>,
}

fn read_pem(path: &Path, what: &str) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read {what} '{}'", path.display()))
}

/// Load the TLS material from disk and build a tonic `ServerTlsConfig`.
///
/// # Errors
/// Returns an error if any of the configured files cannot be read.
pub fn load_server_tls(settings: &ServerTlsSettings) -> anyhow::Result<ServerTlsConfig> {
    let cert = read_pem(&settings.cert_path, "TLS certificate")?;
    let key = read_pem(&settings.key_path, "TLS key")?;

    let mut tls = ServerTlsConfig::new().identity(Identity::from_pem(cert, key));

    if let Some(ca_path) = &settings.ca_path {
        let ca = read_pem(ca_path, "CA certificate")?;
        tls = tls
            .client_ca_root(Certificate::from_pem(ca))
            .client_auth_optional(true);
        tracing::info!(ca = %ca_path.display(), "client certificate verification enabled");
    }

    Ok(tls)
}

/// Serve `routes` on an already bound listener until `cancel` fires.
///
/// In-flight calls are allowed to finish after cancellation; the caller
/// decides how long to wait for that.
///
/// # Errors
/// Returns an error if TLS cannot be applied or the server fails while running.
pub async fn serve_tcp(
    listener: TcpListener,
    routes: Routes,
    tls: Option<ServerTlsConfig>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let bound_addr = listener.local_addr()?;
    let mut builder = Server::builder();
    if let Some(tls) = tls {
        builder = builder
            .tls_config(tls)
            .context("failed to apply server TLS configuration")?;
        tracing::info!(%bound_addr, transport = "tcp+tls", "gRPC server listening");
    } else {
        tracing::info!(%bound_addr, transport = "tcp", "gRPC server listening");
    }

    let incoming = TcpListenerStream::new(listener);
    builder
        .add_routes(routes)
        .serve_with_incoming_shutdown(incoming, async move {
            cancel.cancelled().await;
        })
        .await?;

    tracing::info!(%bound_addr, "gRPC server stopped");
    Ok(())
}
