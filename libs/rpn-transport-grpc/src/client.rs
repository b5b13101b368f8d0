//! gRPC client transport configuration and connection utilities.
//!
//! This module provides the client-side transport stack with:
//! - Configurable connect timeout and optional per-RPC timeout
//! - HTTP/2 keepalive settings for long-lived streaming calls
//! - Optional TLS with native roots and an extra CA certificate
//! - Tracing spans around connection establishment
//!
//! Connections are attempted exactly once. Callers decide whether a failed
//! connection is worth another attempt.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::Instrument;

fn duration_to_i64_ms(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// TLS settings for outgoing connections.
#[derive(Debug, Clone, Default)]
pub struct ClientTlsSettings {
    /// Additional PEM-encoded CA certificate trusted on top of the native roots.
    pub ca_path: Option<PathBuf>,

    /// Override for the server name checked against the certificate.
    pub domain: Option<String>,
}

/// Configuration for gRPC client transport stack.
#[derive(Debug, Clone)]
pub struct GrpcClientConfig {
    /// Timeout for establishing the initial connection.
    pub connect_timeout: Duration,

    /// Timeout applied to every RPC on the channel.
    ///
    /// Left unset by default: a streaming call lives as long as its producer.
    pub rpc_timeout: Option<Duration>,

    /// TLS settings; `None` means plaintext HTTP/2.
    pub tls: Option<ClientTlsSettings>,

    /// Service name for tracing.
    pub service_name: &'static str,

    /// Emit a log line once connected.
    pub enable_tracing: bool,
}

impl Default for GrpcClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            rpc_timeout: None,
            tls: None,
            service_name: "grpc_client",
            enable_tracing: true,
        }
    }
}

impl GrpcClientConfig {
    /// Create a new configuration with the given service name.
    #[must_use]
    pub fn new(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Default::default()
        }
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the RPC timeout.
    #[must_use]
    pub fn with_rpc_timeout(mut self, timeout: Duration) -> Self {
        self.rpc_timeout = Some(timeout);
        self
    }

    /// Connect over TLS.
    #[must_use]
    pub fn with_tls(mut self, tls: ClientTlsSettings) -> Self {
        self.tls = Some(tls);
        self
    }

    /// Disable tracing.
    #[must_use]
    pub fn without_tracing(mut self) -> Self {
        self.enable_tracing = false;
        self
    }
}

/// Turn a bare `host:port` into a URI with the scheme implied by the TLS setting.
///
/// Addresses that already carry a scheme are returned untouched.
#[must_use]
pub fn endpoint_uri(addr: &str, tls: bool) -> String {
    if addr.contains("://") {
        addr.to_owned()
    } else if tls {
        format!("https://{addr}")
    } else {
        format!("http://{addr}")
    }
}

fn build_tls_config(settings: &ClientTlsSettings) -> anyhow::Result<ClientTlsConfig> {
    let mut tls = ClientTlsConfig::new().with_native_roots();

    if let Some(ca_path) = &settings.ca_path {
        let pem = std::fs::read(ca_path)
            .with_context(|| format!("failed to read CA certificate '{}'", ca_path.display()))?;
        tls = tls.ca_certificate(Certificate::from_pem(pem));
    }

    if let Some(domain) = &settings.domain {
        tls = tls.domain_name(domain.clone());
    }

    Ok(tls)
}

/// Build a tonic `Endpoint` with timeouts, keepalive settings and optional TLS.
///
/// Configures:
/// - Connect timeout
/// - Per-RPC timeout (when set)
/// - TCP keepalive (30 seconds)
/// - HTTP/2 keepalive interval (30 seconds)
/// - Keepalive timeout (10 seconds)
/// - Keep alive while idle
fn build_endpoint(uri: String, cfg: &GrpcClientConfig) -> anyhow::Result<Endpoint> {
    let mut endpoint = Endpoint::from_shared(uri)?
        .connect_timeout(cfg.connect_timeout)
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    if let Some(timeout) = cfg.rpc_timeout {
        endpoint = endpoint.timeout(timeout);
    }

    if let Some(tls) = &cfg.tls {
        endpoint = endpoint.tls_config(build_tls_config(tls)?)?;
    }

    Ok(endpoint)
}

/// Connect to a gRPC service with the configured transport stack.
///
/// # Example
///
/// ```ignore
/// use rpn_transport_grpc::client::{connect_with_stack, GrpcClientConfig};
///
/// let config = GrpcClientConfig::new("calculator");
/// let client: CalculatorClient<Channel> =
///     connect_with_stack("http://localhost:8080", &config).await?;
/// ```
///
/// # Errors
/// Returns an error if the URI is invalid, the TLS material cannot be loaded
/// or the connection cannot be established.
pub async fn connect_with_stack<TClient>(
    uri: impl Into<String>,
    cfg: &GrpcClientConfig,
) -> anyhow::Result<TClient>
where
    TClient: From<Channel>,
{
    let uri_string = uri.into();
    let span = tracing::debug_span!(
        "grpc_connect",
        service = cfg.service_name,
        uri = %uri_string,
        tls = cfg.tls.is_some()
    );

    async move {
        let endpoint = build_endpoint(uri_string.clone(), cfg)?;
        let channel = endpoint
            .connect()
            .await
            .with_context(|| format!("failed to connect to {uri_string}"))?;

        if cfg.enable_tracing {
            let connect_timeout_ms = duration_to_i64_ms(cfg.connect_timeout);
            tracing::info!(
                service_name = cfg.service_name,
                connect_timeout_ms,
                "gRPC client connected"
            );
        }

        Ok(TClient::from(channel))
    }
    .instrument(span)
    .await
}
