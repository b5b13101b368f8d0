//! Layered server configuration.
//!
//! Precedence, lowest first: built-in defaults, YAML file, `CALC__*`
//! environment variables (`__` separates nesting levels), CLI flags.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use rpn_transport_grpc::server::ServerTlsSettings;
use serde::{Deserialize, Serialize};

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "CALC__";

const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));
const DEFAULT_STATUS_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 5000));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<ServerTlsSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// gRPC listener.
    pub listen_addr: SocketAddr,
    /// HTTP listener for `/status` and `/metrics`.
    pub status_addr: SocketAddr,
    /// How long in-flight work may take to drain after a shutdown signal.
    #[serde(with = "crate::humantime_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR,
            status_addr: DEFAULT_STATUS_ADDR,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Level requested by `-v` repetitions; `None` when the flag is absent.
    #[must_use]
    pub fn from_verbosity(count: u8) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Info),
            2 => Some(Self::Debug),
            _ => Some(Self::Trace),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON when stderr, where logs go, is not a terminal; text otherwise.
    #[default]
    Auto,
    Json,
    Text,
}

/// Values given on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub listen_addr: Option<SocketAddr>,
    pub status_addr: Option<SocketAddr>,
    pub verbose: u8,
}

impl AppConfig {
    /// Load defaults, then the YAML file if given, then the environment.
    ///
    /// # Errors
    /// Fails when an explicit file is missing or any layer holds an invalid value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    /// Apply CLI flags on top of the loaded configuration.
    ///
    /// `-v` only ever raises the log level.
    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(addr) = cli.listen_addr {
            self.server.listen_addr = addr;
        }
        if let Some(addr) = cli.status_addr {
            self.server.status_addr = addr;
        }
        if let Some(level) = LogLevel::from_verbosity(cli.verbose) {
            self.logging.level = self.logging.level.max(level);
        }
    }

    /// Render the effective configuration as YAML.
    ///
    /// # Errors
    /// Fails if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).context("failed to render configuration as YAML")
    }
}
