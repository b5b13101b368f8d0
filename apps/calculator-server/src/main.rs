#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod config;
mod humantime_serde;
mod logging;
mod signals;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use calculator::CalculatorModule;
use clap::{Parser, Subcommand};
use rpn_transport_grpc::server::{load_server_tls, serve_tcp};
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::{AppConfig, CliOverrides};

/// Calculator Server - evaluates RPN expressions over gRPC
#[derive(Parser)]
#[command(name = "calculator-server")]
#[command(about = "Calculator Server - evaluates RPN expressions over gRPC")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// gRPC listen address override (e.g. 127.0.0.1:8080)
    #[arg(long)]
    listen_addr: Option<SocketAddr>,

    /// Status/metrics HTTP listen address override
    #[arg(long)]
    status_addr: Option<SocketAddr>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Layered config:
    // 1) defaults -> 2) YAML (if provided) -> 3) env (CALC__*) -> 4) CLI overrides
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(&CliOverrides {
        listen_addr: cli.listen_addr,
        status_addr: cli.status_addr,
        verbose: cli.verbose,
    });

    logging::init(&config.logging)?;

    if cli.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Dispatch subcommands (default: run)
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let host = hostname::get()
                .map(|h| h.to_string_lossy().into_owned())
                .unwrap_or_else(|_| "unknown".to_owned());
            run_server(config)
                .instrument(tracing::info_span!("calculator-server", host = %host))
                .await
        }
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    if let Some(tls) = &config.tls {
        load_server_tls(tls)?;
    }
    println!("Configuration is valid");
    print!("{}", config.to_yaml()?);
    Ok(())
}

async fn serve_status(
    listener: TcpListener,
    router: axum::Router,
    cancel: CancellationToken,
) -> Result<()> {
    let bound_addr = listener.local_addr()?;
    tracing::info!(%bound_addr, "status server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .context("status server failed")
}

/// A listener task that ends before shutdown was requested is always an error.
fn unexpected_exit(name: &str, exited: Result<Result<()>, JoinError>) -> Result<()> {
    match exited {
        Ok(Ok(())) => Err(anyhow!("{name} stopped unexpectedly")),
        Ok(Err(e)) => Err(e),
        Err(e) => Err(anyhow::Error::new(e).context(format!("{name} task failed"))),
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let module = CalculatorModule::new()?;
    let tls = config.tls.as_ref().map(load_server_tls).transpose()?;

    let grpc_listener = TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("failed to bind gRPC listener on {}", config.server.listen_addr))?;
    let status_listener = TcpListener::bind(config.server.status_addr)
        .await
        .with_context(|| format!("failed to bind status listener on {}", config.server.status_addr))?;

    let routes = module.grpc_routes()?;
    let cancel = CancellationToken::new();
    let mut grpc = tokio::spawn(
        serve_tcp(grpc_listener, routes, tls, cancel.child_token())
            .in_current_span(),
    );
    let mut status = tokio::spawn(
        serve_status(status_listener, module.status_router(), cancel.child_token())
            .in_current_span(),
    );

    module.mark_serving();
    tracing::info!("calculator server started");

    tokio::select! {
        received = signals::wait_for_shutdown() => {
            received?;
        }
        exited = &mut grpc => {
            module.mark_not_serving();
            cancel.cancel();
            return unexpected_exit("gRPC server", exited);
        }
        exited = &mut status => {
            module.mark_not_serving();
            cancel.cancel();
            return unexpected_exit("status server", exited);
        }
    }

    module.mark_not_serving();
    cancel.cancel();

    let timeout = config.server.shutdown_timeout;
    match tokio::time::timeout(timeout, async { (grpc.await, status.await) }).await {
        Ok((grpc_result, status_result)) => {
            grpc_result??;
            status_result??;
            tracing::info!("calculator server stopped");
        }
        Err(_) => {
            tracing::warn!(
                timeout = %humantime::format_duration(timeout),
                "shutdown timeout elapsed, abandoning in-flight calls"
            );
        }
    }
    Ok(())
}
