//! Arc API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!   auth   permissions   users   es          (plugins, built independently)
//!     │         │          │      │
//!     └─────────┴────┬─────┴──────┘
//!                    ▼
//!           ┌─────────────────┐
//!           │    Registry     │  unique by name
//!           └────────┬────────┘
//!                    ▼ snapshot
//!           ┌─────────────────┐
//!           │  OrderPolicy    │  catch-all last, others by name
//!           └────────┬────────┘
//!                    ▼
//!           ┌─────────────────┐
//!           │ Mount pipeline  │  initialize + add routes, stop on failure
//!           └────────┬────────┘
//!                    ▼ freeze
//!           ┌─────────────────┐      ┌──────────────┐
//!   Client ─▶  HTTP server    │─────▶│ first match  │─▶ plugin handler
//!           └─────────────────┘      └──────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;

use arc_gateway::config::env_file::load_env_file;
use arc_gateway::config::loader::load_config;
use arc_gateway::config::GatewayConfig;
use arc_gateway::lifecycle::{bootstrap, Shutdown, StartupError};
use arc_gateway::observability::logging::{init_logging, LogTarget};
use arc_gateway::observability::metrics;
use arc_gateway::plugin::{OrderPolicy, Registry};
use arc_gateway::{plugins, HttpServer};

#[derive(Parser)]
#[command(name = "arc-gateway")]
#[command(about = "Plugin-based API gateway in front of a search cluster", long_about = None)]
struct Cli {
    /// Path to file with environment variables to load in KEY=VALUE format
    #[arg(long, default_value = ".env")]
    env: PathBuf,

    /// Process log target: stdout, stderr or a rotated file path (empty discards logs)
    #[arg(long, default_value = "")]
    log: String,

    /// List currently registered plugins
    #[arg(long)]
    plugins: bool,

    /// Address to serve on
    #[arg(long)]
    addr: Option<String>,

    /// Port number
    #[arg(long)]
    port: Option<u16>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // The environment must be populated before any runtime thread starts.
    if let Err(e) = load_env_file(&cli.env) {
        eprintln!("[ERROR]: reading env file {:?}: {}", cli.env, e);
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("[ERROR]: starting runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("[ERROR]: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StartupError> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(addr) = cli.addr {
        config.listener.address = addr;
    }
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    init_logging(&LogTarget::parse(&cli.log), &config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "arc-gateway starting");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let mut registry = Registry::new();
    plugins::register_builtin(&mut registry, &config)?;
    let listing = registry.describe();

    let policy = OrderPolicy::catch_all_last(config.plugins.catch_all.as_str());
    let gateway = bootstrap(registry, &policy).await?;

    if cli.plugins {
        println!("{}", listing);
    }

    serve(config, gateway.router()).await
}

async fn serve(
    config: GatewayConfig,
    router: std::sync::Arc<arc_gateway::routing::Router>,
) -> Result<(), StartupError> {
    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signals = shutdown.trigger_on_os_signal();
    let server = HttpServer::new(config, router);
    server.run(listener, shutdown.subscribe()).await?;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
