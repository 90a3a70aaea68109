use anyhow::{Context, Result, bail};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use floodroute::api::OrsClient;
use floodroute::config::{DEFAULT_BIND, DEFAULT_ZONES, Discovered, FileConfig};
use floodroute::server::{AppState, app};
use floodroute::zones::FloodZones;

/// Flood-aware route service
///
/// Fetches driving routes from OpenRouteService and scores how much of each
/// route runs through flood-prone zones.
///
/// Examples:
///   # Serve with zones from ./flood_prone.geojson
///   ORS_API_KEY=... floodroute
///
///   # Custom zones and address, up to 4 concurrent provider calls
///   floodroute --zones data/bataan.geojson --bind 0.0.0.0:8080 --max-concurrency 4
#[derive(Parser, Debug)]
#[command(name = "floodroute")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches floodroute.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// OpenRouteService API key
    #[arg(long, env = "ORS_API_KEY", hide_env_values = true)]
    ors_api_key: Option<String>,

    /// Maximum concurrent requests to the routing provider
    #[arg(long, env = "ORS_MAX_CONCURRENCY")]
    max_concurrency: Option<usize>,

    /// Address to listen on [default: 127.0.0.1:8000]
    #[arg(short = 'b', long, env = "FLOODROUTE_BIND")]
    bind: Option<SocketAddr>,

    /// Flood zone GeoJSON file [default: flood_prone.geojson]
    #[arg(short = 'z', long, env = "FLOODROUTE_ZONES")]
    zones: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let discovered = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            Discovered {
                config: Some(toml::from_str(&contents).context("Failed to parse config file")?),
                rejected: Vec::new(),
            }
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load()
    };
    let file_config: FileConfig = discovered.config.unwrap_or_default();

    let verbose = args.verbose || file_config.verbose;
    init_logging(verbose);

    for (path, reason) in &discovered.rejected {
        warn!(path = %path.display(), error = %reason, "Ignoring unreadable config file");
    }

    let bind: SocketAddr = match args.bind.or(file_config.bind) {
        Some(addr) => addr,
        None => DEFAULT_BIND.parse().context("Invalid bind address")?,
    };
    let zones_path = args
        .zones
        .clone()
        .or(file_config.zones.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ZONES));

    let mut routing = file_config.routing.clone().unwrap_or_default();
    if let Some(n) = args.max_concurrency {
        routing.max_concurrency = n;
    }
    routing.max_concurrency = routing.max_concurrency.max(1);

    let api_key = args.ors_api_key.filter(|k| !k.trim().is_empty());

    let zones = Arc::new(
        FloodZones::load(&zones_path).context("Failed to load flood zones")?,
    );

    let client = match api_key {
        Some(key) => Some(OrsClient::new(key, &routing).context("Failed to create routing client")?),
        None => {
            warn!("ORS_API_KEY is not set; /optimize-route will fail until it is");
            None
        }
    };

    info!(
        %bind,
        zones = zones.len(),
        ors_key_present = client.is_some(),
        max_concurrency = routing.max_concurrency,
        "Starting floodroute"
    );

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .context(format!("Failed to bind {}", bind))?;

    axum::serve(listener, app(AppState::new(zones, client)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
