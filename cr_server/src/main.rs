//! Single-table No-Limit Hold'em card-room server.
//!
//! Spawns one table hub actor and bridges WebSocket sessions to it.

use std::net::SocketAddr;

use anyhow::Error;
use card_room::TableHub;
use cr_server::{api, config::ServerConfig, logging};
use ctrlc::set_handler;
use pico_args::Arguments;

const HELP: &str = "\
Run a single-table No-Limit Hold'em card-room server

USAGE:
  cr_server [OPTIONS]

OPTIONS:
  --bind         IP:PORT   Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:7777]
  --small-blind  N         Small blind in chips         [default: env TABLE_SMALL_BLIND or 10]
  --big-blind    N         Big blind in chips           [default: env TABLE_BIG_BLIND or 20]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                 Bind address (e.g. 0.0.0.0:7777)
  TABLE_NAME                  Table display name
  TABLE_MIN_PLAYERS           Players needed to auto-start      [default: 2]
  TABLE_MAX_PLAYERS           Seat count, clamped to [2,9]      [default: 9]
  TABLE_ANTE                  Ante per hand, 0 disables         [default: 0]
  TABLE_STARTING_CHIPS        Stack handed to each joiner       [default: 1000]
  TABLE_ACTION_TIMEOUT_SECS   Turn clock, 0 disables folding    [default: 30]
";

struct Args {
    bind: Option<SocketAddr>,
    small_blind: Option<u32>,
    big_blind: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env if present; never overrides real environment variables.
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }
    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        small_blind: pargs.opt_value_from_str("--small-blind")?,
        big_blind: pargs.opt_value_from_str("--big-blind")?,
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.small_blind, args.big_blind)
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("configuration validation failed: {e}"))?;

    tracing::info!(
        "table '{}': blinds {}/{}, ante {}, {} starting chips, {}-{} players",
        config.table.name,
        config.table.small_blind,
        config.table.big_blind,
        config.table.ante,
        config.table.starting_chips,
        config.table.min_players,
        config.table.max_players,
    );

    let hub = TableHub::spawn(config.table.clone());
    let app = api::create_router(api::AppState { hub });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {}: {e}", config.bind))?;
    tracing::info!(
        "server running at http://{} (WebSocket endpoint: /ws). Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))?;

    tracing::info!("shutting down");
    Ok(())
}

/// Graceful shutdown signal.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
