use clap::Parser;
use log::{error, info};
use server::{http, GameConfig, GameServer, ServerConfig};
use std::time::Duration;

/// Main-method of the application.
/// Parses command-line arguments, then spawns the game loop and serves the HTTP API.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[clap(short = 'H', long, default_value = "0.0.0.0")]
        host: String,
        /// Server port to listen on
        #[clap(short, long, env = "PORT", default_value = "10000")]
        port: u16,
        /// Seconds on the clock when a round starts
        #[clap(short, long, default_value = "40")]
        round_time: u32,
        /// Seconds between sweeps for idle players
        #[clap(long, default_value = "600")]
        cleanup_interval: u64,
        /// Seconds without a request after which a player is removed
        #[clap(long, default_value = "600")]
        inactivity_timeout: u64,
        /// Seed for reproducible problem sequences
        #[clap(long)]
        seed: Option<u64>,
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        game: GameConfig {
            round_time: args.round_time,
            cleanup_interval: Duration::from_secs(args.cleanup_interval),
            inactivity_timeout: Duration::from_secs(args.inactivity_timeout),
            seed: args.seed,
            ..GameConfig::default()
        },
    };
    config.validate()?;
    let address = config.socket_addr()?;

    // Game loop owns all sessions; the HTTP layer only holds a handle
    let (game, handle) = GameServer::new(config.game);
    let game_task = tokio::spawn(game.run());

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        info!("Received Ctrl+C, shutting down gracefully...");
    };

    let (bound, serve) = http::bind(address, handle.clone(), shutdown)?;
    info!("Server running on {}", bound);
    serve.await;

    handle.shutdown();
    if let Err(e) = game_task.await {
        error!("Game loop task panicked: {}", e);
    }

    Ok(())
}
