use clap::Parser;
use log::{error, info};
use server::auth::CredentialFile;
use server::leaderboard::RankOrder;
use server::network::{Server, ServerConfig, DEFAULT_WORKERS};
use shared::DEFAULT_PORT;
use std::path::PathBuf;
use std::sync::Arc;

/// Multiplayer Minesweeper server.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Number of session workers
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    workers: usize,

    /// Credential file of whitespace-separated username/password pairs
    #[arg(short, long, default_value = "Authentication.txt")]
    auth_file: PathBuf,

    /// Seed for reproducible minefields, e.g. 42. Layouts are random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Reject connections once this many are waiting for a worker
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Which completion times rank highest on the leaderboard
    #[arg(long, value_enum, default_value_t = RankOrder::SlowestFirst)]
    rank_order: RankOrder,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let credentials = CredentialFile::load(&args.auth_file).map_err(|e| {
        error!("{}", e);
        e
    })?;
    info!(
        "Loaded {} credentials from {}",
        credentials.len(),
        args.auth_file.display()
    );

    let config = ServerConfig {
        host: args.host,
        port: args.port,
        workers: args.workers,
        seed: args.seed,
        queue_capacity: args.queue_capacity,
        rank_order: args.rank_order,
    };

    let server = Server::new(config, Arc::new(credentials))
        .await
        .map_err(|e| {
            error!("Failed to start server: {}", e);
            e
        })?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Accept failed: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
