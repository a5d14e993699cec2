use clap::Parser;
use client::network::Client;
use log::{error, info};
use tokio::io::BufReader;

/// Terminal client for the Minesweeper server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server hostname or address
    host: String,

    /// Server port
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    info!("Connecting to {}:{}", args.host, args.port);
    let mut client = Client::connect(&args.host, args.port).await.map_err(|e| {
        error!("Error while attempting to connect to server: {}", e);
        e
    })?;

    let mut keyboard = BufReader::new(tokio::io::stdin());
    let mut screen = std::io::stdout();
    client.run(&mut keyboard, &mut screen).await?;

    Ok(())
}
