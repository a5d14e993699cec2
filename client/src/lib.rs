//! # Minesweeper Client Library
//!
//! The terminal side of the online Minesweeper service. The client holds no
//! game state of its own: the server drives every exchange and the client
//! only displays what it is sent and forwards what the player types.
//!
//! ## Message Handling
//!
//! - `PRINT` frames are shown up to and including their first line feed.
//! - `INPUT` frames are shown the same way, then one line is read from the
//!   keyboard and sent back as `DATA`.
//! - `EXIT` frames are shown and end the session.
//!
//! Every `PRINT`, `INPUT` and `EXIT` frame is acknowledged before anything
//! else is sent, which is what lets the server pace its output line by line.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::connect("127.0.0.1", 12345).await?;
//!     let mut keyboard = BufReader::new(tokio::io::stdin());
//!     client.run(&mut keyboard, &mut std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```

pub mod network;
