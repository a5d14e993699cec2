//! # Minesweeper Server Library
//!
//! This library provides the server side of the online Minesweeper service.
//! Clients connect over TCP, log in, and play independent games that all feed
//! one shared leaderboard.
//!
//! ## Core Responsibilities
//!
//! ### Connection Dispatch
//! A single acceptor pushes every new connection onto a FIFO dispatch queue.
//! A fixed pool of workers pops connections off the queue; each worker serves
//! one client from login to disconnect before taking the next.
//!
//! ### Session Flow
//! Each connection runs a small state machine (main menu, playing, game over,
//! leaderboard) over the half-duplex protocol from the `shared` crate. Every
//! line the server prints is acknowledged by the client before the next one
//! is sent.
//!
//! ### Leaderboard
//! Finished games update per-user statistics, and won games are ranked by
//! completion time with a tie-break on experience. The leaderboard is the only
//! state shared between workers and is always mutated under a single write
//! lock.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The 9x9 minefield: mine placement, iterative flood-fill reveal and
//! mine flagging.
//!
//! ### Coordinate Module (`coordinate`)
//! Parsing of two-character coordinates like `A1` or `1A` into grid indices.
//!
//! ### Render Module (`render`)
//! Text rendering of the field with a numbered header and lettered rows.
//!
//! ### Leaderboard Module (`leaderboard`)
//! User statistics and the ranked score list.
//!
//! ### Auth Module (`auth`)
//! The credential check behind the login prompt.
//!
//! ### Dispatch Module (`dispatch`)
//! The queue between the acceptor and the worker pool.
//!
//! ### Session Module (`session`)
//! Login and the per-connection screen state machine.
//!
//! ### Network Module (`network`)
//! Listening socket, acceptor loop and worker pool.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::auth::CredentialFile;
//! use server::network::{Server, ServerConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = CredentialFile::load("Authentication.txt")?;
//!     let server = Server::new(ServerConfig::default(), Arc::new(credentials)).await?;
//!
//!     // Spawns the worker pool, then accepts clients until an accept fails
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Known Limitations
//!
//! Sessions have no read or write timeouts: a client that stops answering keeps
//! its worker busy until the connection breaks. With the default unbounded
//! queue, waiting connections are limited only by the listen backlog.

pub mod auth;
pub mod coordinate;
pub mod dispatch;
pub mod game;
pub mod leaderboard;
pub mod network;
pub mod render;
pub mod session;
