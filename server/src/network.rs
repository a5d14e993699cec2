//! Server network layer: one acceptor feeding a fixed pool of session workers

use crate::auth::CredentialStore;
use crate::dispatch::{DispatchQueue, PendingConnection, Rejected};
use crate::game::field_rng;
use crate::leaderboard::{Leaderboard, RankOrder, SharedLeaderboard};
use crate::session::{authenticate, Session};
use log::{debug, error, info, warn};
use shared::{Channel, ProtocolError, DEFAULT_PORT};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

pub const DEFAULT_WORKERS: usize = 3;

/// How long a rejected client gets to acknowledge the busy notice.
pub const REJECT_ACK_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Size of the worker pool, fixed for the life of the server
    pub workers: usize,
    /// Makes minefield layouts reproducible across runs
    pub seed: Option<u64>,
    /// Maximum number of connections waiting for a worker; unbounded when `None`
    pub queue_capacity: Option<usize>,
    pub rank_order: RankOrder,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            workers: DEFAULT_WORKERS,
            seed: None,
            queue_capacity: None,
            rank_order: RankOrder::default(),
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// State every worker needs to run a session.
struct WorkerContext {
    leaderboard: SharedLeaderboard,
    credentials: Arc<dyn CredentialStore>,
    seed: Option<u64>,
}

pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    queue: Arc<DispatchQueue<PendingConnection>>,
    context: Arc<WorkerContext>,
    next_connection_id: u64,
}

impl Server {
    /// Binds the listening socket. Failing here is fatal to the process.
    pub async fn new(config: ServerConfig, credentials: Arc<dyn CredentialStore>) -> io::Result<Self> {
        let listener = TcpListener::bind(config.address()).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let context = Arc::new(WorkerContext {
            leaderboard: Leaderboard::shared(config.rank_order),
            credentials,
            seed: config.seed,
        });

        Ok(Server {
            listener,
            queue: Arc::new(DispatchQueue::with_capacity(config.queue_capacity)),
            context,
            config,
            next_connection_id: 1,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn leaderboard(&self) -> SharedLeaderboard {
        Arc::clone(&self.context.leaderboard)
    }

    /// Spawns the worker pool, then accepts connections forever.
    ///
    /// Only an accept failure returns; session failures stay inside their worker.
    pub async fn run(mut self) -> io::Result<()> {
        self.spawn_workers();

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let id = self.next_connection_id;
            self.next_connection_id += 1;

            match self.queue.enqueue(PendingConnection { id, peer, stream }) {
                Ok(queue_len) => {
                    info!(
                        "Client {} connected from {}. Queue length: {}",
                        id, peer, queue_len
                    );
                }
                Err(Rejected(connection)) => {
                    warn!("Rejecting client {} from {}: queue is full", id, peer);
                    tokio::spawn(reject_busy(connection));
                }
            }
        }
    }

    fn spawn_workers(&self) {
        let workers = if self.config.workers == 0 {
            warn!("Worker pool size of 0 requested, using 1");
            1
        } else {
            self.config.workers
        };

        for worker_id in 1..=workers {
            let queue = Arc::clone(&self.queue);
            let context = Arc::clone(&self.context);
            tokio::spawn(async move {
                run_worker(worker_id, queue, context).await;
            });
        }

        info!("Started {} session workers", workers);
    }
}

/// Serves queued connections one at a time, for as long as the queue lives.
async fn run_worker(
    worker_id: usize,
    queue: Arc<DispatchQueue<PendingConnection>>,
    context: Arc<WorkerContext>,
) {
    while let Some(connection) = queue.dequeue().await {
        let id = connection.id;
        debug!("Worker {} picked up client {}", worker_id, id);

        match serve_connection(connection, &context).await {
            Ok(()) => info!("Client {} disconnected", id),
            Err(e) if e.is_disconnect() => info!("Client {} dropped the connection", id),
            Err(e) => warn!("Client {} session ended: {}", id, e),
        }
    }

    error!("Worker {} stopping: dispatch queue closed", worker_id);
}

/// Authenticates and plays one connection to completion. The socket closes
/// when the connection is dropped on return.
async fn serve_connection(
    connection: PendingConnection,
    context: &WorkerContext,
) -> Result<(), ProtocolError> {
    let PendingConnection { id, peer, stream } = connection;
    let mut channel = Channel::new(stream);

    let Some(username) = authenticate(&mut channel, context.credentials.as_ref()).await? else {
        info!("Client {} from {} failed to log in", id, peer);
        return Ok(());
    };
    info!("Client {} logged in as {}", id, username);

    let rng = field_rng(context.seed, id);
    let mut session = Session::new(channel, username, Arc::clone(&context.leaderboard), rng);
    session.run().await
}

/// Sends the busy notice and closes. A peer that never acknowledges it is
/// dropped once `REJECT_ACK_TIMEOUT` expires.
async fn reject_busy(connection: PendingConnection) {
    let mut channel = Channel::new(connection.stream);
    let notice = channel.exit("The server is busy, try again later. Disconnecting...\n");

    match tokio::time::timeout(REJECT_ACK_TIMEOUT, notice).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!("Client {} went away before rejection: {}", connection.id, e),
        Err(_) => debug!("Client {} never acknowledged rejection, closing", connection.id),
    }
}
