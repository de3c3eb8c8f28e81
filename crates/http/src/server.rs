//! TCP server accepting connections and serving one request on each.
//!
//! [`Server::start`] binds the listener and spawns the accept loop, returning a
//! handle right away. Every accepted stream is split into its read and write
//! halves and handed to an [`HttpConnection`] running on its own task, so a slow
//! handler only holds up its own connection.
//!
//! [`Server::close`] stops the accept loop and drops the listener. Connections
//! that are already being served run to completion.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::connection::HttpConnection;
use crate::handler::Handler;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("address must be set")]
    MissingAddress,

    #[error("can't bind listener: {source}")]
    Bind { source: io::Error },

    #[error("can't read listener address: {source}")]
    LocalAddr { source: io::Error },
}

impl ServerError {
    pub fn bind(source: io::Error) -> Self {
        Self::Bind { source }
    }

    pub fn local_addr(source: io::Error) -> Self {
        Self::LocalAddr { source }
    }
}

#[derive(Debug, Default)]
pub struct ServerBuilder {
    address: Option<SocketAddr>,
    config: ServerConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<SocketAddr>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the configured address and starts accepting connections.
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if no address was set or the listener can't be bound.
    pub async fn start<H>(self, handler: H) -> Result<Server, ServerError>
    where
        H: Handler<OwnedWriteHalf> + 'static,
    {
        let address = self.address.ok_or(ServerError::MissingAddress)?;
        let listener = TcpListener::bind(address).await.map_err(ServerError::bind)?;
        Server::serve(listener, self.config, handler)
    }
}

/// Handle of a running server.
///
/// Dropping the handle leaves the accept loop running; call [`Server::close`] to
/// stop it.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    accept_task: JoinHandle<()>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Starts a server on `address` with the default [`ServerConfig`].
    ///
    /// # Errors
    ///
    /// Returns `ServerError` if the listener can't be bound.
    pub async fn start<A, H>(address: A, handler: H) -> Result<Self, ServerError>
    where
        A: ToSocketAddrs,
        H: Handler<OwnedWriteHalf> + 'static,
    {
        let listener = TcpListener::bind(address).await.map_err(ServerError::bind)?;
        Self::serve(listener, ServerConfig::default(), handler)
    }

    fn serve<H>(listener: TcpListener, config: ServerConfig, handler: H) -> Result<Self, ServerError>
    where
        H: Handler<OwnedWriteHalf> + 'static,
    {
        let local_addr = listener.local_addr().map_err(ServerError::local_addr)?;
        info!(%local_addr, max_connections = ?config.get_max_connections(), "start listening");

        let shutdown = CancellationToken::new();
        let accept_loop = AcceptLoop {
            listener,
            handler: Arc::new(handler),
            limit: config.get_max_connections().map(|max| Arc::new(Semaphore::new(max))),
            config,
            shutdown: shutdown.clone(),
        };
        let accept_task = tokio::spawn(accept_loop.run());

        Ok(Self { local_addr, shutdown, accept_task })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting and waits until the listener is closed.
    pub async fn close(self) {
        self.shutdown.cancel();
        if let Err(e) = self.accept_task.await {
            error!(cause = %e, "accept loop ended abnormally");
        }
        info!(local_addr = %self.local_addr, "server closed");
    }
}

struct AcceptLoop<H> {
    listener: TcpListener,
    handler: Arc<H>,
    config: ServerConfig,
    limit: Option<Arc<Semaphore>>,
    shutdown: CancellationToken,
}

impl<H> AcceptLoop<H>
where
    H: Handler<OwnedWriteHalf> + 'static,
{
    async fn run(self) {
        loop {
            // wait for a free slot first so the backlog absorbs the overflow
            let permit = match &self.limit {
                Some(limit) => tokio::select! {
                    () = self.shutdown.cancelled() => break,
                    permit = Arc::clone(limit).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                },
                None => None,
            };

            let (stream, remote_addr) = tokio::select! {
                () = self.shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        if self.shutdown.is_cancelled() {
                            break;
                        }
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            debug!(%remote_addr, "accept connection");
            self.spawn_connection(stream, remote_addr, permit);
        }

        debug!(local_addr = ?self.listener.local_addr().ok(), "accept loop stopped");
    }

    fn spawn_connection(&self, stream: TcpStream, remote_addr: SocketAddr, permit: Option<OwnedSemaphorePermit>) {
        let handler = Arc::clone(&self.handler);
        let (reader, writer) = stream.into_split();
        let connection = HttpConnection::with_config(reader, writer, &self.config);

        tokio::spawn(async move {
            let _permit = permit;
            match connection.process(handler).await {
                Ok(()) => {
                    debug!(%remote_addr, "finished process, connection shutdown");
                }
                Err(e) => {
                    error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                }
            }
        });
    }
}
