//! The dispatcher: accepts connections and serves each on its own task.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use fileserve_http::connection::{DiagnosticMode, HttpConnection};
use fileserve_http::protocol::HttpError;
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::{ConnectionLimit, ServerConfig};
use crate::service::FileService;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("can't listen on {address}: {source}")]
    Listen { address: SocketAddr, source: io::Error },

    #[error("failed to accept connection: {source}")]
    Accept { source: io::Error },
}

/// A bound listener together with everything needed to serve it.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    connection_limit: ConnectionLimit,
    diagnostic_mode: DiagnosticMode,
    service: Arc<FileService>,
}

impl Server {
    /// Binds and starts listening on the configured address.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails when the socket can't be created, bound or put in listening mode.
    pub fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = listen(address, config.backlog()).map_err(|source| ServerError::Listen { address, source })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Listen { address, source })?;

        info!(address = %local_addr, backlog = config.backlog(), limit = ?config.connection_limit(), root = %config.root().display(), "start listening");

        Ok(Self {
            listener,
            local_addr,
            connection_limit: config.connection_limit(),
            diagnostic_mode: config.diagnostic_mode(),
            service: Arc::new(FileService::from_config(&config)),
        })
    }

    /// The address actually bound, useful when the configured port is `0`.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves until the connection limit is reached or ctrl-c is pressed.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Accept`] when accepting a connection fails.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }

    /// Serves until the connection limit is reached or `shutdown` completes.
    ///
    /// Either way the listener is closed first, then every connection already
    /// started is awaited before returning. With [`ConnectionLimit::Lifetime`]
    /// at most `n` connections are ever served; with
    /// [`ConnectionLimit::Concurrent`] at most `n` are served at the same time.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Accept`] when accepting a connection fails. Accept
    /// failures are not retried, but the started connections are still drained.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let Server { listener, connection_limit, diagnostic_mode, service, .. } = self;

        let permits = match connection_limit {
            ConnectionLimit::Concurrent(max) => Some(Arc::new(Semaphore::new(max))),
            ConnectionLimit::Lifetime(_) => None,
        };

        tokio::pin!(shutdown);
        let mut connections = JoinSet::new();
        let mut started: usize = 0;

        let result = loop {
            if matches!(connection_limit, ConnectionLimit::Lifetime(max) if started >= max) {
                info!(started, "connection limit reached, stop accepting");
                break Ok(());
            }

            while let Some(joined) = connections.try_join_next() {
                log_join(joined);
            }

            let permit = match &permits {
                Some(semaphore) => tokio::select! {
                    permit = Arc::clone(semaphore).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_closed) => break Ok(()),
                    },
                    () = &mut shutdown => {
                        info!("shutdown requested, stop accepting");
                        break Ok(());
                    }
                },
                None => None,
            };

            let (tcp_stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(source) => {
                        error!(cause = %source, "failed to accept");
                        break Err(ServerError::Accept { source });
                    }
                },
                () = &mut shutdown => {
                    info!("shutdown requested, stop accepting");
                    break Ok(());
                }
            };

            started += 1;
            let span = info_span!("connection", id = started, %peer);
            connections.spawn(serve(tcp_stream, Arc::clone(&service), diagnostic_mode, permit).instrument(span));
        };

        // refuse new clients while the started ones finish
        drop(listener);

        info!(in_flight = connections.len(), "waiting for connections to finish");
        while let Some(joined) = connections.join_next().await {
            log_join(joined);
        }
        info!(served = started, "server stopped");

        result
    }
}

async fn serve(tcp_stream: TcpStream, service: Arc<FileService>, diagnostic_mode: DiagnosticMode, permit: Option<OwnedSemaphorePermit>) {
    let (reader, writer) = tcp_stream.into_split();
    let connection = HttpConnection::new(reader, writer).with_diagnostic_mode(diagnostic_mode);

    match connection.process(service).await {
        Ok(()) => info!("finished process, connection shutdown"),
        Err(HttpError::RequestError { source }) => info!(cause = %source, "request rejected, connection shutdown"),
        Err(e) => error!(cause = %e, "service has error, connection shutdown"),
    }

    drop(permit);
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(cause = %e, "connection task failed");
    }
}

fn listen(address: SocketAddr, backlog: u32) -> io::Result<TcpListener> {
    let socket = if address.is_ipv4() { TcpSocket::new_v4()? } else { TcpSocket::new_v6()? };
    socket.set_reuseaddr(true)?;
    socket.bind(address)?;
    socket.listen(backlog)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received ctrl-c"),
        Err(e) => {
            warn!(cause = %e, "can't listen for ctrl-c, only the connection limit stops the server");
            std::future::pending::<()>().await;
        }
    }
}
