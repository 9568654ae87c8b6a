//! TCP server exposing the bridge routes.
//!
//! Accepts any number of controller connections up to a limit and answers
//! newline-delimited JSON requests on each of them. Every connection runs in
//! its own task with its own clone of the [`RpcHandler`], so a slow client
//! never holds up another; all of them meet at the state guard.
//!
//! ```text
//! Controller A ┐
//!              ├──> RpcServer ──> connection task ──> RpcHandler ──> StateGuard
//! Controller B ┘        │
//!                       └──> LinesCodec (framing)
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use tagstream_reader::mock::MockReader;
//! use tagstream_rpc::{RpcServer, RpcServerConfig};
//! use tagstream_service::{Bridge, BridgeConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (reader, events) = MockReader::new();
//! let bridge = Bridge::new(reader, BridgeConfig::default());
//! let rpc = bridge.rpc();
//! let _handle = bridge.start(events);
//!
//! let server = RpcServer::bind(RpcServerConfig::default()).await?;
//! server.run(rpc).await?;
//! # Ok(())
//! # }
//! ```

use crate::protocol::{RpcReply, respond};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tagstream_reader::ReaderDriver;
use tagstream_service::RpcHandler;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, warn};

/// Longest request line accepted, in bytes.
///
/// A longer line gets one error reply and then the connection is closed.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Configuration for the RPC server
///
/// # Example
///
/// ```
/// use tagstream_rpc::RpcServerConfig;
///
/// let config = RpcServerConfig {
///     bind_addr: "0.0.0.0:8080".parse().unwrap(),
///     max_connections: 16,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcServerConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,

    /// Maximum number of simultaneous connections
    pub max_connections: usize,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            max_connections: 64,
        }
    }
}

/// Errors that can occur during RPC server operations
#[derive(Debug, Error)]
pub enum RpcServerError {
    /// Failed to bind to address
    #[error("Failed to bind to {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Low-level I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing error on a connection
    #[error("Codec error: {0}")]
    Codec(#[from] LinesCodecError),

    /// Reply could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, RpcServerError>;

/// Newline-delimited JSON RPC server.
#[derive(Debug)]
pub struct RpcServer {
    listener: TcpListener,
    config: RpcServerConfig,
    slots: Arc<Semaphore>,
}

impl RpcServer {
    /// Bind the server to the configured address
    ///
    /// # Errors
    ///
    /// Returns [`RpcServerError::BindFailed`] if the address is in use or
    /// not permitted.
    pub async fn bind(config: RpcServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| RpcServerError::BindFailed {
                addr: config.bind_addr,
                source,
            })?;

        info!(
            addr = %config.bind_addr,
            max_connections = config.max_connections,
            "RPC server listening"
        );

        Ok(Self {
            listener,
            slots: Arc::new(Semaphore::new(config.max_connections)),
            config,
        })
    }

    /// Actual bound address (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, serving each on its own task.
    ///
    /// Returns only if the listener itself fails. Connections beyond
    /// `max_connections` are closed immediately.
    pub async fn run<D: ReaderDriver>(self, handler: RpcHandler<D>) -> Result<()> {
        loop {
            let (stream, addr) = self.listener.accept().await?;

            let Ok(permit) = Arc::clone(&self.slots).try_acquire_owned() else {
                warn!(
                    addr = %addr,
                    max_connections = self.config.max_connections,
                    "Connection rejected: maximum connections reached"
                );
                drop(stream);
                continue;
            };

            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
            }

            debug!(addr = %addr, "Controller connected");
            let handler = handler.clone();
            tokio::spawn(async move {
                match serve_connection(stream, handler, permit).await {
                    Ok(()) => debug!(addr = %addr, "Controller disconnected"),
                    Err(e) => error!(addr = %addr, error = %e, "Connection closed with error"),
                }
            });
        }
    }
}

/// Answer requests on one connection until the peer closes it.
///
/// An oversized line is answered with an error envelope, after which the
/// framed stream ends and the connection is dropped.
async fn serve_connection<D: ReaderDriver>(
    stream: TcpStream,
    handler: RpcHandler<D>,
    _permit: OwnedSemaphorePermit,
) -> Result<()> {
    let mut framed = Framed::new(stream, LinesCodec::new_with_max_length(MAX_LINE_LENGTH));

    while let Some(frame) = framed.next().await {
        let reply = match frame {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => respond(&handler, &line).await,
            Err(LinesCodecError::MaxLineLengthExceeded) => RpcReply::error(
                Value::Null,
                format!("Request exceeds {MAX_LINE_LENGTH} bytes"),
            ),
            Err(e) => return Err(e.into()),
        };

        framed.send(serde_json::to_string(&reply)?).await?;
    }

    Ok(())
}
