use std::io;
use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, info, trace, warn};

use crate::config::SenderConfig;
use crate::error::SendError;

/// Outcome of a successful send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub peer: SocketAddr,
    pub bytes: usize,
}

pub struct Sender {
    config: SenderConfig,
}

impl Sender {
    pub fn new(config: SenderConfig) -> Self {
        Sender { config }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Connect, write the whole payload, and close the connection.
    ///
    /// The stream lives only inside this call, so it is closed on every
    /// return path.
    pub async fn run(&self) -> Result<SendReport, SendError> {
        let addr = self.config.addr();

        let mut stream = connect_ipv4(&addr).await?;
        let peer = stream
            .peer_addr()
            .map_err(|e| SendError::connection(format!("lost connection to {}", addr), e))?;
        debug!(%peer, "connected");

        let payload = &self.config.payload;
        if payload.is_empty() {
            warn!("payload is empty");
        }
        trace!(payload = payload.as_str());

        let bytes = payload.encode();
        stream
            .write_all(bytes)
            .await
            .map_err(|e| SendError::connection(format!("failed to send to {}", addr), e))?;
        trace!(len = bytes.len(), "payload written");

        // EOF for the listener once everything written is on its way
        stream
            .shutdown()
            .await
            .map_err(|e| SendError::connection(format!("failed to close connection to {}", addr), e))?;

        info!(%peer, bytes = bytes.len(), "payload sent");

        Ok(SendReport {
            peer,
            bytes: bytes.len(),
        })
    }
}

/// Try every IPv4 address `addr` resolves to, in order.
async fn connect_ipv4(addr: &str) -> Result<TcpStream, SendError> {
    let candidates = lookup_host(addr)
        .await
        .map_err(|e| SendError::connection(format!("failed to resolve {}", addr), e))?
        .filter(SocketAddr::is_ipv4);

    let mut last_error = None;
    for candidate in candidates {
        debug!(%candidate, "connecting");
        match TcpStream::connect(candidate).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%candidate, error = %e, "connect failed");
                last_error = Some(e);
            }
        }
    }

    let error = last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::AddrNotAvailable, "no IPv4 address found")
    });
    Err(SendError::connection(format!("failed to connect to {}", addr), error))
}
