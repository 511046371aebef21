//! UDP writer for outbound OSC packets.
//!
//! One socket is bound to the configured local port and connected to the
//! DAW. A single writer task owns it and drains a FIFO queue, so messages
//! from every WebSocket connection reach the socket in the order they
//! were accepted.
//!
//! ```text
//! conn task A ─┐
//! conn task B ─┼─▶ mpsc (FIFO) ─▶ UdpOscWriter::run ─▶ UdpSocket ─▶ DAW
//! conn task C ─┘
//! ```

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::domain::osc::{encode, ControlMessage};
use crate::ports::{OscSink, SinkError};

/// Counters reported when the writer stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub sent: u64,
    pub failed: u64,
}

/// Cloneable sink handle feeding the writer task.
#[derive(Clone)]
pub struct OscUdpHandle {
    tx: mpsc::UnboundedSender<ControlMessage>,
}

#[async_trait]
impl OscSink for OscUdpHandle {
    async fn send(&self, message: ControlMessage) -> Result<(), SinkError> {
        self.tx.send(message).map_err(|_| SinkError::Closed)
    }
}

/// Owner of the outbound UDP socket.
pub struct UdpOscWriter {
    socket: UdpSocket,
    rx: mpsc::UnboundedReceiver<ControlMessage>,
    remote: SocketAddr,
}

impl UdpOscWriter {
    /// Bind `local_addr` and target `remote_addr`.
    ///
    /// Returns the sink handle and the writer; spawn [`UdpOscWriter::run`]
    /// to start transmitting.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the local port cannot be bound or the remote
    /// address cannot be resolved.
    pub async fn bind(local_addr: &str, remote_addr: &str) -> io::Result<(OscUdpHandle, Self)> {
        let socket = UdpSocket::bind(local_addr).await?;
        socket.connect(remote_addr).await?;
        let remote = socket.peer_addr()?;

        let (tx, rx) = mpsc::unbounded_channel();
        Ok((OscUdpHandle { tx }, Self { socket, rx, remote }))
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Remote address packets are sent to.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// Drain the queue until every handle is dropped.
    ///
    /// Encode and send failures are logged and the message is dropped;
    /// nothing is retried.
    pub async fn run(mut self) -> WriterStats {
        let mut stats = WriterStats::default();

        while let Some(message) = self.rx.recv().await {
            let packet = match encode(&message) {
                Ok(packet) => packet,
                Err(e) => {
                    tracing::error!(address = %message.address, "Failed to encode OSC message: {}", e);
                    stats.failed += 1;
                    continue;
                }
            };

            match self.socket.send(&packet).await {
                Ok(_) => {
                    tracing::trace!(message = %message, remote = %self.remote, "OSC sent");
                    stats.sent += 1;
                }
                Err(e) => {
                    tracing::error!(
                        address = %message.address,
                        remote = %self.remote,
                        "Failed to send OSC packet: {}",
                        e
                    );
                    stats.failed += 1;
                }
            }
        }

        tracing::debug!(sent = stats.sent, failed = stats.failed, "OSC writer stopped");
        stats
    }
}
