//! WebSocket connector - tokio-tungstenite implementation of `SocketConnector`.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::ClientError;
use crate::ports::{ClientLink, LinkCommand, LinkEvent, SocketConnector};

/// Opens real WebSocket connections.
///
/// Each link is driven by one spawned task that forwards `LinkCommand`s to
/// the socket and socket frames to `LinkEvent`s. The task ends on close,
/// error, or when the command sender is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SocketConnector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<ClientLink, ClientError> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| ClientError::connect(url, e))?;

        let (mut write, mut read) = stream.split();
        let (outbound, mut commands) = mpsc::unbounded_channel();
        let (events, inbound) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = commands.recv() => match command {
                        Some(LinkCommand::Text(text)) => {
                            if let Err(e) = write.send(Message::Text(text)).await {
                                let _ = events.send(LinkEvent::Error(e.to_string()));
                                break;
                            }
                        }
                        Some(LinkCommand::Close) | None => {
                            let _ = write.send(Message::Close(None)).await;
                            let _ = events.send(LinkEvent::Closed);
                            break;
                        }
                    },
                    frame = read.next() => match frame {
                        Some(Ok(Message::Text(text))) => {
                            let _ = events.send(LinkEvent::Text(text));
                        }
                        Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                            Ok(text) => {
                                let _ = events.send(LinkEvent::Text(text));
                            }
                            Err(e) => tracing::debug!(error = %e, "Dropping non-UTF-8 binary frame"),
                        },
                        Some(Ok(Message::Close(_))) | None => {
                            let _ = events.send(LinkEvent::Closed);
                            break;
                        }
                        // ping/pong are answered by tungstenite
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            let _ = events.send(LinkEvent::Error(e.to_string()));
                            break;
                        }
                    },
                }
            }
        });

        Ok(ClientLink { outbound, inbound })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_to_closed_port_is_connect_error() {
        // bind then drop to find a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = WebSocketConnector::new()
            .connect(&format!("ws://{}", addr))
            .await;

        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }

    #[tokio::test]
    async fn invalid_url_is_connect_error() {
        let result = WebSocketConnector::new().connect("not a url").await;
        assert!(matches!(result, Err(ClientError::Connect { .. })));
    }
}
