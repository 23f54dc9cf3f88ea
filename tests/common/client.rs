//! Test WebSocket client.
//!
//! Wraps a tokio-tungstenite stream so tests can send frames and assert on
//! what the relay delivers.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// A test session client.
pub struct TestClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Perform the upgrade handshake against `url`.
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let (ws, _response) = connect_async(url).await?;
        Ok(Self { ws })
    }

    /// Attempt an upgrade that is expected to be refused; returns the HTTP
    /// status the relay answered with.
    pub async fn refused_status(url: &str) -> anyhow::Result<u16> {
        match connect_async(url).await {
            Ok(_) => anyhow::bail!("upgrade to {url} unexpectedly succeeded"),
            Err(tungstenite::Error::Http(response)) => Ok(response.status().as_u16()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
        self.ws.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    pub async fn send_binary(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.ws.send(Message::Binary(data.to_vec())).await?;
        Ok(())
    }

    /// Receive a single data frame.
    pub async fn recv(&mut self) -> anyhow::Result<Message> {
        self.recv_timeout(Duration::from_secs(2)).await
    }

    /// Receive a data frame with a timeout. Control frames are skipped.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        timeout(dur, async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(frame))) => anyhow::bail!("closed by relay: {frame:?}"),
                    Some(Ok(msg)) => return Ok(msg),
                    Some(Err(e)) => return Err(e.into()),
                    None => anyhow::bail!("stream ended"),
                }
            }
        })
        .await?
    }

    /// Receive a text frame.
    pub async fn recv_text(&mut self) -> anyhow::Result<String> {
        match self.recv().await? {
            Message::Text(text) => Ok(text),
            other => anyhow::bail!("expected text frame, got {other:?}"),
        }
    }

    /// True if no data frame arrives within `dur`.
    pub async fn is_silent_for(&mut self, dur: Duration) -> bool {
        self.recv_timeout(dur).await.is_err()
    }

    /// Wait for the relay to end the session.
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        timeout(Duration::from_secs(3), async {
            loop {
                match self.ws.next().await {
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return Ok(()),
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                    Some(Ok(msg)) => anyhow::bail!("expected close, got {msg:?}"),
                }
            }
        })
        .await?
    }

    /// Close the session from the client side and drain until the relay
    /// acknowledges.
    pub async fn close(mut self) -> anyhow::Result<()> {
        self.ws.close(None).await?;
        let _ = timeout(Duration::from_secs(2), async {
            while let Some(Ok(_)) = self.ws.next().await {}
        })
        .await;
        Ok(())
    }

    /// Drop the TCP stream without a close handshake.
    pub fn drop_connection(self) {
        drop(self.ws);
    }
}
