//! WebSocket client for the ticker stream

use async_trait::async_trait;
use chrono::Utc;
use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::core::{Error, FeedEvent, Result, TickerFeed};

/// WebSocket ticker feed client
///
/// The server pushes batches unsolicited, so there is no subscription
/// handshake. Each text frame is forwarded as one `FeedEvent::Batch`, stamped
/// with the moment it was received; every record updated from that frame
/// shares the stamp. When the connection ends for any reason a single
/// `FeedEvent::ConnectionLost` is emitted and `run` returns. No reconnection
/// is attempted; the user restarts the process.
pub struct WsTickerFeed {
    name: String,
    ws_url: String,
    connected: Arc<RwLock<bool>>,
}

impl WsTickerFeed {
    pub fn new(name: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ws_url: ws_url.into(),
            connected: Arc::new(RwLock::new(false)),
        }
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.read()
    }

    async fn notify_lost(&self, events: &mpsc::Sender<FeedEvent>, reason: String) {
        if events
            .send(FeedEvent::ConnectionLost { reason })
            .await
            .is_err()
        {
            debug!("Engine already gone, dropping connection-lost event");
        }
    }
}

#[async_trait]
impl TickerFeed for WsTickerFeed {
    async fn run(&self, events: mpsc::Sender<FeedEvent>) -> Result<()> {
        let url = Url::parse(&self.ws_url)
            .map_err(|e| Error::Config(format!("Invalid WebSocket URL {}: {}", self.ws_url, e)))?;

        info!("Connecting to WebSocket: {}", url);

        let (ws_stream, _) = match connect_async(url.as_str()).await {
            Ok(conn) => conn,
            Err(e) => {
                self.notify_lost(&events, format!("could not connect: {}", e))
                    .await;
                return Err(Error::WebSocket(e.to_string()));
            }
        };

        *self.connected.write() = true;
        info!("Connected to WebSocket: {}", self.name);

        let (mut write, mut read) = ws_stream.split();

        // Message loop
        let reason = loop {
            match read.next().await {
                Some(Ok(Message::Text(text))) => {
                    let event = FeedEvent::Batch {
                        payload: text.to_string(),
                        received_at: Utc::now(),
                    };
                    if events.send(event).await.is_err() {
                        warn!("Engine channel closed, stopping feed");
                        break "engine stopped".to_string();
                    }
                }
                Some(Ok(Message::Ping(data))) => {
                    if let Err(e) = write.send(Message::Pong(data)).await {
                        break format!("failed to answer ping: {}", e);
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    info!("WebSocket closed by server");
                    break "closed by server".to_string();
                }
                Some(Err(e)) => {
                    error!("WebSocket error: {}", e);
                    break e.to_string();
                }
                None => break "stream ended".to_string(),
                _ => {}
            }
        };

        *self.connected.write() = false;
        self.notify_lost(&events, reason).await;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
