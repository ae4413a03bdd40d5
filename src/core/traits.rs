//! Core traits - the seam between transports and the merge engine

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::core::{FeedEvent, Result};

/// Ticker feed trait - implemented by transports.
///
/// A feed delivers every received batch, stamped with its moment of receipt,
/// through the event channel, and reports connection failure through the same
/// channel as a distinct event. Reconnect policy is not part of this
/// interface; a feed that loses its connection reports it and returns.
#[async_trait]
pub trait TickerFeed: Send + Sync {
    /// Run the feed until the connection ends, delivering events to `events`
    async fn run(&self, events: mpsc::Sender<FeedEvent>) -> Result<()>;

    /// Get the feed name
    fn name(&self) -> &str;
}
