//! Engine loop - applies feed events to the store, one at a time
//!
//! The engine is the single consumer of the feed channel and the sole owner
//! of the `TickerStore`. Each batch is fully applied before the next event is
//! taken, which is what makes the store safe without any locking.

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, warn};

use crate::core::{FeedEvent, Result};
use crate::store::{InstrumentRow, TickerStore};

/// Everything the display layer needs for one redraw.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Listing-ordered instrument rows
    pub rows: Vec<InstrumentRow>,

    /// Set once when the feed connection is lost; the display shows it as a
    /// blocking notice. Recovery is a process restart.
    pub feed_notice: Option<String>,
}

/// Drain the feed channel, merging batches into `store` and republishing the
/// view after every applied batch.
///
/// A batch that fails to decode is dropped whole (the store is untouched) and
/// the stream keeps flowing. Returns when the feed channel closes.
pub async fn run_engine(
    mut events: mpsc::Receiver<FeedEvent>,
    mut store: TickerStore,
    snapshots: watch::Sender<ViewState>,
) -> Result<()> {
    while let Some(event) = events.recv().await {
        match event {
            FeedEvent::Batch {
                payload,
                received_at,
            } => match store.apply_batch(&payload, received_at) {
                Ok(()) => {
                    debug!("Applied batch, {} instruments tracked", store.len());
                    let _ = snapshots.send(ViewState {
                        rows: store.rows(),
                        feed_notice: None,
                    });
                }
                Err(e) => {
                    warn!("Rejected batch: {}", e);
                }
            },
            FeedEvent::ConnectionLost { reason } => {
                error!("Ticker feed connection lost: {}", reason);
                let _ = snapshots.send(ViewState {
                    rows: store.rows(),
                    feed_notice: Some(reason),
                });
            }
        }
    }

    Ok(())
}
