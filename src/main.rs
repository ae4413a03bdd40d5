use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use tickwatch::core::{Config, TickerFeed};
use tickwatch::display::run_display;
use tickwatch::engine::{run_engine, ViewState};
use tickwatch::feeds::WsTickerFeed;
use tickwatch::store::TickerStore;

/// Feed→engine channel buffer. Sized to absorb WebSocket bursts without
/// back-pressuring the read loop.
const FEED_CHANNEL_BUFFER: usize = 256;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tickwatch=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load_default();
    info!("📡 tickwatch starting, feed: {}", config.feed.ws_url);

    let (events_tx, events_rx) = mpsc::channel(FEED_CHANNEL_BUFFER);
    let (view_tx, view_rx) = watch::channel(ViewState::default());

    let feed = WsTickerFeed::new("stocks", &config.feed.ws_url);
    let store = TickerStore::new();

    let feed_handle = tokio::spawn(async move { feed.run(events_tx).await });
    let engine_handle = tokio::spawn(run_engine(events_rx, store, view_tx));
    let display_handle = tokio::spawn(run_display(view_rx, config.display));

    tokio::select! {
        res = feed_handle => {
            match res {
                Ok(Ok(())) => warn!("Ticker feed exited"),
                Ok(Err(err)) => warn!("Ticker feed returned error: {}", err),
                Err(err) => warn!("Ticker feed task panicked: {}", err),
            }
        }
        res = engine_handle => {
            match res {
                Ok(Ok(())) => warn!("Engine task exited"),
                Ok(Err(err)) => warn!("Engine task returned error: {}", err),
                Err(err) => warn!("Engine task panicked: {}", err),
            }
        }
        res = display_handle => {
            match res {
                Ok(Ok(())) => warn!("Display task exited"),
                Ok(Err(err)) => warn!("Display task returned error: {}", err),
                Err(err) => warn!("Display task panicked: {}", err),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }

    Ok(())
}
