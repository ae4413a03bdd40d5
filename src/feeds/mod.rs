//! Ticker feeds - WebSocket ingestion

pub mod ws_client;

pub use ws_client::WsTickerFeed;
