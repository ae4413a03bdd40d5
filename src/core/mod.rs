//! Core module - Common types, traits, error handling, and config

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{Config, DisplayConfig, FeedConfig};
pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
