//! Core types - Strong typing for safety

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Instrument name (e.g., "AAPL")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Direction of a price change relative to the immediately preceding
/// stored price for the same instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i8)]
pub enum Direction {
    Down = -1,
    Unchanged = 0,
    Up = 1,
}

impl Direction {
    /// Direction of `current` relative to `previous`. Both values must
    /// already be at display precision; the comparison is never made on
    /// raw unrounded prices.
    pub fn between(previous: Decimal, current: Decimal) -> Self {
        match current.cmp(&previous) {
            Ordering::Less => Direction::Down,
            Ordering::Greater => Direction::Up,
            Ordering::Equal => Direction::Unchanged,
        }
    }
}

/// Latest known state for one instrument. Only the newest value is kept;
/// there is no price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    /// Current price, rounded to 2 fractional digits at ingest
    pub price: Decimal,

    /// Receive time of the batch that last set this record. Every record
    /// touched by one batch carries the same timestamp.
    pub updated_at: DateTime<Utc>,

    /// Change direction versus the previous stored price
    pub direction: Direction,
}

/// Event delivered by a ticker feed to the engine.
///
/// `Batch` is the single message-handling entry point; `ConnectionLost` is
/// the out-of-band failure notification path. The merge engine attaches no
/// behavior to the failure path beyond surfacing it to the display.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    Batch {
        payload: String,
        received_at: DateTime<Utc>,
    },
    ConnectionLost {
        reason: String,
    },
}
