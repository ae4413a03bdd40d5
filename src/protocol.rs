//! Wire format for tick batches
//!
//! The server sends each batch as a bare JSON array of 2-element arrays:
//! `[["AAPL", 173.2801], ["MSFT", 50.0]]`. No envelope, no sequence number,
//! no schema version. Decoding validates the whole payload up front so a bad
//! batch can be rejected before any state is touched.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::core::{Error, Result, Symbol};

/// Number of fractional digits prices are normalized to on ingest.
/// Everything downstream (storage, comparison, display) sees this precision.
pub const PRICE_DECIMALS: u32 = 2;

/// One validated tick, price already at display precision.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub symbol: Symbol,
    pub price: Decimal,
}

/// Decode a raw batch payload into ticks, in payload order.
///
/// The payload must be a JSON array; anything else is `MalformedPayload`.
/// Each entry must be a `[name, price]` pair with a non-empty string name and
/// a number representable as a `Decimal`; a violating entry is `InvalidTick`
/// with its index. Prices are rounded half-up to [`PRICE_DECIMALS`] here, so
/// two raw prices that round to the same value are indistinguishable from
/// this point on.
pub fn decode_batch(raw: &str) -> Result<Vec<Tick>> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;

    let mut ticks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let pair = entry.as_array().ok_or_else(|| Error::InvalidTick {
            index,
            reason: "entry is not an array".to_string(),
        })?;

        if pair.len() != 2 {
            return Err(Error::InvalidTick {
                index,
                reason: format!("expected [name, price], got {} elements", pair.len()),
            });
        }

        let name = pair[0].as_str().ok_or_else(|| Error::InvalidTick {
            index,
            reason: "name is not a string".to_string(),
        })?;
        if name.is_empty() {
            return Err(Error::InvalidTick {
                index,
                reason: "name is empty".to_string(),
            });
        }

        let raw_price = pair[1].as_f64().ok_or_else(|| Error::InvalidTick {
            index,
            reason: "price is not a number".to_string(),
        })?;

        ticks.push(Tick {
            symbol: Symbol::new(name),
            price: normalize_price(raw_price, index)?,
        });
    }

    Ok(ticks)
}

/// Convert a raw price to a `Decimal` rounded to display precision.
fn normalize_price(raw: f64, index: usize) -> Result<Decimal> {
    let price = Decimal::try_from(raw).map_err(|_| Error::InvalidTick {
        index,
        reason: format!("price {} is not representable", raw),
    })?;

    Ok(price.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero))
}
