//! In-memory ticker state, merged incrementally from batch updates.
//!
//! The store is exclusively owned by the engine task. `apply_batch` takes
//! `&mut self` and runs to completion before the next batch is considered,
//! so no locking exists and readers never observe a half-applied batch.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::core::{Direction, InstrumentRecord, Result, Symbol};
use crate::protocol;

/// Latest known record per instrument, plus the published name listing.
///
/// Records are created on first sight of a name and mutated in place on every
/// later batch that mentions it. Nothing is ever removed; the store grows for
/// the life of the connection. The listing is sorted by symbol, which keeps
/// iteration order deterministic across runs.
#[derive(Debug, Default)]
pub struct TickerStore {
    records: BTreeMap<Symbol, InstrumentRecord>,
    names: Vec<Symbol>,
}

/// One listing-ordered display row, cloned out of the store so consumers
/// never hold a reference into live state.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct InstrumentRow {
    pub symbol: Symbol,
    pub price: Decimal,
    pub updated_at: DateTime<Utc>,
    pub direction: Direction,
}

impl TickerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one raw batch payload into the store.
    ///
    /// The payload is decoded and validated in full before any state is
    /// touched: a batch that fails to decode is rejected whole, leaving every
    /// record exactly as it was. After validation:
    ///
    /// 1. every existing record's direction is reset to `Unchanged`, so an
    ///    instrument absent from this batch does not keep showing the
    ///    previous batch's movement;
    /// 2. ticks are merged in payload order, each one compared against the
    ///    stored price as of that moment (a name repeated within one payload
    ///    is compared against the earlier occurrence's result);
    /// 3. the name listing is recomputed.
    ///
    /// Every record touched by the batch is stamped with `received_at`.
    pub fn apply_batch(&mut self, raw: &str, received_at: DateTime<Utc>) -> Result<()> {
        let ticks = protocol::decode_batch(raw)?;

        for record in self.records.values_mut() {
            record.direction = Direction::Unchanged;
        }

        for tick in ticks {
            match self.records.get_mut(&tick.symbol) {
                Some(record) => {
                    record.direction = Direction::between(record.price, tick.price);
                    record.price = tick.price;
                    record.updated_at = received_at;
                }
                None => {
                    // First sight: no prior price to compare against
                    self.records.insert(
                        tick.symbol,
                        InstrumentRecord {
                            price: tick.price,
                            updated_at: received_at,
                            direction: Direction::Unchanged,
                        },
                    );
                }
            }
        }

        self.names = self.records.keys().cloned().collect();
        Ok(())
    }

    /// Ordered listing of every instrument seen so far, as of the most
    /// recent completed batch.
    pub fn instruments(&self) -> &[Symbol] {
        &self.names
    }

    /// Look up the current record for an instrument by name.
    pub fn get(&self, name: &str) -> Option<&InstrumentRecord> {
        self.records.get(name)
    }

    /// Listing-ordered snapshot rows for the display layer.
    pub fn rows(&self) -> Vec<InstrumentRow> {
        self.names
            .iter()
            .map(|symbol| {
                let record = &self.records[symbol];
                InstrumentRow {
                    symbol: symbol.clone(),
                    price: record.price,
                    updated_at: record.updated_at,
                    direction: record.direction,
                }
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    fn price(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_sight_is_unchanged() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 100]]"#, ts(1)).unwrap();

        let record = store.get("AAPL").unwrap();
        assert_eq!(record.price, price("100"));
        assert_eq!(record.direction, Direction::Unchanged);
        assert_eq!(format!("{:.2}", record.price), "100.00");
        assert_eq!(store.instruments(), vec![Symbol::new("AAPL")]);
    }

    #[test]
    fn test_price_rise_is_up() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 100]]"#, ts(1)).unwrap();
        store.apply_batch(r#"[["AAPL", 101]]"#, ts(2)).unwrap();

        let record = store.get("AAPL").unwrap();
        assert_eq!(record.direction, Direction::Up);
        assert_eq!(record.price, price("101"));
    }

    #[test]
    fn test_price_drop_is_down() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 101]]"#, ts(1)).unwrap();
        store.apply_batch(r#"[["AAPL", 99.5]]"#, ts(2)).unwrap();

        assert_eq!(store.get("AAPL").unwrap().direction, Direction::Down);
    }

    #[test]
    fn test_same_price_is_unchanged() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 100]]"#, ts(1)).unwrap();
        store.apply_batch(r#"[["AAPL", 100.0]]"#, ts(2)).unwrap();

        assert_eq!(store.get("AAPL").unwrap().direction, Direction::Unchanged);
    }

    #[test]
    fn test_absent_instrument_resets_to_unchanged() {
        let mut store = TickerStore::new();
        store
            .apply_batch(r#"[["AAPL", 101], ["MSFT", 50]]"#, ts(1))
            .unwrap();
        store.apply_batch(r#"[["AAPL", 102]]"#, ts(2)).unwrap();
        assert_eq!(store.get("AAPL").unwrap().direction, Direction::Up);

        // MSFT absent from the next batch: movement must not go stale
        store.apply_batch(r#"[["AAPL", 99]]"#, ts(3)).unwrap();
        assert_eq!(store.get("AAPL").unwrap().direction, Direction::Down);
        assert_eq!(store.get("MSFT").unwrap().direction, Direction::Unchanged);
        assert_eq!(store.get("MSFT").unwrap().price, price("50"));
    }

    #[test]
    fn test_empty_batch_still_resets() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 100]]"#, ts(1)).unwrap();
        store.apply_batch(r#"[["AAPL", 105]]"#, ts(2)).unwrap();
        assert_eq!(store.get("AAPL").unwrap().direction, Direction::Up);

        store.apply_batch("[]", ts(3)).unwrap();
        assert_eq!(store.get("AAPL").unwrap().direction, Direction::Unchanged);
    }

    #[test]
    fn test_duplicate_name_in_one_batch_applies_sequentially() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 100]]"#, ts(1)).unwrap();

        // Second occurrence compares against the first occurrence's result
        store
            .apply_batch(r#"[["AAPL", 100], ["AAPL", 105]]"#, ts(2))
            .unwrap();

        let record = store.get("AAPL").unwrap();
        assert_eq!(record.direction, Direction::Up);
        assert_eq!(record.price, price("105"));
    }

    #[test]
    fn test_comparison_happens_after_rounding() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 10.005]]"#, ts(1)).unwrap();
        assert_eq!(store.get("AAPL").unwrap().price, price("10.01"));

        // 10.0051 rounds to the same 2-decimal value: no movement
        store.apply_batch(r#"[["AAPL", 10.0051]]"#, ts(2)).unwrap();
        assert_eq!(store.get("AAPL").unwrap().direction, Direction::Unchanged);
    }

    #[test]
    fn test_listing_is_sorted_with_no_duplicates() {
        let mut store = TickerStore::new();
        store
            .apply_batch(r#"[["MSFT", 50], ["AAPL", 100]]"#, ts(1))
            .unwrap();
        store
            .apply_batch(r#"[["GOOG", 90], ["AAPL", 101]]"#, ts(2))
            .unwrap();

        assert_eq!(
            store.instruments(),
            vec![Symbol::new("AAPL"), Symbol::new("GOOG"), Symbol::new("MSFT")]
        );
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_batch_timestamp_is_shared_and_resets_do_not_touch_it() {
        let mut store = TickerStore::new();
        store
            .apply_batch(r#"[["AAPL", 100], ["MSFT", 50]]"#, ts(1))
            .unwrap();
        assert_eq!(store.get("AAPL").unwrap().updated_at, ts(1));
        assert_eq!(store.get("MSFT").unwrap().updated_at, ts(1));

        store.apply_batch(r#"[["AAPL", 101]]"#, ts(2)).unwrap();
        assert_eq!(store.get("AAPL").unwrap().updated_at, ts(2));
        // MSFT was only reset, not updated
        assert_eq!(store.get("MSFT").unwrap().updated_at, ts(1));
    }

    #[test]
    fn test_malformed_payload_leaves_state_untouched() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 100]]"#, ts(1)).unwrap();
        store.apply_batch(r#"[["AAPL", 105]]"#, ts(2)).unwrap();

        let err = store.apply_batch("{broken", ts(3)).unwrap_err();
        assert!(matches!(err, crate::core::Error::MalformedPayload(_)));

        let record = store.get("AAPL").unwrap();
        assert_eq!(record.price, price("105"));
        assert_eq!(record.direction, Direction::Up);
        assert_eq!(record.updated_at, ts(2));
    }

    #[test]
    fn test_invalid_entry_aborts_whole_batch() {
        let mut store = TickerStore::new();
        store.apply_batch(r#"[["AAPL", 100]]"#, ts(1)).unwrap();
        store.apply_batch(r#"[["AAPL", 105]]"#, ts(2)).unwrap();

        // First entry is fine, second is not: neither must apply
        let err = store
            .apply_batch(r#"[["AAPL", 99], ["MSFT"]]"#, ts(3))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::core::Error::InvalidTick { index: 1, .. }
        ));

        let record = store.get("AAPL").unwrap();
        assert_eq!(record.price, price("105"));
        assert_eq!(record.direction, Direction::Up);
        assert!(store.get("MSFT").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rows_follow_listing_order() {
        let mut store = TickerStore::new();
        store
            .apply_batch(r#"[["MSFT", 50], ["AAPL", 100.456]]"#, ts(1))
            .unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, Symbol::new("AAPL"));
        assert_eq!(rows[0].price, price("100.46"));
        assert_eq!(rows[1].symbol, Symbol::new("MSFT"));
    }

    #[test]
    fn test_empty_store() {
        let store = TickerStore::new();
        assert!(store.is_empty());
        assert!(store.instruments().is_empty());
        assert!(store.get("AAPL").is_none());
        assert!(store.rows().is_empty());
    }
}
