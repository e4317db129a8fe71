//! Point-in-time persistence of engine state.
//!
//! Rather than serialize each `OrderBook`'s internal `BTreeMap`/`VecDeque`
//! structure directly, a snapshot records every resting order flattened into
//! arrival order and replays them back through the ordinary `add_order` path
//! on load. Slower than a structural restore, but the book's invariants
//! (non-empty levels, correct aggregate quantities, FIFO order) come from the
//! same code path live traffic uses instead of being trusted from a file.

use std::collections::HashMap;
use std::io;

use serde::{Deserialize, Serialize};

use crate::book::OrderBook;
use crate::ids::IdGenerator;
use crate::matching::MatchingEngine;
use crate::order::Order;

/// Bumped whenever the snapshot document's shape changes in a way that
/// affects how `SnapshotStore::load` must interpret it.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub version: u32,
    pub order_counter: u64,
    pub trade_counter: u64,
    /// Every resting order across every symbol's book, sorted by
    /// `arrival_seq` so replay reproduces the original FIFO ordering.
    pub resting_orders: Vec<Order>,
    pub pending_stops: HashMap<String, Vec<Order>>,
}

/// Where a snapshot document is written to and read from. Implemented by
/// callers against whatever storage they use (local file, object store,
/// in-memory buffer in tests); this crate only defines the document shape
/// and the capture/replay logic.
pub trait SnapshotHandle {
    fn write(&mut self, snapshot: &EngineSnapshot) -> io::Result<()>;
    fn read(&mut self) -> io::Result<Option<EngineSnapshot>>;
}

pub struct SnapshotStore;

impl SnapshotStore {
    /// Build a snapshot document from the engine's current state without
    /// touching any handle.
    pub fn capture(engine: &MatchingEngine) -> EngineSnapshot {
        let mut resting_orders: Vec<Order> = engine
            .books()
            .values()
            .flat_map(OrderBook::all_orders)
            .cloned()
            .collect();
        resting_orders.sort_by_key(|order| order.arrival_seq);

        EngineSnapshot {
            version: SNAPSHOT_VERSION,
            order_counter: engine.id_generator().order_counter(),
            trade_counter: engine.id_generator().trade_counter(),
            resting_orders,
            pending_stops: engine.pending_stops().clone(),
        }
    }

    pub fn save(engine: &MatchingEngine, handle: &mut impl SnapshotHandle) -> io::Result<()> {
        handle.write(&Self::capture(engine))
    }

    /// Replace `engine`'s books and pending-stop lists with a snapshot read
    /// from `handle`. Returns `Ok(false)` if the handle holds nothing yet
    /// (e.g. first startup), in which case `engine` is left untouched.
    pub fn load(engine: &mut MatchingEngine, handle: &mut impl SnapshotHandle) -> io::Result<bool> {
        let Some(mut snapshot) = handle.read()? else {
            return Ok(false);
        };
        snapshot.resting_orders.sort_by_key(|order| order.arrival_seq);

        let mut books: HashMap<String, OrderBook> = HashMap::new();
        for order in snapshot.resting_orders {
            let symbol = order.symbol.clone();
            books
                .entry(symbol.clone())
                .or_insert_with(|| OrderBook::new(symbol))
                .add_order(order);
        }
        for symbol in snapshot.pending_stops.keys() {
            books
                .entry(symbol.clone())
                .or_insert_with(|| OrderBook::new(symbol.clone()));
        }

        let id_gen = IdGenerator::from_counters(snapshot.order_counter, snapshot.trade_counter);
        engine.restore(books, snapshot.pending_stops, id_gen);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::decimal::Price;
    use crate::order::{NewOrderRequest, OrderType, Side};
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct MemoryHandle {
        bytes: Option<Vec<u8>>,
    }

    impl SnapshotHandle for MemoryHandle {
        fn write(&mut self, snapshot: &EngineSnapshot) -> io::Result<()> {
            self.bytes = Some(serde_json::to_vec(snapshot)?);
            Ok(())
        }

        fn read(&mut self) -> io::Result<Option<EngineSnapshot>> {
            match &self.bytes {
                Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
                None => Ok(None),
            }
        }
    }

    fn limit_request(side: Side, price: Price, qty: Price) -> NewOrderRequest {
        NewOrderRequest {
            symbol: "BTC-USDT".to_string(),
            order_type: OrderType::Limit,
            side,
            quantity: qty,
            price: Some(price),
            stop_price: None,
        }
    }

    #[test]
    fn load_with_nothing_written_returns_false_and_leaves_engine_alone() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let mut handle = MemoryHandle::default();
        assert!(!SnapshotStore::load(&mut engine, &mut handle).unwrap());
        assert!(engine.get_bbo("BTC-USDT").is_none());
    }

    #[test]
    fn snapshot_round_trips_resting_orders_and_counters() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        engine
            .process_order(limit_request(Side::Buy, dec!(50000), dec!(1)))
            .unwrap();
        engine
            .process_order(limit_request(Side::Buy, dec!(49900), dec!(2)))
            .unwrap();

        let mut handle = MemoryHandle::default();
        SnapshotStore::save(&engine, &mut handle).unwrap();

        let mut restored = MatchingEngine::new(EngineConfig::default());
        assert!(SnapshotStore::load(&mut restored, &mut handle).unwrap());
        assert_eq!(
            restored.get_bbo("BTC-USDT").unwrap().best_bid,
            Some(dec!(50000))
        );
        assert_eq!(restored.id_generator().order_counter(), 2);

        // The restored generator continues from where the snapshot left off.
        let next = restored
            .process_order(limit_request(Side::Sell, dec!(60000), dec!(1)))
            .unwrap();
        assert_eq!(next.order_id.as_str(), "ORD-0000000003");
    }

    #[test]
    fn snapshot_preserves_pending_stop_orders() {
        let mut engine = MatchingEngine::new(EngineConfig::default());
        let mut stop = NewOrderRequest {
            symbol: "BTC-USDT".to_string(),
            order_type: OrderType::StopLoss,
            side: Side::Sell,
            quantity: dec!(1),
            price: None,
            stop_price: Some(dec!(49000)),
        };
        engine.process_order(stop.clone()).unwrap();
        stop.quantity = dec!(2);
        engine.process_order(stop).unwrap();

        let mut handle = MemoryHandle::default();
        SnapshotStore::save(&engine, &mut handle).unwrap();

        let mut restored = MatchingEngine::new(EngineConfig::default());
        SnapshotStore::load(&mut restored, &mut handle).unwrap();
        assert_eq!(restored.pending_stop_count("BTC-USDT"), 2);
    }
}
