//! Order and trade identifiers.
//!
//! The venue assigns sequential, zero-padded string identifiers rather than
//! random UUIDs: `ORD-0000000042`, `TRD-0000000007`. Both counters are owned by
//! the [`crate::matching::MatchingEngine`] and persisted through snapshots.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for an order, format `ORD-%010d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a trade, format `TRD-%010d`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub String);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TradeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Generates monotonically increasing order and trade identifiers.
///
/// Both counters are plain `u64`s rather than anything atomic: the engine is
/// single-writer by construction (§5 of the specification this crate
/// implements), so there is never concurrent access to mutate here.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct IdGenerator {
    order_seq: u64,
    trade_seq: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a generator to specific counter values, e.g. after a snapshot load.
    pub fn from_counters(order_seq: u64, trade_seq: u64) -> Self {
        Self {
            order_seq,
            trade_seq,
        }
    }

    pub fn order_counter(&self) -> u64 {
        self.order_seq
    }

    pub fn trade_counter(&self) -> u64 {
        self.trade_seq
    }

    pub fn next_order_id(&mut self) -> OrderId {
        self.order_seq += 1;
        OrderId(format!("ORD-{:010}", self.order_seq))
    }

    pub fn next_trade_id(&mut self) -> TradeId {
        self.trade_seq += 1;
        TradeId(format!("TRD-{:010}", self.trade_seq))
    }
}
