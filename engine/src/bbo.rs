//! Best-bid-and-offer and level-2 depth wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Price, Quantity};

/// Best bid and offer for one symbol at an instant. Either price may be
/// absent if that side of the book is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bbo {
    pub symbol: String,
    pub best_bid: Option<Price>,
    pub best_bid_quantity: Quantity,
    pub best_ask: Option<Price>,
    pub best_ask_quantity: Quantity,
    pub timestamp: DateTime<Utc>,
}

/// L2 order book snapshot: aggregated (price, quantity) pairs per level, top-N
/// on each side. Named `OrderBookSnapshot` per §3 of the specification this
/// crate implements; distinct from [`crate::snapshot::EngineSnapshot`], the
/// persistence-layer document that the same name would otherwise collide
/// with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    /// Descending by price.
    pub bids: Vec<(Price, Quantity)>,
    /// Ascending by price.
    pub asks: Vec<(Price, Quantity)>,
}

/// Everything published on the `bbo_and_depth` stream for a symbol.
///
/// Internally tagged so the wire shape matches `{"type": "bbo", ...}` /
/// `{"type": "orderbook", ...}` exactly, with both variants' fields flattened
/// alongside `type` at the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarketEvent {
    #[serde(rename = "bbo")]
    Bbo(Bbo),
    #[serde(rename = "orderbook")]
    Depth(OrderBookSnapshot),
}
