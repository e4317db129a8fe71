//! The engine's error hierarchy.
//!
//! Mirrors the four concrete error kinds from the source plus a `Fatal`
//! variant for invariant violations. Only `Fatal` indicates a bug in the
//! matching algorithm itself; every other variant is an expected, recoverable
//! outcome of ordinary engine operation.

use thiserror::Error;

use crate::ids::OrderId;

/// A specific invariant that matching must never actually violate. Surfacing
/// this variant at all is a defect in the matching code, not a data problem;
/// callers should not attempt to continue past it.
#[derive(Debug, Error)]
pub enum FatalInvariant {
    #[error("book for {symbol} is crossed: best bid {best_bid} >= best ask {best_ask}")]
    CrossedBook {
        symbol: String,
        best_bid: String,
        best_ask: String,
    },
    #[error("order index entry for {0} has no matching price-level order")]
    CorruptedIndex(OrderId),
    #[error("price level at {price} for {symbol} has negative total_quantity: {quantity}")]
    NegativeLevelQuantity {
        symbol: String,
        price: String,
        quantity: String,
    },
}

/// All errors `MatchingEngine` can produce.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Synchronous rejection before any book mutation (§7). The order is
    /// never admitted; no counters advance, no trades are emitted.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// FOK could not be filled in full; the book is left exactly as it was.
    #[error("insufficient liquidity to fill order {order_id} completely")]
    InsufficientLiquidity { order_id: OrderId },

    /// A cancel or query referenced an order the engine has no record of.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// Reserved for future quote-currency policy; not raised by any path
    /// today; any well-formed symbol is currently accepted.
    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    /// A detected invariant violation. Never meant to be caught and ignored.
    #[error("fatal invariant violation: {0}")]
    Fatal(#[from] FatalInvariant),
}
