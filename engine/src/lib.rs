//! A price-time-priority matching engine for crypto spot symbols.
//!
//! Every price, quantity, and fee is a [`rust_decimal::Decimal`]; there is no
//! binary floating point anywhere on the matching path. A single
//! [`matching::MatchingEngine`] owns one [`book::OrderBook`] per symbol plus
//! the pending stop-order lists, and is meant to be driven by one writer at a
//! time — either directly, or through [`worker::EngineHandle`] if the
//! embedding application needs to call in from multiple threads.

pub mod bbo;
pub mod book;
pub mod config;
pub mod decimal;
pub mod error;
pub mod fees;
pub mod ids;
pub mod matching;
pub mod order;
pub mod price_level;
pub mod publish;
pub mod snapshot;
pub mod trade;
pub mod worker;

pub use bbo::{Bbo, MarketEvent, OrderBookSnapshot};
pub use book::OrderBook;
pub use config::{EngineConfig, LogFormat};
pub use decimal::{Price, Quantity};
pub use error::{EngineError, FatalInvariant};
pub use fees::FeeCalculator;
pub use ids::{IdGenerator, OrderId, TradeId};
pub use matching::{MatchingEngine, OrderResult};
pub use order::{NewOrderRequest, Order, OrderResultStatus, OrderStatus, OrderType, Side};
pub use publish::{MarketDataPublisher, SubscribeError, SubscriberRegistry, TradePublisher};
pub use snapshot::{EngineSnapshot, SnapshotHandle, SnapshotStore};
pub use trade::Trade;
pub use worker::{EngineHandle, EngineWorker};
