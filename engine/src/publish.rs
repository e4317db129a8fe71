//! Fan-out of BBO/depth and trade events to subscribed listeners.
//!
//! The source mixed event fan-out into the matching path via ad-hoc
//! fire-and-forget tasks. This module re-architects that as a
//! `SubscriberRegistry` the engine hands events to synchronously: `send()` on
//! a `tokio::sync::broadcast` channel never blocks and never awaits, so the
//! matching thread is never suspended by a slow subscriber. A subscriber that
//! falls behind discovers exactly how many events it missed the next time it
//! receives (`RecvError::Lagged(n)`) — this is the "bounded queue,
//! drop-oldest with a drop counter" policy the specification recommends,
//! expressed through tokio's existing primitive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use thiserror::Error;
use tokio::sync::broadcast;

use crate::bbo::{Bbo, MarketEvent, OrderBookSnapshot};
use crate::trade::Trade;

/// The two independently-subscribable event streams per symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    BboAndDepth,
    Trades,
}

#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("symbol {symbol} already has the maximum of {limit} subscribers for {stream:?}")]
    TooManySubscribers {
        symbol: String,
        limit: usize,
        stream: StreamKind,
    },
}

/// Owns one broadcast channel per `(symbol, stream kind)`, created lazily on
/// first subscribe.
pub struct SubscriberRegistry {
    buffer_capacity: usize,
    max_subscribers_per_symbol: usize,
    market_channels: RwLock<HashMap<String, broadcast::Sender<MarketEvent>>>,
    trade_channels: RwLock<HashMap<String, broadcast::Sender<Trade>>>,
}

impl SubscriberRegistry {
    pub fn new(buffer_capacity: usize, max_subscribers_per_symbol: usize) -> Self {
        Self {
            buffer_capacity,
            max_subscribers_per_symbol,
            market_channels: RwLock::new(HashMap::new()),
            trade_channels: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe_market_data(
        &self,
        symbol: &str,
    ) -> Result<broadcast::Receiver<MarketEvent>, SubscribeError> {
        let mut channels = self.market_channels.write().unwrap();
        let sender = channels
            .entry(symbol.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_capacity).0);
        if sender.receiver_count() >= self.max_subscribers_per_symbol {
            return Err(SubscribeError::TooManySubscribers {
                symbol: symbol.to_string(),
                limit: self.max_subscribers_per_symbol,
                stream: StreamKind::BboAndDepth,
            });
        }
        Ok(sender.subscribe())
    }

    pub fn subscribe_trades(
        &self,
        symbol: &str,
    ) -> Result<broadcast::Receiver<Trade>, SubscribeError> {
        let mut channels = self.trade_channels.write().unwrap();
        let sender = channels
            .entry(symbol.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_capacity).0);
        if sender.receiver_count() >= self.max_subscribers_per_symbol {
            return Err(SubscribeError::TooManySubscribers {
                symbol: symbol.to_string(),
                limit: self.max_subscribers_per_symbol,
                stream: StreamKind::Trades,
            });
        }
        Ok(sender.subscribe())
    }

    /// Hand an event to any subscribers of this symbol's market-data stream.
    /// A `send` error just means nobody is listening; that is not a failure.
    fn publish_market_event(&self, symbol: &str, event: MarketEvent) {
        if let Some(sender) = self.market_channels.read().unwrap().get(symbol) {
            let _ = sender.send(event);
        }
    }

    fn publish_trade_event(&self, symbol: &str, trade: Trade) {
        if let Some(sender) = self.trade_channels.read().unwrap().get(symbol) {
            let _ = sender.send(trade);
        }
    }
}

/// Publishes BBO updates and L2 depth snapshots, and caches the last BBO
/// published per symbol for synchronous lookup without recomputation.
pub struct MarketDataPublisher {
    registry: Arc<SubscriberRegistry>,
    bbo_cache: Mutex<HashMap<String, Bbo>>,
}

impl MarketDataPublisher {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            registry,
            bbo_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, symbol: &str) -> Result<broadcast::Receiver<MarketEvent>, SubscribeError> {
        self.registry.subscribe_market_data(symbol)
    }

    pub fn publish_bbo_update(&self, symbol: &str, bbo: Bbo) {
        self.bbo_cache
            .lock()
            .unwrap()
            .insert(symbol.to_string(), bbo.clone());
        self.registry.publish_market_event(symbol, MarketEvent::Bbo(bbo));
    }

    pub fn publish_orderbook_update(&self, symbol: &str, snapshot: OrderBookSnapshot) {
        self.registry
            .publish_market_event(symbol, MarketEvent::Depth(snapshot));
    }

    pub fn get_cached_bbo(&self, symbol: &str) -> Option<Bbo> {
        self.bbo_cache.lock().unwrap().get(symbol).cloned()
    }
}

/// Publishes trade executions. The aggressor side on each trade is already
/// the taker's side by construction; this publisher does no further work
/// beyond fan-out.
pub struct TradePublisher {
    registry: Arc<SubscriberRegistry>,
}

impl TradePublisher {
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self { registry }
    }

    pub fn subscribe(&self, symbol: &str) -> Result<broadcast::Receiver<Trade>, SubscribeError> {
        self.registry.subscribe_trades(symbol)
    }

    pub fn publish_trade(&self, trade: Trade) {
        let symbol = trade.symbol.clone();
        self.registry.publish_trade_event(&symbol, trade);
    }
}
