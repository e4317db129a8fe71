//! Engine configuration.
//!
//! Set once at construction and treated as immutable for the engine's
//! lifetime (§5's "shared-resource policy"): nothing on the matching path
//! ever mutates a field here. Fields the source's settings module defines
//! purely for the HTTP transport (`api_host`, `api_port`,
//! `max_websocket_connections`) are dropped — that surface is an explicit
//! Non-goal, not merely out of focus, so those fields have no referent left
//! to configure.

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Price;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Enable periodic automatic snapshots via [`crate::snapshot::SnapshotStore`].
    pub enable_persistence: bool,
    /// Seconds between automatic snapshots when `enable_persistence` is set.
    pub snapshot_interval_seconds: u64,
    /// Enable maker/taker fee calculation on every trade.
    pub enable_fees: bool,
    pub maker_fee_rate: Price,
    pub taker_fee_rate: Price,
    /// Per-symbol subscriber cap enforced by `SubscriberRegistry`.
    pub max_subscribers_per_symbol: usize,
    /// Default number of price levels returned by depth queries.
    pub depth_levels_default: usize,
    /// Capacity of the bounded command channel used by the worker-thread
    /// architecture in §5 option (a).
    pub order_queue_size: usize,
    /// Ambient logging configuration, kept from the source's settings module
    /// even though the logging backend itself is out of scope (§1).
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Console,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_persistence: false,
            snapshot_interval_seconds: 60,
            enable_fees: false,
            maker_fee_rate: dec!(0.001),
            taker_fee_rate: dec!(0.002),
            max_subscribers_per_symbol: 1000,
            depth_levels_default: 10,
            order_queue_size: 10_000,
            log_level: "INFO".to_string(),
            log_format: LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_settings() {
        let config = EngineConfig::default();
        assert!(!config.enable_persistence);
        assert_eq!(config.snapshot_interval_seconds, 60);
        assert_eq!(config.order_queue_size, 10_000);
        assert_eq!(config.depth_levels_default, 10);
    }
}
