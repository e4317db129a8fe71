//! Maker/taker fee calculation.

use crate::decimal::{quantize8, Price};

/// Computes maker and taker fees on a trade's notional value at configured
/// rates, quantized to 8 fractional digits.
#[derive(Debug, Clone, Copy)]
pub struct FeeCalculator {
    maker_fee_rate: Price,
    taker_fee_rate: Price,
}

impl FeeCalculator {
    pub fn new(maker_fee_rate: Price, taker_fee_rate: Price) -> Self {
        Self {
            maker_fee_rate,
            taker_fee_rate,
        }
    }

    /// `(maker_fee, taker_fee)` for a trade of the given notional value
    /// (`price * quantity`).
    pub fn calculate_fees(&self, trade_value: Price) -> (Price, Price) {
        (
            self.calculate_maker_fee(trade_value),
            self.calculate_taker_fee(trade_value),
        )
    }

    pub fn calculate_maker_fee(&self, trade_value: Price) -> Price {
        quantize8(trade_value * self.maker_fee_rate)
    }

    pub fn calculate_taker_fee(&self, trade_value: Price) -> Price {
        quantize8(trade_value * self.taker_fee_rate)
    }

    /// `trade_value` minus the applicable fee for the given role.
    pub fn net_proceeds(&self, trade_value: Price, is_maker: bool) -> Price {
        let fee = if is_maker {
            self.calculate_maker_fee(trade_value)
        } else {
            self.calculate_taker_fee(trade_value)
        };
        trade_value - fee
    }

    pub fn fee_rates(&self) -> (Price, Price) {
        (self.maker_fee_rate, self.taker_fee_rate)
    }

    pub fn set_maker_fee_rate(&mut self, rate: Price) {
        self.maker_fee_rate = rate;
    }

    pub fn set_taker_fee_rate(&mut self, rate: Price) {
        self.taker_fee_rate = rate;
    }
}

impl Default for FeeCalculator {
    /// 0.1% maker, 0.2% taker, the same defaults the source venue ships with.
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self::new(dec!(0.001), dec!(0.002))
    }
}
