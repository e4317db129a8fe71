//! Exact fixed-point arithmetic for prices, quantities, and fees.
//!
//! Binary floating point never appears anywhere in this crate: every price,
//! quantity, and fee is a [`rust_decimal::Decimal`], which carries up to 28-29
//! significant digits, comfortably over the 18-digit floor this engine requires.

use rust_decimal::{Decimal, RoundingStrategy};

/// A price, in quote-currency units.
pub type Price = Decimal;

/// A quantity, in base-currency units.
pub type Quantity = Decimal;

/// Fee quantization scale: 10^-8, matching crypto-exchange convention.
const FEE_SCALE: u32 = 8;

/// Quantize a value to 8 fractional digits using bankers' rounding
/// (round-half-to-even).
///
/// The source this engine was derived from quantizes with no explicit rounding
/// override, which defaults to round-half-to-even; this crate applies that same
/// rounding strategy everywhere a value is quantized, not only for fees, so the
/// whole engine has one rounding discipline.
pub fn quantize8(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(FEE_SCALE, RoundingStrategy::MidpointNearestEven)
}
