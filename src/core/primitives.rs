use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds `value` to `decimals` places, ties to even on the exact binary value.
///
/// Matches how analysis scripts round the exported float columns, so
/// `2.675` (stored as `2.67499999...`) rounds down to `2.67`.
/// Non-finite values are returned unchanged.
#[must_use]
pub fn round_dp(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    Decimal::from_f64_retain(value)
        .or_else(|| Decimal::from_f64(value))
        .map(|decimal| {
            decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointNearestEven)
        })
        .and_then(|rounded| rounded.to_f64())
        .unwrap_or(value)
}
