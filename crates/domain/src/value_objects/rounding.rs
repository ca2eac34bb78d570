use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds `value` to `dp` decimal places, halves away from zero.
///
/// Goes through `Decimal` so that values such as `2.675` round the way they
/// read instead of following their binary representation. Non-finite or
/// out-of-range values are returned unchanged.
#[must_use]
pub fn round_half_away(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

/// `value` as a `Decimal` carrying exactly `dp` places, for display.
#[must_use]
pub fn to_fixed(value: f64, dp: u32) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| {
        let mut fixed = d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        fixed.rescale(dp);
        fixed
    })
}
