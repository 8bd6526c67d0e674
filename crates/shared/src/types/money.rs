//! Money rounding with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every monetary step is rounded half away from zero to two decimal places,
//! and rounding is applied at each intermediate step rather than once at the end.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for every stored monetary amount.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary value half away from zero to two decimal places.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `percent` percent of `base`, rounded with [`round_money`].
///
/// Returns `None` if `base * percent` overflows.
#[must_use]
pub fn percent_of(base: Decimal, percent: Decimal) -> Option<Decimal> {
    base.checked_mul(percent)
        .map(|product| round_money(product / Decimal::ONE_HUNDRED))
}
