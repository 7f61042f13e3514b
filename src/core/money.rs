//! Money utilities for precise cent arithmetic.
//!
//! All stored amounts are integer cents (`i64`), which keeps ledger
//! reconciliation exact. `rust_decimal` is used only for intermediate
//! percentage arithmetic, rounded half-up to whole cents before anything is
//! stored or summed.

use rust_decimal::prelude::*;

/// A monetary amount in cents.
pub type Cents = i64;

/// Rounds a decimal cent amount to whole cents, half-up.
///
/// Cent amounts derived from `i64` inputs and catalog percentages always fit
/// in an `i64`; non-representable values collapse to zero.
#[must_use]
pub fn round_to_cents(value: Decimal) -> Cents {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Applies a percentage (0-100) to a cent amount, rounding half-up.
///
/// Non-finite percentages contribute nothing; callers validate percentage
/// ranges when categories are created or seeded.
#[must_use]
pub fn percentage_of(base: Cents, percent: f64) -> Cents {
    let Some(rate) = Decimal::from_f64(percent) else {
        return 0;
    };
    round_to_cents(Decimal::from(base) * rate / Decimal::ONE_HUNDRED)
}

/// Converts a major-unit amount (e.g. `2.50` euros) to cents, half-up.
///
/// Returns `None` for non-finite input.
#[must_use]
pub fn cents_from_major(value: f64) -> Option<Cents> {
    let decimal = Decimal::from_f64(value)?;
    Some(round_to_cents(decimal * Decimal::ONE_HUNDRED))
}

/// Formats a cent amount as a major-unit string, e.g. `-1250` -> `"-12.50"`.
#[must_use]
pub fn format_cents(amount: Cents) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}
