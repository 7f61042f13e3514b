//! Fee calculator - Computes category markups layered onto base prices.
//!
//! Each category contributes `fixed_markup + base * percentage_markup / 100`,
//! with absent markups treated as zero. Fees are additive across categories
//! and the per-category breakdown preserves input order for deterministic
//! display and audit. The functions here are pure: no validation, no side
//! effects, safe to call unboundedly and concurrently. Negative inputs are
//! the caller's responsibility to reject.

use crate::core::money::{Cents, percentage_of};
use crate::entities::category;

/// Fee charged by a single category, with its clearing destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCharge {
    /// The category that levies this charge
    pub category_id: i64,
    /// Charge in cents
    pub charge: Cents,
    /// Clearing account collecting the charge, if the category has one
    pub clearing_account_id: Option<i64>,
}

/// Aggregated fees for one charged base amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBreakdown {
    /// Sum of all per-category charges in cents
    pub total: Cents,
    /// Per-category charges, in the input order of the categories
    pub per_category: Vec<CategoryCharge>,
}

/// Computes the markup fees for a base price under the given categories.
#[must_use]
pub fn calculate_fees(base_price: Cents, categories: &[category::Model]) -> FeeBreakdown {
    let mut per_category = Vec::with_capacity(categories.len());
    let mut total: Cents = 0;

    for cat in categories {
        let fixed = cat.fixed_markup.unwrap_or(0);
        let percent = cat
            .percentage_markup
            .map_or(0, |pct| percentage_of(base_price, pct));
        let charge = fixed + percent;
        total += charge;
        per_category.push(CategoryCharge {
            category_id: cat.id,
            charge,
            clearing_account_id: cat.clearing_account_id,
        });
    }

    FeeBreakdown { total, per_category }
}

/// Base amount plus all category fees.
///
/// For group-order items this is the display total computed from the *final*
/// allocated cost, since such items carry no fixed nominal price.
#[must_use]
pub fn cost_with_fees(base: Cents, categories: &[category::Model]) -> Cents {
    base + calculate_fees(base, categories).total
}
