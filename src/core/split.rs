//! Split/allocation engine - Divides one aggregate paid amount across all
//! wished items of a group order.
//!
//! Two-pass algorithm: every entry first gets the even share of the total,
//! then manual per-entry overrides are applied and the residual
//! (total minus override sum) is redistributed evenly across the
//! non-overridden entries. Amounts are integer cents; the even share uses
//! floor division and the remainder cents go to the last non-overridden
//! entry in iteration order, so the allocation reconciles to the total
//! exactly. Recomputation is O(total entries) and deterministic; the split
//! is a fresh value produced on every call, never mutated incrementally.

use crate::core::aggregate::{BaseSplit, SplitEntry, UserSplit};
use crate::core::money::Cents;
use crate::errors::{Error, Result};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A warning state that requires operator attention before committing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SplitWarning {
    /// The override sum exceeds the total paid amount; all non-overridden
    /// entries collapsed to zero.
    OverCommitted {
        /// Sum of all override values in cents
        overridden_sum: Cents,
    },
    /// Every entry is overridden but the overrides fall short of the total;
    /// the residue cannot be redistributed without breaking override
    /// exactness.
    Unallocated {
        /// Unallocated residue in cents
        amount: Cents,
    },
}

/// A computed cost allocation, discarded once committed into transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    /// The group order this split was computed for
    pub group_order_id: i64,
    /// Per-user allocation, mirroring the base split's structure
    pub users: Vec<UserSplit>,
    /// The total paid amount being distributed, in cents
    pub total_amount: Cents,
    /// Total wished items; the divisor of the even split
    pub total_items: usize,
    /// Sum of all override values present, in cents
    pub overridden_sum: Cents,
    /// Number of entries carrying an override
    pub overridden_count: usize,
    /// Set when the allocation needs operator attention before commit
    pub warning: Option<SplitWarning>,
}

impl Split {
    /// Flat iteration over (user id, wish id, entry), in allocation order.
    pub fn entries(&self) -> impl Iterator<Item = (i64, i64, &SplitEntry)> {
        self.users.iter().flat_map(|u| {
            u.wishes
                .iter()
                .flat_map(move |w| w.entries.iter().map(move |e| (u.user_id, w.wish_id, e)))
        })
    }

    /// Sum of all final costs in cents.
    #[must_use]
    pub fn allocated_total(&self) -> Cents {
        self.entries().map(|(_, _, e)| e.final_cost).sum()
    }

    /// Sum of one user's final costs in cents.
    #[must_use]
    pub fn user_total(&self, user_id: i64) -> Cents {
        self.users
            .iter()
            .filter(|u| u.user_id == user_id)
            .flat_map(|u| u.wishes.iter())
            .flat_map(|w| w.entries.iter())
            .map(|e| e.final_cost)
            .sum()
    }
}

/// Computes the cost allocation for a base split.
///
/// `overrides` maps wish-item line ids to manually fixed costs; overridden
/// entries always resolve to their override exactly.
///
/// # Errors
/// Returns `Validation` for a negative total amount, a negative override
/// value, or an override keyed by an unknown wish-item id. Zero total items
/// is not an error; every cost is simply zero.
pub fn compute_split(
    base: BaseSplit,
    total_amount: Cents,
    overrides: &HashMap<i64, Cents>,
) -> Result<Split> {
    if total_amount < 0 {
        return Err(Error::Validation {
            message: format!("total amount must not be negative, got {total_amount}"),
        });
    }

    let known_ids: HashSet<i64> = base.entries().map(|e| e.wish_item_id).collect();
    for (&wish_item_id, &value) in overrides {
        if !known_ids.contains(&wish_item_id) {
            return Err(Error::Validation {
                message: format!("override references unknown wish item {wish_item_id}"),
            });
        }
        if value < 0 {
            return Err(Error::Validation {
                message: format!("override for wish item {wish_item_id} must not be negative, got {value}"),
            });
        }
    }

    let total_items = base.total_items;
    let default_cost = if total_items > 0 {
        total_amount / total_items as i64
    } else {
        0
    };

    let mut overridden_sum: Cents = 0;
    let mut overridden_count = 0usize;
    for entry in base.entries() {
        if let Some(&value) = overrides.get(&entry.wish_item_id) {
            overridden_sum += value;
            overridden_count += 1;
        }
    }
    let remaining_items = total_items - overridden_count;

    let (price_per_remaining, residual, warning) = if overridden_sum > total_amount {
        (0, 0, Some(SplitWarning::OverCommitted { overridden_sum }))
    } else if remaining_items > 0 {
        let pool = total_amount - overridden_sum;
        let per = pool / remaining_items as i64;
        (per, pool - per * remaining_items as i64, None)
    } else {
        let leftover = total_amount - overridden_sum;
        let warning = (leftover > 0).then_some(SplitWarning::Unallocated { amount: leftover });
        (0, 0, warning)
    };

    let mut users = base.users;
    let mut non_overridden_seen = 0usize;
    for user in &mut users {
        for wish in &mut user.wishes {
            for entry in &mut wish.entries {
                entry.default_cost = default_cost;
                if let Some(&value) = overrides.get(&entry.wish_item_id) {
                    entry.overwritten_cost = Some(value);
                    entry.final_cost = value;
                } else {
                    non_overridden_seen += 1;
                    entry.overwritten_cost = None;
                    entry.final_cost = if non_overridden_seen == remaining_items {
                        // Last non-overridden entry absorbs the remainder cents
                        price_per_remaining + residual
                    } else {
                        price_per_remaining
                    };
                }
            }
        }
    }

    Ok(Split {
        group_order_id: base.group_order_id,
        users,
        total_amount,
        total_items,
        overridden_sum,
        overridden_count,
        warning,
    })
}
