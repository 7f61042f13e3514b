//! Group order aggregator - Normalizes a group order's wishes into the
//! per-user skeleton the split engine fills in.
//!
//! Users appear in first-seen order; wish groups keep their originating wish
//! id so user-level edits stay traceable, and items keep their in-wish
//! order. Cost fields start at zero and are populated by
//! [`crate::core::split::compute_split`]. `build_base_split` is a pure
//! derivation over already-fetched rows; `load_base_split` is its
//! persistence-facing loader and must be re-run whenever the underlying
//! group order changes.

use crate::core::money::Cents;
use crate::entities::{GroupOrder, Item, ProcurementWish, WishItem, item, procurement_wish, wish_item};
use crate::errors::{Error, Result};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;

/// One wished item line with its (to-be-)allocated costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitEntry {
    /// The wish line this entry was derived from; overrides are keyed by this id
    pub wish_item_id: i64,
    /// The wished catalog item
    pub item_id: i64,
    /// Item name, carried along for display and transaction descriptions
    pub item_name: String,
    /// Even share of the total before overrides are applied, in cents
    pub default_cost: Cents,
    /// Manually overridden cost, if any
    pub overwritten_cost: Option<Cents>,
    /// Resolved cost used at commit, in cents
    pub final_cost: Cents,
}

/// The entries of one originating wish, kept together for traceability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishGroup {
    /// The originating procurement wish
    pub wish_id: i64,
    /// Entries in the order the user listed them
    pub entries: Vec<SplitEntry>,
}

/// All wish groups of one participating user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSplit {
    /// The participating user
    pub user_id: i64,
    /// Wish groups in the order the wishes were placed
    pub wishes: Vec<WishGroup>,
}

/// The normalized skeleton of a group order's wishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseSplit {
    /// The aggregated group order
    pub group_order_id: i64,
    /// Participating users in first-seen order
    pub users: Vec<UserSplit>,
    /// Total wished items across all wishes; the divisor for the even split
    pub total_items: usize,
}

impl BaseSplit {
    /// Flat iteration over every entry, in user-then-wish-then-item order.
    pub fn entries(&self) -> impl Iterator<Item = &SplitEntry> {
        self.users
            .iter()
            .flat_map(|u| u.wishes.iter())
            .flat_map(|w| w.entries.iter())
    }
}

/// Builds the base split from fetched (wish, lines) rows.
///
/// Rows must be in wish-placement order; lines must be in in-wish position
/// order. Pure, no side effects.
#[must_use]
pub fn build_base_split(
    group_order_id: i64,
    rows: Vec<(procurement_wish::Model, Vec<(wish_item::Model, item::Model)>)>,
) -> BaseSplit {
    let mut users: Vec<UserSplit> = Vec::new();
    let mut total_items = 0usize;

    for (wish, lines) in rows {
        let entries: Vec<SplitEntry> = lines
            .into_iter()
            .map(|(line, item)| SplitEntry {
                wish_item_id: line.id,
                item_id: item.id,
                item_name: item.name,
                default_cost: 0,
                overwritten_cost: None,
                final_cost: 0,
            })
            .collect();
        total_items += entries.len();

        let group = WishGroup {
            wish_id: wish.id,
            entries,
        };
        match users.iter_mut().find(|u| u.user_id == wish.user_id) {
            Some(user) => user.wishes.push(group),
            None => users.push(UserSplit {
                user_id: wish.user_id,
                wishes: vec![group],
            }),
        }
    }

    BaseSplit {
        group_order_id,
        users,
        total_items,
    }
}

/// Loads a group order's wishes and derives its base split.
///
/// # Errors
/// Returns `NotFound` if the group order does not exist or a wished item has
/// been removed from the catalog; database errors are propagated.
pub async fn load_base_split(
    db: &DatabaseConnection,
    group_order_id: i64,
) -> Result<BaseSplit> {
    GroupOrder::find_by_id(group_order_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "group order",
            id: group_order_id,
        })?;

    let wishes = ProcurementWish::find()
        .filter(procurement_wish::Column::GroupOrderId.eq(group_order_id))
        .order_by_asc(procurement_wish::Column::Id)
        .all(db)
        .await?;

    let mut rows = Vec::with_capacity(wishes.len());
    for wish in wishes {
        let lines = WishItem::find()
            .filter(wish_item::Column::WishId.eq(wish.id))
            .find_also_related(Item)
            .order_by_asc(wish_item::Column::Position)
            .all(db)
            .await?;

        let mut resolved = Vec::with_capacity(lines.len());
        for (line, maybe_item) in lines {
            let item = maybe_item.ok_or(Error::NotFound {
                entity: "item",
                id: line.item_id,
            })?;
            resolved.push((line, item));
        }
        rows.push((wish, resolved));
    }

    Ok(build_base_split(group_order_id, rows))
}
