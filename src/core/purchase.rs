//! Direct purchases and sales against the catalog.
//!
//! A purchase charges the item's base price plus its category fees, forwards
//! each fee-bearing category's charge into its clearing account, and records
//! everything atomically: one purchase transaction, one fee-forward
//! transaction per collecting category, and the corresponding balance
//! deltas. A sale credits a user for goods provided to the canteen.

use crate::core::fees::calculate_fees;
use crate::core::ledger;
use crate::core::money::{Cents, format_cents};
use crate::entities::{Category, Item, transaction, transaction::TransactionKind};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::{ModelTrait, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Charges a user for one catalog item at its base price plus category fees.
///
/// # Errors
/// Returns `NotFound` for unknown users or items, `Validation` for
/// group-order-only items (they have no direct price), and
/// `InsufficientBalance` when the buyer lacks backing for the full total.
pub async fn purchase_item(
    db: &DatabaseConnection,
    user_id: i64,
    item_id: i64,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;

    let item = Item::find_by_id(item_id)
        .one(&txn)
        .await?
        .ok_or(Error::NotFound {
            entity: "item",
            id: item_id,
        })?;
    if item.is_deleted {
        return Err(Error::NotFound {
            entity: "item",
            id: item_id,
        });
    }
    if item.group_order_only {
        return Err(Error::Validation {
            message: format!("item '{}' is only available through group orders", item.name),
        });
    }

    let categories = item.find_related(Category).all(&txn).await?;
    let fees = calculate_fees(item.price, &categories);
    let total = item.price + fees.total;

    let buyer = ledger::get_active_user(&txn, user_id).await?;
    ledger::ensure_backing(&buyer, -total)?;

    let now = Utc::now();
    let record = transaction::ActiveModel {
        kind: Set(TransactionKind::Purchase),
        amount: Set(-total),
        user_id: Set(Some(user_id)),
        counterpart_user_id: Set(None),
        clearing_account_id: Set(None),
        group_order_id: Set(None),
        item_id: Set(Some(item.id)),
        description: Set(format!("{} ({})", item.name, format_cents(total))),
        timestamp: Set(now),
        canceled: Set(false),
        canceled_by: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    ledger::apply_user_balance_delta(&txn, user_id, -total).await?;

    // Forward each collecting category's charge into its clearing account
    for charge in &fees.per_category {
        let Some(clearing_account_id) = charge.clearing_account_id else {
            continue;
        };
        if charge.charge == 0 {
            continue;
        }
        transaction::ActiveModel {
            kind: Set(TransactionKind::FeeForward),
            amount: Set(charge.charge),
            user_id: Set(Some(user_id)),
            counterpart_user_id: Set(None),
            clearing_account_id: Set(Some(clearing_account_id)),
            group_order_id: Set(None),
            item_id: Set(Some(item.id)),
            description: Set(format!(
                "fee for {} (category {})",
                item.name, charge.category_id
            )),
            timestamp: Set(now),
            canceled: Set(false),
            canceled_by: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        ledger::apply_clearing_balance_delta(&txn, clearing_account_id, charge.charge).await?;
    }

    txn.commit().await?;
    info!(user_id, item_id, total, "purchase completed");
    Ok(record)
}

/// Credits a user for goods provided to the canteen.
///
/// # Errors
/// Returns `Validation` for non-positive amounts and `NotFound` for unknown
/// users.
pub async fn record_sale(
    db: &DatabaseConnection,
    user_id: i64,
    amount: Cents,
    description: String,
) -> Result<transaction::Model> {
    if amount <= 0 {
        return Err(Error::Validation {
            message: format!("sale amount must be positive, got {amount}"),
        });
    }

    let txn = db.begin().await?;
    ledger::get_active_user(&txn, user_id).await?;

    let record = transaction::ActiveModel {
        kind: Set(TransactionKind::Sale),
        amount: Set(amount),
        user_id: Set(Some(user_id)),
        counterpart_user_id: Set(None),
        clearing_account_id: Set(None),
        group_order_id: Set(None),
        item_id: Set(None),
        description: Set(description),
        timestamp: Set(Utc::now()),
        canceled: Set(false),
        canceled_by: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    ledger::apply_user_balance_delta(&txn, user_id, amount).await?;

    txn.commit().await?;
    Ok(record)
}
