//! Direct balance transfers between users.
//!
//! A transfer is one ledger transaction (actor debited, counterpart
//! credited) plus both balance deltas, applied atomically. The sender's
//! backing is checked up front; recipients can always receive.

use crate::core::ledger;
use crate::core::money::{Cents, format_cents};
use crate::entities::{transaction, transaction::TransactionKind};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::info;

/// Moves `amount` cents from one user's balance to another's.
///
/// # Errors
/// Returns `Validation` for non-positive amounts or a self-transfer,
/// `NotFound` for unknown users, and `InsufficientBalance` when the sender
/// lacks backing and disallows overdraw.
pub async fn transfer(
    db: &DatabaseConnection,
    from_user_id: i64,
    to_user_id: i64,
    amount: Cents,
    description: String,
) -> Result<transaction::Model> {
    if amount <= 0 {
        return Err(Error::Validation {
            message: format!("transfer amount must be positive, got {amount}"),
        });
    }
    if from_user_id == to_user_id {
        return Err(Error::Validation {
            message: "cannot transfer to the same user".to_string(),
        });
    }

    let txn = db.begin().await?;

    let sender = ledger::get_active_user(&txn, from_user_id).await?;
    ledger::get_active_user(&txn, to_user_id).await?;
    ledger::ensure_backing(&sender, -amount)?;

    let record = transaction::ActiveModel {
        kind: Set(TransactionKind::Transfer),
        amount: Set(-amount),
        user_id: Set(Some(from_user_id)),
        counterpart_user_id: Set(Some(to_user_id)),
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

    ledger::apply_user_balance_delta(&txn, from_user_id, -amount).await?;
    ledger::apply_user_balance_delta(&txn, to_user_id, amount).await?;

    txn.commit().await?;
    info!(
        from_user_id,
        to_user_id,
        amount = %format_cents(amount),
        "transfer completed"
    );
    Ok(record)
}
