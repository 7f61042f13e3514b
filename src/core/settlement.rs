//! Settlement committer - Turns a finalized split into ledger transactions,
//! and reverses previously committed settlements.
//!
//! Both operations run inside one database transaction: the conditional
//! status flip (filtered on the expected current status) serializes
//! concurrent commit/revert attempts, and every transaction insert and
//! balance change either lands together with it or not at all. An error at
//! any point drops the uncommitted transaction, which SeaORM rolls back, so
//! a half-settled order is never observable.
//!
//! Policy: commit enforces account backing per participant. A user whose
//! balance cannot cover their share, and who does not allow overdraw, aborts
//! the entire commit with `InsufficientBalance`.

use crate::core::ledger;
use crate::core::lifecycle::{self, Transition};
use crate::core::money::format_cents;
use crate::core::orders::get_group_order;
use crate::core::split::Split;
use crate::entities::{
    GroupOrder, ProcurementWish, Transaction, WishItem, group_order, procurement_wish,
    transaction, transaction::TransactionKind, wish_item,
};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::{Set, TransactionTrait, prelude::*};
use std::collections::HashSet;
use tracing::{info, warn};

/// Commits a finalized split: one procurement-settlement transaction per
/// (user, wish, item) tuple, each decrementing that user's balance by its
/// final cost, and the group order flipped to Settled.
///
/// A split carrying a warning (over-committed or unallocated residue) is
/// only committed when the operator passes `accept_warning`.
///
/// # Errors
/// Returns `Forbidden` for non-admins, `Validation` for an unacknowledged
/// split or a stale one (its wish lines no longer match the order's),
/// `Conflict` if the order is not in the orders-closed state (including
/// losing a commit race), and `InsufficientBalance` if any participant
/// lacks backing.
pub async fn commit_settlement(
    db: &DatabaseConnection,
    group_order_id: i64,
    split: &Split,
    acting_admin_id: i64,
    accept_warning: bool,
) -> Result<()> {
    let admin = ledger::require_admin(db, acting_admin_id).await?;

    if split.group_order_id != group_order_id {
        return Err(Error::Validation {
            message: format!(
                "split was computed for group order {}, not {group_order_id}",
                split.group_order_id
            ),
        });
    }
    if let Some(warning) = &split.warning {
        if !accept_warning {
            return Err(Error::Validation {
                message: format!(
                    "split requires operator attention before commit: {warning:?}"
                ),
            });
        }
        warn!(group_order_id, ?warning, "committing split with acknowledged warning");
    }

    let txn = db.begin().await?;

    let order = get_group_order(&txn, group_order_id).await?;
    let target = lifecycle::check_transition(&order, Transition::Settle)?;

    // A split computed before the wish set reached its final shape must not
    // commit: a late wish would settle for free with no audit trace.
    let wish_ids: Vec<i64> = ProcurementWish::find()
        .filter(procurement_wish::Column::GroupOrderId.eq(group_order_id))
        .all(&txn)
        .await?
        .iter()
        .map(|w| w.id)
        .collect();
    let current_lines: HashSet<i64> = WishItem::find()
        .filter(wish_item::Column::WishId.is_in(wish_ids))
        .all(&txn)
        .await?
        .iter()
        .map(|l| l.id)
        .collect();
    let split_lines: HashSet<i64> = split.entries().map(|(_, _, e)| e.wish_item_id).collect();
    if split_lines != current_lines {
        return Err(Error::Validation {
            message: format!(
                "split is stale: it allocates {} wish lines, group order {group_order_id} now has {}",
                split_lines.len(),
                current_lines.len()
            ),
        });
    }

    let update = group_order::ActiveModel {
        status: Set(target),
        closed_by: Set(Some(admin.id)),
        ..Default::default()
    };
    let flipped = GroupOrder::update_many()
        .set(update)
        .filter(group_order::Column::Id.eq(group_order_id))
        .filter(group_order::Column::Status.eq(order.status))
        .exec(&txn)
        .await?;
    if flipped.rows_affected == 0 {
        // Lost a race after the pre-check; report the fresh status
        let current = get_group_order(&txn, group_order_id).await?;
        return Err(Error::Conflict {
            group_order_id,
            attempted: Transition::Settle.as_str(),
            status: current.status.as_str(),
        });
    }

    // Backing check per participant before any balance is touched
    for user_split in &split.users {
        let user = ledger::get_active_user(&txn, user_split.user_id).await?;
        ledger::ensure_backing(&user, -split.user_total(user.id))?;
    }

    let now = Utc::now();
    for (user_id, _wish_id, entry) in split.entries() {
        transaction::ActiveModel {
            kind: Set(TransactionKind::ProcurementSettlement),
            amount: Set(-entry.final_cost),
            user_id: Set(Some(user_id)),
            counterpart_user_id: Set(None),
            clearing_account_id: Set(None),
            group_order_id: Set(Some(group_order_id)),
            item_id: Set(Some(entry.item_id)),
            description: Set(format!(
                "{} ({}), share {}",
                entry.item_name,
                order.name,
                format_cents(entry.final_cost)
            )),
            timestamp: Set(now),
            canceled: Set(false),
            canceled_by: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        ledger::apply_user_balance_delta(&txn, user_id, -entry.final_cost).await?;
    }

    txn.commit().await?;
    info!(
        group_order_id,
        admin_id = admin.id,
        total = split.total_amount,
        participants = split.users.len(),
        "settlement committed"
    );
    Ok(())
}

/// Reverts a committed settlement: every non-canceled procurement-settlement
/// transaction of the order gets an offsetting reversal entry, the original
/// is flagged canceled, balances are restored, and the order returns to the
/// orders-closed state.
///
/// # Errors
/// Returns `Forbidden` for non-admins and `Conflict` if the order is not
/// Settled (never-settled, already-reverted, or losing a revert race).
pub async fn revert_settlement(
    db: &DatabaseConnection,
    group_order_id: i64,
    acting_admin_id: i64,
) -> Result<()> {
    let admin = ledger::require_admin(db, acting_admin_id).await?;

    let txn = db.begin().await?;

    let order = get_group_order(&txn, group_order_id).await?;
    let target = lifecycle::check_transition(&order, Transition::Revert)?;
    let update = group_order::ActiveModel {
        status: Set(target),
        reverted_by: Set(Some(admin.id)),
        ..Default::default()
    };
    let flipped = GroupOrder::update_many()
        .set(update)
        .filter(group_order::Column::Id.eq(group_order_id))
        .filter(group_order::Column::Status.eq(order.status))
        .exec(&txn)
        .await?;
    if flipped.rows_affected == 0 {
        let current = get_group_order(&txn, group_order_id).await?;
        return Err(Error::Conflict {
            group_order_id,
            attempted: Transition::Revert.as_str(),
            status: current.status.as_str(),
        });
    }

    let settled = Transaction::find()
        .filter(transaction::Column::GroupOrderId.eq(group_order_id))
        .filter(transaction::Column::Kind.eq(TransactionKind::ProcurementSettlement))
        .filter(transaction::Column::Canceled.eq(false))
        .all(&txn)
        .await?;

    let now = Utc::now();
    let reverted_count = settled.len();
    for original in settled {
        transaction::ActiveModel {
            kind: Set(TransactionKind::SettlementReversal),
            amount: Set(-original.amount),
            user_id: Set(original.user_id),
            counterpart_user_id: Set(None),
            clearing_account_id: Set(None),
            group_order_id: Set(Some(group_order_id)),
            item_id: Set(original.item_id),
            description: Set(format!("reversal: {}", original.description)),
            timestamp: Set(now),
            canceled: Set(false),
            canceled_by: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(user_id) = original.user_id {
            ledger::apply_user_balance_delta(&txn, user_id, -original.amount).await?;
        }

        let mut canceled: transaction::ActiveModel = original.into();
        canceled.canceled = Set(true);
        canceled.canceled_by = Set(Some(admin.id));
        canceled.update(&txn).await?;
    }

    txn.commit().await?;
    info!(
        group_order_id,
        admin_id = admin.id,
        reverted_count,
        "settlement reverted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::split::SplitWarning;
    use crate::core::{aggregate, split};
    use crate::entities::{User, group_order::OrderStatus, user};
    use crate::test_utils::*;
    use std::collections::HashMap;

    async fn balance_of(db: &DatabaseConnection, user_id: i64) -> i64 {
        User::find_by_id(user_id).one(db).await.unwrap().unwrap().balance
    }

    async fn settlement_transactions(
        db: &DatabaseConnection,
        group_order_id: i64,
    ) -> Vec<transaction::Model> {
        Transaction::find()
            .filter(transaction::Column::GroupOrderId.eq(group_order_id))
            .all(db)
            .await
            .unwrap()
    }

    /// Two users, three wished items, order already closed.
    /// Returns (db, admin, alice, bob, order id).
    async fn closed_order_scenario() -> Result<(DatabaseConnection, user::Model, user::Model, user::Model, i64)>
    {
        let db = setup_test_db().await?;
        let admin = create_admin_user(&db, "root").await?;
        let alice = create_user_with_balance(&db, "alice", 5000, false).await?;
        let bob = create_user_with_balance(&db, "bob", 5000, false).await?;
        let pizza = create_group_item(&db, "Pizza").await?;
        let salad = create_group_item(&db, "Salad").await?;
        let order = create_open_group_order(&db, "friday", admin.id).await?;

        crate::core::orders::place_wish(&db, order.id, alice.id, &[pizza.id]).await?;
        crate::core::orders::place_wish(&db, order.id, bob.id, &[pizza.id, salad.id]).await?;
        crate::core::orders::close_orders(&db, order.id, admin.id).await?;
        Ok((db, admin, alice, bob, order.id))
    }

    async fn compute(db: &DatabaseConnection, order_id: i64, total: i64) -> Result<split::Split> {
        let base = aggregate::load_base_split(db, order_id).await?;
        split::compute_split(base, total, &HashMap::new())
    }

    #[tokio::test]
    async fn test_commit_charges_final_costs() -> Result<()> {
        let (db, admin, alice, bob, order_id) = closed_order_scenario().await?;
        let split = compute(&db, order_id, 3000).await?;

        commit_settlement(&db, order_id, &split, admin.id, false).await?;

        assert_eq!(balance_of(&db, alice.id).await, 4000);
        assert_eq!(balance_of(&db, bob.id).await, 3000);

        let order = get_group_order(&db, order_id).await?;
        assert_eq!(order.status, OrderStatus::Settled);
        assert_eq!(order.closed_by, Some(admin.id));

        let txns = settlement_transactions(&db, order_id).await;
        assert_eq!(txns.len(), 3);
        assert!(txns.iter().all(|t| t.kind == TransactionKind::ProcurementSettlement));
        assert!(txns.iter().all(|t| t.amount == -1000));
        assert!(txns.iter().all(|t| !t.canceled));
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_uses_override_amounts() -> Result<()> {
        let (db, admin, alice, bob, order_id) = closed_order_scenario().await?;
        let base = aggregate::load_base_split(&db, order_id).await?;
        // Override Bob's salad line to 5.00
        let salad_line = base
            .entries()
            .find(|e| e.item_name == "Salad")
            .unwrap()
            .wish_item_id;
        let overrides = HashMap::from([(salad_line, 500)]);
        let split = split::compute_split(base, 3000, &overrides)?;

        commit_settlement(&db, order_id, &split, admin.id, false).await?;

        assert_eq!(balance_of(&db, alice.id).await, 5000 - 1250);
        assert_eq!(balance_of(&db, bob.id).await, 5000 - 1250 - 500);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_requires_orders_closed() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_admin_user(&db, "root").await?;
        let order = create_open_group_order(&db, "friday", admin.id).await?;
        let split = compute(&db, order.id, 0).await?;

        let result = commit_settlement(&db, order.id, &split, admin.id, true).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { attempted: "settle", status: "open", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_double_commit_conflicts() -> Result<()> {
        let (db, admin, _alice, _bob, order_id) = closed_order_scenario().await?;
        let split = compute(&db, order_id, 3000).await?;

        commit_settlement(&db, order_id, &split, admin.id, false).await?;
        let result = commit_settlement(&db, order_id, &split, admin.id, false).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { attempted: "settle", status: "settled", .. }
        ));
        // No duplicate charges
        assert_eq!(settlement_transactions(&db, order_id).await.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_atomicity_on_backing_failure() -> Result<()> {
        let (db, admin, alice, bob, order_id) = closed_order_scenario().await?;
        // Bob owes 2000 but only has 100 and no overdraw
        set_user_balance(&db, bob.id, 100).await?;
        let split = compute(&db, order_id, 3000).await?;

        let result = commit_settlement(&db, order_id, &split, admin.id, false).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientBalance { user_id, .. } if user_id == bob.id
        ));

        // Nothing persisted: no transactions, no balance changes, status unchanged
        assert!(settlement_transactions(&db, order_id).await.is_empty());
        assert_eq!(balance_of(&db, alice.id).await, 5000);
        assert_eq!(balance_of(&db, bob.id).await, 100);
        assert_eq!(
            get_group_order(&db, order_id).await?.status,
            OrderStatus::OrdersClosed
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_allows_overdraw() -> Result<()> {
        let (db, admin, _alice, bob, order_id) = closed_order_scenario().await?;
        set_user_balance(&db, bob.id, 100).await?;
        set_user_overdraw(&db, bob.id, true).await?;
        let split = compute(&db, order_id, 3000).await?;

        commit_settlement(&db, order_id, &split, admin.id, false).await?;
        assert_eq!(balance_of(&db, bob.id).await, 100 - 2000);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_warning_requires_acknowledgment() -> Result<()> {
        let (db, admin, _alice, _bob, order_id) = closed_order_scenario().await?;
        let base = aggregate::load_base_split(&db, order_id).await?;
        let first_line = base.entries().next().unwrap().wish_item_id;
        // Override above the total: over-committed warning
        let overrides = HashMap::from([(first_line, 9000)]);
        let split = split::compute_split(base, 3000, &overrides)?;
        assert!(matches!(split.warning, Some(SplitWarning::OverCommitted { .. })));

        let result = commit_settlement(&db, order_id, &split, admin.id, false).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        assert_eq!(
            get_group_order(&db, order_id).await?.status,
            OrderStatus::OrdersClosed
        );

        // Acknowledged, it commits
        commit_settlement(&db, order_id, &split, admin.id, true).await?;
        assert_eq!(
            get_group_order(&db, order_id).await?.status,
            OrderStatus::Settled
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_requires_admin() -> Result<()> {
        let (db, _admin, alice, _bob, order_id) = closed_order_scenario().await?;
        let split = compute(&db, order_id, 3000).await?;

        let result = commit_settlement(&db, order_id, &split, alice.id, false).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_rejects_stale_split() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_admin_user(&db, "root").await?;
        let alice = create_user_with_balance(&db, "alice", 5000, false).await?;
        let bob = create_user_with_balance(&db, "bob", 5000, false).await?;
        let pizza = create_group_item(&db, "Pizza").await?;
        let order = create_open_group_order(&db, "friday", admin.id).await?;
        crate::core::orders::place_wish(&db, order.id, alice.id, &[pizza.id]).await?;

        // Split computed before the last participant wished
        let split = compute(&db, order.id, 3000).await?;
        crate::core::orders::place_wish(&db, order.id, bob.id, &[pizza.id]).await?;
        crate::core::orders::close_orders(&db, order.id, admin.id).await?;

        let result = commit_settlement(&db, order.id, &split, admin.id, false).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        // Nothing persisted: status unchanged, nobody charged
        assert_eq!(
            get_group_order(&db, order.id).await?.status,
            OrderStatus::OrdersClosed
        );
        assert!(settlement_transactions(&db, order.id).await.is_empty());
        assert_eq!(balance_of(&db, alice.id).await, 5000);
        assert_eq!(balance_of(&db, bob.id).await, 5000);

        // Recomputed against the final wish set, it commits
        let split = compute(&db, order.id, 3000).await?;
        commit_settlement(&db, order.id, &split, admin.id, false).await?;
        assert_eq!(balance_of(&db, alice.id).await, 3500);
        assert_eq!(balance_of(&db, bob.id).await, 3500);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_rejects_mismatched_split() -> Result<()> {
        let (db, admin, _alice, _bob, order_id) = closed_order_scenario().await?;
        let mut split = compute(&db, order_id, 3000).await?;
        split.group_order_id += 1;

        let result = commit_settlement(&db, order_id, &split, admin.id, false).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_revert_restores_balances_and_status() -> Result<()> {
        let (db, admin, alice, bob, order_id) = closed_order_scenario().await?;
        let split = compute(&db, order_id, 3000).await?;
        commit_settlement(&db, order_id, &split, admin.id, false).await?;

        revert_settlement(&db, order_id, admin.id).await?;

        assert_eq!(balance_of(&db, alice.id).await, 5000);
        assert_eq!(balance_of(&db, bob.id).await, 5000);

        let order = get_group_order(&db, order_id).await?;
        assert_eq!(order.status, OrderStatus::OrdersClosed);
        assert_eq!(order.reverted_by, Some(admin.id));

        let txns = settlement_transactions(&db, order_id).await;
        // 3 originals (flagged canceled) + 3 offsetting reversals
        assert_eq!(txns.len(), 6);
        let originals: Vec<_> = txns
            .iter()
            .filter(|t| t.kind == TransactionKind::ProcurementSettlement)
            .collect();
        assert_eq!(originals.len(), 3);
        assert!(originals.iter().all(|t| t.canceled && t.canceled_by == Some(admin.id)));
        let reversals: Vec<_> = txns
            .iter()
            .filter(|t| t.kind == TransactionKind::SettlementReversal)
            .collect();
        assert_eq!(reversals.len(), 3);
        assert!(reversals.iter().all(|t| t.amount == 1000 && !t.canceled));
        Ok(())
    }

    #[tokio::test]
    async fn test_reverted_order_can_be_settled_again() -> Result<()> {
        let (db, admin, alice, _bob, order_id) = closed_order_scenario().await?;
        let split = compute(&db, order_id, 3000).await?;
        commit_settlement(&db, order_id, &split, admin.id, false).await?;
        revert_settlement(&db, order_id, admin.id).await?;

        // Re-settle with a corrected total
        let split = compute(&db, order_id, 1500).await?;
        commit_settlement(&db, order_id, &split, admin.id, false).await?;
        assert_eq!(balance_of(&db, alice.id).await, 4500);
        Ok(())
    }

    #[tokio::test]
    async fn test_revert_unsettled_conflicts() -> Result<()> {
        let (db, admin, _alice, _bob, order_id) = closed_order_scenario().await?;
        let result = revert_settlement(&db, order_id, admin.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { attempted: "revert", status: "orders-closed", .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_double_revert_conflicts() -> Result<()> {
        let (db, admin, alice, _bob, order_id) = closed_order_scenario().await?;
        let split = compute(&db, order_id, 3000).await?;
        commit_settlement(&db, order_id, &split, admin.id, false).await?;
        revert_settlement(&db, order_id, admin.id).await?;

        let result = revert_settlement(&db, order_id, admin.id).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));
        // Balances restored exactly once
        assert_eq!(balance_of(&db, alice.id).await, 5000);
        Ok(())
    }
}
