//! Group order operations - Creation, wish intake, closing, cancellation.
//!
//! Closing and cancellation are admin actions guarded by the state machine;
//! the status flip is a conditional update filtered on the expected current
//! status, so two concurrent attempts cannot both succeed. Wishes are only
//! accepted while the order is Open and its deadline has not passed; an
//! expired order is closed automatically when touched, and a periodic sweep
//! (`close_expired_orders`) closes the rest.

use crate::core::ledger;
use crate::core::lifecycle::{self, Transition};
use crate::entities::{
    GroupOrder, Item, ProcurementWish, group_order, group_order::OrderStatus, procurement_wish,
    wish_item,
};
use crate::errors::{Error, Result};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Creates a new group order in the Open state.
///
/// # Errors
/// Returns `Validation` for an empty name or a deadline in the past, and
/// `NotFound` if the creating user does not exist.
pub async fn create_group_order(
    db: &DatabaseConnection,
    name: String,
    orders_close_at: DateTimeUtc,
    created_by: i64,
) -> Result<group_order::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "group order name cannot be empty".to_string(),
        });
    }
    if orders_close_at <= Utc::now() {
        return Err(Error::Validation {
            message: "group order deadline must be in the future".to_string(),
        });
    }
    ledger::get_active_user(db, created_by).await?;

    let order = group_order::ActiveModel {
        name: Set(name.trim().to_string()),
        orders_close_at: Set(orders_close_at),
        orders_closed_at: Set(None),
        status: Set(OrderStatus::Open),
        created_by: Set(created_by),
        closed_by: Set(None),
        reverted_by: Set(None),
        ..Default::default()
    };

    let result = order.insert(db).await?;
    info!(group_order_id = result.id, "created group order");
    Ok(result)
}

/// Loads a group order by id.
///
/// # Errors
/// Returns `NotFound` if the group order does not exist.
pub async fn get_group_order<C>(db: &C, group_order_id: i64) -> Result<group_order::Model>
where
    C: ConnectionTrait,
{
    GroupOrder::find_by_id(group_order_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "group order",
            id: group_order_id,
        })
}

/// Lists a group order's wishes in placement order.
pub async fn get_wishes_for_group_order(
    db: &DatabaseConnection,
    group_order_id: i64,
) -> Result<Vec<procurement_wish::Model>> {
    ProcurementWish::find()
        .filter(procurement_wish::Column::GroupOrderId.eq(group_order_id))
        .order_by_asc(procurement_wish::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Places a procurement wish: one user's ordered item list within an Open
/// group order. The wish and its item lines are inserted atomically.
///
/// # Errors
/// Returns `Conflict` if the order is not accepting wishes (closed, settled,
/// canceled, or past its deadline — the latter also auto-closes the order),
/// `Validation` for an empty item list, and `NotFound` for unknown users or
/// items.
pub async fn place_wish(
    db: &DatabaseConnection,
    group_order_id: i64,
    user_id: i64,
    item_ids: &[i64],
) -> Result<procurement_wish::Model> {
    if item_ids.is_empty() {
        return Err(Error::Validation {
            message: "a wish must contain at least one item".to_string(),
        });
    }
    ledger::get_active_user(db, user_id).await?;

    let order = get_group_order(db, group_order_id).await?;
    if order.status != OrderStatus::Open {
        return Err(Error::Conflict {
            group_order_id,
            attempted: "accept wishes",
            status: order.status.as_str(),
        });
    }
    if order.orders_close_at <= Utc::now() {
        // Deadline passed without a sweep; close on touch and refuse the wish
        auto_close(db, group_order_id).await?;
        return Err(Error::Conflict {
            group_order_id,
            attempted: "accept wishes",
            status: OrderStatus::OrdersClosed.as_str(),
        });
    }

    for &item_id in item_ids {
        let item = Item::find_by_id(item_id)
            .one(db)
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
    }

    let txn = db.begin().await?;

    let wish = procurement_wish::ActiveModel {
        group_order_id: Set(group_order_id),
        user_id: Set(user_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (position, &item_id) in item_ids.iter().enumerate() {
        wish_item::ActiveModel {
            wish_id: Set(wish.id),
            item_id: Set(item_id),
            position: Set(position as i32),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;
    Ok(wish)
}

/// Cuts off wish intake for a group order (admin action).
///
/// # Errors
/// Returns `Forbidden` for non-admins and `Conflict` if the order is not
/// Open (including losing a race against another close).
pub async fn close_orders(
    db: &DatabaseConnection,
    group_order_id: i64,
    acting_admin_id: i64,
) -> Result<group_order::Model> {
    let admin = ledger::require_admin(db, acting_admin_id).await?;
    let order = get_group_order(db, group_order_id).await?;
    let target = lifecycle::check_transition(&order, Transition::CloseOrders)?;

    let update = group_order::ActiveModel {
        status: Set(target),
        orders_closed_at: Set(Some(Utc::now())),
        closed_by: Set(Some(admin.id)),
        ..Default::default()
    };
    let result = GroupOrder::update_many()
        .set(update)
        .filter(group_order::Column::Id.eq(group_order_id))
        .filter(group_order::Column::Status.eq(order.status))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        // Lost a race after the pre-check; report the fresh status
        let current = get_group_order(db, group_order_id).await?;
        return Err(Error::Conflict {
            group_order_id,
            attempted: Transition::CloseOrders.as_str(),
            status: current.status.as_str(),
        });
    }

    info!(group_order_id, admin_id = admin.id, "orders closed");
    get_group_order(db, group_order_id).await
}

/// Closes every Open group order whose deadline has passed.
///
/// Returns the ids of the orders that were closed. Intended to be run
/// periodically; racing manual closes are harmless because each flip is
/// conditional on the Open status.
pub async fn close_expired_orders(db: &DatabaseConnection) -> Result<Vec<i64>> {
    let now = Utc::now();
    let expired = GroupOrder::find()
        .filter(group_order::Column::Status.eq(OrderStatus::Open))
        .filter(group_order::Column::OrdersCloseAt.lte(now))
        .all(db)
        .await?;

    let mut closed = Vec::with_capacity(expired.len());
    for order in expired {
        if auto_close(db, order.id).await? {
            closed.push(order.id);
        }
    }

    if !closed.is_empty() {
        info!(count = closed.len(), "closed expired group orders");
    }
    Ok(closed)
}

/// Cancels a group order before settlement. Only legal from Open.
///
/// # Errors
/// Returns `Forbidden` for non-admins and `Conflict` from any other state.
pub async fn cancel_group_order(
    db: &DatabaseConnection,
    group_order_id: i64,
    acting_admin_id: i64,
) -> Result<group_order::Model> {
    let admin = ledger::require_admin(db, acting_admin_id).await?;
    let order = get_group_order(db, group_order_id).await?;
    let target = lifecycle::check_transition(&order, Transition::Cancel)?;

    let update = group_order::ActiveModel {
        status: Set(target),
        closed_by: Set(Some(admin.id)),
        ..Default::default()
    };
    let result = GroupOrder::update_many()
        .set(update)
        .filter(group_order::Column::Id.eq(group_order_id))
        .filter(group_order::Column::Status.eq(order.status))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let current = get_group_order(db, group_order_id).await?;
        return Err(Error::Conflict {
            group_order_id,
            attempted: Transition::Cancel.as_str(),
            status: current.status.as_str(),
        });
    }

    info!(group_order_id, admin_id = admin.id, "group order canceled");
    get_group_order(db, group_order_id).await
}

/// Conditional Open -> OrdersClosed flip without an acting admin (deadline
/// expiry). Returns whether this call performed the flip.
async fn auto_close(db: &DatabaseConnection, group_order_id: i64) -> Result<bool> {
    let update = group_order::ActiveModel {
        status: Set(OrderStatus::OrdersClosed),
        orders_closed_at: Set(Some(Utc::now())),
        ..Default::default()
    };
    let result = GroupOrder::update_many()
        .set(update)
        .filter(group_order::Column::Id.eq(group_order_id))
        .filter(group_order::Column::Status.eq(OrderStatus::Open))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
