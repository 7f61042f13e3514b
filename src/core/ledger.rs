//! Ledger service - The single entry point for balance mutation.
//!
//! User and clearing-account balances are the shared mutable resource of the
//! system; every change goes through the atomic deltas here, always inside
//! the same database transaction that records the corresponding transaction
//! row. No other module writes balances directly.

use crate::core::money::Cents;
use crate::entities::{ClearingAccount, User, clearing_account, user};
use crate::errors::{Error, Result};
use sea_orm::{prelude::*, sea_query::Expr};

/// Loads a user, treating soft-deleted users as absent.
///
/// # Errors
/// Returns `NotFound` if the user does not exist or is deleted.
pub async fn get_active_user<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "user",
            id: user_id,
        })?;
    if user.is_deleted {
        return Err(Error::NotFound {
            entity: "user",
            id: user_id,
        });
    }
    Ok(user)
}

/// Loads a user and requires the admin flag.
///
/// # Errors
/// Returns `NotFound` for missing users and `Forbidden` for non-admins.
pub async fn require_admin<C>(db: &C, user_id: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let user = get_active_user(db, user_id).await?;
    if !user.is_admin {
        return Err(Error::Forbidden { user_id });
    }
    Ok(user)
}

/// Checks that applying `delta` to the user's balance is backed.
///
/// A negative delta that would push the balance below zero fails with
/// `InsufficientBalance` unless the user allows overdraw. Positive deltas
/// always pass.
pub fn ensure_backing(user: &user::Model, delta: Cents) -> Result<()> {
    if delta < 0 && !user.allow_overdraw && user.balance + delta < 0 {
        return Err(Error::InsufficientBalance {
            user_id: user.id,
            current: user.balance,
            required: -delta,
        });
    }
    Ok(())
}

/// Atomically adds `delta` to a user's balance.
///
/// Uses a single `UPDATE users SET balance = balance + ?` statement so
/// concurrent mutations cannot lose updates.
///
/// # Errors
/// Returns `NotFound` if the user does not exist.
pub async fn apply_user_balance_delta<C>(db: &C, user_id: i64, delta: Cents) -> Result<()>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "user",
            id: user_id,
        })?;

    User::update_many()
        .col_expr(
            user::Column::Balance,
            Expr::col(user::Column::Balance).add(delta),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(db)
        .await?;

    Ok(())
}

/// Atomically adds `delta` to a clearing account's balance.
///
/// # Errors
/// Returns `NotFound` if the clearing account does not exist.
pub async fn apply_clearing_balance_delta<C>(db: &C, account_id: i64, delta: Cents) -> Result<()>
where
    C: ConnectionTrait,
{
    ClearingAccount::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(Error::NotFound {
            entity: "clearing account",
            id: account_id,
        })?;

    ClearingAccount::update_many()
        .col_expr(
            clearing_account::Column::Balance,
            Expr::col(clearing_account::Column::Balance).add(delta),
        )
        .filter(clearing_account::Column::Id.eq(account_id))
        .exec(db)
        .await?;

    Ok(())
}
