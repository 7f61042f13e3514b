//! Shared test utilities for LabEats.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{money::Cents, orders},
    entities::{category, clearing_account, group_order, item, item_category, procurement_wish, user},
    errors::Result,
};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, prelude::DateTimeUtc};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test user with zero balance, no overdraw, no admin rights.
pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> Result<user::Model> {
    user::ActiveModel {
        name: Set(name.to_string()),
        balance: Set(0),
        allow_overdraw: Set(false),
        is_admin: Set(false),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test user with the admin flag set.
pub async fn create_admin_user(db: &DatabaseConnection, name: &str) -> Result<user::Model> {
    user::ActiveModel {
        name: Set(name.to_string()),
        balance: Set(0),
        allow_overdraw: Set(false),
        is_admin: Set(true),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a test user with a specific starting balance and overdraw setting.
pub async fn create_user_with_balance(
    db: &DatabaseConnection,
    name: &str,
    balance: Cents,
    allow_overdraw: bool,
) -> Result<user::Model> {
    user::ActiveModel {
        name: Set(name.to_string()),
        balance: Set(balance),
        allow_overdraw: Set(allow_overdraw),
        is_admin: Set(false),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a clearing account with zero collected balance.
pub async fn create_test_clearing_account(
    db: &DatabaseConnection,
    name: &str,
) -> Result<clearing_account::Model> {
    clearing_account::ActiveModel {
        name: Set(name.to_string()),
        balance: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a directly purchasable item with the given base price.
pub async fn create_test_item(
    db: &DatabaseConnection,
    name: &str,
    price: Cents,
) -> Result<item::Model> {
    item::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        group_order_only: Set(false),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a group-order-only item. Its base price is zero because group
/// items are costed only at settlement.
pub async fn create_group_item(db: &DatabaseConnection, name: &str) -> Result<item::Model> {
    item::ActiveModel {
        name: Set(name.to_string()),
        price: Set(0),
        group_order_only: Set(true),
        is_deleted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Creates a category with the given markups and optional clearing account.
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    fixed_markup: Option<Cents>,
    percentage_markup: Option<f64>,
    clearing_account_id: Option<i64>,
) -> Result<category::Model> {
    category::ActiveModel {
        name: Set(name.to_string()),
        fixed_markup: Set(fixed_markup),
        percentage_markup: Set(percentage_markup),
        clearing_account_id: Set(clearing_account_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Links an item to a category.
pub async fn link_item_category(
    db: &DatabaseConnection,
    item_id: i64,
    category_id: i64,
) -> Result<()> {
    item_category::ActiveModel {
        item_id: Set(item_id),
        category_id: Set(category_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}

/// Creates an Open group order with a deadline one hour out.
pub async fn create_open_group_order(
    db: &DatabaseConnection,
    name: &str,
    created_by: i64,
) -> Result<group_order::Model> {
    orders::create_group_order(
        db,
        name.to_string(),
        Utc::now() + Duration::hours(1),
        created_by,
    )
    .await
}

/// Places a wish through the regular intake path.
pub async fn place_test_wish(
    db: &DatabaseConnection,
    group_order_id: i64,
    user_id: i64,
    item_ids: &[i64],
) -> Result<procurement_wish::Model> {
    orders::place_wish(db, group_order_id, user_id, item_ids).await
}

/// Rewrites a group order's deadline, bypassing creation-time validation.
/// Used to simulate expiry without sleeping.
pub async fn set_orders_close_at(
    db: &DatabaseConnection,
    group_order_id: i64,
    orders_close_at: DateTimeUtc,
) -> Result<()> {
    group_order::ActiveModel {
        id: Set(group_order_id),
        orders_close_at: Set(orders_close_at),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

/// Overwrites a user's balance directly, bypassing the ledger.
pub async fn set_user_balance(db: &DatabaseConnection, user_id: i64, balance: Cents) -> Result<()> {
    user::ActiveModel {
        id: Set(user_id),
        balance: Set(balance),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}

/// Toggles a user's overdraw permission.
pub async fn set_user_overdraw(
    db: &DatabaseConnection,
    user_id: i64,
    allow_overdraw: bool,
) -> Result<()> {
    user::ActiveModel {
        id: Set(user_id),
        allow_overdraw: Set(allow_overdraw),
        ..Default::default()
    }
    .update(db)
    .await?;
    Ok(())
}
