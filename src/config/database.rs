//! Database configuration module for LabEats.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    Category, ClearingAccount, GroupOrder, Item, ItemCategory, ProcurementWish, Transaction, User,
    WishItem,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from environment variable or returns default `SQLite` path.
///
/// This function looks for `DATABASE_URL` in the environment and falls back to
/// a default local `SQLite` file if not found.
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://labeats.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a default local `SQLite` file if no environment variable is set.
/// This function handles connection errors and provides a clean interface for database access
/// throughout the application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    Database::connect(get_database_url()).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// Referenced tables are created before the tables that carry foreign keys to
/// them, so the generated constraints always resolve.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User);
    let clearing_account_table = schema.create_table_from_entity(ClearingAccount);
    let category_table = schema.create_table_from_entity(Category);
    let item_table = schema.create_table_from_entity(Item);
    let item_category_table = schema.create_table_from_entity(ItemCategory);
    let group_order_table = schema.create_table_from_entity(GroupOrder);
    let procurement_wish_table = schema.create_table_from_entity(ProcurementWish);
    let wish_item_table = schema.create_table_from_entity(WishItem);
    let transaction_table = schema.create_table_from_entity(Transaction);

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&clearing_account_table)).await?;
    db.execute(builder.build(&category_table)).await?;
    db.execute(builder.build(&item_table)).await?;
    db.execute(builder.build(&item_category_table)).await?;
    db.execute(builder.build(&group_order_table)).await?;
    db.execute(builder.build(&procurement_wish_table)).await?;
    db.execute(builder.build(&wish_item_table)).await?;
    db.execute(builder.build(&transaction_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        GroupOrderModel, ItemModel, TransactionModel, UserModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _: Vec<ItemModel> = Item::find().limit(1).all(&db).await?;
        let _: Vec<GroupOrderModel> = GroupOrder::find().limit(1).all(&db).await?;
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_connection_in_memory() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        Ok(())
    }
}
