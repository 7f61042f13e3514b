//! User entity - An account holder with a ledger balance.
//!
//! Balances are stored in integer cents and are mutated exclusively through
//! the ledger module, so that every balance change is backed by a transaction
//! record. `allow_overdraw` permits a balance to go negative without blocking
//! new charges; `is_admin` gates close/settle/revert operations.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across users
    #[sea_orm(unique)]
    pub name: String,
    /// Current ledger balance in cents (may be negative when overdraw is allowed)
    pub balance: i64,
    /// Whether this user's balance may go negative without blocking new charges
    pub allow_overdraw: bool,
    /// Whether this user may perform administrative operations (close/settle/revert)
    pub is_admin: bool,
    /// Soft delete flag - if true, user is hidden but ledger history is preserved
    pub is_deleted: bool,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many ledger transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// One user has many procurement wishes
    #[sea_orm(has_many = "super::procurement_wish::Entity")]
    ProcurementWishes,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::procurement_wish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcurementWishes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
