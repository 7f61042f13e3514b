//! Clearing account entity - A named ledger balance acting as a
//! fee-collection sink.
//!
//! Clearing accounts are mutated only by fee-forwarding transactions; they
//! are valid transfer destinations but hold no user identity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Clearing account database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clearing_accounts")]
pub struct Model {
    /// Unique identifier for the clearing account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name (e.g., "Deposit pool")
    #[sea_orm(unique)]
    pub name: String,
    /// Collected balance in cents
    pub balance: i64,
}

/// Defines relationships between ClearingAccount and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Categories that forward their fees here
    #[sea_orm(has_many = "super::category::Entity")]
    Categories,
    /// Fee-forwarding transactions credited to this account
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
