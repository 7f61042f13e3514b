//! Group order entity - A time-boxed collective purchase window.
//!
//! A group order collects procurement wishes from users until its deadline
//! passes or an admin stops intake. The lifecycle is governed by
//! [`OrderStatus`]: Open -> OrdersClosed -> Settled, with Settled reversible
//! back to OrdersClosed and a terminal Canceled state reachable only from
//! Open. While a group order is Open no settlement may occur; once Settled,
//! the monetary allocation is immutable except via an explicit reversal.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a group order.
///
/// The numeric codes are part of the stored representation and must not be
/// renumbered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum OrderStatus {
    /// Accepting wishes
    #[sea_orm(num_value = 1)]
    Open,
    /// Intake cut off; awaiting settlement (also the post-revert state)
    #[sea_orm(num_value = 5)]
    OrdersClosed,
    /// Allocation committed into ledger transactions
    #[sea_orm(num_value = 6)]
    Settled,
    /// Abandoned before settlement; terminal
    #[sea_orm(num_value = 99)]
    Canceled,
}

impl OrderStatus {
    /// Stable lowercase name, used in conflict errors and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::OrdersClosed => "orders-closed",
            Self::Settled => "settled",
            Self::Canceled => "canceled",
        }
    }
}

/// Group order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "group_orders")]
pub struct Model {
    /// Unique identifier for the group order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Friday pizza run")
    pub name: String,
    /// Deadline after which incoming wishes are cut off automatically
    pub orders_close_at: DateTimeUtc,
    /// When intake was actually cut off; None while still open
    pub orders_closed_at: Option<DateTimeUtc>,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// User who created the group order
    pub created_by: i64,
    /// Admin who closed intake, triggered settlement, or canceled the
    /// order, if any
    pub closed_by: Option<i64>,
    /// Admin who reverted a settlement, if any (kept for audit)
    pub reverted_by: Option<i64>,
}

/// Defines relationships between GroupOrder and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One group order collects many procurement wishes
    #[sea_orm(has_many = "super::procurement_wish::Entity")]
    ProcurementWishes,
    /// Ledger transactions produced by settling this group order
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::procurement_wish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcurementWishes.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
