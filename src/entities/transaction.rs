//! Transaction entity - An immutable ledger entry.
//!
//! Every balance change in the system is backed by exactly one transaction
//! record. `amount` is the signed effect in cents on the acting balance
//! (the user's, or the clearing account's for fee forwards). Transactions
//! are never updated in place; a reversal creates new offsetting entries and
//! flags the originals `canceled`, so financial history is never deleted.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Type tag of a ledger transaction.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TransactionKind {
    /// Direct purchase of a catalog item (price plus category fees)
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Credit for goods provided to the canteen
    #[sea_orm(string_value = "sale")]
    Sale,
    /// Direct balance transfer between two users
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Charge produced by committing a group-order settlement
    #[sea_orm(string_value = "procurement_settlement")]
    ProcurementSettlement,
    /// Offsetting entry produced by reverting a settlement
    #[sea_orm(string_value = "settlement_reversal")]
    SettlementReversal,
    /// Category fee forwarded into a clearing account
    #[sea_orm(string_value = "fee_forward")]
    FeeForward,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Type tag of the transaction
    pub kind: TransactionKind,
    /// Signed effect in cents on the acting balance
    pub amount: i64,
    /// Acting user, if any (fee forwards keep the paying user here for audit)
    pub user_id: Option<i64>,
    /// Money-destination user for transfers, if any
    pub counterpart_user_id: Option<i64>,
    /// Destination clearing account for fee forwards, if any
    pub clearing_account_id: Option<i64>,
    /// The group order that produced this entry, if any
    pub group_order_id: Option<i64>,
    /// The catalog item this entry charges for, if any
    pub item_id: Option<i64>,
    /// Human-readable description of the transaction
    pub description: String,
    /// When the transaction was created
    pub timestamp: DateTimeUtc,
    /// Whether this entry has been canceled by a reversal
    pub canceled: bool,
    /// Admin who canceled this entry, if any
    pub canceled_by: Option<i64>,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The acting user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// The money-destination user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CounterpartUserId",
        to = "super::user::Column::Id"
    )]
    CounterpartUser,
    /// The destination clearing account
    #[sea_orm(
        belongs_to = "super::clearing_account::Entity",
        from = "Column::ClearingAccountId",
        to = "super::clearing_account::Column::Id"
    )]
    ClearingAccount,
    /// The originating group order
    #[sea_orm(
        belongs_to = "super::group_order::Entity",
        from = "Column::GroupOrderId",
        to = "super::group_order::Column::Id"
    )]
    GroupOrder,
    /// The charged catalog item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::clearing_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClearingAccount.def()
    }
}

impl Related<super::group_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupOrder.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
