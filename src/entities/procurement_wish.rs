//! Procurement wish entity - One user's item request within a group order.
//!
//! Wishes carry no price; the cost of each wished item is determined only at
//! settlement, by splitting the aggregate bill. A wish is never mutated after
//! settlement; reversal cancels the derived transactions, not the wish.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Procurement wish database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "procurement_wishes")]
pub struct Model {
    /// Unique identifier for the wish
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The group order this wish belongs to
    pub group_order_id: i64,
    /// The user who placed the wish
    pub user_id: i64,
    /// When the wish was placed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between ProcurementWish and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each wish belongs to one group order
    #[sea_orm(
        belongs_to = "super::group_order::Entity",
        from = "Column::GroupOrderId",
        to = "super::group_order::Column::Id"
    )]
    GroupOrder,
    /// Each wish belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// The ordered item lines inside this wish
    #[sea_orm(has_many = "super::wish_item::Entity")]
    WishItems,
}

impl Related<super::group_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroupOrder.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::wish_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WishItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
