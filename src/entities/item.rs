//! Item entity - A purchasable catalog item.
//!
//! Items carry a base price in cents and a set of categories whose markups
//! are layered on top at purchase time. Items flagged `group_order_only`
//! cannot be bought directly; they exist to be wished inside group orders,
//! where their price is determined only at settlement.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Unique identifier for the item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the item (e.g., "Club-Mate", "Pizza")
    pub name: String,
    /// Base price in cents, before category markups
    pub price: i64,
    /// Whether this item is only available through group orders
    pub group_order_only: bool,
    /// Soft delete flag - if true, item is hidden but referenced history is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Item and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One item appears in many wish lines
    #[sea_orm(has_many = "super::wish_item::Entity")]
    WishItems,
    /// One item is referenced by many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
    /// Join rows linking this item to its categories
    #[sea_orm(has_many = "super::item_category::Entity")]
    ItemCategories,
}

impl Related<super::wish_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WishItems.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

/// Items and categories are many-to-many via the `item_categories` join table
impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::item_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::item_category::Relation::Item.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
