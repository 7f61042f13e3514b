//! Wish item entity - One wished item line inside a procurement wish.
//!
//! The `position` column preserves the order in which the user listed the
//! items. The row id is the key under which settlement cost overrides are
//! expressed, so the same catalog item wished twice stays independently
//! overridable.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Wish item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wish_items")]
pub struct Model {
    /// Unique identifier for the wish line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// The wish this line belongs to
    pub wish_id: i64,
    /// The wished catalog item
    pub item_id: i64,
    /// Zero-based position within the wish
    pub position: i32,
}

/// Defines relationships between WishItem and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one procurement wish
    #[sea_orm(
        belongs_to = "super::procurement_wish::Entity",
        from = "Column::WishId",
        to = "super::procurement_wish::Column::Id"
    )]
    ProcurementWish,
    /// Each line references one catalog item
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::procurement_wish::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProcurementWish.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
