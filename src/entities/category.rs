//! Category entity - A markup rule set applied on top of item prices.
//!
//! A category may carry a fixed markup (cents), a percentage markup (0-100),
//! or both; absent markups count as zero. Collected fees are forwarded to the
//! optional destination clearing account. Multiple categories may apply to
//! one item; their fees are additive.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    /// Unique identifier for the category
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name of the category (e.g., "Deposit", "Delivery")
    #[sea_orm(unique)]
    pub name: String,
    /// Fixed markup in cents added per charged item, if any
    pub fixed_markup: Option<i64>,
    /// Percentage markup (0-100) applied to the charged base amount, if any
    pub percentage_markup: Option<f64>,
    /// Clearing account that collects this category's fees, if any
    pub clearing_account_id: Option<i64>,
}

/// Defines relationships between Category and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each category optionally forwards fees to one clearing account
    #[sea_orm(
        belongs_to = "super::clearing_account::Entity",
        from = "Column::ClearingAccountId",
        to = "super::clearing_account::Column::Id"
    )]
    ClearingAccount,
    /// Join rows linking this category to its items
    #[sea_orm(has_many = "super::item_category::Entity")]
    ItemCategories,
}

impl Related<super::clearing_account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClearingAccount.def()
    }
}

/// Categories and items are many-to-many via the `item_categories` join table
impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        super::item_category::Relation::Item.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::item_category::Relation::Category.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
