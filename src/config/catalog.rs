//! Catalog seed configuration loading from config.toml
//!
//! The clearing accounts, categories, and items defined in config.toml are
//! used to seed the database on first run or when entries are missing.
//! Seeding is idempotent: existing records (matched by name) are left
//! untouched, so a restart never duplicates or resets the catalog.

use crate::core::money;
use crate::entities::{
    Category, ClearingAccount, Item, ItemCategory, category, clearing_account, item, item_category,
};
use crate::errors::{Error, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    /// Clearing accounts that collect category fees
    #[serde(default)]
    pub clearing_accounts: Vec<ClearingAccountConfig>,
    /// Item categories with their markups
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    /// Purchasable items
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

/// Configuration for a single clearing account
#[derive(Debug, Deserialize, Clone)]
pub struct ClearingAccountConfig {
    /// Name of the clearing account
    pub name: String,
}

/// Configuration for a single category
#[derive(Debug, Deserialize, Clone)]
pub struct CategoryConfig {
    /// Name of the category
    pub name: String,
    /// Fixed markup per charged item, in major currency units (e.g. 0.15)
    pub fixed_markup: Option<f64>,
    /// Percentage markup (0-100) applied to the charged base amount
    pub percentage_markup: Option<f64>,
    /// Name of the clearing account that collects this category's fees
    pub clearing_account: Option<String>,
}

/// Configuration for a single item
#[derive(Debug, Deserialize, Clone)]
pub struct ItemConfig {
    /// Name of the item
    pub name: String,
    /// Base price in major currency units (e.g. 1.50)
    pub price: f64,
    /// Whether this item is only available through group orders
    #[serde(default)]
    pub group_order_only: bool,
    /// Names of the categories this item belongs to
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Loads catalog configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or required fields are missing.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads catalog configuration from the default location (./config.toml)
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_default_config() -> Result<CatalogConfig> {
    load_config("config.toml")
}

/// Seeds missing clearing accounts, categories, and items from the
/// configuration. Existing records (matched by name) are left untouched.
///
/// # Errors
/// Returns `Config` for invalid amounts or dangling clearing-account /
/// category references, and `Database` for persistence failures.
pub async fn seed_catalog(db: &DatabaseConnection, config: &CatalogConfig) -> Result<()> {
    for account in &config.clearing_accounts {
        let existing = ClearingAccount::find()
            .filter(clearing_account::Column::Name.eq(&account.name))
            .one(db)
            .await?;
        if existing.is_none() {
            clearing_account::ActiveModel {
                name: Set(account.name.clone()),
                balance: Set(0),
                ..Default::default()
            }
            .insert(db)
            .await?;
            info!(name = %account.name, "seeded clearing account");
        }
    }

    for cat in &config.categories {
        let existing = Category::find()
            .filter(category::Column::Name.eq(&cat.name))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        let fixed_markup = match cat.fixed_markup {
            None => None,
            Some(major) => Some(money::cents_from_major(major).ok_or_else(|| Error::Config {
                message: format!("category '{}': invalid fixed_markup {major}", cat.name),
            })?),
        };
        if let Some(pct) = cat.percentage_markup {
            if !(0.0..=100.0).contains(&pct) {
                return Err(Error::Config {
                    message: format!("category '{}': percentage_markup {pct} out of range", cat.name),
                });
            }
        }
        let clearing_account_id = match &cat.clearing_account {
            None => None,
            Some(name) => {
                let account = ClearingAccount::find()
                    .filter(clearing_account::Column::Name.eq(name))
                    .one(db)
                    .await?
                    .ok_or_else(|| Error::Config {
                        message: format!(
                            "category '{}' references unknown clearing account '{name}'",
                            cat.name
                        ),
                    })?;
                Some(account.id)
            }
        };

        category::ActiveModel {
            name: Set(cat.name.clone()),
            fixed_markup: Set(fixed_markup),
            percentage_markup: Set(cat.percentage_markup),
            clearing_account_id: Set(clearing_account_id),
            ..Default::default()
        }
        .insert(db)
        .await?;
        info!(name = %cat.name, "seeded category");
    }

    for entry in &config.items {
        let price = money::cents_from_major(entry.price).ok_or_else(|| Error::Config {
            message: format!("item '{}': invalid price {}", entry.name, entry.price),
        })?;

        let item = match Item::find()
            .filter(item::Column::Name.eq(&entry.name))
            .one(db)
            .await?
        {
            Some(existing) => existing,
            None => {
                let created = item::ActiveModel {
                    name: Set(entry.name.clone()),
                    price: Set(price),
                    group_order_only: Set(entry.group_order_only),
                    is_deleted: Set(false),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                info!(name = %entry.name, "seeded item");
                created
            }
        };

        for category_name in &entry.categories {
            let cat = Category::find()
                .filter(category::Column::Name.eq(category_name))
                .one(db)
                .await?
                .ok_or_else(|| Error::Config {
                    message: format!(
                        "item '{}' references unknown category '{category_name}'",
                        entry.name
                    ),
                })?;

            let linked = ItemCategory::find()
                .filter(item_category::Column::ItemId.eq(item.id))
                .filter(item_category::Column::CategoryId.eq(cat.id))
                .one(db)
                .await?;
            if linked.is_none() {
                item_category::ActiveModel {
                    item_id: Set(item.id),
                    category_id: Set(cat.id),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }
        }
    }

    Ok(())
}
