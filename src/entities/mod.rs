//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod clearing_account;
pub mod group_order;
pub mod item;
pub mod item_category;
pub mod procurement_wish;
pub mod transaction;
pub mod user;
pub mod wish_item;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use clearing_account::{
    Column as ClearingAccountColumn, Entity as ClearingAccount, Model as ClearingAccountModel,
};
pub use group_order::{
    Column as GroupOrderColumn, Entity as GroupOrder, Model as GroupOrderModel, OrderStatus,
};
pub use item::{Column as ItemColumn, Entity as Item, Model as ItemModel};
pub use item_category::{
    Column as ItemCategoryColumn, Entity as ItemCategory, Model as ItemCategoryModel,
};
pub use procurement_wish::{
    Column as ProcurementWishColumn, Entity as ProcurementWish, Model as ProcurementWishModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel, TransactionKind,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
pub use wish_item::{Column as WishItemColumn, Entity as WishItem, Model as WishItemModel};
