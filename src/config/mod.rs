/// Database configuration and connection management
pub mod database;

/// Catalog seed configuration (clearing accounts, categories, items) from config.toml
pub mod catalog;
