//! LabEats service entry point.
//!
//! Boots the database, seeds the catalog from config.toml, and runs the
//! periodic sweep that closes group orders whose deadline has passed.

use labeats::config::{catalog, database};
use labeats::core::orders;
use labeats::errors::Result;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// How often expired group orders are swept closed.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenvy::dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Initialize database
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed the catalog (if a config.toml is present)
    if Path::new("config.toml").exists() {
        let config = catalog::load_default_config()?;
        catalog::seed_catalog(&db, &config)
            .await
            .inspect(|_| info!("Catalog seeded."))
            .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
    } else {
        info!("No config.toml found; skipping catalog seeding.");
    }

    // 5. Sweep expired group orders until shut down
    info!("LabEats ready; sweeping expired group orders every {SWEEP_INTERVAL:?}.");
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        interval.tick().await;
        if let Err(e) = orders::close_expired_orders(&db).await {
            error!("Expired-order sweep failed: {}", e);
        }
    }
}
