//! Shared test utilities for the economy core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test accounts, items and pets with sensible defaults.

use crate::{
    config::economy::EconomyConfig,
    core::{cooldown::CooldownTracker, inventory, ledger},
    entities,
    errors::Result,
};
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

pub use crate::core::dice::ScriptedDice;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Fixed clock used by every time-dependent test.
#[must_use]
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Creates an account with an exact balance and full health.
pub async fn create_test_account(
    db: &DatabaseConnection,
    user_id: &str,
    balance: i64,
) -> Result<entities::account::Model> {
    ledger::ensure_account(db, user_id, balance).await
}

/// Puts `quantity` units of an item into the user's inventory.
pub async fn give_item(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: &str,
    quantity: i32,
) -> Result<i32> {
    inventory::add_item(db, user_id, item_id, quantity).await
}

/// A well-fed, happy level 1 pet that is not stored anywhere.
///
/// # Defaults
/// * `defense`: 10
/// * `speed`: 10
/// * `hunger` and `happiness`: 100, stored at [`test_now`]
#[must_use]
pub fn test_pet(user_id: &str) -> entities::pet::Model {
    entities::pet::Model {
        user_id: user_id.to_string(),
        name: "Biscuit".to_string(),
        species: "dog".to_string(),
        level: 1,
        defense: 10,
        speed: 10,
        hunger: 100,
        happiness: 100,
        last_fed: test_now(),
        last_played: test_now(),
    }
}

/// Routes `tracing` output through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Everything a resolver run borrows, with default configuration.
pub struct TestEnv {
    /// In-memory database
    pub db: DatabaseConnection,
    /// Default economy settings
    pub config: EconomyConfig,
    /// Empty cooldown tracker
    pub cooldowns: CooldownTracker,
}

impl TestEnv {
    /// Sets up a fresh database and default settings.
    pub async fn new() -> Result<Self> {
        init_test_tracing();
        Ok(Self {
            db: setup_test_db().await?,
            config: EconomyConfig::default(),
            cooldowns: CooldownTracker::new(),
        })
    }
}
