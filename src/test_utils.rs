//! Shared test utilities for the filament tracker.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        filament::{self, FilamentDetails, FilamentStock, NewFilament},
        spool::{self, NewSpool},
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test filament without any spools.
///
/// # Defaults
/// * brand: "Test Brand"
/// * type: "PLA"
/// * diameter: 1.75
pub async fn create_test_filament(db: &DatabaseConnection, color: &str) -> Result<FilamentStock> {
    filament::create_filament(
        db,
        NewFilament::new(FilamentDetails::new("Test Brand", "PLA", color)),
    )
    .await
}

/// Adds a spool to a filament through the regular ledger path.
pub async fn add_test_spool(
    db: &DatabaseConnection,
    filament_id: i64,
    new_spool: NewSpool,
) -> Result<entities::spool::Model> {
    spool::add_spool_to_filament(db, filament_id, new_spool).await
}

/// Adds an unopened reusable spool holding `grams`, which gets a tracked body.
pub async fn create_reusable_spool(
    db: &DatabaseConnection,
    filament_id: i64,
    grams: f64,
) -> Result<entities::spool::Model> {
    add_test_spool(
        db,
        filament_id,
        NewSpool {
            is_reusable: true,
            ..NewSpool::full(grams)
        },
    )
    .await
}

/// A point in time `days` days before now.
#[must_use]
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

/// An in-memory spool model for tests that never touch the store.
#[must_use]
pub fn test_spool_model(
    id: i64,
    total_weight: f64,
    weight_remaining: f64,
    created_at: DateTime<Utc>,
) -> entities::spool::Model {
    entities::spool::Model {
        id,
        filament_id: 1,
        total_weight,
        weight_remaining,
        is_refill: false,
        spool_material: None,
        is_reusable: false,
        purchase_price_per_kg: None,
        created_at,
        emptied_at: None,
    }
}
