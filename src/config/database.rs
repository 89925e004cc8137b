//! Database configuration module for the filament tracker.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Databases created by older versions are brought forward by adding
//! the columns they are missing; existing rows pick up the column defaults.

use crate::entities::{AppSettings, Brand, Filament, ReusableSpool, Spool};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Schema, Statement,
};
use tracing::{debug, info};

/// Default location of the `SQLite` file when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/filaments.sqlite?mode=rwc";

const DEFAULT_DATA_DIR: &str = "data";

/// Columns introduced after the first release: (table, column, definition).
const LATE_COLUMNS: &[(&str, &str, &str)] = &[
    ("app_settings", "currency", "TEXT NOT NULL DEFAULT 'DKK'"),
    ("filaments", "price_per_kg", "REAL"),
    ("spools", "purchase_price_per_kg", "REAL"),
];

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the `SQLite` database using the `DATABASE_URL` environment variable.
///
/// Falls back to a local `data/filaments.sqlite` file, creating the `data`
/// directory when needed.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if database_url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all(DEFAULT_DATA_DIR)?;
    }

    info!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet, then back-fills late columns.
///
/// Safe to run on every start: existing tables and rows are left untouched.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut filament_table = schema.create_table_from_entity(Filament);
    let mut spool_table = schema.create_table_from_entity(Spool);
    let mut reusable_table = schema.create_table_from_entity(ReusableSpool);
    let mut settings_table = schema.create_table_from_entity(AppSettings);
    let mut brand_table = schema.create_table_from_entity(Brand);

    for table in [
        filament_table.if_not_exists(),
        spool_table.if_not_exists(),
        reusable_table.if_not_exists(),
        settings_table.if_not_exists(),
        brand_table.if_not_exists(),
    ] {
        db.execute(builder.build(&*table)).await?;
    }

    for (table, column, definition) in LATE_COLUMNS {
        if ensure_column(db, table, column, definition).await? {
            info!("Added missing column {table}.{column}");
        }
    }

    Ok(())
}

/// Adds `column` to `table` when the table predates it. Returns whether the
/// column had to be added. Only `SQLite` is inspected; other backends always
/// get the full schema from the entities.
async fn ensure_column<C>(db: &C, table: &str, column: &str, definition: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    if backend != DatabaseBackend::Sqlite {
        return Ok(false);
    }

    let rows = db
        .query_all(Statement::from_string(
            backend,
            format!("PRAGMA table_info({table})"),
        ))
        .await?;
    let exists = rows
        .iter()
        .any(|row| row.try_get::<String>("", "name").is_ok_and(|name| name == column));
    if exists {
        debug!("Column {table}.{column} already present");
        return Ok(false);
    }

    db.execute(Statement::from_string(
        backend,
        format!("ALTER TABLE {table} ADD COLUMN {column} {definition}"),
    ))
    .await?;
    Ok(true)
}
