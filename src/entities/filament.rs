//! Filament entity - A catalog entry for a purchasable filament.
//!
//! A filament is identified by brand, type, finish, color and diameter. The
//! physical stock lives in its spools; weights and status are derived from
//! them and are never stored here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Filament database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "filaments")]
pub struct Model {
    /// Unique identifier for the filament
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Manufacturer name (free text, not linked to the brands table)
    pub brand: String,
    /// Material type (e.g., "PLA", "PETG")
    #[sea_orm(column_name = "type")]
    pub filament_type: String,
    /// Surface finish (e.g., "Matte", "Silk")
    pub finish: Option<String>,
    /// Human-readable color name
    pub color_name: String,
    /// Hex color code, `#000000` by default
    pub color_code: String,
    /// Filament diameter in millimetres, two decimals
    pub diameter: f64,
    /// Manual price-per-kg override
    pub price_per_kg: Option<f64>,
    /// Where the filament is stored
    pub location: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the filament was added to the catalog
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Filament and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One filament has many spools
    #[sea_orm(has_many = "super::spool::Entity")]
    Spools,
}

impl Related<super::spool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Spools.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
