//! App settings entity - The singleton settings row.
//!
//! Holds the stock thresholds and the display currency. Exactly one row is
//! expected; it is created with defaults on first read.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// App settings database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Remaining weight (grams) below which a filament is low
    pub low_threshold: f64,
    /// Remaining weight (grams) below which a filament is critical
    pub critical_threshold: f64,
    /// ISO currency code used for prices
    pub currency: String,
}

/// `AppSettings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
