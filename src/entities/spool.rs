//! Spool entity - One physical unit of filament stock.
//!
//! Each spool belongs to a filament and carries its own remaining-weight
//! counter. A spool is empty once its remaining weight reaches zero or it has
//! an emptied timestamp; the ledger keeps both signals in step.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Spool database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spools")]
pub struct Model {
    /// Unique identifier for the spool
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning filament
    pub filament_id: i64,
    /// Net filament weight when new, in grams
    pub total_weight: f64,
    /// Filament left on the spool, in grams
    pub weight_remaining: f64,
    /// Whether this is a refill (no spool body of its own)
    pub is_refill: bool,
    /// Spool body material (e.g., "plastic", "cardboard")
    pub spool_material: Option<String>,
    /// Whether the spool body is kept for refills afterwards
    pub is_reusable: bool,
    /// Price paid per kilogram
    pub purchase_price_per_kg: Option<f64>,
    /// When the spool was added
    pub created_at: DateTimeUtc,
    /// When the spool ran out
    pub emptied_at: Option<DateTimeUtc>,
}

/// Defines relationships between Spool and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each spool belongs to one filament
    #[sea_orm(
        belongs_to = "super::filament::Entity",
        from = "Column::FilamentId",
        to = "super::filament::Column::Id",
        on_delete = "Cascade"
    )]
    Filament,
}

impl Related<super::filament::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Filament.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// A spool is empty when nothing is left or it was marked emptied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weight_remaining <= 0.0 || self.emptied_at.is_some()
    }

    /// A spool can be drawn from when it has weight left and was never emptied.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.weight_remaining > 0.0 && self.emptied_at.is_none()
    }

    /// Remaining weight as a percentage of the total, 0 for a zero total.
    #[must_use]
    pub fn percent_remaining(&self) -> f64 {
        if self.total_weight > 0.0 {
            (self.weight_remaining / self.total_weight) * 100.0
        } else {
            0.0
        }
    }

    /// Whether some filament has already been taken from this spool.
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.percent_remaining() < 100.0
    }
}
