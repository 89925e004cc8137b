//! Reusable spool entity - A physical spool body that can be refilled.
//!
//! The body points at the spool record currently wound on it. The pointer is
//! weak: clearing it (or deleting the spool) never removes the body itself.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Reusable spool database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reusable_spools")]
pub struct Model {
    /// Unique identifier for the spool body
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Body material, `"plastic"` unless stated otherwise
    pub material: String,
    /// Whether a spool currently occupies this body
    pub in_use: bool,
    /// Spool record currently wound on this body
    pub current_spool_id: Option<i64>,
    /// When the body was first tracked
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `ReusableSpool` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Spool currently occupying the body, if any
    #[sea_orm(
        belongs_to = "super::spool::Entity",
        from = "Column::CurrentSpoolId",
        to = "super::spool::Column::Id",
        on_delete = "SetNull"
    )]
    CurrentSpool,
}

impl Related<super::spool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CurrentSpool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
