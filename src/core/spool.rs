//! Spool ledger - creating, editing and removing physical spools.
//!
//! Every write keeps two things consistent: a spool with nothing left always
//! carries an emptied timestamp, and the reusable body ledger follows the
//! spool (tracked when a reusable spool arrives, released when it runs out or
//! is removed). Each public operation runs in its own database transaction.

use crate::{
    core::reusable,
    entities::{Filament, Spool, spool},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Net weight of a standard spool in grams.
pub const DEFAULT_SPOOL_WEIGHT: f64 = 1000.0;

/// Rounds a gram amount to hundredths of a gram.
///
/// Every stored weight and every debit goes through this, so repeated
/// subtraction never leaves a sub-centigram residue on a spool.
#[must_use]
pub fn round_grams(grams: f64) -> f64 {
    (grams * 100.0).round() / 100.0
}

/// Input for a new spool.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSpool {
    /// Net filament weight when new, in grams
    pub total_weight: f64,
    /// Filament left, in grams
    pub weight_remaining: f64,
    /// Refill without its own spool body
    pub is_refill: bool,
    /// Spool body material
    pub spool_material: Option<String>,
    /// Body is kept for refills
    pub is_reusable: bool,
    /// Price paid per kilogram
    pub purchase_price_per_kg: Option<f64>,
    /// Creation time, now when absent
    pub created_at: Option<DateTime<Utc>>,
}

impl NewSpool {
    /// An unopened spool holding `total_weight` grams.
    #[must_use]
    pub const fn full(total_weight: f64) -> Self {
        Self {
            total_weight,
            weight_remaining: total_weight,
            is_refill: false,
            spool_material: None,
            is_reusable: false,
            purchase_price_per_kg: None,
            created_at: None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        for amount in [self.total_weight, self.weight_remaining] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount { amount });
            }
        }
        if self.weight_remaining > self.total_weight {
            return Err(Error::Validation {
                message: format!(
                    "Remaining weight {}g exceeds the spool's total of {}g",
                    self.weight_remaining, self.total_weight
                ),
            });
        }
        validate_price(self.purchase_price_per_kg)
    }
}

impl Default for NewSpool {
    fn default() -> Self {
        Self::full(DEFAULT_SPOOL_WEIGHT)
    }
}

pub(crate) fn validate_price(price: Option<f64>) -> Result<()> {
    match price {
        Some(amount) if !amount.is_finite() || amount <= 0.0 => {
            Err(Error::InvalidAmount { amount })
        }
        _ => Ok(()),
    }
}

/// Inserts a spool row without touching the body ledger.
///
/// A spool inserted with nothing left is stamped as emptied at its creation time.
pub(crate) async fn insert_spool_row<C>(
    db: &C,
    filament_id: i64,
    new_spool: &NewSpool,
) -> Result<spool::Model>
where
    C: ConnectionTrait,
{
    new_spool.validate()?;
    let created_at = new_spool.created_at.unwrap_or_else(Utc::now);
    let weight_remaining = round_grams(new_spool.weight_remaining);
    let emptied_at = (weight_remaining <= 0.0).then_some(created_at);

    let spool = spool::ActiveModel {
        filament_id: Set(filament_id),
        total_weight: Set(round_grams(new_spool.total_weight)),
        weight_remaining: Set(weight_remaining),
        is_refill: Set(new_spool.is_refill),
        spool_material: Set(clean_text(new_spool.spool_material.as_deref())),
        is_reusable: Set(new_spool.is_reusable),
        purchase_price_per_kg: Set(new_spool.purchase_price_per_kg),
        created_at: Set(created_at),
        emptied_at: Set(emptied_at),
        ..Default::default()
    };
    spool.insert(db).await.map_err(Into::into)
}

/// Inserts a spool and starts tracking its body when it is reusable.
pub(crate) async fn insert_spool<C>(
    db: &C,
    filament_id: i64,
    new_spool: &NewSpool,
) -> Result<spool::Model>
where
    C: ConnectionTrait,
{
    let spool = insert_spool_row(db, filament_id, new_spool).await?;
    reusable::track_spool(db, &spool, Utc::now()).await?;
    Ok(spool)
}

/// Adds a spool to an existing filament.
pub async fn add_spool_to_filament(
    db: &DatabaseConnection,
    filament_id: i64,
    new_spool: NewSpool,
) -> Result<spool::Model> {
    new_spool.validate()?;

    let txn = db.begin().await?;

    Filament::find_by_id(filament_id)
        .one(&txn)
        .await?
        .ok_or(Error::FilamentNotFound { id: filament_id })?;

    let spool = insert_spool(&txn, filament_id, &new_spool).await?;

    txn.commit().await?;
    info!(
        "Added spool {} ({}g) to filament {filament_id}",
        spool.id, spool.total_weight
    );
    Ok(spool)
}

/// Finds a spool by its unique ID.
pub async fn get_spool_by_id(db: &DatabaseConnection, spool_id: i64) -> Result<Option<spool::Model>> {
    Spool::find_by_id(spool_id).one(db).await.map_err(Into::into)
}

/// All spools of a filament, empty ones included, oldest first.
pub async fn get_spools_for_filament(
    db: &DatabaseConnection,
    filament_id: i64,
) -> Result<Vec<spool::Model>> {
    Spool::find()
        .filter(spool::Column::FilamentId.eq(filament_id))
        .order_by_asc(spool::Column::CreatedAt)
        .order_by_asc(spool::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Spools of a filament that can still be drawn from.
pub async fn get_available_spools<C>(db: &C, filament_id: i64) -> Result<Vec<spool::Model>>
where
    C: ConnectionTrait,
{
    Spool::find()
        .filter(spool::Column::FilamentId.eq(filament_id))
        .filter(spool::Column::WeightRemaining.gt(0.0))
        .filter(spool::Column::EmptiedAt.is_null())
        .all(db)
        .await
        .map_err(Into::into)
}

/// Writes the editable fields of `changes` to the stored spool.
///
/// The owning filament, total weight and creation time are kept from the
/// stored row. A remaining weight at or below zero is clamped to zero and
/// stamped as emptied, and a spool with an emptied timestamp keeps no weight.
/// When a reusable spool ends up empty its body is released in the same
/// transaction.
pub async fn update_spool(db: &DatabaseConnection, changes: spool::Model) -> Result<spool::Model> {
    if !changes.weight_remaining.is_finite() {
        return Err(Error::InvalidAmount {
            amount: changes.weight_remaining,
        });
    }
    validate_price(changes.purchase_price_per_kg)?;

    let txn = db.begin().await?;

    let stored = Spool::find_by_id(changes.id)
        .one(&txn)
        .await?
        .ok_or(Error::SpoolNotFound { id: changes.id })?;

    let mut weight_remaining = round_grams(changes.weight_remaining);
    if weight_remaining > stored.total_weight {
        return Err(Error::Validation {
            message: format!(
                "Remaining weight {weight_remaining}g exceeds the spool's total of {}g",
                stored.total_weight
            ),
        });
    }

    let mut emptied_at = changes.emptied_at;
    if weight_remaining <= 0.0 || emptied_at.is_some() {
        weight_remaining = 0.0;
        emptied_at = emptied_at.or_else(|| Some(Utc::now()));
    }

    let mut active: spool::ActiveModel = stored.into();
    active.weight_remaining = Set(weight_remaining);
    active.emptied_at = Set(emptied_at);
    active.is_refill = Set(changes.is_refill);
    active.spool_material = Set(clean_text(changes.spool_material.as_deref()));
    active.is_reusable = Set(changes.is_reusable);
    active.purchase_price_per_kg = Set(changes.purchase_price_per_kg);
    let updated = active.update(&txn).await?;

    if updated.is_reusable && updated.is_empty() {
        reusable::release_for_spool(&txn, updated.id).await?;
    }

    txn.commit().await?;
    Ok(updated)
}

/// Records a new remaining weight for a spool, e.g. after weighing it.
pub async fn set_weight_remaining(
    db: &DatabaseConnection,
    spool_id: i64,
    weight_remaining: f64,
) -> Result<spool::Model> {
    let spool = get_spool_by_id(db, spool_id)
        .await?
        .ok_or(Error::SpoolNotFound { id: spool_id })?;
    update_spool(
        db,
        spool::Model {
            weight_remaining,
            ..spool
        },
    )
    .await
}

/// Marks a spool as used up. Any weight still recorded on it is written off.
pub async fn mark_spool_empty(db: &DatabaseConnection, spool_id: i64) -> Result<spool::Model> {
    let spool = get_spool_by_id(db, spool_id)
        .await?
        .ok_or(Error::SpoolNotFound { id: spool_id })?;
    update_spool(
        db,
        spool::Model {
            weight_remaining: 0.0,
            emptied_at: spool.emptied_at.or_else(|| Some(Utc::now())),
            ..spool
        },
    )
    .await
}

/// Deletes a spool and frees any body that was holding it.
pub async fn delete_spool(db: &DatabaseConnection, spool_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let spool = Spool::find_by_id(spool_id)
        .one(&txn)
        .await?
        .ok_or(Error::SpoolNotFound { id: spool_id })?;

    reusable::release_for_spool(&txn, spool.id).await?;
    spool.delete(&txn).await?;

    txn.commit().await?;
    info!("Deleted spool {spool_id}");
    Ok(())
}

/// Trims optional text, mapping blank input to `None`.
pub(crate) fn clean_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
