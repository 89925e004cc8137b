//! Filament catalog - creating, reading, editing and deleting filaments.
//!
//! A filament is read together with its spools as a [`FilamentStock`], which
//! derives total weight, remaining weight, status and effective price from the
//! spools on every read. None of those values are stored.

use crate::{
    core::{
        reusable,
        spool::{self as spool_ops, NewSpool, clean_text, validate_price},
        threshold::{StockStatus, Thresholds},
    },
    entities::{Filament, Spool, filament, spool},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{LoaderTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

/// Price per kg used when neither the filament nor any spool has one.
pub const FALLBACK_PRICE_PER_KG: f64 = 149.0;
/// Diameter assumed when none is given, in millimetres.
pub const DEFAULT_DIAMETER: f64 = 1.75;
/// Color code assumed when none is given.
pub const DEFAULT_COLOR_CODE: &str = "#000000";

/// Editable catalog fields of a filament.
#[derive(Debug, Clone, PartialEq)]
pub struct FilamentDetails {
    /// Manufacturer
    pub brand: String,
    /// Material type
    pub filament_type: String,
    /// Surface finish
    pub finish: Option<String>,
    /// Color name
    pub color_name: String,
    /// Hex color code
    pub color_code: String,
    /// Diameter in millimetres
    pub diameter: f64,
    /// Manual price-per-kg override
    pub price_per_kg: Option<f64>,
    /// Storage location
    pub location: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
}

impl FilamentDetails {
    /// Details with the default color code and diameter.
    #[must_use]
    pub fn new(brand: &str, filament_type: &str, color_name: &str) -> Self {
        Self {
            brand: brand.to_string(),
            filament_type: filament_type.to_string(),
            finish: None,
            color_name: color_name.to_string(),
            color_code: DEFAULT_COLOR_CODE.to_string(),
            diameter: DEFAULT_DIAMETER,
            price_per_kg: None,
            location: None,
            notes: None,
        }
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("Brand", &self.brand),
            ("Type", &self.filament_type),
            ("Color name", &self.color_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("{field} cannot be empty"),
                });
            }
        }

        if !self.diameter.is_finite() || self.diameter <= 0.0 {
            return Err(Error::Validation {
                message: format!("Diameter must be positive, got {}", self.diameter),
            });
        }

        validate_price(self.price_per_kg)
    }

    fn color_code_or_default(&self) -> String {
        clean_text(Some(&self.color_code)).unwrap_or_else(|| DEFAULT_COLOR_CODE.to_string())
    }
}

/// Input for a new filament together with its first spools.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFilament {
    /// Catalog fields
    pub details: FilamentDetails,
    /// Creation time, now when absent
    pub created_at: Option<DateTime<Utc>>,
    /// Spools to add along with the filament
    pub spools: Vec<NewSpool>,
}

impl NewFilament {
    /// A filament with no spools yet.
    #[must_use]
    pub const fn new(details: FilamentDetails) -> Self {
        Self {
            details,
            created_at: None,
            spools: Vec::new(),
        }
    }

    /// Adds a spool to create along with the filament.
    #[must_use]
    pub fn with_spool(mut self, spool: NewSpool) -> Self {
        self.spools.push(spool);
        self
    }
}

/// A filament read together with its spools.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilamentStock {
    /// The catalog entry
    pub filament: filament::Model,
    /// Spools loaded with it, oldest first
    pub spools: Vec<spool::Model>,
}

impl FilamentStock {
    /// Sum of the spools' total weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.spools.iter().map(|s| s.total_weight).sum()
    }

    /// Grams that can still be drawn, counting available spools only.
    #[must_use]
    pub fn weight_remaining(&self) -> f64 {
        self.available_spools().map(|s| s.weight_remaining).sum()
    }

    /// Remaining weight as a percentage of the total, 0 when there is no total.
    #[must_use]
    pub fn percent_remaining(&self) -> f64 {
        let total = self.total_weight();
        if total > 0.0 {
            (self.weight_remaining() / total) * 100.0
        } else {
            0.0
        }
    }

    /// Number of spools loaded.
    #[must_use]
    pub fn spool_count(&self) -> usize {
        self.spools.len()
    }

    /// Stock level under `thresholds`.
    #[must_use]
    pub fn status(&self, thresholds: &Thresholds) -> StockStatus {
        thresholds.status(self.weight_remaining())
    }

    /// Manual override, else the mean spool purchase price, else [`FALLBACK_PRICE_PER_KG`].
    #[must_use]
    pub fn effective_price_per_kg(&self) -> f64 {
        if let Some(price) = self.filament.price_per_kg {
            return price;
        }

        let prices: Vec<f64> = self
            .spools
            .iter()
            .filter_map(|s| s.purchase_price_per_kg)
            .collect();
        if prices.is_empty() {
            FALLBACK_PRICE_PER_KG
        } else {
            #[allow(clippy::cast_precision_loss)] // spool counts are tiny
            let count = prices.len() as f64;
            prices.iter().sum::<f64>() / count
        }
    }

    /// Spools that can still be drawn from.
    pub fn available_spools(&self) -> impl Iterator<Item = &spool::Model> {
        self.spools.iter().filter(|s| s.is_available())
    }

    /// Human-readable name, e.g. "Bambu Lab PLA Matte Black".
    #[must_use]
    pub fn display_name(&self) -> String {
        let f = &self.filament;
        match &f.finish {
            Some(finish) => format!("{} {} {} {}", f.brand, f.filament_type, finish, f.color_name),
            None => format!("{} {} {}", f.brand, f.filament_type, f.color_name),
        }
    }

    /// Name with the id appended, as offered by autocomplete.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} #{}", self.display_name(), self.filament.id)
    }
}

/// Extracts a filament id from a label such as "Bambu Lab PLA Black #12" or a bare "12".
#[must_use]
pub fn parse_filament_ref(input: &str) -> Option<i64> {
    let input = input.trim();
    input
        .rsplit_once('#')
        .map_or(input, |(_, id)| id)
        .trim()
        .parse()
        .ok()
}

/// Inserts a filament and its spools on an open connection or transaction.
///
/// With `track_reusable` off the reusable spools are left for the caller to
/// reconcile (bulk import does this once for the whole store).
pub(crate) async fn insert_filament<C>(
    db: &C,
    new_filament: &NewFilament,
    track_reusable: bool,
) -> Result<FilamentStock>
where
    C: ConnectionTrait,
{
    let details = &new_filament.details;
    details.validate()?;

    let filament = filament::ActiveModel {
        brand: Set(details.brand.trim().to_string()),
        filament_type: Set(details.filament_type.trim().to_string()),
        finish: Set(clean_text(details.finish.as_deref())),
        color_name: Set(details.color_name.trim().to_string()),
        color_code: Set(details.color_code_or_default()),
        diameter: Set(round_diameter(details.diameter)),
        price_per_kg: Set(details.price_per_kg),
        location: Set(clean_text(details.location.as_deref())),
        notes: Set(clean_text(details.notes.as_deref())),
        created_at: Set(new_filament.created_at.unwrap_or_else(Utc::now)),
        ..Default::default()
    };
    let filament = filament.insert(db).await?;

    let mut spools = Vec::with_capacity(new_filament.spools.len());
    for new_spool in &new_filament.spools {
        let spool = if track_reusable {
            spool_ops::insert_spool(db, filament.id, new_spool).await?
        } else {
            spool_ops::insert_spool_row(db, filament.id, new_spool).await?
        };
        spools.push(spool);
    }

    Ok(FilamentStock { filament, spools })
}

/// Creates a filament with its initial spools in one transaction.
///
/// Reusable spools with filament on them get a tracked body.
pub async fn create_filament(
    db: &DatabaseConnection,
    new_filament: NewFilament,
) -> Result<FilamentStock> {
    new_filament.details.validate()?;
    for spool in &new_filament.spools {
        spool.validate()?;
    }

    let txn = db.begin().await?;
    let stock = insert_filament(&txn, &new_filament, true).await?;
    txn.commit().await?;

    info!(
        "Created filament {} '{}' with {} spool(s)",
        stock.filament.id,
        stock.display_name(),
        stock.spool_count()
    );
    Ok(stock)
}

/// Finds a filament by ID together with all of its spools, empty ones included.
pub async fn get_filament_by_id(
    db: &DatabaseConnection,
    filament_id: i64,
) -> Result<Option<FilamentStock>> {
    let Some(filament) = Filament::find_by_id(filament_id).one(db).await? else {
        return Ok(None);
    };
    let spools = spool_ops::get_spools_for_filament(db, filament_id).await?;
    Ok(Some(FilamentStock { filament, spools }))
}

/// Every filament, newest first, with only the spools that still hold filament.
pub async fn get_all_filaments(db: &DatabaseConnection) -> Result<Vec<FilamentStock>> {
    let filaments = Filament::find()
        .order_by_desc(filament::Column::CreatedAt)
        .order_by_desc(filament::Column::Id)
        .all(db)
        .await?;
    load_stock(db, filaments, true).await
}

/// Every filament in id order with all of its spools.
pub(crate) async fn get_full_catalog<C>(db: &C) -> Result<Vec<FilamentStock>>
where
    C: ConnectionTrait,
{
    let filaments = Filament::find()
        .order_by_asc(filament::Column::Id)
        .all(db)
        .await?;
    load_stock(db, filaments, false).await
}

async fn load_stock<C>(
    db: &C,
    filaments: Vec<filament::Model>,
    available_only: bool,
) -> Result<Vec<FilamentStock>>
where
    C: ConnectionTrait,
{
    let spools = filaments.load_many(Spool, db).await?;

    Ok(filaments
        .into_iter()
        .zip(spools)
        .map(|(filament, mut spools)| {
            if available_only {
                spools.retain(spool::Model::is_available);
            }
            spools.sort_by_key(|s| (s.created_at, s.id));
            FilamentStock { filament, spools }
        })
        .collect())
}

/// Replaces the catalog fields of a filament. Spools are left untouched.
pub async fn update_filament(
    db: &DatabaseConnection,
    filament_id: i64,
    details: FilamentDetails,
) -> Result<filament::Model> {
    details.validate()?;

    let mut filament: filament::ActiveModel = Filament::find_by_id(filament_id)
        .one(db)
        .await?
        .ok_or(Error::FilamentNotFound { id: filament_id })?
        .into();

    filament.brand = Set(details.brand.trim().to_string());
    filament.filament_type = Set(details.filament_type.trim().to_string());
    filament.finish = Set(clean_text(details.finish.as_deref()));
    filament.color_name = Set(details.color_name.trim().to_string());
    filament.color_code = Set(details.color_code_or_default());
    filament.diameter = Set(round_diameter(details.diameter));
    filament.price_per_kg = Set(details.price_per_kg);
    filament.location = Set(clean_text(details.location.as_deref()));
    filament.notes = Set(clean_text(details.notes.as_deref()));

    filament.update(db).await.map_err(Into::into)
}

/// Sets or clears the manual price-per-kg override.
pub async fn set_price_override(
    db: &DatabaseConnection,
    filament_id: i64,
    price_per_kg: Option<f64>,
) -> Result<filament::Model> {
    validate_price(price_per_kg)?;

    let mut filament: filament::ActiveModel = Filament::find_by_id(filament_id)
        .one(db)
        .await?
        .ok_or(Error::FilamentNotFound { id: filament_id })?
        .into();
    filament.price_per_kg = Set(price_per_kg);
    filament.update(db).await.map_err(Into::into)
}

/// Deletes a filament with all of its spools. Returns how many spools went with it.
///
/// Bodies holding any of those spools are released first.
pub async fn delete_filament(db: &DatabaseConnection, filament_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    let filament = Filament::find_by_id(filament_id)
        .one(&txn)
        .await?
        .ok_or(Error::FilamentNotFound { id: filament_id })?;

    let spool_ids: Vec<i64> = Spool::find()
        .filter(spool::Column::FilamentId.eq(filament_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    reusable::release_for_spools(&txn, &spool_ids).await?;
    let removed = Spool::delete_many()
        .filter(spool::Column::FilamentId.eq(filament_id))
        .exec(&txn)
        .await?
        .rows_affected;
    filament.delete(&txn).await?;

    txn.commit().await?;
    info!("Deleted filament {filament_id} and {removed} spool(s)");
    Ok(removed)
}

/// Removes every filament and spool. Bodies are released, brands and settings stay.
pub async fn purge_inventory(db: &DatabaseConnection) -> Result<u64> {
    let txn = db.begin().await?;

    reusable::release_all(&txn).await?;
    let spools = Spool::delete_many().exec(&txn).await?.rows_affected;
    let filaments = Filament::delete_many().exec(&txn).await?.rows_affected;

    txn.commit().await?;
    info!("Purged {filaments} filament(s) and {spools} spool(s)");
    Ok(filaments)
}

fn round_diameter(diameter: f64) -> f64 {
    (diameter * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn stock_with(spools: Vec<spool::Model>, price_override: Option<f64>) -> FilamentStock {
        FilamentStock {
            filament: filament::Model {
                id: 1,
                brand: "Polymaker".to_string(),
                filament_type: "PETG".to_string(),
                finish: None,
                color_name: "Teal".to_string(),
                color_code: "#008080".to_string(),
                diameter: 1.75,
                price_per_kg: price_override,
                location: None,
                notes: None,
                created_at: Utc::now(),
            },
            spools,
        }
    }

    #[tokio::test]
    async fn test_create_filament_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_filament(
            &db,
            NewFilament::new(FilamentDetails::new("  ", "PLA", "Black")),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { message }) if message.contains("Brand")));

        let result = create_filament(
            &db,
            NewFilament::new(FilamentDetails::new("eSun", "", "Black")),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { message }) if message.contains("Type")));

        let result = create_filament(
            &db,
            NewFilament::new(FilamentDetails::new("eSun", "PLA", "")),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_filament(
            &db,
            NewFilament::new(FilamentDetails {
                diameter: 0.0,
                ..FilamentDetails::new("eSun", "PLA", "Black")
            }),
        )
        .await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_filament(
            &db,
            NewFilament::new(FilamentDetails::new("eSun", "PLA", "Black"))
                .with_spool(NewSpool::full(-1.0)),
        )
        .await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_filament_with_spools() -> Result<()> {
        let db = setup_test_db().await?;

        let stock = create_filament(
            &db,
            NewFilament::new(FilamentDetails {
                finish: Some("Matte".to_string()),
                color_code: "  ".to_string(),
                diameter: 1.754,
                ..FilamentDetails::new(" Bambu Lab ", "PLA", "Charcoal")
            })
            .with_spool(NewSpool::full(1000.0))
            .with_spool(NewSpool {
                is_reusable: true,
                ..NewSpool::full(1000.0)
            }),
        )
        .await?;

        assert_eq!(stock.filament.brand, "Bambu Lab");
        assert_eq!(stock.filament.color_code, DEFAULT_COLOR_CODE);
        assert_eq!(stock.filament.diameter, 1.75);
        assert_eq!(stock.spool_count(), 2);
        assert_eq!(stock.total_weight(), 2000.0);
        assert_eq!(stock.display_name(), "Bambu Lab PLA Matte Charcoal");

        let bodies = reusable::get_all_reusable_spools(&db).await?;
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0].current_spool_id, Some(stock.spools[1].id));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_filament_by_id_includes_empty_spools() -> Result<()> {
        let db = setup_test_db().await?;
        let stock = create_test_filament(&db, "White").await?;
        let id = stock.filament.id;
        add_test_spool(&db, id, NewSpool::full(1000.0)).await?;
        add_test_spool(
            &db,
            id,
            NewSpool {
                weight_remaining: 0.0,
                ..NewSpool::full(1000.0)
            },
        )
        .await?;

        let stock = get_filament_by_id(&db, id).await?.unwrap();
        assert_eq!(stock.spool_count(), 2);
        assert_eq!(stock.weight_remaining(), 1000.0);
        assert_eq!(stock.percent_remaining(), 50.0);
        assert_eq!(stock.available_spools().count(), 1);

        assert!(get_filament_by_id(&db, 999).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_filaments_newest_first_available_only() -> Result<()> {
        let db = setup_test_db().await?;
        let old = create_filament(
            &db,
            NewFilament {
                created_at: Some(days_ago(10)),
                ..NewFilament::new(FilamentDetails::new("eSun", "PLA", "Old"))
            }
            .with_spool(NewSpool {
                weight_remaining: 0.0,
                ..NewSpool::full(1000.0)
            })
            .with_spool(NewSpool {
                weight_remaining: 300.0,
                ..NewSpool::full(1000.0)
            }),
        )
        .await?;
        let new = create_filament(
            &db,
            NewFilament {
                created_at: Some(days_ago(1)),
                ..NewFilament::new(FilamentDetails::new("eSun", "PLA", "New"))
            },
        )
        .await?;

        let all = get_all_filaments(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].filament.id, new.filament.id);
        assert_eq!(all[1].filament.id, old.filament.id);
        assert_eq!(all[1].spool_count(), 1);
        assert_eq!(all[1].weight_remaining(), 300.0);
        assert_eq!(all[0].spool_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_filament() -> Result<()> {
        let db = setup_test_db().await?;
        let stock = create_test_filament(&db, "White").await?;

        let updated = update_filament(
            &db,
            stock.filament.id,
            FilamentDetails {
                location: Some("Shelf B".to_string()),
                price_per_kg: Some(199.0),
                ..FilamentDetails::new("Prusament", "PETG", "Galaxy Black")
            },
        )
        .await?;
        assert_eq!(updated.brand, "Prusament");
        assert_eq!(updated.location.as_deref(), Some("Shelf B"));
        assert_eq!(updated.price_per_kg, Some(199.0));

        let missing = update_filament(&db, 999, FilamentDetails::new("a", "b", "c")).await;
        assert!(matches!(missing, Err(Error::FilamentNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_price_override() -> Result<()> {
        let db = setup_test_db().await?;
        let stock = create_test_filament(&db, "White").await?;

        let updated = set_price_override(&db, stock.filament.id, Some(220.0)).await?;
        assert_eq!(updated.price_per_kg, Some(220.0));
        let cleared = set_price_override(&db, stock.filament.id, None).await?;
        assert_eq!(cleared.price_per_kg, None);

        let invalid = set_price_override(&db, stock.filament.id, Some(-3.0)).await;
        assert!(matches!(invalid, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_filament_cascades_and_releases_bodies() -> Result<()> {
        let db = setup_test_db().await?;
        let stock = create_test_filament(&db, "White").await?;
        let id = stock.filament.id;
        let spool = create_reusable_spool(&db, id, 1000.0).await?;
        add_test_spool(&db, id, NewSpool::full(500.0)).await?;

        let removed = delete_filament(&db, id).await?;
        assert_eq!(removed, 2);

        assert!(get_filament_by_id(&db, id).await?.is_none());
        assert!(spool_ops::get_spool_by_id(&db, spool.id).await?.is_none());
        let bodies = reusable::get_all_reusable_spools(&db).await?;
        assert_eq!(bodies.len(), 1);
        assert!(!bodies[0].in_use);

        let again = delete_filament(&db, id).await;
        assert!(matches!(again, Err(Error::FilamentNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_purge_inventory() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_filament(&db, "White").await?;
        create_reusable_spool(&db, a.filament.id, 1000.0).await?;
        create_test_filament(&db, "Black").await?;

        assert_eq!(purge_inventory(&db).await?, 2);
        assert!(get_all_filaments(&db).await?.is_empty());
        let bodies = reusable::get_all_reusable_spools(&db).await?;
        assert_eq!(bodies.len(), 1);
        assert!(!bodies[0].in_use);
        Ok(())
    }

    #[test]
    fn test_effective_price() {
        let mut a = test_spool_model(1, 1000.0, 1000.0, days_ago(2));
        let mut b = test_spool_model(2, 1000.0, 1000.0, days_ago(1));
        let c = test_spool_model(3, 1000.0, 1000.0, days_ago(1));

        assert_eq!(
            stock_with(vec![a.clone(), c.clone()], None).effective_price_per_kg(),
            FALLBACK_PRICE_PER_KG
        );

        a.purchase_price_per_kg = Some(100.0);
        b.purchase_price_per_kg = Some(200.0);
        assert_eq!(
            stock_with(vec![a.clone(), b.clone(), c], None).effective_price_per_kg(),
            150.0
        );
        assert_eq!(
            stock_with(vec![a, b], Some(90.0)).effective_price_per_kg(),
            90.0
        );
    }

    #[test]
    fn test_derived_weights_and_status() {
        let thresholds = Thresholds::default();
        let empty = stock_with(Vec::new(), None);
        assert_eq!(empty.total_weight(), 0.0);
        assert_eq!(empty.percent_remaining(), 0.0);
        assert_eq!(empty.status(&thresholds), StockStatus::Critical);

        let stock = stock_with(
            vec![
                test_spool_model(1, 1000.0, 200.0, days_ago(2)),
                test_spool_model(2, 1000.0, 400.0, days_ago(1)),
            ],
            None,
        );
        assert_eq!(stock.weight_remaining(), 600.0);
        assert_eq!(stock.percent_remaining(), 30.0);
        assert_eq!(stock.status(&thresholds), StockStatus::Ok);

        let mut closed = test_spool_model(3, 1000.0, 1000.0, days_ago(3));
        closed.emptied_at = Some(days_ago(1));
        let only_closed = stock_with(vec![closed], None);
        assert_eq!(only_closed.weight_remaining(), 0.0);
        assert_eq!(only_closed.status(&thresholds), StockStatus::Critical);
    }

    #[test]
    fn test_parse_filament_ref() {
        assert_eq!(parse_filament_ref("Bambu Lab PLA Black #12"), Some(12));
        assert_eq!(parse_filament_ref(" 7 "), Some(7));
        assert_eq!(parse_filament_ref("Color #Red #3"), Some(3));
        assert_eq!(parse_filament_ref("Bambu Lab PLA Black"), None);
        assert_eq!(parse_filament_ref(""), None);
    }

    #[test]
    fn test_label_round_trips_through_parse() {
        let stock = stock_with(Vec::new(), None);
        assert_eq!(stock.label(), "Polymaker PETG Teal #1");
        assert_eq!(parse_filament_ref(&stock.label()), Some(1));
    }
}
