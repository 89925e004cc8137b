//! CSV import and export of the whole inventory.
//!
//! Every spool becomes one row that also carries its filament's fields. On
//! import, rows sharing the same filament identity (brand, type, finish,
//! color name, color code, diameter) are merged back into one filament with
//! one spool per row. Columns may come in any order; unknown columns are
//! ignored and missing ones read as empty.

use crate::{
    core::{
        filament::{
            DEFAULT_DIAMETER, FALLBACK_PRICE_PER_KG, FilamentDetails, NewFilament,
            get_full_catalog, insert_filament,
        },
        reusable,
        spool::{DEFAULT_SPOOL_WEIGHT, NewSpool},
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    io::{Read, Write},
};
use tracing::{info, instrument};

const DATE_FORMAT: &str = "%m/%d/%Y";
const NO_MATERIAL: &str = "none";

/// One row of the exchange format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvFilamentRecord {
    /// Manufacturer
    #[serde(rename = "Brand")]
    pub brand: String,
    /// Material type
    #[serde(rename = "Type")]
    pub filament_type: String,
    /// Surface finish
    #[serde(rename = "Finish")]
    pub finish: String,
    /// Color name
    #[serde(rename = "Color Name")]
    pub color_name: String,
    /// Hex color code
    #[serde(rename = "Color Code")]
    pub color_code: String,
    /// Spool total weight in grams
    #[serde(rename = "Total Weight (g)")]
    pub total_weight: String,
    /// Spool remaining weight in grams
    #[serde(rename = "Weight Remaining (g)")]
    pub weight_remaining: String,
    /// Always 1 on export, ignored on import
    #[serde(rename = "Quantity")]
    pub quantity: String,
    /// `spool` or `refill`
    #[serde(rename = "Spool Type")]
    pub spool_type: String,
    /// Spool body material, `none` when unknown
    #[serde(rename = "Spool Material")]
    pub spool_material: String,
    /// `Yes` or `No`
    #[serde(rename = "Reusable Spool")]
    pub reusable_spool: String,
    /// Diameter in millimetres
    #[serde(rename = "Diameter (mm)")]
    pub diameter: String,
    /// Storage location
    #[serde(rename = "Location")]
    pub location: String,
    /// Free-form notes
    #[serde(rename = "Notes")]
    pub notes: String,
    /// `MM/dd/yyyy`
    #[serde(rename = "Date Added")]
    pub date_added: String,
    /// Price per kilogram, plain decimal
    #[serde(rename = "Purchase Price Per Kg")]
    pub purchase_price_per_kg: String,
}

impl CsvFilamentRecord {
    fn is_blank(&self) -> bool {
        [
            &self.brand,
            &self.filament_type,
            &self.color_name,
            &self.total_weight,
            &self.weight_remaining,
        ]
        .iter()
        .all(|field| field.trim().is_empty())
    }

    /// Filament identity used to merge rows. Diameter is compared in hundredths of a millimetre.
    fn identity(&self) -> (String, String, String, String, String, i64) {
        #[allow(clippy::cast_possible_truncation)] // diameters are a few millimetres
        let diameter = (parse_diameter(&self.diameter) * 100.0).round() as i64;
        (
            self.brand.trim().to_string(),
            self.filament_type.trim().to_string(),
            self.finish.trim().to_string(),
            self.color_name.trim().to_string(),
            self.color_code.trim().to_string(),
            diameter,
        )
    }

    fn to_spool(&self, created_at: DateTime<Utc>) -> NewSpool {
        let total_weight = parse_grams(&self.total_weight).unwrap_or(DEFAULT_SPOOL_WEIGHT);
        let material = self.spool_material.trim();
        NewSpool {
            total_weight,
            weight_remaining: parse_grams(&self.weight_remaining)
                .map_or(total_weight, |grams| grams.min(total_weight)),
            is_refill: self.spool_type.trim().eq_ignore_ascii_case("refill"),
            spool_material: (!material.is_empty() && !material.eq_ignore_ascii_case(NO_MATERIAL))
                .then(|| material.to_string()),
            is_reusable: self.reusable_spool.trim().eq_ignore_ascii_case("yes"),
            purchase_price_per_kg: Some(parse_price(&self.purchase_price_per_kg)),
            created_at: Some(created_at),
        }
    }
}

/// Counts from one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Filaments created
    pub filaments_created: usize,
    /// Spools created
    pub spools_created: usize,
    /// Reusable bodies that started being tracked
    pub containers_created: usize,
    /// Rows with no content
    pub rows_skipped: usize,
}

/// Writes every filament and spool as CSV rows to `writer`.
pub async fn export_csv<W: Write>(db: &DatabaseConnection, writer: W) -> Result<usize> {
    let catalog = get_full_catalog(db).await?;
    let mut wtr = csv::Writer::from_writer(writer);

    let mut rows = 0;
    for stock in &catalog {
        let filament = &stock.filament;
        for spool in &stock.spools {
            let price = spool.purchase_price_per_kg.or(filament.price_per_kg);
            // An emptied spool must come back empty, whatever weight is on record.
            let weight_remaining = if spool.is_empty() {
                0.0
            } else {
                spool.weight_remaining
            };
            wtr.serialize(CsvFilamentRecord {
                brand: filament.brand.clone(),
                filament_type: filament.filament_type.clone(),
                finish: filament.finish.clone().unwrap_or_default(),
                color_name: filament.color_name.clone(),
                color_code: filament.color_code.clone(),
                total_weight: spool.total_weight.to_string(),
                weight_remaining: weight_remaining.to_string(),
                quantity: "1".to_string(),
                spool_type: if spool.is_refill { "refill" } else { "spool" }.to_string(),
                spool_material: spool
                    .spool_material
                    .clone()
                    .unwrap_or_else(|| NO_MATERIAL.to_string()),
                reusable_spool: if spool.is_reusable { "Yes" } else { "No" }.to_string(),
                diameter: filament.diameter.to_string(),
                location: filament.location.clone().unwrap_or_default(),
                notes: filament.notes.clone().unwrap_or_default(),
                date_added: filament.created_at.format(DATE_FORMAT).to_string(),
                purchase_price_per_kg: price.map(|p| p.to_string()).unwrap_or_default(),
            })?;
            rows += 1;
        }
    }

    wtr.flush()?;
    info!("Exported {rows} spool rows");
    Ok(rows)
}

/// Exports the inventory into a string.
pub async fn export_csv_string(db: &DatabaseConnection) -> Result<String> {
    let mut buffer = Vec::new();
    export_csv(db, &mut buffer).await?;
    String::from_utf8(buffer).map_err(|e| Error::Validation {
        message: format!("Exported CSV is not valid UTF-8: {e}"),
    })
}

/// Imports CSV rows from `reader`.
///
/// The whole import is one transaction: a row without brand, type or color
/// name aborts it and nothing is stored. Values that fail to parse fall back
/// to defaults (1000g total, remaining equal to total, 1.75mm, today). A
/// missing or non-positive price becomes the fallback price. Reusable spools
/// that no body points at yet are tracked afterwards.
#[instrument(skip(db, reader))]
pub async fn import_csv<R: Read>(db: &DatabaseConnection, reader: R) -> Result<ImportSummary> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut summary = ImportSummary::default();
    let mut order = Vec::new();
    let mut groups: HashMap<_, Vec<CsvFilamentRecord>> = HashMap::new();

    for (index, row) in rdr.deserialize::<CsvFilamentRecord>().enumerate() {
        let record = row?;
        if record.is_blank() {
            summary.rows_skipped += 1;
            continue;
        }

        for (field, value) in [
            ("Brand", &record.brand),
            ("Type", &record.filament_type),
            ("Color Name", &record.color_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation {
                    message: format!("Row {}: {field} is required", index + 2),
                });
            }
        }

        let key = record.identity();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(record);
    }

    let txn = db.begin().await?;

    for key in order {
        let Some(records) = groups.remove(&key) else {
            continue;
        };
        let Some(first) = records.first() else {
            continue;
        };

        let created_at = parse_date(&first.date_added);
        let new_filament = NewFilament {
            details: FilamentDetails {
                brand: key.0,
                filament_type: key.1,
                finish: Some(key.2),
                color_name: key.3,
                color_code: key.4,
                diameter: parse_diameter(&first.diameter),
                price_per_kg: None,
                location: Some(first.location.clone()),
                notes: Some(first.notes.clone()),
            },
            created_at: Some(created_at),
            spools: records.iter().map(|r| r.to_spool(created_at)).collect(),
        };

        let stock = insert_filament(&txn, &new_filament, false).await?;
        summary.filaments_created += 1;
        summary.spools_created += stock.spool_count();
    }

    summary.containers_created = reusable::track_untracked_spools(&txn).await?;
    txn.commit().await?;

    info!(
        "Imported {} filaments with {} spools, {} reusable bodies tracked",
        summary.filaments_created, summary.spools_created, summary.containers_created
    );
    Ok(summary)
}

fn parse_grams(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|g| g.is_finite() && *g >= 0.0)
}

fn parse_diameter(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(DEFAULT_DIAMETER)
}

fn parse_price(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
        .unwrap_or(FALLBACK_PRICE_PER_KG)
}

/// Reads `MM/dd/yyyy`, RFC 3339 or ISO dates. Anything else is now.
fn parse_date(value: &str) -> DateTime<Utc> {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return timestamp.with_timezone(&Utc);
    }
    [DATE_FORMAT, "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map_or_else(Utc::now, |naive| naive.and_utc())
}
