//! Report generation business logic.
//!
//! This module turns filament stock into report data: per-filament reports,
//! inventory-wide statistics, progress bars and one-line summaries. All
//! functions are framework-agnostic; the bot layer only decides how to send
//! the text.

use crate::{
    core::{
        filament::{FilamentStock, get_all_filaments, get_filament_by_id},
        threshold::{StockStatus, Thresholds},
    },
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

/// Stock report for one filament.
#[derive(Debug, Clone, Serialize)]
pub struct FilamentReport {
    /// The filament with all of its spools
    pub stock: FilamentStock,
    /// Status of the remaining weight
    pub status: StockStatus,
    /// Remaining weight as a percentage of the total
    pub progress_percent: f64,
    /// Price per kg used for valuation
    pub price_per_kg: f64,
    /// Value of the filament still on the spools
    pub remaining_value: f64,
    /// Spools that can still be drawn from
    pub available_spools: usize,
}

/// Builds the report for one filament. Remaining weight and status count
/// available spools only; the progress bar is measured against every spool.
pub async fn generate_filament_report(
    db: &DatabaseConnection,
    filament_id: i64,
    thresholds: &Thresholds,
) -> Result<FilamentReport> {
    let stock = get_filament_by_id(db, filament_id)
        .await?
        .ok_or(Error::FilamentNotFound { id: filament_id })?;

    let price_per_kg = stock.effective_price_per_kg();
    Ok(FilamentReport {
        status: stock.status(thresholds),
        progress_percent: calculate_progress(stock.weight_remaining(), stock.total_weight()),
        price_per_kg,
        remaining_value: stock.weight_remaining() / 1000.0 * price_per_kg,
        available_spools: stock.available_spools().count(),
        stock,
    })
}

/// Inventory-wide counts, computed from available spools only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockStatistics {
    /// Filaments in the catalog
    pub filaments: usize,
    /// Spools with filament left
    pub spools: usize,
    /// Filaments with enough stock
    pub ok: usize,
    /// Filaments below the low threshold
    pub low: usize,
    /// Filaments below the critical threshold
    pub critical: usize,
    /// Grams on hand across the inventory
    pub weight_remaining: f64,
    /// Value of the stock on hand
    pub stock_value: f64,
}

impl StockStatistics {
    /// Tallies `stock` under `thresholds`.
    #[must_use]
    pub fn from_stock(stock: &[FilamentStock], thresholds: &Thresholds) -> Self {
        let mut stats = Self {
            filaments: stock.len(),
            ..Self::default()
        };
        for filament in stock {
            match filament.status(thresholds) {
                StockStatus::Ok => stats.ok += 1,
                StockStatus::Low => stats.low += 1,
                StockStatus::Critical => stats.critical += 1,
            }
            let remaining = filament.weight_remaining();
            stats.spools += filament.spool_count();
            stats.weight_remaining += remaining;
            stats.stock_value += remaining / 1000.0 * filament.effective_price_per_kg();
        }
        stats
    }
}

/// Counts filaments per status tier and totals the stock on hand.
pub async fn get_statistics(
    db: &DatabaseConnection,
    thresholds: &Thresholds,
) -> Result<StockStatistics> {
    let stock = get_all_filaments(db).await?;
    Ok(StockStatistics::from_stock(&stock, thresholds))
}

/// Remaining weight as a percentage of the total, 0 for an empty total.
#[must_use]
pub fn calculate_progress(remaining: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }

    (remaining / total) * 100.0
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is in [0, 100] and length is small, so the result fits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// Formats grams, switching to kilograms from 1000 g up.
#[must_use]
pub fn format_grams(grams: f64) -> String {
    if grams.abs() >= 1000.0 {
        format!("{:.2} kg", grams / 1000.0)
    } else {
        format!("{grams:.0} g")
    }
}

/// Formats a price with its currency code, e.g. "149.00 DKK".
#[must_use]
pub fn format_price(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

/// One-line stock summary, e.g. "🟡 eSun PLA Red #4 | 320 g left | 1 spool(s)".
#[must_use]
pub fn format_stock_line(stock: &FilamentStock, thresholds: &Thresholds) -> String {
    format!(
        "{} {} | {} left | {} spool(s)",
        stock.status(thresholds).emoji(),
        stock.label(),
        format_grams(stock.weight_remaining()),
        stock.spool_count()
    )
}

/// Joins `lines` into messages no longer than `max_len` characters each.
///
/// A single line longer than `max_len` gets a message of its own.
#[must_use]
pub fn chunk_lines(lines: &[String], max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in lines {
        let needed = if current.is_empty() {
            line.chars().count()
        } else {
            current.chars().count() + 1 + line.chars().count()
        };
        if needed > max_len && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::spool::NewSpool;
    use crate::test_utils::*;

    #[test]
    fn test_calculate_progress() {
        assert_eq!(calculate_progress(1000.0, 1000.0), 100.0);
        assert_eq!(calculate_progress(250.0, 1000.0), 25.0);
        assert_eq!(calculate_progress(0.0, 1000.0), 0.0);
        assert_eq!(calculate_progress(50.0, 0.0), 0.0);
    }

    #[test]
    fn test_format_progress_bar_full() {
        let bar = format_progress_bar(100.0, Some(10));
        assert_eq!(bar, "[██████████] 100.0%");
    }

    #[test]
    fn test_format_progress_bar_half() {
        let bar = format_progress_bar(50.0, Some(10));
        assert_eq!(bar, "[█████░░░░░] 50.0%");
    }

    #[test]
    fn test_format_progress_bar_zero() {
        let bar = format_progress_bar(0.0, None);
        assert_eq!(bar, "[░░░░░░░░░░] 0.0%");
    }

    #[test]
    fn test_format_grams() {
        assert_eq!(format_grams(320.0), "320 g");
        assert_eq!(format_grams(1000.0), "1.00 kg");
        assert_eq!(format_grams(2450.0), "2.45 kg");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(149.0, "DKK"), "149.00 DKK");
    }

    #[test]
    fn test_chunk_lines() {
        let lines: Vec<String> = ["aaaa", "bbbb", "cccc"].iter().map(ToString::to_string).collect();
        assert_eq!(chunk_lines(&lines, 9), vec!["aaaa\nbbbb", "cccc"]);
        assert_eq!(chunk_lines(&lines, 100), vec!["aaaa\nbbbb\ncccc"]);
        assert_eq!(chunk_lines(&lines, 2), vec!["aaaa", "bbbb", "cccc"]);
        assert!(chunk_lines(&[], 10).is_empty());
    }

    #[tokio::test]
    async fn test_generate_filament_report() -> Result<()> {
        let db = setup_test_db().await?;
        let stock = create_test_filament(&db, "Green").await?;
        let id = stock.filament.id;
        add_test_spool(
            &db,
            id,
            NewSpool {
                weight_remaining: 200.0,
                purchase_price_per_kg: Some(200.0),
                ..NewSpool::full(1000.0)
            },
        )
        .await?;
        add_test_spool(
            &db,
            id,
            NewSpool {
                weight_remaining: 0.0,
                ..NewSpool::full(1000.0)
            },
        )
        .await?;

        let report = generate_filament_report(&db, id, &Thresholds::default()).await?;
        assert_eq!(report.status, StockStatus::Critical);
        assert_eq!(report.progress_percent, 10.0);
        assert_eq!(report.price_per_kg, 200.0);
        assert_eq!(report.remaining_value, 40.0);
        assert_eq!(report.available_spools, 1);
        assert_eq!(report.stock.spool_count(), 2);

        let missing = generate_filament_report(&db, 999, &Thresholds::default()).await;
        assert!(matches!(missing, Err(Error::FilamentNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_report_and_stock_list_agree_on_emptied_spool() -> Result<()> {
        let db = setup_test_db().await?;
        let stock = create_test_filament(&db, "Black").await?;
        let id = stock.filament.id;
        let spool = add_test_spool(&db, id, NewSpool::full(1000.0)).await?;
        crate::core::spool::mark_spool_empty(&db, spool.id).await?;

        let thresholds = Thresholds::default();
        let report = generate_filament_report(&db, id, &thresholds).await?;
        let listed = get_all_filaments(&db)
            .await?
            .into_iter()
            .find(|s| s.filament.id == id)
            .ok_or(Error::FilamentNotFound { id })?;

        assert_eq!(report.status, StockStatus::Critical);
        assert_eq!(report.status, listed.status(&thresholds));
        assert_eq!(report.stock.weight_remaining(), 0.0);
        assert_eq!(report.stock.weight_remaining(), listed.weight_remaining());
        assert_eq!(report.remaining_value, 0.0);
        assert_eq!(report.available_spools, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_statistics() -> Result<()> {
        let db = setup_test_db().await?;
        for (color, grams) in [("Red", 200.0), ("Blue", 600.0), ("White", 400.0)] {
            let stock = create_test_filament(&db, color).await?;
            add_test_spool(&db, stock.filament.id, NewSpool::full(grams)).await?;
        }
        create_test_filament(&db, "Empty").await?;

        let stats = get_statistics(&db, &Thresholds::default()).await?;
        assert_eq!(stats.filaments, 4);
        assert_eq!(stats.spools, 3);
        assert_eq!(stats.ok, 1);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.critical, 2);
        assert_eq!(stats.weight_remaining, 1200.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_format_stock_line() -> Result<()> {
        let db = setup_test_db().await?;
        let stock = create_test_filament(&db, "Red").await?;
        add_test_spool(&db, stock.filament.id, NewSpool::full(320.0)).await?;
        let stock = get_filament_by_id(&db, stock.filament.id).await?.unwrap_or(stock);

        let line = format_stock_line(&stock, &Thresholds::default());
        assert!(line.starts_with("🟡 "));
        assert!(line.ends_with("| 320 g left | 1 spool(s)"));
        Ok(())
    }
}
