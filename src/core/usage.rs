//! Consumption allocator - records filament usage against a filament's spools.
//!
//! A usage request for N grams is spread over the filament's available spools
//! in a fixed order: spools that are already opened come before unopened ones,
//! and within each group the oldest spool goes first (ties broken by id).
//! Running out of stock part-way is not an error; the result carries the
//! shortfall instead. All spool writes of one request commit together.

use crate::{
    core::{
        reusable,
        spool::{get_available_spools, round_grams},
    },
    entities::{Filament, spool},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::fmt;
use tracing::{info, instrument, warn};

/// One debit applied to one spool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpoolAllocation {
    /// Spool that was debited
    pub spool_id: i64,
    /// Grams taken from it
    pub grams_used: f64,
    /// Whether this debit emptied the spool
    pub was_emptied: bool,
    /// Grams left on the spool afterwards
    pub remaining_after: f64,
}

/// Outcome of a usage request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageResult {
    /// Filament the usage was recorded against
    pub filament_id: i64,
    /// Grams asked for
    pub total_grams_requested: f64,
    /// Debits in the order they were applied
    pub allocations: Vec<SpoolAllocation>,
    /// Set when the available spools could not cover the request
    pub insufficient_filament: bool,
    /// Grams that could not be allocated
    pub shortfall_grams: f64,
}

impl UsageResult {
    /// Grams actually taken across all spools.
    #[must_use]
    pub fn grams_allocated(&self) -> f64 {
        self.allocations.iter().map(|a| a.grams_used).sum()
    }

    /// Number of spools this request emptied.
    #[must_use]
    pub fn spools_emptied(&self) -> usize {
        self.allocations.iter().filter(|a| a.was_emptied).count()
    }

    /// Human-readable summary of the allocation.
    #[must_use]
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UsageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.insufficient_filament {
            return write!(
                f,
                "Insufficient filament: short by {:.1}g (used {:.1}g of {:.1}g requested, {} spool(s) emptied)",
                self.shortfall_grams,
                self.grams_allocated(),
                self.total_grams_requested,
                self.spools_emptied()
            );
        }

        match self.allocations.len() {
            0 => write!(f, "Fully satisfied: nothing to allocate"),
            1 => write!(
                f,
                "Fully satisfied: used {:.1}g from spool {}",
                self.total_grams_requested, self.allocations[0].spool_id
            ),
            count => write!(
                f,
                "Used {:.1}g across {count} spool(s), {} emptied",
                self.total_grams_requested,
                self.spools_emptied()
            ),
        }
    }
}

/// Puts spools in draw order: opened before unopened, then oldest first.
pub fn sort_for_allocation(spools: &mut [spool::Model]) {
    spools.sort_by_key(|s| (!s.is_opened(), s.created_at, s.id));
}

/// Plans a usage of `grams` over `available`, without touching the store.
///
/// Returns the updated spools alongside the result. `available` is taken in
/// the order given, so callers sort it with [`sort_for_allocation`] first.
/// Debits and balances are kept to hundredths of a gram.
#[must_use]
pub fn plan_allocation(
    filament_id: i64,
    available: Vec<spool::Model>,
    grams: f64,
    now: DateTime<Utc>,
) -> (Vec<spool::Model>, UsageResult) {
    let mut remaining_to_allocate = round_grams(grams);
    let mut allocations = Vec::new();
    let mut updated = Vec::new();

    for mut spool in available {
        if remaining_to_allocate <= 0.0 {
            break;
        }

        let take = round_grams(remaining_to_allocate.min(spool.weight_remaining));
        spool.weight_remaining = round_grams(spool.weight_remaining - take);

        let was_emptied = spool.weight_remaining <= 0.0;
        if was_emptied {
            spool.weight_remaining = 0.0;
            spool.emptied_at = Some(now);
        }

        allocations.push(SpoolAllocation {
            spool_id: spool.id,
            grams_used: take,
            was_emptied,
            remaining_after: spool.weight_remaining,
        });
        remaining_to_allocate = round_grams(remaining_to_allocate - take);
        updated.push(spool);
    }

    let insufficient_filament = remaining_to_allocate > 0.0;
    let result = UsageResult {
        filament_id,
        total_grams_requested: grams,
        allocations,
        insufficient_filament,
        shortfall_grams: if insufficient_filament {
            remaining_to_allocate
        } else {
            0.0
        },
    };
    (updated, result)
}

/// Records `grams` of usage against a filament.
///
/// Fails with [`Error::NoStockAvailable`] when the filament has no available
/// spool, even for a zero-gram request. A request larger than the stock
/// empties every available spool and reports the shortfall. Reusable spools
/// emptied here release their body in the same transaction.
#[instrument(skip(db))]
pub async fn record_usage(
    db: &DatabaseConnection,
    filament_id: i64,
    grams: f64,
) -> Result<UsageResult> {
    if !grams.is_finite() || grams < 0.0 {
        return Err(Error::InvalidAmount { amount: grams });
    }

    let txn = db.begin().await?;

    Filament::find_by_id(filament_id)
        .one(&txn)
        .await?
        .ok_or(Error::FilamentNotFound { id: filament_id })?;

    let mut available = get_available_spools(&txn, filament_id).await?;
    if available.is_empty() {
        return Err(Error::NoStockAvailable { filament_id });
    }
    sort_for_allocation(&mut available);

    let (updated, result) = plan_allocation(filament_id, available, grams, Utc::now());

    for spool in updated {
        let spool_id = spool.id;
        let release_body = spool.is_reusable && spool.is_empty();
        let (weight_remaining, emptied_at) = (spool.weight_remaining, spool.emptied_at);

        let mut active: spool::ActiveModel = spool.into();
        active.weight_remaining = Set(weight_remaining);
        active.emptied_at = Set(emptied_at);
        active.update(&txn).await?;

        if release_body {
            reusable::release_for_spool(&txn, spool_id).await?;
        }
    }

    txn.commit().await?;

    if result.insufficient_filament {
        warn!(
            "Filament {filament_id} short by {:.1}g after using {:.1}g",
            result.shortfall_grams,
            result.grams_allocated()
        );
    } else {
        info!("Recorded {grams:.1}g against filament {filament_id}");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::spool::{NewSpool, get_spool_by_id};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_scenario_partial_use_then_shortfall() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        let spool = add_test_spool(&db, id, NewSpool::full(1000.0)).await?;

        let result = record_usage(&db, id, 300.0).await?;
        assert!(!result.insufficient_filament);
        assert_eq!(result.shortfall_grams, 0.0);
        assert_eq!(
            result.allocations,
            vec![SpoolAllocation {
                spool_id: spool.id,
                grams_used: 300.0,
                was_emptied: false,
                remaining_after: 700.0,
            }]
        );
        let stored = get_spool_by_id(&db, spool.id).await?.unwrap();
        assert_eq!(stored.weight_remaining, 700.0);
        assert!(!stored.is_empty());

        let result = record_usage(&db, id, 800.0).await?;
        assert!(result.insufficient_filament);
        assert_eq!(result.shortfall_grams, 100.0);
        assert_eq!(result.allocations.len(), 1);
        assert!(result.allocations[0].was_emptied);
        assert_eq!(result.allocations[0].grams_used, 700.0);

        let stored = get_spool_by_id(&db, spool.id).await?.unwrap();
        assert_eq!(stored.weight_remaining, 0.0);
        assert!(stored.emptied_at.is_some());
        assert!(stored.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_fractional_use_empties_spool_exactly() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        let spool = add_test_spool(&db, id, NewSpool::full(1000.0)).await?;

        for _ in 0..3 {
            let result = record_usage(&db, id, 333.3).await?;
            assert!(!result.insufficient_filament);
        }
        let stored = get_spool_by_id(&db, spool.id).await?.unwrap();
        assert_eq!(stored.weight_remaining, 0.1);

        let result = record_usage(&db, id, 0.1).await?;
        assert!(!result.insufficient_filament);
        assert_eq!(result.allocations[0].remaining_after, 0.0);
        assert!(result.allocations[0].was_emptied);

        let stored = get_spool_by_id(&db, spool.id).await?.unwrap();
        assert_eq!(stored.weight_remaining, 0.0);
        assert!(stored.is_empty());
        assert!(matches!(
            record_usage(&db, id, 1.0).await,
            Err(Error::NoStockAvailable { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_plan_covers_fractional_stock_exactly() {
        let now = Utc::now();
        let spools = vec![
            test_spool_model(1, 1000.0, 0.1, days_ago(2)),
            test_spool_model(2, 1000.0, 0.2, days_ago(1)),
        ];

        let (updated, result) = plan_allocation(1, spools, 0.3, now);
        assert!(!result.insufficient_filament);
        assert_eq!(result.shortfall_grams, 0.0);
        assert!(updated.iter().all(|s| s.weight_remaining == 0.0));
        assert_eq!(result.spools_emptied(), 2);
    }

    #[tokio::test]
    async fn test_opened_spool_is_used_before_unopened() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        let opened = add_test_spool(
            &db,
            id,
            NewSpool {
                weight_remaining: 600.0,
                created_at: Some(days_ago(1)),
                ..NewSpool::full(1000.0)
            },
        )
        .await?;
        let fresh = add_test_spool(
            &db,
            id,
            NewSpool {
                created_at: Some(days_ago(0)),
                ..NewSpool::full(1000.0)
            },
        )
        .await?;

        let result = record_usage(&db, id, 700.0).await?;
        assert_eq!(result.allocations.len(), 2);
        assert_eq!(result.allocations[0].spool_id, opened.id);
        assert_eq!(result.allocations[0].grams_used, 600.0);
        assert!(result.allocations[0].was_emptied);
        assert_eq!(result.allocations[1].spool_id, fresh.id);
        assert_eq!(result.allocations[1].grams_used, 100.0);
        assert_eq!(result.allocations[1].remaining_after, 900.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_opened_spool_wins_even_when_newer() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        add_test_spool(
            &db,
            id,
            NewSpool {
                created_at: Some(days_ago(30)),
                ..NewSpool::full(1000.0)
            },
        )
        .await?;
        let opened = add_test_spool(
            &db,
            id,
            NewSpool {
                weight_remaining: 999.0,
                created_at: Some(days_ago(1)),
                ..NewSpool::full(1000.0)
            },
        )
        .await?;

        let result = record_usage(&db, id, 10.0).await?;
        assert_eq!(result.allocations.len(), 1);
        assert_eq!(result.allocations[0].spool_id, opened.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_oldest_unopened_spool_first() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        let newer = add_test_spool(
            &db,
            id,
            NewSpool {
                created_at: Some(days_ago(2)),
                ..NewSpool::full(1000.0)
            },
        )
        .await?;
        let older = add_test_spool(
            &db,
            id,
            NewSpool {
                created_at: Some(days_ago(9)),
                ..NewSpool::full(1000.0)
            },
        )
        .await?;

        let result = record_usage(&db, id, 50.0).await?;
        assert_eq!(result.allocations[0].spool_id, older.id);

        let untouched = get_spool_by_id(&db, newer.id).await?.unwrap();
        assert_eq!(untouched.weight_remaining, 1000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_satisfiable_request_allocates_exactly() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        add_test_spool(&db, id, NewSpool::full(250.0)).await?;
        add_test_spool(&db, id, NewSpool::full(250.0)).await?;
        add_test_spool(&db, id, NewSpool::full(250.0)).await?;

        let result = record_usage(&db, id, 600.0).await?;
        assert!(!result.insufficient_filament);
        assert_eq!(result.shortfall_grams, 0.0);
        assert_eq!(result.grams_allocated(), 600.0);
        assert_eq!(result.spools_emptied(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_over_request_empties_everything() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        add_test_spool(
            &db,
            id,
            NewSpool {
                weight_remaining: 150.0,
                ..NewSpool::full(1000.0)
            },
        )
        .await?;
        add_test_spool(&db, id, NewSpool::full(200.0)).await?;

        let result = record_usage(&db, id, 1000.0).await?;
        assert!(result.insufficient_filament);
        assert_eq!(result.shortfall_grams, 650.0);
        assert_eq!(result.spools_emptied(), 2);

        let again = record_usage(&db, id, 1.0).await;
        assert!(matches!(
            again,
            Err(Error::NoStockAvailable { filament_id }) if filament_id == id
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_grams_is_a_no_op_with_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        let spool = add_test_spool(&db, id, NewSpool::full(1000.0)).await?;

        let result = record_usage(&db, id, 0.0).await?;
        assert!(result.allocations.is_empty());
        assert!(!result.insufficient_filament);
        assert_eq!(result.summary(), "Fully satisfied: nothing to allocate");

        let stored = get_spool_by_id(&db, spool.id).await?.unwrap();
        assert_eq!(stored.weight_remaining, 1000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_zero_grams_without_stock_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;

        let result = record_usage(&db, id, 0.0).await;
        assert!(matches!(result, Err(Error::NoStockAvailable { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_emptied_spools_are_not_available() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        let spool = add_test_spool(&db, id, NewSpool::full(1000.0)).await?;
        crate::core::spool::mark_spool_empty(&db, spool.id).await?;

        let result = record_usage(&db, id, 10.0).await;
        assert!(matches!(result, Err(Error::NoStockAvailable { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_filament() -> Result<()> {
        let db = setup_test_db().await?;
        let result = record_usage(&db, 404, 10.0).await;
        assert!(matches!(result, Err(Error::FilamentNotFound { id: 404 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_amount_is_rejected_before_store() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = record_usage(&db, 1, -5.0).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        let result = record_usage(&db, 1, f64::INFINITY).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_emptying_reusable_spool_releases_body() -> Result<()> {
        let db = setup_test_db().await?;
        let filament = create_test_filament(&db, "Black").await?;
        let id = filament.filament.id;
        let spool = create_reusable_spool(&db, id, 400.0).await?;

        let result = record_usage(&db, id, 400.0).await?;
        assert!(!result.insufficient_filament);
        assert!(result.allocations[0].was_emptied);

        assert!(reusable::get_body_for_spool(&db, spool.id).await?.is_none());
        let bodies = reusable::get_all_reusable_spools(&db).await?;
        assert_eq!(bodies.len(), 1);
        assert!(!bodies[0].in_use);
        Ok(())
    }

    #[test]
    fn test_plan_tie_break_on_id() {
        let created = days_ago(3);
        let mut spools = vec![
            test_spool_model(8, 1000.0, 1000.0, created),
            test_spool_model(5, 1000.0, 1000.0, created),
        ];
        sort_for_allocation(&mut spools);
        assert_eq!(spools[0].id, 5);

        let (updated, result) = plan_allocation(1, spools, 1500.0, Utc::now());
        assert_eq!(updated.len(), 2);
        assert_eq!(result.allocations[0].spool_id, 5);
        assert!(result.allocations[0].was_emptied);
        assert_eq!(result.allocations[1].remaining_after, 500.0);
        assert!(updated[0].emptied_at.is_some());
        assert!(updated[1].emptied_at.is_none());
    }

    #[test]
    fn test_summaries() {
        let (_, one) = plan_allocation(
            1,
            vec![test_spool_model(3, 1000.0, 1000.0, days_ago(1))],
            120.0,
            Utc::now(),
        );
        assert_eq!(one.summary(), "Fully satisfied: used 120.0g from spool 3");

        let (_, many) = plan_allocation(
            1,
            vec![
                test_spool_model(1, 1000.0, 100.0, days_ago(2)),
                test_spool_model(2, 1000.0, 1000.0, days_ago(1)),
            ],
            300.0,
            Utc::now(),
        );
        assert_eq!(many.summary(), "Used 300.0g across 2 spool(s), 1 emptied");

        let (_, short) = plan_allocation(
            1,
            vec![test_spool_model(1, 1000.0, 100.0, days_ago(2))],
            250.0,
            Utc::now(),
        );
        assert_eq!(
            short.summary(),
            "Insufficient filament: short by 150.0g (used 100.0g of 250.0g requested, 1 spool(s) emptied)"
        );
    }
}
