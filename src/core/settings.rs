//! Application settings - stock thresholds and display currency.
//!
//! The settings table holds a single row. It is created with defaults the
//! first time it is read, and every update is pushed to the shared
//! [`ThresholdPolicy`] so status checks pick up the new cutoffs at once.

use crate::{
    core::threshold::{DEFAULT_CRITICAL_THRESHOLD, DEFAULT_LOW_THRESHOLD, ThresholdPolicy, Thresholds},
    entities::{AppSettings, app_settings},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

/// Currency used until the user picks another.
pub const DEFAULT_CURRENCY: &str = "DKK";

/// Requested settings change. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsUpdate {
    /// New low threshold in grams
    pub low_threshold: Option<f64>,
    /// New critical threshold in grams
    pub critical_threshold: Option<f64>,
    /// New ISO currency code
    pub currency: Option<String>,
}

/// Returns the settings row, inserting the defaults when there is none.
pub async fn get_settings<C>(db: &C) -> Result<app_settings::Model>
where
    C: ConnectionTrait,
{
    if let Some(settings) = AppSettings::find()
        .order_by_asc(app_settings::Column::Id)
        .one(db)
        .await?
    {
        return Ok(settings);
    }

    let defaults = app_settings::ActiveModel {
        low_threshold: Set(DEFAULT_LOW_THRESHOLD),
        critical_threshold: Set(DEFAULT_CRITICAL_THRESHOLD),
        currency: Set(DEFAULT_CURRENCY.to_string()),
        ..Default::default()
    };
    info!("No settings found, storing defaults");
    defaults.insert(db).await.map_err(Into::into)
}

/// Reads the stored thresholds.
pub async fn load_thresholds<C>(db: &C) -> Result<Thresholds>
where
    C: ConnectionTrait,
{
    let settings = get_settings(db).await?;
    Ok(Thresholds {
        low: settings.low_threshold,
        critical: settings.critical_threshold,
    })
}

/// Applies `update`, saves it and publishes the new thresholds to `policy`.
///
/// Thresholds must be finite and non-negative, with the critical cutoff not
/// above the low one. The currency code is stored upper-case.
pub async fn update_settings(
    db: &DatabaseConnection,
    policy: &ThresholdPolicy,
    update: SettingsUpdate,
) -> Result<app_settings::Model> {
    let current = get_settings(db).await?;

    let low = update.low_threshold.unwrap_or(current.low_threshold);
    let critical = update.critical_threshold.unwrap_or(current.critical_threshold);
    for amount in [low, critical] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }
    if critical > low {
        return Err(Error::Validation {
            message: format!(
                "Critical threshold ({critical}g) cannot be above the low threshold ({low}g)"
            ),
        });
    }

    let currency = match update.currency {
        Some(code) => {
            let code = code.trim().to_uppercase();
            if code.is_empty() {
                return Err(Error::Validation {
                    message: "Currency cannot be empty".to_string(),
                });
            }
            code
        }
        None => current.currency.clone(),
    };

    let mut active: app_settings::ActiveModel = current.into();
    active.low_threshold = Set(low);
    active.critical_threshold = Set(critical);
    active.currency = Set(currency);
    let saved = active.update(db).await?;

    policy.set(Thresholds {
        low: saved.low_threshold,
        critical: saved.critical_threshold,
    });
    info!(
        "Settings updated: low={}g critical={}g currency={}",
        saved.low_threshold, saved.critical_threshold, saved.currency
    );
    Ok(saved)
}
