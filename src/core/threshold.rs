//! Stock threshold policy.
//!
//! Maps a remaining weight to a status tier using two cutoffs. The cutoffs
//! are held by a [`ThresholdPolicy`] handle that is passed to whatever needs
//! to evaluate status; updating it notifies every subscriber.

use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tokio::sync::watch;

/// Default low threshold in grams.
pub const DEFAULT_LOW_THRESHOLD: f64 = 500.0;
/// Default critical threshold in grams.
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 250.0;

/// Stock level of a filament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    /// Plenty left
    Ok,
    /// Below the low threshold
    Low,
    /// Below the critical threshold
    Critical,
}

impl StockStatus {
    /// Lowercase name as used in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Low => "low",
            Self::Critical => "critical",
        }
    }

    /// Traffic-light marker for chat output.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Ok => "🟢",
            Self::Low => "🟡",
            Self::Critical => "🔴",
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of `weight_remaining` against the two cutoffs.
///
/// Comparisons are strict: a weight exactly at a threshold gets the better tier.
#[must_use]
pub fn status(weight_remaining: f64, low_threshold: f64, critical_threshold: f64) -> StockStatus {
    if weight_remaining < critical_threshold {
        StockStatus::Critical
    } else if weight_remaining < low_threshold {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

/// The pair of cutoffs, in grams.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Below this a filament is low
    pub low: f64,
    /// Below this a filament is critical
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW_THRESHOLD,
            critical: DEFAULT_CRITICAL_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Status of a remaining weight under these cutoffs.
    #[must_use]
    pub fn status(&self, weight_remaining: f64) -> StockStatus {
        status(weight_remaining, self.low, self.critical)
    }
}

/// Shared, updatable threshold configuration.
///
/// Cloning the handle shares the same configuration. Updates are visible to
/// every clone immediately and wake any [`watch::Receiver`] obtained from
/// [`ThresholdPolicy::subscribe`].
#[derive(Debug, Clone)]
pub struct ThresholdPolicy {
    sender: Arc<watch::Sender<Thresholds>>,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl ThresholdPolicy {
    /// Creates a policy starting from `initial`.
    #[must_use]
    pub fn new(initial: Thresholds) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// The cutoffs currently in effect.
    #[must_use]
    pub fn current(&self) -> Thresholds {
        *self.sender.borrow()
    }

    /// Status of a remaining weight under the current cutoffs.
    #[must_use]
    pub fn status(&self, weight_remaining: f64) -> StockStatus {
        self.current().status(weight_remaining)
    }

    /// Replaces the cutoffs and notifies subscribers.
    pub fn set(&self, thresholds: Thresholds) {
        self.sender.send_replace(thresholds);
    }

    /// Receiver that is marked changed on every [`ThresholdPolicy::set`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Thresholds> {
        self.sender.subscribe()
    }
}
