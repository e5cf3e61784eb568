//! The forecast document produced by the generation pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A complete cash-flow projection for one user.
///
/// Produced wholesale by [`ForecastEngine::regenerate`] and persisted as a
/// single document per user; it is never mutated in place, only replaced.
///
/// Invariant: `dates`, `daily_net`, `cumulative_balance` and
/// `confidence_band` all have exactly `horizon_days` entries.
///
/// [`ForecastEngine::regenerate`]: crate::ForecastEngine::regenerate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub generated_at: DateTime<Utc>,
    pub horizon_days: u32,
    /// Calendar days covered by the projection, strictly ascending,
    /// starting the day after generation.
    pub dates: Vec<NaiveDate>,
    /// Projected net cash movement per day, in minor units.
    pub daily_net: Vec<f64>,
    /// Running balance: `current_balance + Σ daily_net[..=i]`.
    pub cumulative_balance: Vec<f64>,
    pub current_balance: f64,
    /// 1-based index of the first day the cumulative balance goes negative.
    /// `None` when it never does within the horizon. The first crossing
    /// governs even if the balance later recovers.
    pub runway_days: Option<u32>,
    /// Population standard deviation of recent residuals.
    pub confidence_std: f64,
    /// Per-step `(lower, upper)` bounds: `daily_net[i] ± 2·confidence_std`.
    pub confidence_band: Vec<(f64, f64)>,
}

impl ForecastResult {
    /// Age of this forecast at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.generated_at
    }
}
