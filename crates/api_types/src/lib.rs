use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod forecast {
    use super::*;

    /// Query parameters for `GET /forecast`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ForecastGet {
        /// Projection horizon in days. Valid range 1-365; the server falls
        /// back to its default (90) when absent.
        pub horizon: Option<u32>,
    }

    /// Lower/upper bound of the confidence band for one horizon step.
    #[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
    pub struct BandPoint {
        pub lower: f64,
        pub upper: f64,
    }

    /// A full forecast as served to clients.
    ///
    /// `dates`, `daily_net`, `cumulative_balance` and `confidence_band` all
    /// have exactly `horizon_days` entries.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ForecastResponse {
        pub generated_at: DateTime<Utc>,
        pub horizon_days: u32,
        pub dates: Vec<NaiveDate>,
        pub daily_net: Vec<f64>,
        pub cumulative_balance: Vec<f64>,
        pub current_balance: f64,
        /// 1-based day index of the first projected shortfall, if any.
        pub runway_days: Option<u32>,
        pub confidence_std: f64,
        pub confidence_band: Vec<BandPoint>,
    }
}
