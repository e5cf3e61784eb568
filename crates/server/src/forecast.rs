//! Forecast API endpoints

use api_types::forecast::{BandPoint, ForecastGet, ForecastResponse};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, server::ServerState, user};
use engine::{EngineError, ForecastResult, HORIZON_RANGE};

fn map_result(result: ForecastResult) -> ForecastResponse {
    ForecastResponse {
        generated_at: result.generated_at,
        horizon_days: result.horizon_days,
        dates: result.dates,
        daily_net: result.daily_net,
        cumulative_balance: result.cumulative_balance,
        current_balance: result.current_balance,
        runway_days: result.runway_days,
        confidence_std: result.confidence_std,
        confidence_band: result
            .confidence_band
            .into_iter()
            .map(|(lower, upper)| BandPoint { lower, upper })
            .collect(),
    }
}

/// Serves the user's forecast, from cache when fresh.
pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<ForecastGet>,
) -> Result<Json<ForecastResponse>, ServerError> {
    let result = state.engine.forecast(&user.username, payload.horizon).await?;
    Ok(Json(map_result(result)))
}

/// Forces a regeneration, ignoring any cached result.
pub async fn refresh(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(payload): Query<ForecastGet>,
) -> Result<Json<ForecastResponse>, ServerError> {
    let config = state.engine.config();
    let horizon = payload.horizon.unwrap_or(config.default_horizon_days);
    if !HORIZON_RANGE.contains(&horizon) {
        return Err(EngineError::InvalidHorizon(format!(
            "horizon must be between {} and {}, got {horizon}",
            HORIZON_RANGE.start(),
            HORIZON_RANGE.end()
        ))
        .into());
    }

    let result = state
        .engine
        .regenerate(&user.username, config.lookback_days, horizon)
        .await?;
    Ok(Json(map_result(result)))
}
