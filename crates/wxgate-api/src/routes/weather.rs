//! Forecast endpoint: validation, cache lookup, Open-Meteo on miss.

use axum::{
    extract::{Query, State},
    Json,
};
use std::collections::HashMap;
use wxgate_weather::WeatherPayload;

use crate::{error::ApiError, state::AppState, validation};

/// GET /v1/weather
///
/// A hit returns the stored payload verbatim, so `source` still reads
/// `upstream` for cached responses.
pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<WeatherPayload>, ApiError> {
    let query = validation::weather_query(&params)?;
    let key = query.cache_key();

    if let Some(cached) = state.weather_cache.get(&key) {
        tracing::debug!(%key, "weather cache hit");
        return Ok(Json(cached));
    }

    tracing::debug!(%key, "weather cache miss");
    let data = state.forecast.fetch(query.lat, query.lon, query.units).await?;
    let payload = WeatherPayload::upstream(data);
    state
        .weather_cache
        .set(key, payload.clone(), state.weather_ttl);

    Ok(Json(payload))
}
