//! Place search and reverse lookup, both backed by Nominatim.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use wxgate_weather::{PlaceDetail, PlaceMatch};

use crate::{error::ApiError, state::AppState, validation};

#[derive(Debug, Serialize)]
pub struct GeocodeResponse {
    pub results: Vec<PlaceMatch>,
}

#[derive(Debug, Serialize)]
pub struct ReverseGeocodeResponse {
    pub place: PlaceDetail,
}

/// GET /v1/geocode
///
/// Nominatim is always asked for five matches; `limit` only truncates, so
/// values above five never return more than five results.
pub async fn get_geocode(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<GeocodeResponse>, ApiError> {
    let query = validation::geocode_query(&params)?;

    let mut results = state.places.search(&query.q).await?;
    results.truncate(query.limit);

    Ok(Json(GeocodeResponse { results }))
}

/// GET /v1/reverse-geocode
pub async fn get_reverse_geocode(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ReverseGeocodeResponse>, ApiError> {
    let query = validation::reverse_geocode_query(&params)?;
    let place = state.places.reverse(query.lat, query.lon).await?;
    Ok(Json(ReverseGeocodeResponse { place }))
}
