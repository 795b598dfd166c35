//! Static OpenAPI 3.0 description of the public endpoints.

use axum::Json;
use serde_json::{json, Value};

fn coordinate_param(name: &str, limit: f64) -> Value {
    let min = -limit;
    json!({
        "in": "query",
        "name": name,
        "required": true,
        "schema": { "type": "number", "minimum": min, "maximum": limit }
    })
}

fn error_responses() -> Value {
    json!({
        "400": { "description": "Validation error" },
        "429": { "description": "Rate limit exceeded" },
        "502": { "description": "Upstream provider error" }
    })
}

fn with_success(description: &str, schema: Value) -> Value {
    let mut responses = error_responses();
    responses["200"] = json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    });
    responses
}

fn weather_path() -> Value {
    let units = json!({
        "in": "query",
        "name": "units",
        "required": false,
        "schema": { "type": "string", "enum": ["metric", "imperial"], "default": "metric" }
    });
    let payload = json!({
        "type": "object",
        "properties": {
            "source": { "type": "string", "enum": ["cache", "upstream"] },
            "data": { "type": "object", "description": "Raw Open-Meteo response" }
        }
    });

    json!({
        "get": {
            "summary": "Get weather forecast (current + hourly + daily)",
            "description": "Proxies Open-Meteo for the given coordinates. Results are cached in memory for 5 minutes.",
            "parameters": [coordinate_param("lat", 90.0), coordinate_param("lon", 180.0), units],
            "responses": with_success("Weather data", payload)
        }
    })
}

fn geocode_path() -> Value {
    let params = json!([
        { "in": "query", "name": "q", "required": true, "schema": { "type": "string", "minLength": 2 } },
        {
            "in": "query",
            "name": "limit",
            "required": false,
            "schema": { "type": "integer", "minimum": 1, "maximum": 10, "default": 5 },
            "description": "At most 5 results are ever returned"
        }
    ]);
    let place = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "lat": { "type": "number" },
            "lon": { "type": "number" }
        }
    });
    let results = json!({
        "type": "object",
        "properties": { "results": { "type": "array", "items": place } }
    });

    json!({
        "get": {
            "summary": "Search a place name to get coordinates",
            "parameters": params,
            "responses": with_success("Matching places", results)
        }
    })
}

fn reverse_geocode_path() -> Value {
    let place = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "city": { "type": "string", "nullable": true },
            "country": { "type": "string", "nullable": true }
        }
    });

    json!({
        "get": {
            "summary": "Reverse geocode coordinates to a human-readable place",
            "parameters": [coordinate_param("lat", 90.0), coordinate_param("lon", 180.0)],
            "responses": with_success("Place info", json!({
                "type": "object",
                "properties": { "place": place }
            }))
        }
    })
}

pub fn document() -> Value {
    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Weather API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Weather forecasts and geocoding backed by Open-Meteo and Nominatim"
        },
        "servers": [{ "url": "/v1" }],
        "paths": {
            "/weather": weather_path(),
            "/geocode": geocode_path(),
            "/reverse-geocode": reverse_geocode_path()
        }
    })
}

/// GET /docs.json
pub async fn openapi_document() -> Json<Value> {
    Json(document())
}
