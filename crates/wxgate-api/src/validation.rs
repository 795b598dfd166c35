//! Query-string validation for the public endpoints.
//!
//! Every field is checked and every failure is reported, keyed by field name.
//! Numeric fields arrive as strings and are coerced after trimming.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use wxgate_weather::{GeocodeQuery, ReverseGeocodeQuery, Units, WeatherQuery};

pub const LAT_RANGE: (f64, f64) = (-90.0, 90.0);
pub const LON_RANGE: (f64, f64) = (-180.0, 180.0);
pub const LIMIT_RANGE: (f64, f64) = (1.0, 10.0);
pub const DEFAULT_LIMIT: usize = 5;
pub const MIN_QUERY_LEN: usize = 2;

/// Flattened validation failure: form-level messages plus field -> messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn into_result<T>(self, value: Option<T>) -> Result<T, FieldErrors> {
        match value {
            Some(v) if self.is_empty() => Ok(v),
            _ => Err(self),
        }
    }
}

type Params = HashMap<String, String>;

/// `lat`, `lon` required; `units` defaults to metric.
pub fn weather_query(params: &Params) -> Result<WeatherQuery, FieldErrors> {
    let mut errors = FieldErrors::default();

    let lat = required_number(params, "lat", LAT_RANGE, &mut errors);
    let lon = required_number(params, "lon", LON_RANGE, &mut errors);
    let units = units(params, &mut errors);

    let query = match (lat, lon, units) {
        (Some(lat), Some(lon), Some(units)) => Some(WeatherQuery { lat, lon, units }),
        _ => None,
    };
    errors.into_result(query)
}

/// `q` at least two characters; `limit` an integer in 1..=10, default 5.
pub fn geocode_query(params: &Params) -> Result<GeocodeQuery, FieldErrors> {
    let mut errors = FieldErrors::default();

    let q = match params.get("q") {
        None => {
            errors.add("q", "Required");
            None
        }
        Some(q) if q.chars().count() < MIN_QUERY_LEN => {
            errors.add(
                "q",
                format!("String must contain at least {} character(s)", MIN_QUERY_LEN),
            );
            None
        }
        Some(q) => Some(q.clone()),
    };

    let limit = match params.get("limit") {
        None => Some(DEFAULT_LIMIT),
        Some(raw) => coerce_number(raw, "limit", &mut errors).and_then(|n| {
            let mut ok = true;
            if n.fract() != 0.0 {
                errors.add("limit", "Expected integer, received float");
                ok = false;
            }
            ok &= check_range(n, "limit", LIMIT_RANGE, &mut errors);
            ok.then_some(n as usize)
        }),
    };

    let query = match (q, limit) {
        (Some(q), Some(limit)) => Some(GeocodeQuery { q, limit }),
        _ => None,
    };
    errors.into_result(query)
}

/// `lat`, `lon` required.
pub fn reverse_geocode_query(params: &Params) -> Result<ReverseGeocodeQuery, FieldErrors> {
    let mut errors = FieldErrors::default();

    let lat = required_number(params, "lat", LAT_RANGE, &mut errors);
    let lon = required_number(params, "lon", LON_RANGE, &mut errors);

    let query = match (lat, lon) {
        (Some(lat), Some(lon)) => Some(ReverseGeocodeQuery { lat, lon }),
        _ => None,
    };
    errors.into_result(query)
}

fn required_number(
    params: &Params,
    field: &str,
    range: (f64, f64),
    errors: &mut FieldErrors,
) -> Option<f64> {
    let Some(raw) = params.get(field) else {
        errors.add(field, "Required");
        return None;
    };

    let value = coerce_number(raw, field, errors)?;
    check_range(value, field, range, errors).then_some(value)
}

fn coerce_number(raw: &str, field: &str, errors: &mut FieldErrors) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => Some(v),
        _ => {
            errors.add(field, "Expected number, received nan");
            None
        }
    }
}

fn check_range(value: f64, field: &str, (min, max): (f64, f64), errors: &mut FieldErrors) -> bool {
    if value < min {
        errors.add(field, format!("Number must be greater than or equal to {}", min));
        false
    } else if value > max {
        errors.add(field, format!("Number must be less than or equal to {}", max));
        false
    } else {
        true
    }
}

fn units(params: &Params, errors: &mut FieldErrors) -> Option<Units> {
    match params.get("units") {
        None => Some(Units::default()),
        Some(raw) => match Units::parse(raw) {
            Some(units) => Some(units),
            None => {
                errors.add(
                    "units",
                    format!(
                        "Invalid enum value. Expected 'metric' | 'imperial', received '{}'",
                        raw
                    ),
                );
                None
            }
        },
    }
}
