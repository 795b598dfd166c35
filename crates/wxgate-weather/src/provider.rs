//! Open-Meteo forecast client.
//! Free, no API key required.

use reqwest::Client;
use std::time::Duration;
use tracing::instrument;

use crate::error::UpstreamError;
use crate::types::Units;

const SERVICE: &str = "Open-Meteo";

const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation",
    "wind_speed_10m",
    "wind_gusts_10m",
    "wind_direction_10m",
];

const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "precipitation_probability",
    "precipitation",
    "cloud_cover",
    "wind_speed_10m",
];

const DAILY_FIELDS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "sunrise",
    "sunset",
    "precipitation_sum",
];

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, UpstreamError> {
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.to_string(),
        })
    }

    /// Query parameters sent to Open-Meteo for a location and unit system.
    pub fn query_params(lat: f64, lon: f64, units: Units) -> Vec<(&'static str, String)> {
        let profile = units.profile();
        vec![
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("current", CURRENT_FIELDS.join(",")),
            ("hourly", HOURLY_FIELDS.join(",")),
            ("daily", DAILY_FIELDS.join(",")),
            ("timezone", "auto".to_string()),
            ("temperature_unit", profile.temperature.to_string()),
            ("wind_speed_unit", profile.wind_speed.to_string()),
            ("precipitation_unit", profile.precipitation.to_string()),
        ]
    }

    /// Fetch current, hourly and daily forecast. The decoded body is returned as-is.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(
        &self,
        lat: f64,
        lon: f64,
        units: Units,
    ) -> Result<serde_json::Value, UpstreamError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query_params(lat, lon, units))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Open-Meteo returned status {}", status);
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::InvalidResponse {
            service: SERVICE,
            reason: e.to_string(),
        })
    }
}
