use std::sync::Arc;
use std::time::Duration;

use wxgate_core::Config;
use wxgate_weather::{ForecastClient, PlaceResolver, TtlCache, UpstreamError, WeatherPayload};

use crate::middleware::RateLimiter;

/// Shared state handed to every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub forecast: ForecastClient,
    pub places: PlaceResolver,
    pub weather_cache: Arc<TtlCache<WeatherPayload>>,
    pub weather_ttl: Duration,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Build clients and an empty cache from configuration.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let upstream = &config.upstream;
        let forecast = ForecastClient::new(
            &upstream.forecast_url,
            &upstream.user_agent,
            upstream.timeout(),
        )?;
        let places = PlaceResolver::new(
            &upstream.nominatim_url,
            &upstream.user_agent,
            upstream.timeout(),
        )?;

        Ok(Self {
            forecast,
            places,
            weather_cache: Arc::new(TtlCache::new()),
            weather_ttl: config.cache.weather_ttl(),
            rate_limiter: Arc::new(RateLimiter::new(
                config.rate_limit.max_requests,
                config.rate_limit.window(),
            )),
        })
    }
}
