//! Weather and geocoding upstreams for wxgate
//!
//! Open-Meteo forecasts, Nominatim forward/reverse geocoding, and the
//! in-memory TTL cache that fronts the forecast endpoint.

pub mod cache;
pub mod error;
pub mod geocode;
pub mod provider;
pub mod types;

pub use cache::TtlCache;
pub use error::UpstreamError;
pub use geocode::{PlaceResolver, SEARCH_PAGE_SIZE};
pub use provider::ForecastClient;
pub use types::*;
