use serde::{Deserialize, Serialize};

/// Unit system requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    /// Parse the wire representation; only the two lowercase names are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "metric" => Some(Self::Metric),
            "imperial" => Some(Self::Imperial),
            _ => None,
        }
    }

    /// Open-Meteo unit parameters for this system
    pub fn profile(&self) -> UnitProfile {
        match self {
            Self::Metric => UnitProfile {
                temperature: "celsius",
                wind_speed: "kmh",
                precipitation: "mm",
            },
            Self::Imperial => UnitProfile {
                temperature: "fahrenheit",
                wind_speed: "mph",
                precipitation: "inch",
            },
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitProfile {
    pub temperature: &'static str,
    pub wind_speed: &'static str,
    pub precipitation: &'static str,
}

/// Validated forecast request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    pub lat: f64,
    pub lon: f64,
    pub units: Units,
}

impl WeatherQuery {
    /// Cache key with coordinates rounded to three decimals.
    ///
    /// Nearby requests that round the same way share an entry. Exact binary
    /// ties (e.g. `0.0625`) round half to even, so they land on `0.062`.
    pub fn cache_key(&self) -> String {
        format!(
            "wx:{:.3}:{:.3}:{}",
            unsigned_zero(self.lat),
            unsigned_zero(self.lon),
            self.units
        )
    }
}

/// `-0.0` and `0.0` must format identically.
fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}

/// Validated forward geocoding request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    pub q: String,
    pub limit: usize,
}

/// Validated reverse geocoding request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverseGeocodeQuery {
    pub lat: f64,
    pub lon: f64,
}

/// Where a forecast payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadSource {
    Cache,
    Upstream,
}

/// Forecast response body: the provider's JSON, untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    pub source: PayloadSource,
    pub data: serde_json::Value,
}

impl WeatherPayload {
    pub fn upstream(data: serde_json::Value) -> Self {
        Self {
            source: PayloadSource::Upstream,
            data,
        }
    }
}

/// One forward geocoding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// Reverse geocoding result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceDetail {
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_parse() {
        assert_eq!(Units::parse("metric"), Some(Units::Metric));
        assert_eq!(Units::parse("imperial"), Some(Units::Imperial));
        assert_eq!(Units::parse("Imperial"), None);
        assert_eq!(Units::parse("kelvin"), None);
    }

    #[test]
    fn test_units_default_is_metric() {
        assert_eq!(Units::default(), Units::Metric);
    }

    #[test]
    fn test_metric_profile() {
        let p = Units::Metric.profile();
        assert_eq!(p.temperature, "celsius");
        assert_eq!(p.wind_speed, "kmh");
        assert_eq!(p.precipitation, "mm");
    }

    #[test]
    fn test_imperial_profile() {
        let p = Units::Imperial.profile();
        assert_eq!(p.temperature, "fahrenheit");
        assert_eq!(p.wind_speed, "mph");
        assert_eq!(p.precipitation, "inch");
    }

    #[test]
    fn test_cache_key_quantizes_nearby_coordinates() {
        let a = WeatherQuery {
            lat: 35.00001,
            lon: -120.00002,
            units: Units::Metric,
        };
        let b = WeatherQuery {
            lat: 35.00004,
            lon: -120.00006,
            units: Units::Metric,
        };
        assert_eq!(a.cache_key(), "wx:35.000:-120.000:metric");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_normalizes_negative_zero() {
        let positive = WeatherQuery {
            lat: 0.0,
            lon: 0.0,
            units: Units::Metric,
        };
        let negative = WeatherQuery {
            lat: -0.0,
            lon: -0.0,
            units: Units::Metric,
        };
        assert_eq!(negative.cache_key(), "wx:0.000:0.000:metric");
        assert_eq!(negative.cache_key(), positive.cache_key());
    }

    #[test]
    fn test_cache_key_separates_units() {
        let metric = WeatherQuery {
            lat: 33.4,
            lon: -111.9,
            units: Units::Metric,
        };
        let imperial = WeatherQuery {
            units: Units::Imperial,
            ..metric
        };
        assert_ne!(metric.cache_key(), imperial.cache_key());
    }

    #[test]
    fn test_payload_serializes_lowercase_source() {
        let payload = WeatherPayload::upstream(serde_json::json!({"current": {}}));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["source"], "upstream");
        assert_eq!(json["data"], serde_json::json!({"current": {}}));
    }

    #[test]
    fn test_place_detail_nulls() {
        let place = PlaceDetail {
            name: "Somewhere".into(),
            city: None,
            country: None,
        };
        let json = serde_json::to_value(&place).unwrap();
        assert!(json["city"].is_null());
        assert!(json["country"].is_null());
    }
}
