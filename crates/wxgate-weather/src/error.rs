//! Upstream (Open-Meteo / Nominatim) error types.

use thiserror::Error;

/// Fallback text when an error renders to an empty string.
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Upstream error";

#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Non-2xx HTTP status; `service` names the endpoint, e.g. "Nominatim search".
    #[error("{service} error {status}")]
    Status { service: &'static str, status: u16 },

    /// Body did not match the expected shape
    #[error("{service} returned an invalid response: {reason}")]
    InvalidResponse {
        service: &'static str,
        reason: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl UpstreamError {
    /// Message exposed to API clients.
    pub fn public_message(&self) -> String {
        let msg = self.to_string();
        if msg.trim().is_empty() {
            GENERIC_UPSTREAM_MESSAGE.to_string()
        } else {
            msg
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            Self::InvalidResponse { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_includes_code() {
        let err = UpstreamError::Status {
            service: "Open-Meteo",
            status: 503,
        };
        assert_eq!(err.public_message(), "Open-Meteo error 503");
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_invalid_response_message() {
        let err = UpstreamError::InvalidResponse {
            service: "Nominatim reverse",
            reason: "missing field `display_name`".into(),
        };
        assert!(err.public_message().contains("Nominatim reverse"));
        assert!(err.public_message().contains("display_name"));
        assert_eq!(err.status(), None);
    }
}
