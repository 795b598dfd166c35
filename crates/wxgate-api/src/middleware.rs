//! Request interceptors: per-client rate limiting and security headers.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use governor::{
    clock::{Clock, DefaultClock},
    middleware::NoOpMiddleware,
    state::keyed::DefaultKeyedStateStore,
    Quota, RateLimiter as GovernorLimiter,
};
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::error::ApiError;
use crate::state::AppState;

/// Requests without connection info (in-process callers) share the `None` key.
pub type ClientKey = Option<IpAddr>;

/// Per-client limiter: `max_requests` may burst at once, and one request is
/// replenished every `window / max_requests` (GCRA).
pub struct RateLimiter<C: Clock = DefaultClock> {
    limiter: GovernorLimiter<
        ClientKey,
        DefaultKeyedStateStore<ClientKey>,
        C,
        NoOpMiddleware<<C as Clock>::Instant>,
    >,
}

fn quota(max_requests: u32, window: Duration) -> Quota {
    let burst = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
    Quota::with_period(window / burst.get())
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, &DefaultClock::default())
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(max_requests: u32, window: Duration, clock: &C) -> Self {
        Self {
            limiter: GovernorLimiter::new(
                quota(max_requests, window),
                DefaultKeyedStateStore::default(),
                clock,
            ),
        }
    }

    /// Count a request; returns false once the client has used up its quota.
    pub fn check(&self, client: ClientKey) -> bool {
        self.limiter.check_key(&client).is_ok()
    }

    /// Forget clients whose quota has fully replenished.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }
}

pub async fn rate_limit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    if !state.rate_limiter.check(client) {
        tracing::warn!(
            client = ?client,
            path = request.uri().path(),
            "rate limit exceeded"
        );
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}

/// Conservative response headers for a JSON API.
pub fn security_headers(router: Router) -> Router {
    let headers: [(HeaderName, &'static str); 6] = [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
        (header::REFERRER_POLICY, "no-referrer"),
        (header::X_DNS_PREFETCH_CONTROL, "off"),
        (
            header::STRICT_TRANSPORT_SECURITY,
            "max-age=15552000; includeSubDomains",
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            "same-origin",
        ),
    ];

    headers.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            name,
            HeaderValue::from_static(value),
        ))
    })
}
