//! Rate limiting and request logging middleware.

use crate::error::ApiError;
use axum::{
    extract::{MatchedPath, Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc};
use tracing::{debug, error, warn};

/// Unkeyed limiter shared by every caller of one quota.
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const DEFAULT_GLOBAL_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(120) {
    Some(n) => n,
    None => unreachable!(),
};

const DEFAULT_SUBMIT_PER_MINUTE: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Which quota a request draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    /// Liveness checks are never limited
    Exempt,
    /// Anonymous submissions
    Submit,
    /// Everything else, including the administrator routes
    Global,
}

impl LimitScope {
    pub fn of(method: &Method, path: &str) -> Self {
        match path {
            "/health" => LimitScope::Exempt,
            "/api/submit" if *method == Method::POST => LimitScope::Submit,
            _ => LimitScope::Global,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LimitScope::Exempt => "exempt",
            LimitScope::Submit => "submit",
            LimitScope::Global => "global",
        }
    }
}

/// Rate limiter state shared across requests.
///
/// Submissions have their own quota so that a flood of anonymous submits
/// cannot spend the quota the review and export routes depend on.
#[derive(Clone)]
pub struct RateLimitState {
    /// Quota for every limited route except submission
    pub global: Arc<Limiter>,
    /// Quota for `POST /api/submit`
    pub submit: Arc<Limiter>,
}

impl RateLimitState {
    /// Create limiters from per-minute quotas; zero falls back to the default.
    pub fn new(global_per_minute: u32, submit_per_minute: u32) -> Self {
        Self {
            global: per_minute(global_per_minute, DEFAULT_GLOBAL_PER_MINUTE),
            submit: per_minute(submit_per_minute, DEFAULT_SUBMIT_PER_MINUTE),
        }
    }

    /// Create a permissive rate limiter for testing.
    pub fn permissive() -> Self {
        Self::new(10_000, 10_000)
    }

    fn limiter(&self, scope: LimitScope) -> Option<&Limiter> {
        match scope {
            LimitScope::Exempt => None,
            LimitScope::Submit => Some(&self.submit),
            LimitScope::Global => Some(&self.global),
        }
    }
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self::new(
            DEFAULT_GLOBAL_PER_MINUTE.get(),
            DEFAULT_SUBMIT_PER_MINUTE.get(),
        )
    }
}

fn per_minute(requests: u32, fallback: NonZeroU32) -> Arc<Limiter> {
    let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(fallback));
    Arc::new(RateLimiter::direct(quota))
}

/// Returns 429 Too Many Requests once the request's quota is spent.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let scope = LimitScope::of(request.method(), request.uri().path());

    if let Some(limiter) = rate_limit.limiter(scope) {
        if limiter.check().is_err() {
            warn!(
                scope = scope.as_str(),
                route = route_of(&request),
                "Rate limit exceeded"
            );
            return Err(ApiError::RateLimitExceeded);
        }
    }

    Ok(next.run(request).await)
}

/// Logs each request by route template.
///
/// Raw URIs carry phone numbers (`/api/status/:phone`, `?phone=`), so only
/// the matched template is recorded.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let route = route_of(&request).to_owned();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        error!(%method, %route, %status, ?duration, "Request failed");
    } else if status.is_client_error() {
        warn!(%method, %route, %status, ?duration, "Request rejected");
    } else {
        debug!(%method, %route, %status, ?duration, "Request completed");
    }

    response
}

fn route_of(request: &Request) -> &str {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or("unmatched")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_by_route() {
        assert_eq!(LimitScope::of(&Method::GET, "/health"), LimitScope::Exempt);
        assert_eq!(
            LimitScope::of(&Method::POST, "/api/submit"),
            LimitScope::Submit
        );
        assert_eq!(
            LimitScope::of(&Method::GET, "/api/submit"),
            LimitScope::Global
        );
        assert_eq!(
            LimitScope::of(&Method::GET, "/api/status/+254712345678"),
            LimitScope::Global
        );
        assert_eq!(
            LimitScope::of(&Method::POST, "/api/update-status"),
            LimitScope::Global
        );
    }

    #[test]
    fn test_submit_quota_is_separate() {
        let state = RateLimitState::new(5, 1);

        assert!(state.limiter(LimitScope::Submit).unwrap().check().is_ok());
        assert!(state.limiter(LimitScope::Submit).unwrap().check().is_err());
        assert!(state.limiter(LimitScope::Global).unwrap().check().is_ok());
        assert!(state.limiter(LimitScope::Exempt).is_none());
    }

    #[test]
    fn test_zero_uses_default_quota() {
        let state = RateLimitState::new(0, 0);
        for _ in 0..100 {
            assert!(state.global.check().is_ok());
        }
        for _ in 0..10 {
            assert!(state.submit.check().is_ok());
        }
        assert!(state.submit.check().is_err());
    }

    #[test]
    fn test_permissive_rate_limit() {
        let state = RateLimitState::permissive();
        for _ in 0..1000 {
            assert!(state.global.check().is_ok());
            assert!(state.submit.check().is_ok());
        }
    }
}
