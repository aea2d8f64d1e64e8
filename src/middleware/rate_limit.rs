//! Per-client request throttling backed by `governor`.
//!
//! Clients are keyed by the socket peer address. Forwarded headers
//! (`X-Forwarded-For` first hop, then `X-Real-IP`) are only consulted when
//! `TRUST_PROXY_HEADERS` is set, since any client can forge them.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};

use crate::app::AppState;
use crate::config::{parse_rate_limit, ApiConfig, ConfigError};
use crate::error::ApiError;

/// Forget idle buckets once this many clients are tracked
const CLEANUP_THRESHOLD: usize = 10_000;

pub struct ClientRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    clock: DefaultClock,
    trust_proxy_headers: bool,
}

impl ClientRateLimiter {
    /// `count` requests per `period`, with the full count available as a burst
    pub fn new(count: u32, period: std::time::Duration) -> Result<Self, ConfigError> {
        let burst = NonZeroU32::new(count)
            .ok_or_else(|| ConfigError::InvalidRateLimit(format!("{count} per {period:?}")))?;
        let quota = Quota::with_period(period / count)
            .ok_or_else(|| ConfigError::InvalidRateLimit(format!("{count} per {period:?}")))?
            .allow_burst(burst);

        Ok(Self {
            limiter: RateLimiter::keyed(quota),
            clock: DefaultClock::default(),
            trust_proxy_headers: false,
        })
    }

    pub fn trusting_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// `None` when rate limiting is disabled
    pub fn from_config(api: &ApiConfig) -> Result<Option<Arc<Self>>, ConfigError> {
        if !api.enable_rate_limiting {
            return Ok(None);
        }
        let (count, period) = parse_rate_limit(&api.rate_limit)?;
        let limiter = Self::new(count, period)?.trusting_proxy_headers(api.trust_proxy_headers);
        Ok(Some(Arc::new(limiter)))
    }

    /// Seconds until the client may retry, or `None` if the request is allowed
    pub fn check(&self, client: &str) -> Option<u64> {
        if self.limiter.len() > CLEANUP_THRESHOLD {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&client.to_string()) {
            Ok(()) => None,
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                Some(wait.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for ClientRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRateLimiter")
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(limiter) = state.limiter.as_ref() else {
        return next.run(request).await;
    };

    let connect_info = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|c| c.0);
    let client = client_key(request.headers(), connect_info, limiter.trust_proxy_headers);

    match limiter.check(&client) {
        None => next.run(request).await,
        Some(retry_after) => {
            tracing::warn!(client = %client, retry_after, "Rate limit exceeded");
            let mut response =
                ApiError::too_many_requests("Rate limit exceeded. Please try again later.")
                    .into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

fn client_key(headers: &HeaderMap, connect_info: Option<SocketAddr>, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return ip;
        }
    }

    connect_info
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_burst_then_reject() {
        let limiter = ClientRateLimiter::new(2, Duration::from_secs(60)).unwrap();
        assert!(limiter.check("10.0.0.1").is_none());
        assert!(limiter.check("10.0.0.1").is_none());
        assert!(limiter.check("10.0.0.1").is_some());
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = ClientRateLimiter::new(1, Duration::from_secs(60)).unwrap();
        assert!(limiter.check("10.0.0.1").is_none());
        assert!(limiter.check("10.0.0.2").is_none());
        assert!(limiter.check("10.0.0.1").is_some());
    }

    #[test]
    fn test_zero_count_rejected() {
        assert!(ClientRateLimiter::new(0, Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_forwarded_headers_ignored_by_default() {
        let socket: SocketAddr = "192.168.1.9:4000".parse().unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, Some(socket), false), "192.168.1.9");
        assert_eq!(client_key(&headers, None, false), "unknown");

        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.4"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(client_key(&headers, Some(socket), false), "192.168.1.9");
    }

    #[test]
    fn test_trusted_proxy_header_precedence() {
        let socket: SocketAddr = "192.168.1.9:4000".parse().unwrap();

        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers, Some(socket), true), "192.168.1.9");

        headers.insert("x-real-ip", HeaderValue::from_static("172.16.0.4"));
        assert_eq!(client_key(&headers, Some(socket), true), "172.16.0.4");

        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        assert_eq!(client_key(&headers, Some(socket), true), "203.0.113.7");
    }
}
