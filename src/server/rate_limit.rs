//! RateLimiter - fixed-window request budget per client address

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::server::error::ApiError;
use crate::server::AppState;

// Windows are pruned once this many clients are tracked.
const PRUNE_THRESHOLD: usize = 1024;

/// Outcome of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed,
    Denied { retry_after_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    enabled: bool,
    usage: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// Create a new RateLimiter
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs.max(1)),
            enabled: config.enabled,
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// Check if rate limiting is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Count one request from `client` and decide whether it may proceed
    pub fn check(&self, client: &str) -> RateLimitResult {
        self.check_at(client, Instant::now())
    }

    fn check_at(&self, client: &str, now: Instant) -> RateLimitResult {
        if !self.enabled {
            return RateLimitResult::Allowed;
        }

        // Counters stay usable even if a holder panicked.
        let mut usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());

        if usage.len() >= PRUNE_THRESHOLD {
            let window = self.window;
            usage.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = usage.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let elapsed = now.duration_since(entry.started);
            let remaining = self.window.saturating_sub(elapsed);
            return RateLimitResult::Denied {
                retry_after_secs: remaining.as_secs().max(1),
            };
        }

        entry.count += 1;
        RateLimitResult::Allowed
    }
}

/// Middleware: reject requests over budget with 429
pub async fn enforce(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match state.rate_limiter.check(&client) {
        RateLimitResult::Allowed => next.run(request).await,
        RateLimitResult::Denied { retry_after_secs } => {
            tracing::warn!("Rate limit exceeded for {}", client);
            ApiError::TooManyRequests { retry_after_secs }.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn test_denies_after_budget() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert_eq!(limiter.check_at("10.0.0.1", now), RateLimitResult::Allowed);
        }
        assert!(matches!(
            limiter.check_at("10.0.0.1", now),
            RateLimitResult::Denied { retry_after_secs: 60 }
        ));
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert_eq!(limiter.check_at("10.0.0.1", now), RateLimitResult::Allowed);
        assert_eq!(limiter.check_at("10.0.0.2", now), RateLimitResult::Allowed);
        assert_ne!(limiter.check_at("10.0.0.1", now), RateLimitResult::Allowed);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        assert_eq!(limiter.check_at("c", start), RateLimitResult::Allowed);
        assert!(matches!(
            limiter.check_at("c", start + Duration::from_secs(4)),
            RateLimitResult::Denied { retry_after_secs: 6 }
        ));
        assert_eq!(
            limiter.check_at("c", start + Duration::from_secs(10)),
            RateLimitResult::Allowed
        );
    }

    #[test]
    fn test_disabled_always_allows() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: false,
            max_requests: 0,
            window_secs: 60,
        });
        assert!(!limiter.is_enabled());
        assert_eq!(limiter.check("c"), RateLimitResult::Allowed);
    }
}
