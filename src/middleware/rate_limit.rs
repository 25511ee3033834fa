use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::warn;

use crate::{
    clock::Clock, config::rate_limit::RateLimitConfig, errors::AppError,
    handlers::generate::AppState, services::metrics,
};

/// Fixed-window counter state for one client.
#[derive(Debug)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: DateTime<Utc>,
}

pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,
    window: Duration,
    max_tracked: usize,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            entries: DashMap::new(),
            limit: config.generate_requests_per_minute,
            window: Duration::seconds(config.window_size_seconds.unwrap_or(60) as i64),
            max_tracked: config.max_tracked_clients,
            clock,
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window.num_seconds().max(0) as u64
    }

    /// Admission check for one request. The dashmap entry guard keeps the
    /// read-then-write atomic per key.
    pub fn check(&self, key: &str) -> bool {
        let now = self.clock.now();

        // Sweep expired windows before tracking yet another client.
        if self.entries.len() >= self.max_tracked && !self.entries.contains_key(key) {
            self.entries.retain(|_, entry| now <= entry.reset_time);
        }

        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                reset_time: now + self.window,
            });

        if now > entry.reset_time {
            entry.count = 1;
            entry.reset_time = now + self.window;
            return true;
        }
        if entry.count >= self.limit {
            return false;
        }
        entry.count += 1;
        true
    }
}

/// First address in X-Forwarded-For, else X-Real-IP, else "unknown". In
/// the worst case all unidentified clients share one counter.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| headers.get("x-real-ip").and_then(|value| value.to_str().ok()))
        .unwrap_or("unknown")
        .to_string()
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.rate_limit.enabled {
        return Ok(next.run(req).await);
    }

    let key = client_key(req.headers());
    if !state.limiter.check(&key) {
        metrics::record_rate_limit_exceeded();
        warn!("Rate limit exceeded for {}", key);
        return Err(AppError::RateLimited {
            retry_after_secs: state.limiter.window_secs(),
        });
    }

    Ok(next.run(req).await)
}
