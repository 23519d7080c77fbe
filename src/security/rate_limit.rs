//! Global token-bucket rate limiting.
//!
//! One bucket per client identity, shared by every route. The bucket table
//! is the only state shared between requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::broadcast;

use crate::config::{IpLookup, RateLimitConfig};
use crate::observability::metrics;
use crate::security::client_ip::client_key;

/// Body returned with 429 responses.
pub const RATE_LIMITED_MESSAGE: &str = "You have reached maximum request limit.";

/// A simple token bucket rate limiter.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_update: now,
        }
    }

    fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();

        // Refill tokens
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_update = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Process-wide rate limiter keyed by client identity.
#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, TokenBucket>>,
    refill_rate: f64,
    capacity: f64,
    lookups: Vec<IpLookup>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            refill_rate: config.requests_per_second as f64,
            capacity: config.burst_size as f64,
            lookups: config.ip_lookups.clone(),
        }
    }

    /// Take one token from `key`'s bucket. Returns false when the bucket is empty.
    pub fn admit(&self, key: &str) -> bool {
        self.admit_at(key, Instant::now())
    }

    fn admit_at(&self, key: &str, now: Instant) -> bool {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity, now));

        bucket.try_acquire(self.capacity, self.refill_rate, now)
    }

    /// Drop buckets untouched for longer than `ttl`. Returns how many were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(ttl, Instant::now())
    }

    fn evict_idle_at(&self, ttl: Duration, now: Instant) -> usize {
        let mut buckets = self.buckets.lock().unwrap_or_else(PoisonError::into_inner);
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_update) <= ttl);
        before - buckets.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Ordered lookups used to derive the client key.
    pub fn lookups(&self) -> &[IpLookup] {
        &self.lookups
    }

    /// Periodically evict idle buckets until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, ttl: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(ttl);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let evicted = self.evict_idle(ttl);
                    if evicted > 0 {
                        tracing::debug!(evicted, remaining = self.tracked_clients(), "Evicted idle rate limit buckets");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Rate limit sweeper stopping");
                    break;
                }
            }
        }
    }
}

/// Middleware function applying the global rate limit ahead of every handler.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request, limiter.lookups());

    if limiter.admit(&key) {
        next.run(request).await
    } else {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited(request.uri().path());
        (StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED_MESSAGE).into_response()
    }
}
