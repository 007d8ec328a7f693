/// Rate limiting middleware
///
/// This module implements fixed-window rate limiting keyed by client IP,
/// with counters kept in process memory. Tiers are applied per route
/// group rather than per client plan.
///
/// # Tiers
///
/// - **General**: 100 requests / 15 minutes, applied to the whole API
/// - **Auth**: 5 requests / 15 minutes on login and register, counting
///   only failed attempts
/// - **Strict**: 10 requests / minute on token refresh
///
/// # Algorithm
///
/// Fixed window per client key:
/// - The first request from a client opens a window
/// - Every request increments the window counter
/// - The counter above the limit blocks the request
/// - The window resets once its duration elapses
/// - Elapsed windows are swept from the table once per window length, so
///   clients that never return do not accumulate
///
/// Failure-only tiers decrement the counter again when the response comes
/// back below 400, so only rejected attempts stay counted.
///
/// # Headers
///
/// Allowed responses include quota headers:
/// - `RateLimit-Limit`: Total requests allowed per window
/// - `RateLimit-Remaining`: Requests remaining in the current window
/// - `RateLimit-Reset`: Seconds until the window resets
/// - `Retry-After`: Seconds to wait (429 responses only)
///
/// # Example
///
/// ```no_run
/// use akcity_api::middleware::rate_limit::{enforce, RateLimitConfig, RateLimiter};
/// use axum::{middleware::from_fn, Router};
///
/// let limiter = RateLimiter::new(RateLimitConfig::general());
///
/// let app: Router = Router::new()
///     .layer(from_fn(move |request, next| {
///         enforce(limiter.clone(), request, next)
///     }));
/// ```

use crate::error::ApiError;
use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Rate limit configuration for a tier
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Length of the counting window
    pub window: Duration,

    /// Maximum requests per window
    pub max_requests: u32,

    /// Whether responses below 400 hand their attempt back
    pub only_count_failures: bool,

    /// Message returned with 429 responses
    pub message: &'static str,
}

impl RateLimitConfig {
    /// General API traffic: 100 requests per 15 minutes
    pub fn general() -> Self {
        RateLimitConfig {
            window: Duration::from_secs(900),
            max_requests: 100,
            only_count_failures: false,
            message: "Too many requests from this IP, please try again later.",
        }
    }

    /// Login and register: 5 attempts per 15 minutes, failures only
    pub fn auth() -> Self {
        RateLimitConfig {
            window: Duration::from_secs(900),
            max_requests: 5,
            only_count_failures: true,
            message: "Too many authentication attempts, please try again later.",
        }
    }

    /// Sensitive operations: 10 requests per minute
    pub fn strict() -> Self {
        RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 10,
            only_count_failures: false,
            message: "Too many requests, please slow down.",
        }
    }
}

/// Counter state for one client key
#[derive(Debug, Clone)]
struct Window {
    /// Requests counted in the current window
    count: u32,

    /// When the current window opened
    started: Instant,
}

/// Result of a rate limit check
#[derive(Debug)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub ok: bool,

    /// Requests remaining in the current window
    pub remaining: u32,

    /// Seconds until the window resets
    pub reset_after: u64,
}

/// Counter table plus the clock that keeps it bounded
#[derive(Debug)]
struct WindowTable {
    by_key: HashMap<String, Window>,

    /// When elapsed windows were last dropped
    last_sweep: Instant,
}

impl WindowTable {
    fn new() -> Self {
        Self {
            by_key: HashMap::new(),
            last_sweep: Instant::now(),
        }
    }

    /// Drops every window that already elapsed
    ///
    /// A returning client would reset its window on the next request anyway,
    /// so removal never changes a decision.
    fn sweep(&mut self, window: Duration) {
        self.by_key.retain(|_, w| w.started.elapsed() < window);
        self.last_sweep = Instant::now();
    }
}

/// Shared fixed-window rate limiter
///
/// Cloning is cheap; clones share the same counter table.
#[derive(Clone)]
pub struct RateLimiter {
    /// Tier configuration
    pub config: RateLimitConfig,

    windows: Arc<Mutex<WindowTable>>,
}

impl RateLimiter {
    /// Creates a rate limiter for the given tier
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(WindowTable::new())),
        }
    }

    /// Counts a request against the client's window
    ///
    /// Denied requests stay counted, so hammering a closed window does not
    /// shorten the wait.
    pub async fn try_acquire(&self, key: &str) -> RateLimitDecision {
        let mut table = self.windows.lock().await;

        // Keys follow X-Forwarded-For, so the table only stays bounded if
        // stale entries are dropped; once per window length is enough
        if table.last_sweep.elapsed() >= self.config.window {
            table.sweep(self.config.window);
        }

        let window = table.by_key.entry(key.to_string()).or_insert_with(|| Window {
            count: 0,
            started: Instant::now(),
        });

        if window.started.elapsed() >= self.config.window {
            window.count = 0;
            window.started = Instant::now();
        }

        window.count = window.count.saturating_add(1);

        let reset_after = self
            .config
            .window
            .saturating_sub(window.started.elapsed())
            .as_secs();

        if window.count > self.config.max_requests {
            RateLimitDecision {
                ok: false,
                remaining: 0,
                reset_after: reset_after.max(1),
            }
        } else {
            RateLimitDecision {
                ok: true,
                remaining: self.config.max_requests - window.count,
                reset_after,
            }
        }
    }

    /// Hands one counted attempt back to the client's window
    pub async fn forgive(&self, key: &str) {
        let mut table = self.windows.lock().await;

        if let Some(window) = table.by_key.get_mut(key) {
            window.count = window.count.saturating_sub(1);
        }
    }

    #[cfg(test)]
    async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.by_key.len()
    }
}

/// Rate limiting middleware function
///
/// Checks the client's window before the handler runs and stamps quota
/// headers on the way out. Wire it with `axum::middleware::from_fn` and a
/// closure that clones the limiter.
///
/// # Errors
///
/// - 429 Too Many Requests: window exhausted, `Retry-After` set
pub async fn enforce(
    limiter: RateLimiter,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_key(&request);
    let decision = limiter.try_acquire(&key).await;

    if !decision.ok {
        tracing::warn!(
            client = %key,
            limit = limiter.config.max_requests,
            "Rate limit exceeded"
        );

        let mut response = ApiError::RateLimited {
            retry_after: decision.reset_after,
            message: limiter.config.message.to_string(),
        }
        .into_response();

        let headers = response.headers_mut();
        headers.insert("RateLimit-Limit", HeaderValue::from(limiter.config.max_requests));
        headers.insert("RateLimit-Remaining", HeaderValue::from(0u32));
        headers.insert("RateLimit-Reset", HeaderValue::from(decision.reset_after));

        return Ok(response);
    }

    let mut response = next.run(request).await;

    if limiter.config.only_count_failures && response.status().as_u16() < 400 {
        limiter.forgive(&key).await;
    }

    // With stacked tiers the innermost one has already stamped its quota;
    // leave it in place
    let headers = response.headers_mut();
    if !headers.contains_key("RateLimit-Limit") {
        headers.insert("RateLimit-Limit", HeaderValue::from(limiter.config.max_requests));
        headers.insert("RateLimit-Remaining", HeaderValue::from(decision.remaining));
        headers.insert("RateLimit-Reset", HeaderValue::from(decision.reset_after));
    }

    Ok(response)
}

/// Resolves the client key for a request
///
/// Takes the first address in `X-Forwarded-For` when a proxy set one,
/// falls back to the peer address, then to a shared `unknown` bucket.
fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request.headers().get("x-forwarded-for") {
        if let Ok(value) = forwarded.to_str() {
            if let Some(first) = value.split(',').next() {
                let ip = first.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
