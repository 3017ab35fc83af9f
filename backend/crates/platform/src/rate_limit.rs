//! Rate Limiting Infrastructure
//!
//! Fixed-window request counting keyed by an arbitrary string (the client IP
//! for the public API).

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    /// 100 requests per 15 minutes
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Seconds until the window resets, for `Retry-After`
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let ms = u64::try_from(self.reset_at_ms - now.timestamp_millis()).unwrap_or(0);
        ms.div_ceil(1000)
    }
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request for `key` and report whether it is allowed
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> RateLimitResult;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at_ms: i64,
    count: u32,
}

#[derive(Debug, Default)]
struct Windows {
    by_key: HashMap<String, Window>,
    last_sweep_ms: i64,
}

impl Windows {
    fn sweep(&mut self, now_ms: i64, window_ms: i64) -> usize {
        let before = self.by_key.len();
        self.by_key.retain(|_, w| now_ms - w.started_at_ms < window_ms);
        self.last_sweep_ms = now_ms;
        before - self.by_key.len()
    }
}

/// Process-local store; adequate for a single API instance
///
/// Elapsed windows are swept at most once per window length, on the request
/// path, so the map only holds keys seen within roughly the last two windows.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<Windows>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop windows that have fully elapsed
    pub async fn prune(&self, config: &RateLimitConfig, now: DateTime<Utc>) -> usize {
        let mut windows = self.windows.lock().await;
        windows.sweep(now.timestamp_millis(), config.window_ms())
    }

    /// Number of keys currently holding a window
    pub async fn tracked_keys(&self) -> usize {
        self.windows.lock().await.by_key.len()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> RateLimitResult {
        let now_ms = now.timestamp_millis();
        let window_ms = config.window_ms();
        let mut windows = self.windows.lock().await;

        if now_ms - windows.last_sweep_ms >= window_ms {
            let dropped = windows.sweep(now_ms, window_ms);
            if dropped > 0 {
                tracing::debug!(dropped, "Pruned elapsed rate limit windows");
            }
        }

        let window = windows.by_key.entry(key.to_string()).or_insert(Window {
            started_at_ms: now_ms,
            count: 0,
        });
        if now_ms - window.started_at_ms >= window_ms {
            *window = Window {
                started_at_ms: now_ms,
                count: 0,
            };
        }

        let allowed = window.count < config.max_requests;
        if allowed {
            window.count += 1;
        }

        RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(window.count),
            reset_at_ms: window.started_at_ms.saturating_add(window_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryRateLimitStore, RateLimitConfig, RateLimitStore};
    use chrono::Utc;

    #[tokio::test]
    async fn test_limit_is_enforced_per_key() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(2, 60);
        let now = Utc::now();

        assert!(store.check_and_increment("1.1.1.1", &config, now).await.allowed);
        let second = store.check_and_increment("1.1.1.1", &config, now).await;
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);

        let third = store.check_and_increment("1.1.1.1", &config, now).await;
        assert!(!third.allowed);
        assert_eq!(third.retry_after_secs(now), 60);

        // other clients are unaffected
        assert!(store.check_and_increment("2.2.2.2", &config, now).await.allowed);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);
        let now = Utc::now();

        assert!(store.check_and_increment("k", &config, now).await.allowed);
        assert!(!store.check_and_increment("k", &config, now).await.allowed);

        let later = now + chrono::Duration::seconds(61);
        assert!(store.check_and_increment("k", &config, later).await.allowed);
    }

    #[tokio::test]
    async fn test_prune_removes_elapsed_windows() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(5, 60);
        let now = Utc::now();
        store.check_and_increment("old", &config, now).await;
        store.check_and_increment("recent", &config, now + chrono::Duration::seconds(30)).await;

        let later = now + chrono::Duration::seconds(75);
        assert_eq!(store.prune(&config, later).await, 1);
        assert_eq!(store.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_elapsed_windows_swept_on_check() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(5, 1);
        let start = Utc::now();

        for i in 0..1_000i64 {
            let at = start + chrono::Duration::seconds(i * 10);
            assert!(store.check_and_increment(&format!("client-{i}"), &config, at).await.allowed);
        }

        assert_eq!(store.tracked_keys().await, 1);
    }

    #[tokio::test]
    async fn test_live_windows_survive_sweep() {
        let store = InMemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);
        let now = Utc::now();

        assert!(store.check_and_increment("busy", &config, now).await.allowed);
        let later = now + chrono::Duration::seconds(30);
        for i in 0..10 {
            store.check_and_increment(&format!("other-{i}"), &config, later).await;
        }

        // still inside its window, so still limited
        assert!(!store.check_and_increment("busy", &config, later).await.allowed);
        assert_eq!(store.tracked_keys().await, 11);
    }

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 100);
        assert_eq!(config.window_ms(), 900_000);
    }
}
