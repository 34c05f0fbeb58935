//! Client-side view of the mod.io rate limit
//!
//! Every response may carry `X-RateLimit-*` headers. The gate keeps the
//! last values it saw and, once the server reports no requests remaining,
//! holds the next request back until the advertised reset.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RETRY_AFTER_HEADER: &str = "x-ratelimit-retryafter";
const STANDARD_RETRY_AFTER_HEADER: &str = "retry-after";

/// Last rate limit values reported by the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateState {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub reset_at: Option<Instant>,
}

impl RateState {
    /// Check if requests must wait at `now`
    pub fn is_blocked(&self, now: Instant) -> bool {
        self.remaining == Some(0) && self.reset_at.is_some_and(|reset| reset > now)
    }

    /// Time left until the reset, when blocked
    pub fn wait_time(&self, now: Instant) -> Option<Duration> {
        if !self.is_blocked(now) {
            return None;
        }
        self.reset_at.map(|reset| reset - now)
    }
}

/// Public rate limit status for display/logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub retry_after: Option<Duration>,
    pub is_blocked: bool,
}

impl RateLimitStatus {
    /// Format rate limit status for display
    pub fn format_status(&self) -> String {
        let remaining = self
            .remaining
            .map_or_else(|| "?".to_string(), |r| r.to_string());
        let limit = self.limit.map_or_else(|| "?".to_string(), |l| l.to_string());

        match self.retry_after {
            Some(wait) if self.is_blocked => format!(
                "mod.io rate limit: {}/{} remaining, blocked for {}s",
                remaining,
                limit,
                wait.as_secs()
            ),
            _ => format!("mod.io rate limit: {}/{} remaining", remaining, limit),
        }
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Seconds until the limit resets, preferring the mod.io header over `Retry-After`
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    header_u64(headers, RETRY_AFTER_HEADER)
        .or_else(|| header_u64(headers, STANDARD_RETRY_AFTER_HEADER))
        .map(Duration::from_secs)
}

/// Shared gate that requests pass through before being sent
#[derive(Debug, Default)]
pub struct RateGate {
    state: Mutex<RateState>,
}

impl RateGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the rate limit headers of a response
    ///
    /// Values present in the headers overwrite the stored ones; a response
    /// without any rate limit header leaves the state untouched. Returns
    /// whether anything was recorded.
    pub fn update(&self, status: StatusCode, headers: &HeaderMap) -> bool {
        let limit = header_u64(headers, LIMIT_HEADER).map(saturate);
        let mut remaining = header_u64(headers, REMAINING_HEADER).map(saturate);
        let retry_after = parse_retry_after(headers);

        if limit.is_none() && remaining.is_none() && retry_after.is_none() {
            return false;
        }

        // A 429 with only a retry hint still means nothing is left
        if status == StatusCode::TOO_MANY_REQUESTS && remaining.is_none() && retry_after.is_some() {
            remaining = Some(0);
        }

        let now = Instant::now();
        let mut state = self.lock();
        if limit.is_some() {
            state.limit = limit;
        }
        if remaining.is_some() {
            state.remaining = remaining;
        }
        if let Some(wait) = retry_after {
            state.reset_at = if wait.is_zero() { None } else { Some(now + wait) };
        }

        debug!(
            "Rate limit updated: {:?}/{:?} remaining, reset in {:?}",
            state.remaining,
            state.limit,
            state.reset_at.map(|reset| reset.saturating_duration_since(now))
        );
        true
    }

    /// Wait until the stored state allows another request
    ///
    /// The lock is only held to read the deadline, never across the sleep.
    /// Once the deadline has passed the remaining count is forgotten so the
    /// next response can report fresh values.
    pub async fn wait_until_available(&self) {
        let wait = self.lock().wait_time(Instant::now());

        let Some(wait) = wait else {
            return;
        };

        info!("mod.io rate limit exhausted, waiting {:?} before the next request", wait);
        sleep(wait).await;

        let now = Instant::now();
        let mut state = self.lock();
        if state.remaining == Some(0) && state.reset_at.is_none_or(|reset| reset <= now) {
            state.remaining = None;
            state.reset_at = None;
        }
    }

    /// Get current rate limit information
    pub fn status(&self) -> RateLimitStatus {
        let now = Instant::now();
        let state = *self.lock();
        RateLimitStatus {
            limit: state.limit,
            remaining: state.remaining,
            retry_after: state.reset_at.map(|reset| reset.saturating_duration_since(now)),
            is_blocked: state.is_blocked(now),
        }
    }

    pub fn snapshot(&self) -> RateState {
        *self.lock()
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
