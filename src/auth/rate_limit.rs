//! Login throttling for the admin gate.
//!
//! The default limiter allows everything. `MemoryRateLimiter` counts failed
//! logins per client address inside a fixed window and refuses further
//! attempts from that address until the window ends.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{error, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited,
}

pub trait RateLimiter: Send + Sync {
    fn check(&self, client: &str) -> RateLimitDecision;
    fn record_failure(&self, client: &str);
    fn record_success(&self, client: &str);
}

#[derive(Clone, Debug)]
pub struct NoopRateLimiter;

impl RateLimiter for NoopRateLimiter {
    fn check(&self, _client: &str) -> RateLimitDecision {
        RateLimitDecision::Allowed
    }

    fn record_failure(&self, _client: &str) {}

    fn record_success(&self, _client: &str) {}
}

#[derive(Debug)]
struct Window {
    started: Instant,
    failures: u32,
}

#[derive(Debug)]
pub struct MemoryRateLimiter {
    max_failures: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimiter {
    #[must_use]
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            max_failures,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for MemoryRateLimiter {
    fn check(&self, client: &str) -> RateLimitDecision {
        let Ok(mut clients) = self.clients.lock() else {
            error!("Login rate limiter state poisoned");
            // Fail closed
            return RateLimitDecision::Limited;
        };

        let now = Instant::now();
        clients.retain(|_, entry| now.duration_since(entry.started) < self.window);

        match clients.get(client) {
            Some(entry) if entry.failures >= self.max_failures => {
                warn!("Login attempts limited for {client}");
                RateLimitDecision::Limited
            }
            _ => RateLimitDecision::Allowed,
        }
    }

    fn record_failure(&self, client: &str) {
        let Ok(mut clients) = self.clients.lock() else {
            error!("Login rate limiter state poisoned");
            return;
        };

        let now = Instant::now();
        let entry = clients.entry(client.to_string()).or_insert(Window {
            started: now,
            failures: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.failures = 0;
        }
        entry.failures = entry.failures.saturating_add(1);
    }

    fn record_success(&self, client: &str) {
        if let Ok(mut clients) = self.clients.lock() {
            clients.remove(client);
        }
    }
}
