use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub success: bool,
    pub remaining: u32,
    pub reset_at: Instant,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request counter keyed by strings such as `contact:{ip}`.
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        self.check_at(key, limit, window, Instant::now())
    }

    pub fn check_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: Instant,
    ) -> RateLimitDecision {
        let mut windows = self.lock();

        match windows.get_mut(key) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= limit {
                    return RateLimitDecision {
                        success: false,
                        remaining: 0,
                        reset_at: entry.reset_at,
                    };
                }
                entry.count += 1;
                RateLimitDecision {
                    success: true,
                    remaining: limit.saturating_sub(entry.count),
                    reset_at: entry.reset_at,
                }
            }
            _ => {
                let reset_at = now + window;
                windows.insert(key.to_string(), Window { count: 1, reset_at });
                RateLimitDecision {
                    success: true,
                    remaining: limit.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }

    /// Drop windows that have expired by `now`; returns how many were removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|_, entry| now <= entry.reset_at);
        before - windows.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sweep expired windows every five minutes until the runtime shuts down.
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await;
            loop {
                interval.tick().await;
                let removed = limiter.sweep(Instant::now());
                if removed > 0 {
                    debug!("Swept {} expired rate limit windows", removed);
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Window>> {
        // A poisoned map only holds counters, so keep using it.
        self.windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
