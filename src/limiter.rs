//! Pacing of calls to the external model.

use futures::future::BoxFuture;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

pub trait RateLimiter: Send + Sync {
    /// Resolves once the caller may issue one request.
    fn acquire(&self) -> BoxFuture<'_, ()>;
}

/// Token bucket state. Time is passed in, so tests drive it with their own instants.
#[derive(Debug, Clone)]
pub struct Bucket {
    capacity: u32,
    refill_every: Duration,
    tokens: u32,
    last_refill: Instant,
}

impl Bucket {
    pub fn new(capacity: u32, refill_every: Duration, now: Instant) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            refill_every,
            tokens: capacity,
            last_refill: now,
        }
    }

    fn refill(&mut self, now: Instant) {
        if self.refill_every.is_zero() {
            self.tokens = self.capacity;
            self.last_refill = now;
            return;
        }
        let elapsed = now.saturating_duration_since(self.last_refill);
        let earned = elapsed.as_nanos() / self.refill_every.as_nanos();
        if earned == 0 {
            return;
        }
        let earned = earned.min(u128::from(self.capacity)) as u32;
        self.tokens = self.tokens.saturating_add(earned).min(self.capacity);
        if self.tokens == self.capacity {
            self.last_refill = now;
        } else {
            self.last_refill += self.refill_every * earned;
        }
    }

    /// Takes a token, or returns how long until the next one.
    pub fn try_acquire_at(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);
        if self.tokens > 0 {
            self.tokens -= 1;
            Ok(())
        } else {
            let since = now.saturating_duration_since(self.last_refill);
            Err(self.refill_every.saturating_sub(since))
        }
    }

    pub fn available(&self) -> u32 {
        self.tokens
    }
}

// Read through tokio so paused test clocks apply.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

pub struct TokenBucketLimiter {
    bucket: Mutex<Bucket>,
}

impl TokenBucketLimiter {
    pub fn new(capacity: u32, refill_every: Duration) -> Self {
        Self {
            bucket: Mutex::new(Bucket::new(capacity, refill_every, now())),
        }
    }
}

impl RateLimiter for TokenBucketLimiter {
    fn acquire(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            loop {
                let wait = match self.bucket.lock().await.try_acquire_at(now()) {
                    Ok(()) => return,
                    Err(wait) => wait,
                };
                tracing::debug!(wait_ms = wait.as_millis() as u64, "waiting for model rate limit");
                tokio::time::sleep(wait).await;
            }
        })
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn acquire(&self) -> BoxFuture<'_, ()> {
        Box::pin(async {})
    }
}
