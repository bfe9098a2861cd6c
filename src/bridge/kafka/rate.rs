//! Send-rate limiting and throughput reporting

use log::debug;
use std::time::{Duration, Instant};

use crate::bridge::kafka::counters::Counter;
use crate::bridge::kafka::error::KafkaClientError;
use crate::bridge::kafka::shutdown::ShutdownToken;

const WINDOW: Duration = Duration::from_secs(1);

/// Fixed-window limiter bounding sends to `limit_per_second` per window
///
/// Each accepted send calls [`RateLimiter::record_send`] before
/// [`RateLimiter::check`], so the limiter always accounts for the message
/// currently being sent. Bursts straddling a window boundary can exceed the
/// limit by up to one window's budget; this is an accepted trade-off of the
/// fixed-window scheme.
#[derive(Debug)]
pub struct RateLimiter {
    window_start: Instant,
    window_count: i64,
    limit_per_second: i64,
}

impl RateLimiter {
    pub fn new(limit_per_second: i64) -> Result<Self, KafkaClientError> {
        if limit_per_second <= 0 {
            return Err(KafkaClientError::config(format!(
                "rate limit must be positive, got {}",
                limit_per_second
            )));
        }
        Ok(Self {
            window_start: Instant::now(),
            window_count: 0,
            limit_per_second,
        })
    }

    /// Account for the message about to be sent
    pub fn record_send(&mut self) {
        self.window_count += 1;
    }

    /// How long the caller must idle before the send may proceed
    ///
    /// Zero means the send is within this window's budget.
    pub fn check(&mut self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed > WINDOW {
            self.reset(now);
            return Duration::ZERO;
        }
        if self.window_count <= self.limit_per_second {
            return Duration::ZERO;
        }
        let remaining = WINDOW.saturating_sub(elapsed);
        if remaining.is_zero() {
            self.reset(now);
            return Duration::ZERO;
        }
        remaining
    }

    fn reset(&mut self, now: Instant) {
        self.window_start = now;
        self.window_count = 0;
    }
}

/// Periodic sampler deriving a per-second rate from a shared counter
///
/// Each tick reports `(current - previous) * (1000 / interval_ms)` through
/// the callback, then checks the shutdown token — so one extra report is
/// always emitted after shutdown is signaled.
pub struct RateReporter {
    name: String,
    counter: Counter,
    shutdown: ShutdownToken,
    report: Box<dyn Fn(&str, f64) + Send + Sync>,
    period: Duration,
    per_second_multiplier: f64,
}

impl RateReporter {
    pub fn new<F>(
        name: impl Into<String>,
        counter: Counter,
        shutdown: ShutdownToken,
        report: F,
        interval_ms: u64,
    ) -> Result<Self, KafkaClientError>
    where
        F: Fn(&str, f64) + Send + Sync + 'static,
    {
        if interval_ms == 0 {
            return Err(KafkaClientError::config(
                "rate report interval must be positive",
            ));
        }
        Ok(Self {
            name: name.into(),
            counter,
            shutdown,
            report: Box::new(report),
            period: Duration::from_millis(interval_ms),
            per_second_multiplier: 1000.0 / interval_ms as f64,
        })
    }

    /// Sample until the shutdown token is observed
    pub async fn run(self) {
        let mut last = self.counter.get();
        let mut ticker = tokio::time::interval(self.period);
        // the first tick of a tokio interval resolves immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let current = self.counter.get();
            let rate = (current - last) as f64 * self.per_second_multiplier;
            last = current;
            (self.report)(&self.name, rate);
            if self.shutdown.is_signaled() {
                break;
            }
        }
        debug!("rate reporter [{}] stopped", self.name);
    }
}
