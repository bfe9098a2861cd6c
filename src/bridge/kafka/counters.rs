//! Shared atomic counters
//!
//! Counters are single-writer-owned-by-the-wrapper and read concurrently by
//! reporters. Reporters tolerate torn (slightly stale) reads, so relaxed
//! ordering is sufficient.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A shareable monotonic (or gauge) counter
#[derive(Clone, Debug, Default)]
pub struct Counter(Arc<AtomicI64>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement(&self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-consumer event counters, updated strictly before handler dispatch
#[derive(Clone, Debug, Default)]
pub struct ConsumerCounters {
    /// Messages handed to the message handler
    pub delivered: Counter,
    /// Broker-reported poll errors
    pub failed: Counter,
    /// Event kinds this layer does not process
    pub ignored: Counter,
}

impl ConsumerCounters {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Per-producer counters fed by the delivery-confirmation stream
///
/// `sent` counts accepted sends monotonically and feeds rate reporters;
/// `in_flight` is the drain gauge decremented as confirmations arrive.
#[derive(Clone, Debug, Default)]
pub struct DeliveryCounters {
    pub sent: Counter,
    pub success: Counter,
    pub failed: Counter,
    pub in_flight: Counter,
}

impl DeliveryCounters {
    pub fn new() -> Self {
        Self::default()
    }
}
