//! Cooperative shutdown coordination
//!
//! A [`ShutdownToken`] is cloned into every loop that must wind down
//! together: consumer poll loops, reporters and producers all observe the
//! same token between iterations. Signaling is idempotent and write-once;
//! `wait` gives tasks a blocking alternative to polling the flag.

use log::info;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// The OS signal that triggered a shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM (kill, Kubernetes, Docker)
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT (Ctrl+C)"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Wait for SIGINT or SIGTERM
#[cfg(unix)]
pub async fn shutdown_signal() -> ShutdownSignal {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");

    tokio::select! {
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sigint.recv() => ShutdownSignal::Interrupt,
    }
}

/// Windows-compatible variant (only handles Ctrl+C)
#[cfg(not(unix))]
pub async fn shutdown_signal() -> ShutdownSignal {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    ShutdownSignal::Interrupt
}

struct TokenInner {
    signaled: AtomicBool,
    notify: Notify,
}

/// Shared write-once cancellation flag
#[derive(Clone)]
pub struct ShutdownToken {
    inner: Arc<TokenInner>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(TokenInner {
                signaled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
        }
    }

    /// Set the flag; idempotent, wakes every waiter
    pub fn signal(&self) {
        if !self.inner.signaled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Check the flag without blocking; loops call this between iterations
    pub fn is_signaled(&self) -> bool {
        self.inner.signaled.load(Ordering::SeqCst)
    }

    /// Wait until the flag is set
    pub async fn wait(&self) {
        while !self.is_signaled() {
            let notified = self.inner.notify.notified();
            if self.is_signaled() {
                break;
            }
            notified.await;
        }
    }

    /// Spawn a background task that signals this token on SIGINT/SIGTERM
    pub fn monitor_signals(&self) {
        let token = self.clone();
        tokio::spawn(async move {
            let signal = shutdown_signal().await;
            info!("Received {} - initiating graceful shutdown", signal);
            token.signal();
        });
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShutdownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownToken")
            .field("signaled", &self.is_signaled())
            .finish()
    }
}
