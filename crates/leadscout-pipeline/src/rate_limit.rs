//! FIFO request pacing shared by every outbound client.
//!
//! Callers enqueue and suspend; a drain task releases one caller per
//! configured interval, strictly in arrival order. The drain task only
//! exists while the queue is non-empty, so an idle limiter costs nothing
//! and the first caller after idle is released with zero delay.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use leadscout_core::RequestPacer;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Snapshot of the limiter's queue, for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueStatus {
    pub queued: usize,
    pub draining: bool,
    pub requests_per_second: f64,
}

struct QueueEntry {
    release: oneshot::Sender<()>,
    enqueued_at: Instant,
}

struct QueueState {
    queue: VecDeque<QueueEntry>,
    draining: bool,
}

struct Inner {
    state: Mutex<QueueState>,
    interval: Duration,
    requests_per_second: f64,
}

impl Inner {
    fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle to one shared FIFO limiter.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    /// Builds a limiter releasing `requests_per_second` callers per second.
    /// The rate must be positive; config validation enforces that upstream.
    #[must_use]
    pub fn new(requests_per_second: f64) -> Self {
        let rate = requests_per_second.max(f64::MIN_POSITIVE);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState {
                    queue: VecDeque::new(),
                    draining: false,
                }),
                interval: Duration::from_secs_f64(1.0 / rate),
                requests_per_second,
            }),
        }
    }

    /// Suspends the caller until the limiter releases its turn. Callers are
    /// released strictly in arrival order, one per interval.
    pub async fn wait_for_turn(&self) {
        let (release, released) = oneshot::channel();
        {
            let mut state = self.inner.lock_state();
            state.queue.push_back(QueueEntry {
                release,
                enqueued_at: Instant::now(),
            });
            if !state.draining {
                state.draining = true;
                tokio::spawn(drain(Arc::clone(&self.inner)));
            }
        }
        // A dropped sender means the drain task released and exited; either
        // way the turn has come.
        let _ = released.await;
    }

    #[must_use]
    pub fn queue_status(&self) -> QueueStatus {
        let state = self.inner.lock_state();
        QueueStatus {
            queued: state.queue.len(),
            draining: state.draining,
            requests_per_second: self.inner.requests_per_second,
        }
    }
}

async fn drain(inner: Arc<Inner>) {
    loop {
        let entry = {
            let mut state = inner.lock_state();
            match state.queue.pop_front() {
                Some(entry) => entry,
                None => {
                    state.draining = false;
                    return;
                }
            }
        };
        let waited_ms = u64::try_from(entry.enqueued_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::debug!(waited_ms, "releasing queued request");
        let _ = entry.release.send(());
        tokio::time::sleep(inner.interval).await;
    }
}

#[async_trait]
impl RequestPacer for RateLimiter {
    async fn await_turn(&self) {
        self.wait_for_turn().await;
    }
}
