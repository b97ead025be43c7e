// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness-gated outbound sends.
//!
//! A send issued while the transport is open (and nothing is queued ahead of
//! it) goes out immediately. Otherwise it joins a FIFO queue that is flushed,
//! in submission order, the moment the transport reports `Open`. Each queued
//! send carries its own wait budget; when the budget runs out the send is
//! dropped and its timeout callback runs exactly once. Delivery is at most once.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{oneshot, Notify};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::connection::Transport;
use crate::error::ErrorCode;

/// Called once when a send gives up waiting for the transport.
pub type TimeoutCallback = Box<dyn FnOnce() + Send + 'static>;

/// Wait budget for one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    /// How long to wait for the transport to open before giving up.
    pub max_wait: Duration,
    /// Readiness re-check cadence while waiting. Transitions reported by the
    /// transport are acted on immediately; this bounds the delay otherwise.
    pub poll_interval: Duration,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self { max_wait: Duration::from_millis(10000), poll_interval: Duration::from_millis(50) }
    }
}

/// Final state of one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The transport accepted the frame.
    Sent,
    /// The wait budget ran out before the transport opened. Never sent.
    TimedOut,
    /// Cancelled by the caller or by client shutdown. Never sent.
    Cancelled,
    /// The transport was open but refused the frame.
    Failed,
}

struct Pending {
    id: u64,
    frame: String,
    deadline: Instant,
    poll_interval: Duration,
    on_timeout: Option<TimeoutCallback>,
    cancel: CancellationToken,
    done: oneshot::Sender<DispatchOutcome>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    queue: Mutex<VecDeque<Pending>>,
    wake: Notify,
    next_id: AtomicU64,
    defaults: SendOptions,
}

/// Handle to one send. Dropping it does not cancel the send.
pub struct SendTicket {
    id: u64,
    cancel: CancellationToken,
    done: oneshot::Receiver<DispatchOutcome>,
    inner: Arc<Inner>,
}

impl SendTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Withdraw the send if it has not gone out yet.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.inner.wake.notify_one();
    }

    /// Wait for the send to complete.
    pub async fn outcome(self) -> DispatchOutcome {
        self.done.await.unwrap_or(DispatchOutcome::Cancelled)
    }
}

/// Queues outbound frames until the transport is ready.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Create a dispatcher and spawn its flush task. The task exits, cancelling
    /// everything still queued, when `shutdown` fires.
    pub fn new(
        transport: Arc<dyn Transport>,
        defaults: SendOptions,
        shutdown: CancellationToken,
    ) -> Self {
        let inner = Arc::new(Inner {
            transport,
            queue: Mutex::new(VecDeque::new()),
            wake: Notify::new(),
            next_id: AtomicU64::new(1),
            defaults,
        });
        tokio::spawn(Arc::clone(&inner).run(shutdown));
        Self { inner }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.transport.is_ready()
    }

    /// Number of sends still waiting for the transport.
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Send with the default wait budget.
    pub fn send(&self, frame: impl Into<String>, on_timeout: Option<TimeoutCallback>) -> SendTicket {
        self.send_with(frame, on_timeout, self.inner.defaults)
    }

    /// Send with an explicit wait budget.
    pub fn send_with(
        &self,
        frame: impl Into<String>,
        on_timeout: Option<TimeoutCallback>,
        options: SendOptions,
    ) -> SendTicket {
        let frame = frame.into();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();
        let ticket =
            SendTicket { id, cancel: cancel.clone(), done: done_rx, inner: Arc::clone(&self.inner) };

        let mut queue = self.inner.queue.lock();
        if queue.is_empty() && self.inner.transport.is_ready() {
            let outcome = deliver(self.inner.transport.as_ref(), id, frame);
            drop(queue);
            let _ = done_tx.send(outcome);
            return ticket;
        }

        debug!(id, queued = queue.len(), "transport not ready, queueing send");
        queue.push_back(Pending {
            id,
            frame,
            deadline: Instant::now() + options.max_wait,
            poll_interval: options.poll_interval,
            on_timeout,
            cancel,
            done: done_tx,
        });
        drop(queue);
        self.inner.wake.notify_one();
        ticket
    }
}

impl Inner {
    async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut state_rx = self.transport.subscribe_state();
        let mut transport_gone = false;

        loop {
            let next_wake = self.service();
            let sleep_until = next_wake.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = state_rx.changed(), if !transport_gone => {
                    if changed.is_err() {
                        transport_gone = true;
                    }
                }
                _ = self.wake.notified() => {}
                _ = tokio::time::sleep_until(sleep_until), if next_wake.is_some() => {}
            }
        }

        let drained: Vec<Pending> = self.queue.lock().drain(..).collect();
        for pending in drained {
            let _ = pending.done.send(DispatchOutcome::Cancelled);
        }
    }

    /// Flush, expire and drop cancelled entries. Returns when to look again.
    fn service(&self) -> Option<Instant> {
        let now = Instant::now();
        let mut finished = Vec::new();
        let mut expired = Vec::new();

        let next_wake = {
            let mut queue = self.queue.lock();
            let ready = self.transport.is_ready();
            let mut waiting = VecDeque::with_capacity(queue.len());

            for pending in queue.drain(..) {
                if pending.cancel.is_cancelled() {
                    debug!(id = pending.id, "send cancelled");
                    finished.push((pending.done, DispatchOutcome::Cancelled));
                } else if ready {
                    let outcome = deliver(self.transport.as_ref(), pending.id, pending.frame);
                    finished.push((pending.done, outcome));
                } else if pending.deadline <= now {
                    expired.push(pending);
                } else {
                    waiting.push_back(pending);
                }
            }

            let next_wake =
                waiting.iter().map(|p| p.deadline.min(now + p.poll_interval)).min();
            *queue = waiting;
            next_wake
        };

        // Callbacks run outside the lock so they may send again.
        for pending in expired {
            warn!(id = pending.id, "{}: timed out awaiting socket connection", ErrorCode::DispatchTimeout);
            if let Some(on_timeout) = pending.on_timeout {
                on_timeout();
            }
            let _ = pending.done.send(DispatchOutcome::TimedOut);
        }
        for (done, outcome) in finished {
            let _ = done.send(outcome);
        }

        next_wake
    }
}

fn deliver(transport: &dyn Transport, id: u64, frame: String) -> DispatchOutcome {
    match transport.send_frame(frame) {
        Ok(()) => {
            debug!(id, "frame sent");
            DispatchOutcome::Sent
        }
        Err(e) => {
            warn!(id, err = %e, "transport refused frame");
            DispatchOutcome::Failed
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
