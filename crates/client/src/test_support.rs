// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: a scriptable transport and assertion helpers.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::connection::{ConnectionState, Transport};
use crate::dispatch::TimeoutCallback;
use crate::error::ErrorCode;

/// In-memory transport that records every frame it accepts.
pub struct MockTransport {
    state: watch::Sender<ConnectionState>,
    sent: Mutex<Vec<String>>,
    refuse: AtomicBool,
}

impl MockTransport {
    /// A transport in `Connecting`.
    pub fn new() -> Arc<Self> {
        Self::with_state(ConnectionState::Connecting)
    }

    /// A transport that is already open.
    pub fn open() -> Arc<Self> {
        Self::with_state(ConnectionState::Open)
    }

    pub fn with_state(state: ConnectionState) -> Arc<Self> {
        let (state, _) = watch::channel(state);
        Arc::new(Self { state, sent: Mutex::new(Vec::new()), refuse: AtomicBool::new(false) })
    }

    /// Transition and notify state subscribers.
    pub fn set_state(&self, next: ConnectionState) {
        self.state.send_replace(next);
    }

    /// Transition without notifying subscribers, so only polling can see it.
    pub fn set_state_silently(&self, next: ConnectionState) {
        self.state.send_if_modified(|state| {
            *state = next;
            false
        });
    }

    /// Make `send_frame` fail even while open.
    pub fn refuse_frames(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::Relaxed);
    }

    /// Frames accepted so far, in order.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Transport for MockTransport {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn send_frame(&self, frame: String) -> anyhow::Result<()> {
        let state = self.state();
        if state != ConnectionState::Open {
            return Err(ErrorCode::NotReady.to_error(format!("mock transport is {state}")));
        }
        if self.refuse.load(Ordering::Relaxed) {
            anyhow::bail!("mock transport refused frame");
        }
        self.sent.lock().push(frame);
        Ok(())
    }
}

/// A timeout callback paired with a counter of how often it ran.
pub fn counting_callback() -> (Arc<AtomicUsize>, TimeoutCallback) {
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    let callback: TimeoutCallback = Box::new(move || {
        inner.fetch_add(1, Ordering::SeqCst);
    });
    (count, callback)
}

/// Assert that an expression is `Err` and its message contains a substring.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = err.to_string();
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
