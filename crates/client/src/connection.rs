// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection manager: owns the single WebSocket to the device.
//!
//! Lifecycle is `Connecting → Open → (Closed | Error)`. There is no edge back
//! to `Connecting`; once the socket is gone the client stays degraded until it
//! is recreated. While open, a keepalive frame goes out on a fixed interval.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::ErrorCode;
use crate::notify::{Notice, Notifier};
use crate::router::Router;

/// Default keepalive interval.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_millis(10000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Error,
}

impl ConnectionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Error)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Error => "error",
        })
    }
}

/// The outbound side of a device connection, as seen by the dispatcher.
pub trait Transport: Send + Sync {
    fn state(&self) -> ConnectionState;

    /// Receiver notified on every lifecycle transition.
    fn subscribe_state(&self) -> watch::Receiver<ConnectionState>;

    /// Hand one frame to the socket. Fails with [`ErrorCode::NotReady`] unless open.
    fn send_frame(&self, frame: String) -> anyhow::Result<()>;

    fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Open
    }
}

/// Encoded keepalive frame.
pub fn keepalive_frame() -> String {
    codec::encode("keepalive", Value::Null)
}

/// Ticker for keepalive frames. The first tick lands one `period` after
/// creation, not immediately.
pub(crate) fn keepalive_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// A live (or finished) WebSocket connection to the device.
pub struct Connection {
    url: String,
    state: watch::Sender<ConnectionState>,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl Connection {
    /// Open the socket in the background and return immediately in `Connecting`.
    ///
    /// Inbound text frames go to `router` in arrival order. Lifecycle notices
    /// are published on `notifier`. Cancelling `cancel` closes the socket.
    pub fn connect(
        url: impl Into<String>,
        router: Router,
        notifier: Notifier,
        keepalive: Duration,
        cancel: CancellationToken,
    ) -> Arc<Self> {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let conn = Arc::new(Self { url: url.into(), state, outbound, cancel });

        tokio::spawn(Arc::clone(&conn).run(outbound_rx, router, notifier, keepalive));
        conn
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Close the socket. The state becomes `Closed` once the close frame is written.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(url = %self.url, %prev, %next, "connection state changed");
        }
    }

    fn fail(&self, notifier: &Notifier, err: &dyn fmt::Display) {
        warn!(url = %self.url, err = %err, "{}", ErrorCode::ConnectionError);
        self.set_state(ConnectionState::Error);
        notifier.publish(Notice::error(
            "Connection",
            "It has not been possible to communicate with the device",
        ));
    }

    async fn run(
        self: Arc<Self>,
        mut outbound_rx: mpsc::UnboundedReceiver<String>,
        router: Router,
        notifier: Notifier,
        keepalive: Duration,
    ) {
        let connected = tokio::select! {
            _ = self.cancel.cancelled() => {
                self.set_state(ConnectionState::Closed);
                return;
            }
            result = tokio_tungstenite::connect_async(self.url.as_str()) => result,
        };
        let ws = match connected {
            Ok((ws, _)) => ws,
            Err(e) => {
                self.fail(&notifier, &e);
                return;
            }
        };

        let (mut write, mut read) = ws.split();
        self.set_state(ConnectionState::Open);
        info!(url = %self.url, "connected to device");
        notifier.publish(Notice::info(
            "Connection",
            "The connection with the device has been established.",
        ));

        let mut ticker = keepalive_ticker(keepalive);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    // Frames already accepted by send_frame still go out.
                    while let Ok(frame) = outbound_rx.try_recv() {
                        if write.send(Message::Text(frame.into())).await.is_err() {
                            break;
                        }
                    }
                    let _ = write.send(Message::Close(None)).await;
                    self.set_state(ConnectionState::Closed);
                    info!(url = %self.url, "connection closed by client");
                    return;
                }
                _ = ticker.tick() => {
                    if self.state() != ConnectionState::Open {
                        continue;
                    }
                    if let Err(e) = write.send(Message::Text(keepalive_frame().into())).await {
                        self.fail(&notifier, &e);
                        return;
                    }
                }
                Some(frame) = outbound_rx.recv() => {
                    if let Err(e) = write.send(Message::Text(frame.into())).await {
                        self.fail(&notifier, &e);
                        return;
                    }
                }
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            router.route(&text);
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            self.set_state(ConnectionState::Closed);
                            info!(url = %self.url, "connection closed by device");
                            return;
                        }
                        Some(Ok(_)) => {} // binary, ping, pong
                        Some(Err(e)) => {
                            self.fail(&notifier, &e);
                            return;
                        }
                    }
                }
            }
        }
    }
}

impl Transport for Connection {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    fn send_frame(&self, frame: String) -> anyhow::Result<()> {
        let state = self.state();
        if state != ConnectionState::Open {
            return Err(ErrorCode::NotReady.to_error(format!("connection is {state}")));
        }
        self.outbound
            .send(frame)
            .map_err(|_| ErrorCode::NotReady.to_error("connection task has exited"))
    }
}
