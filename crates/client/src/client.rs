// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One device session: connection, router, state slots and outbound sends.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::auth::{AuthHandshake, Credentials, ErrorCallback};
use crate::config::Config;
use crate::connection::{Connection, ConnectionState, Transport};
use crate::dispatch::{DispatchOutcome, Dispatcher, SendOptions, SendTicket, TimeoutCallback};
use crate::intents::Intent;
use crate::notify::{Notice, Notifier};
use crate::router::Router;
use crate::slots::Slots;

/// Connection parameters for a [`Client`].
pub struct ClientOptions {
    pub url: String,
    pub keepalive: Duration,
    pub send: SendOptions,
    /// Sent ahead of every other frame once the socket opens. `None` skips
    /// authentication.
    pub credentials: Option<Credentials>,
    /// Runs once if the credentials could not be delivered in time.
    pub on_auth_error: Option<ErrorCallback>,
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("url", &self.url)
            .field("keepalive", &self.keepalive)
            .field("send", &self.send)
            .field("credentials", &self.credentials)
            .field("on_auth_error", &self.on_auth_error.is_some())
            .finish()
    }
}

impl ClientOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            keepalive: crate::connection::KEEPALIVE_INTERVAL,
            send: SendOptions::default(),
            credentials: None,
            on_auth_error: None,
        }
    }
}

impl From<&Config> for ClientOptions {
    fn from(config: &Config) -> Self {
        Self {
            url: config.url(),
            keepalive: config.keepalive_interval(),
            send: config.send_options(),
            credentials: config.credentials(),
            on_auth_error: None,
        }
    }
}

/// A session with one device.
///
/// Slots are readable by anyone; only frames from the device write them.
pub struct Client {
    slots: Arc<Slots>,
    notifier: Notifier,
    connection: Arc<Connection>,
    dispatcher: Dispatcher,
    auth: AuthHandshake,
    auth_ticket: Mutex<Option<SendTicket>>,
    shutdown: CancellationToken,
}

impl Client {
    /// Start connecting in the background. Must be called within a tokio runtime.
    pub fn connect(options: ClientOptions) -> Self {
        let shutdown = CancellationToken::new();
        let slots = Arc::new(Slots::new());
        let notifier = Notifier::new();
        let router = Router::new(Arc::clone(&slots));

        let connection = Connection::connect(
            options.url,
            router,
            notifier.clone(),
            options.keepalive,
            shutdown.child_token(),
        );
        let transport: Arc<dyn Transport> = connection.clone();
        let dispatcher = Dispatcher::new(transport, options.send, shutdown.clone());
        let auth = AuthHandshake::new(dispatcher.clone(), notifier.clone());

        // Queued before anything a caller can send, so it is flushed first.
        let on_auth_error = options.on_auth_error;
        let auth_ticket = options
            .credentials
            .map(|credentials| auth.send_auth(&credentials, on_auth_error));

        info!(url = %connection.url(), "client started");
        Self {
            slots,
            notifier,
            connection,
            dispatcher,
            auth,
            auth_ticket: Mutex::new(auth_ticket),
            shutdown,
        }
    }

    pub fn slots(&self) -> &Arc<Slots> {
        &self.slots
    }

    /// Receiver for user-facing notices published from now on.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe_state()
    }

    pub fn is_ready(&self) -> bool {
        self.dispatcher.is_ready()
    }

    pub fn url(&self) -> &str {
        self.connection.url()
    }

    /// Send a raw frame once the connection is open.
    pub fn send(&self, frame: impl Into<String>, on_timeout: Option<TimeoutCallback>) -> SendTicket {
        self.dispatcher.send(frame, on_timeout)
    }

    /// Encode and send an outbound intent.
    pub fn dispatch(&self, intent: Intent) -> SendTicket {
        self.dispatcher.send(intent.encode(), None)
    }

    /// Send credentials now, independent of the automatic handshake.
    pub fn authenticate(&self, credentials: &Credentials, on_error: Option<ErrorCallback>) -> SendTicket {
        self.auth.send_auth(credentials, on_error)
    }

    /// Wait for the credentials submitted by [`Client::connect`] to go out.
    ///
    /// `None` when no credentials were configured or this was already awaited.
    pub async fn authenticated(&self) -> Option<DispatchOutcome> {
        let ticket = self.auth_ticket.lock().take()?;
        Some(ticket.outcome().await)
    }

    /// Close the socket and cancel every pending send.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
