// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authentication handshake.
//!
//! Credentials are submitted to the dispatcher as soon as the client starts,
//! so they sit at the head of the send queue and reach the device before any
//! other frame once the socket opens. The device answers with an `auth` frame
//! that lands in the auth slot; this module does not interpret it.

use std::fmt;

use serde_json::json;
use tracing::debug;

use crate::codec;
use crate::dispatch::{Dispatcher, SendTicket, TimeoutCallback};
use crate::notify::{Notice, Notifier};

/// Called when the credentials could not be delivered.
pub type ErrorCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub password: String,
    /// Ask the device to remember the session.
    pub persistent_token: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &"<redacted>")
            .field("persistent_token", &self.persistent_token)
            .finish()
    }
}

/// Encoded `auth` request.
pub fn auth_frame(credentials: &Credentials) -> String {
    codec::encode(
        "auth",
        json!({
            "password": credentials.password,
            "persistent_token": credentials.persistent_token,
        }),
    )
}

#[derive(Clone)]
pub struct AuthHandshake {
    dispatcher: Dispatcher,
    notifier: Notifier,
}

impl AuthHandshake {
    pub fn new(dispatcher: Dispatcher, notifier: Notifier) -> Self {
        Self { dispatcher, notifier }
    }

    /// Submit credentials now. If they cannot be delivered within the
    /// dispatcher's wait budget, an "Authentication failed" notice is published
    /// and `on_error` runs. There is no retry.
    pub fn send_auth(&self, credentials: &Credentials, on_error: Option<ErrorCallback>) -> SendTicket {
        let notifier = self.notifier.clone();
        let on_timeout: TimeoutCallback = Box::new(move || {
            notifier.publish(Notice::error(
                "Authentication failed",
                "The connection with the server could not be established",
            ));
            if let Some(on_error) = on_error {
                on_error();
            }
        });
        debug!(persistent = credentials.persistent_token, "submitting credentials");
        self.dispatcher.send(auth_frame(credentials), Some(on_timeout))
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
