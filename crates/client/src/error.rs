// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure classes surfaced by the client core.
///
/// None of these are fatal. Connection errors and dispatch timeouts reach the
/// user as notices; parse failures and unknown discriminants only reach logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The transport failed to open or errored after opening.
    ConnectionError,
    /// An inbound frame was not valid JSON, or its payload did not fit the slot type.
    ParseFailure,
    /// An inbound envelope carried a key no slot is registered for.
    UnknownDiscriminant,
    /// An outbound send never observed readiness within its wait budget.
    DispatchTimeout,
    /// The transport is not open.
    NotReady,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::ParseFailure => "PARSE_FAILURE",
            Self::UnknownDiscriminant => "UNKNOWN_DISCRIMINANT",
            Self::DispatchTimeout => "DISPATCH_TIMEOUT",
            Self::NotReady => "NOT_READY",
        }
    }

    /// Whether the failure is shown to the user rather than only logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::ConnectionError | Self::DispatchTimeout)
    }

    /// Wrap this code with a message into an `anyhow::Error`.
    pub fn to_error(&self, message: impl Into<String>) -> anyhow::Error {
        anyhow::Error::new(CoreError { code: *self, message: message.into() })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An [`ErrorCode`] paired with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for CoreError {}

/// Extract the [`ErrorCode`] from an `anyhow::Error` produced by [`ErrorCode::to_error`].
pub fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.downcast_ref::<CoreError>().map(|e| e.code)
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
