// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Envelope codec: single-key JSON objects whose key names the message family.
//!
//! Outbound: `{"<discriminant>": <payload>}`. Inbound frames decode to an
//! [`Envelope`] only when they are a JSON object with exactly one key; any
//! other valid JSON is inert. Payload shape is not checked here.

use std::fmt;

use serde_json::{Map, Value};

/// Inbound message families with a state slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discriminant {
    Auth,
    AudioCodecs,
    Config,
    Netif,
    Notification,
    Pipelines,
    Revisions,
    Sensors,
    Status,
    Wifi,
}

impl Discriminant {
    pub const ALL: [Discriminant; 10] = [
        Self::Auth,
        Self::AudioCodecs,
        Self::Config,
        Self::Netif,
        Self::Notification,
        Self::Pipelines,
        Self::Revisions,
        Self::Sensors,
        Self::Status,
        Self::Wifi,
    ];

    /// Wire key for this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::AudioCodecs => "acodecs",
            Self::Config => "config",
            Self::Netif => "netif",
            Self::Notification => "notification",
            Self::Pipelines => "pipelines",
            Self::Revisions => "revisions",
            Self::Sensors => "sensors",
            Self::Status => "status",
            Self::Wifi => "wifi",
        }
    }

    /// Resolve a wire key. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "auth" => Some(Self::Auth),
            "acodecs" => Some(Self::AudioCodecs),
            "config" => Some(Self::Config),
            "netif" => Some(Self::Netif),
            "notification" => Some(Self::Notification),
            "pipelines" => Some(Self::Pipelines),
            "revisions" => Some(Self::Revisions),
            "sensors" => Some(Self::Sensors),
            "status" => Some(Self::Status),
            "wifi" => Some(Self::Wifi),
            _ => None,
        }
    }
}

impl fmt::Display for Discriminant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded single-key frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub key: String,
    pub payload: Value,
}

impl Envelope {
    pub fn new(key: impl Into<String>, payload: Value) -> Self {
        Self { key: key.into(), payload }
    }

    /// The known family for this envelope, if any.
    pub fn discriminant(&self) -> Option<Discriminant> {
        Discriminant::from_key(&self.key)
    }

    /// Serialize back to wire form.
    pub fn encode(&self) -> String {
        encode(&self.key, self.payload.clone())
    }
}

/// Malformed inbound JSON.
#[derive(Debug)]
pub struct ParseFailure(pub serde_json::Error);

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid JSON frame: {}", self.0)
    }
}

impl std::error::Error for ParseFailure {}

/// Encode an outbound envelope.
pub fn encode(discriminant: &str, payload: Value) -> String {
    let mut map = Map::with_capacity(1);
    map.insert(discriminant.to_owned(), payload);
    Value::Object(map).to_string()
}

/// Decode an inbound frame.
///
/// Returns `Ok(None)` for valid JSON that is not a single-key object.
pub fn decode(raw: &str) -> Result<Option<Envelope>, ParseFailure> {
    let value: Value = serde_json::from_str(raw).map_err(ParseFailure)?;
    let Value::Object(map) = value else {
        return Ok(None);
    };
    if map.len() != 1 {
        return Ok(None);
    }
    Ok(map.into_iter().next().map(|(key, payload)| Envelope { key, payload }))
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
