// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound frame routing into state slots.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::codec::{self, Discriminant};
use crate::slots::Slots;

/// What happened to one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// The matching slot was updated.
    Applied(Discriminant),
    /// Invalid JSON. Dropped.
    Malformed,
    /// Valid JSON but not a single-key object. Dropped.
    NotEnvelope,
    /// Single-key object with a key no slot handles. Dropped.
    Unknown(String),
}

/// Applies inbound frames to [`Slots`], in the order they are routed.
///
/// Payload shape is not checked: the slot stores the payload as sent.
/// `status` object payloads merge into the previous value at the top level;
/// every other family, and any non-object `status`, replaces its slot wholesale.
#[derive(Clone)]
pub struct Router {
    slots: Arc<Slots>,
}

impl Router {
    pub fn new(slots: Arc<Slots>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &Arc<Slots> {
        &self.slots
    }

    /// Decode one raw frame and apply it. Never fails; see [`RouteOutcome`].
    pub fn route(&self, raw: &str) -> RouteOutcome {
        let envelope = match codec::decode(raw) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                debug!("ignoring frame that is not a single-key envelope");
                return RouteOutcome::NotEnvelope;
            }
            Err(e) => {
                warn!(err = %e, "dropping malformed frame");
                return RouteOutcome::Malformed;
            }
        };

        let Some(discriminant) = envelope.discriminant() else {
            // Newer firmware may send families this client does not handle.
            trace!(key = %envelope.key, "ignoring unknown discriminant");
            return RouteOutcome::Unknown(envelope.key);
        };

        self.apply(discriminant, envelope.payload);
        trace!(%discriminant, "slot updated");
        RouteOutcome::Applied(discriminant)
    }

    fn apply(&self, discriminant: Discriminant, payload: Value) {
        let slots = &self.slots;
        match discriminant {
            Discriminant::Auth => slots.auth.replace(payload),
            Discriminant::AudioCodecs => slots.audio_codecs.replace(payload),
            Discriminant::Config => slots.config.replace(payload),
            Discriminant::Netif => slots.netif.replace(payload),
            Discriminant::Notification => slots.notifications.replace(payload),
            Discriminant::Pipelines => slots.pipelines.replace(payload),
            Discriminant::Revisions => slots.revisions.replace(payload),
            Discriminant::Sensors => slots.sensors.replace(payload),
            Discriminant::Wifi => slots.wifi.replace(payload),
            Discriminant::Status => match payload {
                Value::Object(update) => slots.status.modify(|status| match status {
                    Some(Value::Object(current)) => current.extend(update),
                    other => *other = Some(Value::Object(update)),
                }),
                other => slots.status.replace(other),
            },
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
