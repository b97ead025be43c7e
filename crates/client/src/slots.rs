// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable state slots, one per inbound message family.
//!
//! Each slot is a `watch` channel holding the last payload exactly as the
//! device sent it. Typed views are decoded on read, so a payload the typed
//! struct does not describe is still stored and observable. Mutation is
//! crate-private: only the router writes.

use std::marker::PhantomData;
use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};

use crate::codec::Discriminant;
use crate::messages::{
    AudioCodecsMessage, AuthMessage, ConfigMessage, NetifMessage, NotificationsMessage,
    PipelinesMessage, RevisionsMessage, SensorsMessage, StatusMessage, WifiMessage,
};

/// A single observable cell. Empty until the first matching frame arrives.
///
/// `T` is the typed view returned by [`Slot::get`]; storage is raw JSON.
pub struct Slot<T> {
    tx: watch::Sender<Option<Value>>,
    _view: PhantomData<fn() -> T>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx, _view: PhantomData }
    }

    /// Borrow the stored payload. Do not hold across an await point.
    pub fn borrow(&self) -> watch::Ref<'_, Option<Value>> {
        self.tx.borrow()
    }

    /// Clone of the stored payload, untouched.
    pub fn raw(&self) -> Option<Value> {
        self.tx.borrow().clone()
    }

    /// Receiver that is notified on every write to this slot.
    pub fn subscribe(&self) -> watch::Receiver<Option<Value>> {
        self.tx.subscribe()
    }

    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub(crate) fn replace(&self, value: Value) {
        self.tx.send_replace(Some(value));
    }

    pub(crate) fn modify(&self, f: impl FnOnce(&mut Option<Value>)) {
        self.tx.send_modify(f);
    }

    fn sender(&self) -> &watch::Sender<Option<Value>> {
        &self.tx
    }
}

impl<T: DeserializeOwned> Slot<T> {
    /// Typed view of the stored payload.
    ///
    /// `None` when the slot is empty or the payload does not fit `T`; the raw
    /// value is still available from [`Slot::raw`].
    pub fn get(&self) -> Option<T> {
        let raw = self.tx.borrow();
        raw.as_ref().and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Stream of slot writes, each item naming the slot that changed.
pub type SlotUpdates = Pin<Box<dyn Stream<Item = Discriminant> + Send>>;

/// Registry of all state slots.
#[derive(Default)]
pub struct Slots {
    pub auth: Slot<AuthMessage>,
    pub audio_codecs: Slot<AudioCodecsMessage>,
    pub config: Slot<ConfigMessage>,
    pub netif: Slot<NetifMessage>,
    pub notifications: Slot<NotificationsMessage>,
    pub pipelines: Slot<PipelinesMessage>,
    pub revisions: Slot<RevisionsMessage>,
    pub sensors: Slot<SensorsMessage>,
    pub status: Slot<StatusMessage>,
    pub wifi: Slot<WifiMessage>,
}

impl Slots {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, discriminant: Discriminant) -> &watch::Sender<Option<Value>> {
        match discriminant {
            Discriminant::Auth => self.auth.sender(),
            Discriminant::AudioCodecs => self.audio_codecs.sender(),
            Discriminant::Config => self.config.sender(),
            Discriminant::Netif => self.netif.sender(),
            Discriminant::Notification => self.notifications.sender(),
            Discriminant::Pipelines => self.pipelines.sender(),
            Discriminant::Revisions => self.revisions.sender(),
            Discriminant::Sensors => self.sensors.sender(),
            Discriminant::Status => self.status.sender(),
            Discriminant::Wifi => self.wifi.sender(),
        }
    }

    /// Current payload of a slot, for generic consumers.
    pub fn to_json(&self, discriminant: Discriminant) -> Option<Value> {
        self.sender(discriminant).borrow().clone()
    }

    /// Every write to any slot from now on, in write order per slot.
    pub fn updates(&self) -> SlotUpdates {
        let streams = Discriminant::ALL.map(|d| -> SlotUpdates {
            Box::pin(WatchStream::from_changes(self.sender(d).subscribe()).map(move |_| d))
        });
        Box::pin(futures_util::stream::select_all(streams))
    }

    /// A change receiver for the given slot.
    pub fn watch(&self, discriminant: Discriminant) -> SlotWatch {
        SlotWatch { rx: self.sender(discriminant).subscribe() }
    }
}

/// Change notification for one slot, independent of its typed view.
pub struct SlotWatch {
    rx: watch::Receiver<Option<Value>>,
}

impl SlotWatch {
    /// Whether the slot was written since this receiver last observed it.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Mark the current value as seen.
    pub fn mark_seen(&mut self) {
        self.rx.mark_unchanged();
    }

    /// Wait for the next write. Errors once the slot registry is dropped.
    pub async fn changed(&mut self) -> anyhow::Result<()> {
        self.rx.changed().await.map_err(|_| anyhow::anyhow!("slot closed"))
    }
}

#[cfg(test)]
#[path = "slots_tests.rs"]
mod tests;
