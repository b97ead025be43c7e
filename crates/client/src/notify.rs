// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-visible notices raised by the client core.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default display time for core notices.
pub const NOTICE_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message meant for the person operating the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, title, description)
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, description)
    }

    pub fn new(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { level, title: title.into(), description: description.into(), duration: NOTICE_DURATION }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Fan-out of notices to any number of subscribers.
///
/// Publishing with no subscribers is not an error; the notice is still logged.
#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => {
                tracing::warn!(title = %notice.title, "{}", notice.description)
            }
            _ => tracing::info!(title = %notice.title, "{}", notice.description),
        }
        let _ = self.tx.send(notice);
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_notices() -> anyhow::Result<()> {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        notifier.publish(Notice::error("Connection", "device unreachable"));

        let notice = rx.recv().await?;
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.title, "Connection");
        assert_eq!(notice.duration, NOTICE_DURATION);
        Ok(())
    }

    #[test]
    fn publish_without_subscribers_is_fine() {
        Notifier::new().publish(Notice::info("Connection", "up"));
    }

    #[test]
    fn serializes_duration_in_millis() -> anyhow::Result<()> {
        let notice = Notice::info("a", "b").with_duration(Duration::from_secs(12));
        let value = serde_json::to_value(&notice)?;
        assert_eq!(value["duration_ms"], 12000);
        assert_eq!(value["level"], "info");
        Ok(())
    }
}
