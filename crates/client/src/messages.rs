// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed views over inbound payloads, one per state slot.
//!
//! Slots store payloads as sent; these types are decoded on read. Field sets
//! follow what the device sends today. Missing fields default, and numeric
//! fields accept numbers or numeric strings so older firmware still decodes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response to an `auth` request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMessage {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Codec id → display label.
pub type AudioCodecsMessage = BTreeMap<String, String>;

/// Device streaming configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asrc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(deserialize_with = "lenient::opt_signed", skip_serializing_if = "Option::is_none")]
    pub delay: Option<i64>,
    #[serde(deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub max_br: Option<u64>,
    #[serde(deserialize_with = "lenient::opt_number", skip_serializing_if = "Option::is_none")]
    pub srt_latency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_overlay: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srtla_addr: Option<String>,
    /// Sent as a number by current firmware and as a string by older builds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srtla_port: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srt_streamid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_pass: Option<String>,
    /// Fields not listed above, kept as sent.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigMessage {
    pub fn srtla_port(&self) -> Option<u16> {
        match self.srtla_port.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// One network interface as reported in `netif`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetifEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Throughput in bytes per second.
    #[serde(deserialize_with = "lenient::number")]
    pub tp: u64,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Interface name → state.
pub type NetifMessage = BTreeMap<String, NetifEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Success,
    Warning,
    Error,
    #[default]
    Info,
}

/// A notification pushed by the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceNotification {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub msg: String,
    pub is_dismissable: bool,
    pub is_persistent: bool,
    /// Display time in seconds; zero for persistent notifications.
    #[serde(deserialize_with = "lenient::number")]
    pub duration: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsMessage {
    pub show: Vec<DeviceNotification>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    pub name: String,
    /// Whether the pipeline accepts an audio source.
    pub asrc: bool,
    /// Whether the pipeline accepts an audio codec choice.
    pub acodec: bool,
}

/// Pipeline id → description.
pub type PipelinesMessage = BTreeMap<String, Pipeline>;

/// Component name → version string.
pub type RevisionsMessage = BTreeMap<String, String>;

/// Sensor label → reading, usually a formatted string but sometimes a bare number.
pub type SensorsMessage = BTreeMap<String, Value>;

/// Outcome of `wifi.new`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiNewResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

/// Transient acknowledgements for WiFi actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnect: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<WifiNewResult>,
}

// -- Status ------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshStatus {
    pub user: String,
    pub user_pass: bool,
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableUpdates {
    pub package_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_size: Option<String>,
}

/// Software update progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Updating {
    Flag(bool),
    Progress {
        downloading: u64,
        unpacking: u64,
        setting_up: u64,
        total: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<i64>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiNetwork {
    pub active: bool,
    pub ssid: String,
    pub signal: i64,
    pub security: String,
    /// Frequency in MHz.
    pub freq: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotspotChannel {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hotspot {
    pub name: String,
    pub password: String,
    pub available_channels: BTreeMap<String, HotspotChannel>,
    pub channel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiDevice {
    pub ifname: String,
    /// UUID of the active connection, if any.
    pub conn: Option<String>,
    pub hw: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
    pub available: Vec<WifiNetwork>,
    /// SSID → connection UUID.
    pub saved: BTreeMap<String, String>,
    pub supports_hotspot: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemNetworkTypes {
    pub supported: Vec<String>,
    pub active: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemConfig {
    pub apn: String,
    pub username: String,
    pub password: String,
    pub roaming: bool,
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModemStatus {
    pub connection: String,
    pub network_type: String,
    pub signal: i64,
    pub roaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modem {
    pub ifname: String,
    pub name: String,
    pub network_type: ModemNetworkTypes,
    /// Absent when no SIM is inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ModemConfig>,
    pub available_networks: Map<String, Value>,
    pub status: ModemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_sim: Option<bool>,
}

/// Modem id → modem.
pub type ModemList = BTreeMap<String, Modem>;

/// Composite device status.
///
/// Held as a raw JSON object because the device sends partial updates that are
/// merged key by key into the previous value. Typed views are decoded on access.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusMessage(pub Map<String, Value>);

impl StatusMessage {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_streaming(&self) -> bool {
        self.get("is_streaming").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn set_password(&self) -> Option<bool> {
        self.get("set_password").and_then(Value::as_bool)
    }

    pub fn ssh(&self) -> Option<SshStatus> {
        self.typed("ssh")
    }

    pub fn available_updates(&self) -> Option<AvailableUpdates> {
        self.typed("available_updates")
    }

    pub fn updating(&self) -> Option<Updating> {
        self.typed("updating")
    }

    /// WiFi devices keyed by device id.
    pub fn wifi(&self) -> BTreeMap<String, WifiDevice> {
        self.typed("wifi").unwrap_or_default()
    }

    pub fn modems(&self) -> ModemList {
        self.typed("modems").unwrap_or_default()
    }

    /// Audio source names.
    pub fn asrcs(&self) -> Vec<String> {
        self.typed("asrcs").unwrap_or_default()
    }

    /// Shallow merge: keys in `update` overwrite, all other keys survive.
    pub fn merge(&mut self, update: Map<String, Value>) {
        for (key, value) in update {
            self.0.insert(key, value);
        }
    }

    fn typed<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Number decoding that tolerates floats and numeric strings.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn unsigned(value: &Value) -> Option<u64> {
        if let Some(n) = value.as_u64() {
            return Some(n);
        }
        as_f64(value).filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64)
    }

    fn signed(value: &Value) -> Option<i64> {
        if let Some(n) = value.as_i64() {
            return Some(n);
        }
        as_f64(value).filter(|f| f.is_finite()).map(|f| f.round() as i64)
    }

    /// Unparseable values decode as zero.
    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        Ok(unsigned(&Value::deserialize(d)?).unwrap_or_default())
    }

    pub fn opt_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(unsigned(&Value::deserialize(d)?))
    }

    pub fn opt_signed<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(signed(&Value::deserialize(d)?))
    }
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
