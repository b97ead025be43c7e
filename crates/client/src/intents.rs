// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed builders for outbound envelopes.
//!
//! Several commands coerce numeric fields to strings (device ids, the bitrate
//! in `set_bitrate`). The device expects exactly these encodings.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::codec;

/// Fixed set of device commands sent under the `command` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SystemCommand {
    /// Install pending software updates.
    Update,
    Reboot,
    Poweroff,
    StartSsh,
    StopSsh,
    ResetSshPass,
    /// Request the system log.
    GetSyslog,
    /// Request the encoder log.
    GetLog,
}

impl SystemCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Reboot => "reboot",
            Self::Poweroff => "poweroff",
            Self::StartSsh => "start_ssh",
            Self::StopSsh => "stop_ssh",
            Self::ResetSshPass => "reset_ssh_pass",
            Self::GetSyslog => "get_syslog",
            Self::GetLog => "get_log",
        }
    }
}

impl fmt::Display for SystemCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device identifier, always sent as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u32> for DeviceId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiAction {
    Scan { device: DeviceId },
    /// Connect to a saved network by connection UUID.
    Connect { uuid: String },
    Disconnect { uuid: String },
    Forget { uuid: String },
    /// Join a network that has not been saved yet.
    New { device: DeviceId, ssid: String, password: String },
    HotspotStart { device: DeviceId },
    HotspotStop { device: DeviceId },
    HotspotConfig { device: DeviceId, name: String, password: String, channel: String },
}

/// Modem APN/network settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModemSettings {
    pub device: DeviceId,
    pub network_type: String,
    pub roaming: Option<bool>,
    pub network: Option<String>,
    pub autoconfig: Option<bool>,
    pub apn: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemAction {
    /// Scan for carriers. The device id stays numeric here.
    Scan { device: u32 },
    Config(ModemSettings),
}

/// One outbound envelope ready for the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    key: &'static str,
    payload: Value,
}

impl Intent {
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn encode(&self) -> String {
        codec::encode(self.key, self.payload.clone())
    }

    pub fn command(command: SystemCommand) -> Self {
        Self { key: "command", payload: json!(command.as_str()) }
    }

    /// Partial configuration update.
    pub fn update_config(config: Map<String, Value>) -> Self {
        Self { key: "config", payload: Value::Object(config) }
    }

    pub fn save_remote_key(key: &str) -> Self {
        Self { key: "config", payload: json!({ "remote_key": key }) }
    }

    pub fn save_password(password: &str) -> Self {
        Self { key: "config", payload: json!({ "password": password }) }
    }

    /// Live bitrate change while streaming; `max_br` is sent as a string.
    pub fn set_bitrate(max_br: u32) -> Self {
        Self { key: "bitrate", payload: json!({ "max_br": max_br.to_string() }) }
    }

    /// Bitrate change with `max_br` sent as a number.
    pub fn update_bitrate(max_br: u32) -> Self {
        Self { key: "bitrate", payload: json!({ "max_br": max_br }) }
    }

    pub fn start_streaming(config: Map<String, Value>) -> Self {
        Self { key: "start", payload: Value::Object(config) }
    }

    pub fn stop_streaming() -> Self {
        Self { key: "stop", payload: json!("0") }
    }

    /// Enable or disable an interface. `ip` is omitted when `None`.
    pub fn set_netif(name: &str, ip: Option<&str>, enabled: bool) -> Self {
        let mut payload = Map::new();
        payload.insert("name".to_owned(), json!(name));
        if let Some(ip) = ip {
            payload.insert("ip".to_owned(), json!(ip));
        }
        payload.insert("enabled".to_owned(), json!(enabled));
        Self { key: "netif", payload: Value::Object(payload) }
    }

    pub fn wifi(action: WifiAction) -> Self {
        let payload = match action {
            WifiAction::Scan { device } => json!({ "scan": device.as_str() }),
            WifiAction::Connect { uuid } => json!({ "connect": uuid }),
            WifiAction::Disconnect { uuid } => json!({ "disconnect": uuid }),
            WifiAction::Forget { uuid } => json!({ "forget": uuid }),
            WifiAction::New { device, ssid, password } => json!({
                "new": { "device": device.as_str(), "ssid": ssid, "password": password }
            }),
            WifiAction::HotspotStart { device } => {
                json!({ "hotspot": { "start": { "device": device.as_str() } } })
            }
            WifiAction::HotspotStop { device } => {
                json!({ "hotspot": { "stop": { "device": device.as_str() } } })
            }
            WifiAction::HotspotConfig { device, name, password, channel } => json!({
                "hotspot": { "config": {
                    "device": device.as_str(),
                    "name": name,
                    "password": password,
                    "channel": channel
                } }
            }),
        };
        Self { key: "wifi", payload }
    }

    pub fn modems(action: ModemAction) -> Self {
        let payload = match action {
            ModemAction::Scan { device } => json!({ "scan": { "device": device } }),
            ModemAction::Config(settings) => json!({
                "config": {
                    "network_type": settings.network_type,
                    "roaming": settings.roaming.unwrap_or(false),
                    "network": settings.network.unwrap_or_default(),
                    "autoconfig": settings.autoconfig.unwrap_or(false),
                    "apn": settings.apn,
                    "username": settings.username,
                    "password": settings.password,
                    "device": settings.device.as_str()
                }
            }),
        };
        Self { key: "modems", payload }
    }
}

#[cfg(test)]
#[path = "intents_tests.rs"]
mod tests;
