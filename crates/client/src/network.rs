// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Presentation helpers over the `netif` and `status` slots.

use crate::messages::{NetifEntry, NetifMessage, StatusMessage, WifiDevice, WifiNetwork};

/// Throughput in bytes/s → kbit/s, rounded to the nearest integer.
pub fn bytes_to_kbits(bytes: u64) -> u64 {
    (bytes as f64 * 8.0 / 1024.0).round() as u64
}

/// Human name for an interface, e.g. `wlan0` → `WiFi 1`, `enp3s0` → `Ethernet 1`.
///
/// A trailing index is shown 1-based. Unrecognized prefixes keep their name.
pub fn network_rename(name: &str) -> String {
    let digits = name.len() - name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (base, suffix) = if digits > 0 {
        let (base, number) = name.split_at(name.len() - digits);
        let index = number.parse::<u64>().unwrap_or(u64::MAX).saturating_add(1);
        (base.trim(), format!(" {index}"))
    } else {
        (name, String::new())
    };

    let label = if base.starts_with("wl") {
        "WiFi"
    } else if base.starts_with("eth") || base.starts_with("en") {
        "Ethernet"
    } else if base.starts_with("ww") {
        "Modem"
    } else if base.starts_with("usb") {
        "USB"
    } else {
        base
    };
    format!("{label}{suffix}")
}

/// [`network_rename`] with the interface error appended in parentheses.
pub fn network_rename_with_error(name: &str, error: Option<&str>) -> String {
    let renamed = network_rename(name);
    match error {
        Some(error) if !error.is_empty() => format!("{renamed} ({error})"),
        _ => renamed,
    }
}

/// Interfaces without an error.
pub fn available_networks(netif: &NetifMessage) -> Vec<(&str, &NetifEntry)> {
    netif.iter().filter(|(_, n)| n.error.is_none()).map(|(k, v)| (k.as_str(), v)).collect()
}

/// Interfaces without an error that are enabled for bonding.
pub fn used_networks(netif: &NetifMessage) -> Vec<(&str, &NetifEntry)> {
    available_networks(netif).into_iter().filter(|(_, n)| n.enabled).collect()
}

/// Sum of every interface's throughput in kbit/s.
pub fn total_bandwidth(netif: &NetifMessage) -> u64 {
    netif.values().map(|n| bytes_to_kbits(n.tp)).sum()
}

/// Band label for a WiFi frequency in MHz.
pub fn wifi_band(freq: u32) -> &'static str {
    if freq > 6000 {
        "6 GHz"
    } else if freq > 5000 {
        "5 GHz"
    } else {
        "2.4 GHz"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Hotspot,
    Connected,
    Disconnected,
}

impl WifiDevice {
    pub fn status(&self) -> WifiStatus {
        if self.hotspot.is_some() {
            WifiStatus::Hotspot
        } else if self.conn.as_deref().is_some_and(|c| !c.is_empty()) {
            WifiStatus::Connected
        } else {
            WifiStatus::Disconnected
        }
    }

    /// The network currently in use, if connected.
    pub fn active_connection(&self) -> Option<&WifiNetwork> {
        self.conn.as_deref().filter(|c| !c.is_empty())?;
        self.available.iter().find(|n| n.active)
    }

    /// Saved connection UUID for a scanned network.
    pub fn saved_uuid(&self, network: &WifiNetwork) -> Option<&str> {
        self.saved.get(&network.ssid).map(String::as_str)
    }
}

/// `"<carrier> (<network type>)"` for the modem bound to `ifname`.
pub fn modem_network_name(status: &StatusMessage, ifname: &str) -> Option<String> {
    let modems = status.modems();
    let modem = modems.values().find(|m| m.ifname == ifname)?;
    Some(format!(
        "{} ({})",
        modem.status.network.as_deref().unwrap_or_default(),
        modem.status.network_type
    ))
}

/// `4g3g` → `4G / 3G`.
pub fn rename_supported_modem_network(item: &str) -> String {
    let mut out = String::with_capacity(item.len() + 8);
    let mut prev: Option<char> = None;
    for c in item.chars() {
        let c = if c == 'g' && prev.is_some_and(|p| p.is_ascii_digit()) { 'G' } else { c };
        if prev == Some('G') && c.is_ascii_digit() {
            out.push_str(" / ");
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

#[cfg(test)]
#[path = "network_tests.rs"]
mod tests;
