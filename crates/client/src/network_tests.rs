// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::*;
use crate::messages::{Hotspot, NetifEntry, NetifMessage, StatusMessage, WifiDevice, WifiNetwork};

#[yare::parameterized(
    wlan     = { "wlan0", "WiFi 1" },
    wl       = { "wlp2s1", "WiFi 2" },
    eth      = { "eth1", "Ethernet 2" },
    enp      = { "enp3s0", "Ethernet 1" },
    wwan     = { "wwan0", "Modem 1" },
    usb      = { "usb2", "USB 3" },
    unknown  = { "tun0", "tun 1" },
    no_index = { "eth", "Ethernet" },
    other    = { "bond", "bond" },
)]
fn renames_interfaces(name: &str, expected: &str) {
    assert_eq!(network_rename(name), expected);
}

#[test]
fn rename_appends_error() {
    assert_eq!(network_rename_with_error("usb0", Some("duplicate IP")), "USB 1 (duplicate IP)");
    assert_eq!(network_rename_with_error("usb0", None), "USB 1");
}

#[yare::parameterized(
    zero    = { 0, 0 },
    small   = { 100, 1 },
    one_kb  = { 128, 1 },
    typical = { 250_000, 1953 },
)]
fn converts_bytes_to_kbits(bytes: u64, kbits: u64) {
    assert_eq!(bytes_to_kbits(bytes), kbits);
}

fn netif() -> NetifMessage {
    NetifMessage::from([
        ("eth0".to_owned(), NetifEntry { ip: Some("10.0.0.2".to_owned()), tp: 1024, enabled: true, error: None }),
        ("wlan0".to_owned(), NetifEntry { ip: None, tp: 2048, enabled: false, error: None }),
        ("usb0".to_owned(), NetifEntry { ip: None, tp: 512, enabled: true, error: Some("no link".to_owned()) }),
    ])
}

#[test]
fn interface_filters_and_bandwidth() {
    let netif = netif();
    let available: Vec<&str> = available_networks(&netif).into_iter().map(|(k, _)| k).collect();
    assert_eq!(available, vec!["eth0", "wlan0"]);

    let used: Vec<&str> = used_networks(&netif).into_iter().map(|(k, _)| k).collect();
    assert_eq!(used, vec!["eth0"]);

    assert_eq!(total_bandwidth(&netif), 8 + 16 + 4);
    assert_eq!(total_bandwidth(&NetifMessage::new()), 0);
}

#[yare::parameterized(
    two_four = { 2412, "2.4 GHz" },
    five     = { 5180, "5 GHz" },
    six      = { 6115, "6 GHz" },
    edge     = { 5000, "2.4 GHz" },
)]
fn wifi_bands(freq: u32, band: &str) {
    assert_eq!(wifi_band(freq), band);
}

#[test]
fn wifi_device_status_and_connection() {
    let network = WifiNetwork { active: true, ssid: "home".to_owned(), signal: 70, security: "WPA2".to_owned(), freq: 2412 };
    let mut device = WifiDevice {
        ifname: "wlan0".to_owned(),
        conn: None,
        available: vec![network.clone()],
        saved: [("home".to_owned(), "uuid-home".to_owned())].into(),
        ..Default::default()
    };
    assert_eq!(device.status(), WifiStatus::Disconnected);
    assert_eq!(device.active_connection(), None);
    assert_eq!(device.saved_uuid(&network), Some("uuid-home"));

    device.conn = Some(String::new());
    assert_eq!(device.status(), WifiStatus::Disconnected);
    assert_eq!(device.active_connection(), None);

    device.conn = Some("uuid-home".to_owned());
    assert_eq!(device.status(), WifiStatus::Connected);
    assert_eq!(device.active_connection().map(|n| n.ssid.as_str()), Some("home"));

    device.hotspot = Some(Hotspot::default());
    assert_eq!(device.status(), WifiStatus::Hotspot);
}

#[test]
fn modem_network_name_by_ifname() -> anyhow::Result<()> {
    let status: StatusMessage = serde_json::from_value(json!({
        "modems": {"1": {"ifname": "wwan0", "status": {"network": "Orange", "network_type": "4G"}}}
    }))?;
    assert_eq!(modem_network_name(&status, "wwan0").as_deref(), Some("Orange (4G)"));
    assert_eq!(modem_network_name(&status, "wwan1"), None);
    Ok(())
}

#[yare::parameterized(
    single = { "4g", "4G" },
    pair   = { "4g3g", "4G / 3G" },
    triple = { "5g4g3g", "5G / 4G / 3G" },
    other  = { "auto", "auto" },
)]
fn renames_modem_network_types(raw: &str, expected: &str) {
    assert_eq!(rename_supported_modem_network(raw), expected);
}
