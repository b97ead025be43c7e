// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::{decode, encode, Discriminant, Envelope};

#[test]
fn encode_wraps_payload_under_key() {
    assert_eq!(encode("keepalive", json!(null)), r#"{"keepalive":null}"#);
    assert_eq!(encode("stop", json!("0")), r#"{"stop":"0"}"#);
    assert_eq!(encode("bitrate", json!({"max_br": 5000})), r#"{"bitrate":{"max_br":5000}}"#);
}

#[test]
fn decode_single_key_object() -> anyhow::Result<()> {
    let env = decode(r#"{"sensors":{"SoC temperature":"45.2 °C"}}"#)?;
    let env = env.ok_or_else(|| anyhow::anyhow!("expected envelope"))?;
    assert_eq!(env.key, "sensors");
    assert_eq!(env.discriminant(), Some(Discriminant::Sensors));
    assert_eq!(env.payload["SoC temperature"], "45.2 °C");
    Ok(())
}

#[test]
fn decode_unknown_key_is_still_an_envelope() -> anyhow::Result<()> {
    let env = decode(r#"{"foo":1}"#)?.ok_or_else(|| anyhow::anyhow!("expected envelope"))?;
    assert_eq!(env.key, "foo");
    assert_eq!(env.discriminant(), None);
    Ok(())
}

#[yare::parameterized(
    empty_object = { "{}" },
    two_keys     = { r#"{"status":{},"config":{}}"# },
    array        = { "[1,2,3]" },
    string       = { r#""status""# },
    null         = { "null" },
)]
fn decode_non_envelopes_are_inert(raw: &str) {
    assert!(matches!(decode(raw), Ok(None)), "raw: {raw}");
}

#[yare::parameterized(
    truncated = { r#"{"status":"# },
    garbage   = { "not json" },
    empty     = { "" },
)]
fn decode_rejects_malformed_json(raw: &str) {
    let err = decode(raw).err();
    assert!(err.is_some(), "raw: {raw}");
    assert!(err.map(|e| e.to_string()).unwrap_or_default().contains("invalid JSON frame"));
}

#[test]
fn discriminant_keys_are_bijective() {
    for d in Discriminant::ALL {
        assert_eq!(Discriminant::from_key(d.as_str()), Some(d));
    }
    assert_eq!(Discriminant::from_key("keepalive"), None);
}

#[test]
fn envelope_encode_matches_free_function() {
    let env = Envelope::new("netif", json!({"name": "eth0", "enabled": true}));
    assert_eq!(env.encode(), encode("netif", json!({"name": "eth0", "enabled": true})));
}
