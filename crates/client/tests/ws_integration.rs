// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests against an in-process fake device speaking the socket
//! protocol over a real WebSocket.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use cerabox::auth::Credentials;
use cerabox::client::{Client, ClientOptions};
use cerabox::connection::ConnectionState;
use cerabox::dispatch::DispatchOutcome;
use cerabox::intents::{Intent, SystemCommand};
use cerabox::notify::NoticeLevel;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// The device side of one accepted connection.
struct FakeDevice {
    addr: SocketAddr,
    /// Frames received from the client, parsed.
    frames: mpsc::UnboundedReceiver<Value>,
    /// Frames to push to the client.
    push: mpsc::UnboundedSender<WsMessage>,
    /// Fires when the client closes the socket.
    closed: mpsc::UnboundedReceiver<()>,
}

impl FakeDevice {
    async fn spawn() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (frames_tx, frames) = mpsc::unbounded_channel();
        let (push, mut push_rx) = mpsc::unbounded_channel::<WsMessage>();
        let (closed_tx, closed) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let Ok((stream, _)) = listener.accept().await else { return };
            let Ok(ws) = tokio_tungstenite::accept_async(stream).await else { return };
            let (mut tx, mut rx) = ws.split();
            loop {
                tokio::select! {
                    msg = rx.next() => match msg {
                        // Text after a close handshake still lands in `frames`.
                        Some(Ok(WsMessage::Text(text))) => {
                            if let Ok(value) = serde_json::from_str::<Value>(&text) {
                                let _ = frames_tx.send(value);
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) => {
                            let _ = closed_tx.send(());
                        }
                        None | Some(Err(_)) => {
                            let _ = closed_tx.send(());
                            return;
                        }
                        Some(Ok(_)) => {}
                    },
                    Some(frame) = push_rx.recv() => {
                        let _ = tx.send(frame).await;
                    }
                }
            }
        });

        Ok(Self { addr, frames, push, closed })
    }

    fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    fn send(&self, value: Value) -> anyhow::Result<()> {
        self.push_raw(value.to_string())
    }

    fn push_raw(&self, text: impl Into<String>) -> anyhow::Result<()> {
        self.push
            .send(WsMessage::Text(text.into().into()))
            .map_err(|_| anyhow::anyhow!("fake device gone"))
    }

    /// Start a close handshake from the device side.
    fn close(&self) -> anyhow::Result<()> {
        self.push.send(WsMessage::Close(None)).map_err(|_| anyhow::anyhow!("fake device gone"))
    }

    async fn recv(&mut self) -> anyhow::Result<Value> {
        tokio::time::timeout(RECV_TIMEOUT, self.frames.recv())
            .await
            .map_err(|_| anyhow::anyhow!("device recv timeout"))?
            .ok_or_else(|| anyhow::anyhow!("device connection ended"))
    }

    /// Discard everything received so far.
    fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.frames.try_recv().is_ok() {
            count += 1;
        }
        count
    }
}

async fn wait_state(client: &Client, want: ConnectionState) -> anyhow::Result<()> {
    let mut rx = client.subscribe_state();
    tokio::time::timeout(RECV_TIMEOUT, rx.wait_for(|s| *s == want))
        .await
        .map_err(|_| anyhow::anyhow!("timed out waiting for {want}"))??;
    Ok(())
}

#[tokio::test]
async fn credentials_are_the_first_frame() -> anyhow::Result<()> {
    let mut device = FakeDevice::spawn().await?;
    let mut options = ClientOptions::new(device.url());
    options.credentials =
        Some(Credentials { password: "hunter22".to_owned(), persistent_token: true });
    let client = Client::connect(options);

    let first = device.recv().await?;
    assert_eq!(first, json!({"auth": {"password": "hunter22", "persistent_token": true}}));
    assert_eq!(client.authenticated().await, Some(DispatchOutcome::Sent));

    device.send(json!({"auth": {"success": true, "auth_token": "tok"}}))?;
    let mut auth = client.slots().auth.subscribe();
    tokio::time::timeout(RECV_TIMEOUT, auth.wait_for(|a| a.is_some())).await??;
    let auth = client.slots().auth.get();
    assert_eq!(auth.and_then(|a| a.auth_token).as_deref(), Some("tok"));
    Ok(())
}

#[tokio::test]
async fn credentials_precede_commands_issued_right_after_connect() -> anyhow::Result<()> {
    let mut device = FakeDevice::spawn().await?;
    let mut options = ClientOptions::new(device.url());
    options.credentials =
        Some(Credentials { password: "hunter22".to_owned(), persistent_token: false });
    let client = Client::connect(options);
    let command = client.dispatch(Intent::command(SystemCommand::Reboot));

    assert_eq!(command.outcome().await, DispatchOutcome::Sent);
    assert_eq!(device.recv().await?, json!({"auth": {"password": "hunter22", "persistent_token": false}}));
    assert_eq!(device.recv().await?, json!({"command": "reboot"}));
    Ok(())
}

#[tokio::test]
async fn device_frames_update_slots() -> anyhow::Result<()> {
    let device = FakeDevice::spawn().await?;
    let client = Client::connect(ClientOptions::new(device.url()));
    wait_state(&client, ConnectionState::Open).await?;

    let mut status = client.slots().status.subscribe();
    device.send(json!({"status": {"is_streaming": false, "asrcs": ["HDMI"]}}))?;
    device.send(json!({"netif": {"eth0": {"ip": "10.0.0.2", "tp": 1024, "enabled": true}}}))?;
    device.send(json!({"status": {"is_streaming": true}}))?;

    tokio::time::timeout(
        RECV_TIMEOUT,
        status.wait_for(|s| {
            s.as_ref().and_then(|s| s.get("is_streaming")) == Some(&json!(true))
        }),
    )
    .await??;

    let status = client.slots().status.get().unwrap_or_default();
    assert_eq!(status.asrcs(), vec!["HDMI".to_owned()]);

    let netif = client.slots().netif.get().unwrap_or_default();
    assert_eq!(netif.get("eth0").map(|n| n.tp), Some(1024));
    assert!(!client.slots().wifi.is_set());
    Ok(())
}

#[tokio::test]
async fn junk_frames_leave_slots_alone() -> anyhow::Result<()> {
    let device = FakeDevice::spawn().await?;
    let client = Client::connect(ClientOptions::new(device.url()));
    wait_state(&client, ConnectionState::Open).await?;

    let mut sensors = client.slots().sensors.subscribe();
    device.push_raw("not json")?;
    device.send(json!({"a": 1, "b": 2}))?;
    device.send(json!({"mystery": {}}))?;
    device.send(json!({"sensors": {"SoC temperature": "41.2 °C"}}))?;

    tokio::time::timeout(RECV_TIMEOUT, sensors.wait_for(|s| s.is_some())).await??;
    assert_eq!(client.state(), ConnectionState::Open);
    assert!(!client.slots().config.is_set());
    assert!(!client.slots().status.is_set());
    Ok(())
}

#[tokio::test]
async fn keepalive_is_sent_while_open() -> anyhow::Result<()> {
    let mut device = FakeDevice::spawn().await?;
    let mut options = ClientOptions::new(device.url());
    options.keepalive = Duration::from_millis(50);
    let _client = Client::connect(options);

    assert_eq!(device.recv().await?, json!({"keepalive": null}));
    assert_eq!(device.recv().await?, json!({"keepalive": null}));
    Ok(())
}

#[tokio::test]
async fn keepalive_stops_once_device_closes() -> anyhow::Result<()> {
    let mut device = FakeDevice::spawn().await?;
    let mut options = ClientOptions::new(device.url());
    options.keepalive = Duration::from_millis(50);
    let client = Client::connect(options);
    let mut notices = client.notices();

    assert_eq!(device.recv().await?, json!({"keepalive": null}));
    device.close()?;
    wait_state(&client, ConnectionState::Closed).await?;
    // Frames written before the close landed may still be in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    device.drain();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(client.state(), ConnectionState::Closed);
    assert_eq!(device.drain(), 0);
    while let Ok(notice) = notices.try_recv() {
        assert_ne!(notice.level, NoticeLevel::Error, "unexpected notice: {notice:?}");
    }
    Ok(())
}

#[tokio::test]
async fn keepalive_stops_after_client_shutdown() -> anyhow::Result<()> {
    let mut device = FakeDevice::spawn().await?;
    let mut options = ClientOptions::new(device.url());
    options.keepalive = Duration::from_millis(50);
    let client = Client::connect(options);

    assert_eq!(device.recv().await?, json!({"keepalive": null}));
    client.shutdown();
    wait_state(&client, ConnectionState::Closed).await?;
    tokio::time::timeout(RECV_TIMEOUT, device.closed.recv()).await?;
    device.drain();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(device.drain(), 0);
    Ok(())
}

#[tokio::test]
async fn sends_before_open_arrive_in_order() -> anyhow::Result<()> {
    let mut device = FakeDevice::spawn().await?;
    let client = Client::connect(ClientOptions::new(device.url()));
    assert_eq!(client.state(), ConnectionState::Connecting);

    let first = client.dispatch(Intent::set_bitrate(5000));
    let second = client.dispatch(Intent::command(SystemCommand::GetLog));
    let third = client.dispatch(Intent::stop_streaming());

    assert_eq!(first.outcome().await, DispatchOutcome::Sent);
    assert_eq!(second.outcome().await, DispatchOutcome::Sent);
    assert_eq!(third.outcome().await, DispatchOutcome::Sent);

    assert_eq!(device.recv().await?, json!({"bitrate": {"max_br": "5000"}}));
    assert_eq!(device.recv().await?, json!({"command": "get_log"}));
    assert_eq!(device.recv().await?, json!({"stop": "0"}));
    Ok(())
}

#[tokio::test]
async fn unreachable_device_reports_error() -> anyhow::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = Client::connect(ClientOptions::new(format!("ws://{addr}")));
    let mut notices = client.notices();

    wait_state(&client, ConnectionState::Error).await?;
    let notice = tokio::time::timeout(RECV_TIMEOUT, notices.recv()).await??;
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.title, "Connection");
    assert!(!client.is_ready());
    Ok(())
}

#[tokio::test]
async fn shutdown_flushes_and_closes() -> anyhow::Result<()> {
    let mut device = FakeDevice::spawn().await?;
    let client = Client::connect(ClientOptions::new(device.url()));
    wait_state(&client, ConnectionState::Open).await?;

    let ticket = client.dispatch(Intent::command(SystemCommand::Reboot));
    assert_eq!(ticket.outcome().await, DispatchOutcome::Sent);
    client.shutdown();

    assert_eq!(device.recv().await?, json!({"command": "reboot"}));
    tokio::time::timeout(RECV_TIMEOUT, device.closed.recv()).await?;
    wait_state(&client, ConnectionState::Closed).await?;
    Ok(())
}
