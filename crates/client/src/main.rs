// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tracing::{error, info, warn};

use cerabox::client::{Client, ClientOptions};
use cerabox::config::{Command, Config};
use cerabox::connection::ConnectionState;
use cerabox::dispatch::DispatchOutcome;
use cerabox::intents::{Intent, SystemCommand};

/// How long to wait for the socket to close after a one-shot send.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);

    match run(config).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("fatal: {e:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        }
    }
}

async fn run(config: Config) -> anyhow::Result<i32> {
    let client = Client::connect(ClientOptions::from(&config));

    let code = match config.command.clone().unwrap_or(Command::Watch) {
        Command::Watch => watch(&client).await?,
        Command::Send { command } => send(&client, command).await,
    };

    client.shutdown();
    wait_terminal(&client, CLOSE_GRACE).await;
    Ok(code)
}

/// Print slot updates, notices and state transitions as JSON lines until
/// Ctrl-C or the connection ends.
async fn watch(client: &Client) -> anyhow::Result<i32> {
    let slots = client.slots();
    let mut updates = slots.updates();
    let mut notices = client.notices();
    let mut state_rx = client.subscribe_state();
    if *state_rx.borrow_and_update() == ConnectionState::Error {
        return Ok(1);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(0);
            }
            Some(discriminant) = updates.next() => {
                let line = json!({"slot": discriminant.as_str(), "value": slots.to_json(discriminant)});
                println!("{line}");
            }
            notice = notices.recv() => match notice {
                Ok(notice) => println!("{}", json!({"notice": notice})),
                Err(broadcast::error::RecvError::Lagged(n)) => warn!(skipped = n, "notice stream lagged"),
                Err(broadcast::error::RecvError::Closed) => return Ok(0),
            },
            changed = state_rx.changed() => {
                changed?;
                let state = *state_rx.borrow_and_update();
                println!("{}", json!({"state": state}));
                match state {
                    ConnectionState::Closed => return Ok(0),
                    ConnectionState::Error => return Ok(1),
                    ConnectionState::Connecting | ConnectionState::Open => {}
                }
            }
        }
    }
}

/// Send one system command, after authentication when credentials are set.
async fn send(client: &Client, command: SystemCommand) -> i32 {
    if let Some(outcome) = client.authenticated().await {
        if outcome != DispatchOutcome::Sent {
            error!(?outcome, "credentials were not delivered");
            return 1;
        }
    }

    match client.dispatch(Intent::command(command)).outcome().await {
        DispatchOutcome::Sent => {
            info!(%command, "command sent");
            0
        }
        outcome => {
            error!(%command, ?outcome, "command not sent");
            1
        }
    }
}

async fn wait_terminal(client: &Client, grace: Duration) {
    let mut state_rx = client.subscribe_state();
    let _ = tokio::time::timeout(grace, state_rx.wait_for(|s| s.is_terminal())).await;
}
