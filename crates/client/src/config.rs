// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::auth::Credentials;
use crate::dispatch::SendOptions;
use crate::intents::SystemCommand;

/// Client for a streaming appliance's control socket.
#[derive(Debug, Clone, Parser)]
#[command(name = "cerabox", version, about)]
pub struct Config {
    /// Socket endpoint including scheme (e.g. `ws://192.168.1.20`).
    #[arg(long, env = "CERABOX_SOCKET_ENDPOINT", default_value = "ws://127.0.0.1")]
    pub endpoint: String,

    /// Socket port.
    #[arg(long, env = "CERABOX_SOCKET_PORT", default_value = "80")]
    pub port: String,

    /// Device password. When unset no authentication is attempted.
    #[arg(long, env = "CERABOX_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Ask the device to remember this session.
    #[arg(long, env = "CERABOX_PERSISTENT_TOKEN")]
    pub persistent_token: bool,

    /// Keepalive interval in milliseconds.
    #[arg(long, env = "CERABOX_KEEPALIVE_MS", default_value_t = 10000)]
    pub keepalive_ms: u64,

    /// How long an outbound send waits for the socket to open, in milliseconds.
    #[arg(long, env = "CERABOX_SEND_TIMEOUT_MS", default_value_t = 10000)]
    pub send_timeout_ms: u64,

    /// Readiness re-check cadence for pending sends, in milliseconds.
    #[arg(long, env = "CERABOX_SEND_POLL_MS", default_value_t = 50)]
    pub send_poll_ms: u64,

    /// Log filter (tracing `EnvFilter` syntax).
    #[arg(long, env = "CERABOX_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format: `text` or `json`.
    #[arg(long, env = "CERABOX_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print every state update and notice as a JSON line until interrupted.
    Watch,
    /// Send one system command and exit.
    Send {
        #[arg(value_enum)]
        command: SystemCommand,
    },
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.endpoint.starts_with("ws://") && !self.endpoint.starts_with("wss://") {
            anyhow::bail!("--endpoint must start with ws:// or wss://, got {}", self.endpoint);
        }
        if self.port.is_empty() || self.port.parse::<u16>().is_err() {
            anyhow::bail!("--port must be a valid port number, got {:?}", self.port);
        }
        if self.keepalive_ms == 0 {
            anyhow::bail!("--keepalive-ms must be greater than zero");
        }
        if self.send_poll_ms == 0 {
            anyhow::bail!("--send-poll-ms must be greater than zero");
        }
        if self.send_poll_ms > self.send_timeout_ms {
            anyhow::bail!("--send-poll-ms cannot exceed --send-timeout-ms");
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            anyhow::bail!("--log-format must be text or json, got {}", self.log_format);
        }
        Ok(())
    }

    /// Full socket URL, `<endpoint>:<port>`.
    pub fn url(&self) -> String {
        format!("{}:{}", self.endpoint.trim_end_matches('/'), self.port)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_ms)
    }

    pub fn send_options(&self) -> SendOptions {
        SendOptions {
            max_wait: Duration::from_millis(self.send_timeout_ms),
            poll_interval: Duration::from_millis(self.send_poll_ms),
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.password.as_ref().map(|password| Credentials {
            password: password.clone(),
            persistent_token: self.persistent_token,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
