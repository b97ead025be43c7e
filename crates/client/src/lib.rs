// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod auth;
pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod intents;
pub mod merge;
pub mod messages;
pub mod network;
pub mod notify;
pub mod pipeline;
pub mod router;
pub mod slots;
pub mod test_support;
