//! Core library for dbapp.
//!
//! Provides credential handling through the `databricks` CLI, an
//! authenticated client for deployed Databricks Apps and their workspace,
//! log tailing over batch polling, Server-Sent Events or WebSocket, and the
//! typed workspace models used by the command line and Web API.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod logs;
pub mod models;

pub use config::Config;
pub use context::AppContext;
pub use error::Error;
