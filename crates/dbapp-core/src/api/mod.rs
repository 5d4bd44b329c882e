//! REST API client module for Databricks Apps and workspaces.
//!
//! This module provides the `ApiClient` for authenticated requests against a
//! single base URL, and `WorkspaceApi` for typed workspace calls (users,
//! warehouses, clusters, statements, serving endpoints, apps).
//!
//! Both use bearer tokens obtained through the `databricks` CLI.

pub mod client;
pub mod workspace;

pub use client::{ApiClient, ResponseBody, SharedCredentials};
pub use workspace::WorkspaceApi;
