//! Authentication module for obtaining bearer tokens.
//!
//! This module provides:
//! - `Credential`: an opaque bearer token held in memory
//! - `CredentialHelper` / `DatabricksCli`: the external CLI that mints tokens
//! - `TokenProbe` / `ScimProbe`: live validation against the workspace
//! - `CredentialProvider`: the cached fetch-validate-login flow
//!
//! Tokens are never written to disk; a provider lives for one invocation.

pub mod credential;
pub mod helper;
pub mod probe;
pub mod provider;

pub use credential::Credential;
pub use helper::{parse_token_output, CredentialHelper, DatabricksCli, HelperOutput};
pub use probe::{ScimProbe, TokenProbe};
pub use provider::CredentialProvider;
