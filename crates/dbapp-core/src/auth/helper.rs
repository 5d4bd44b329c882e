//! The external credential helper (the `databricks` CLI).

use std::io;
use std::process::Stdio;

use anyhow::Result;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::AuthTarget;
use crate::error::Error;
use crate::models::AppInfo;

use super::Credential;

/// Captured result of one helper invocation.
#[derive(Debug, Clone, Default)]
pub struct HelperOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl HelperOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Mints tokens and runs the interactive login.
///
/// A non-zero exit is reported through `HelperOutput::success`; `Err` is
/// reserved for failing to run the helper at all.
#[async_trait]
pub trait CredentialHelper: Send + Sync {
    async fn token(&self) -> Result<HelperOutput>;

    async fn login(&self) -> Result<HelperOutput>;
}

/// Extract a token from helper output: the `access_token` field when the
/// output is JSON, otherwise the trimmed text. Empty output yields `None`.
pub fn parse_token_output(stdout: &str) -> Option<Credential> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return None;
    }
    let token = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => match value.get("access_token").and_then(|t| t.as_str()) {
            Some(token) => token.to_string(),
            None => trimmed.to_string(),
        },
        Err(_) => trimmed.to_string(),
    };
    if token.is_empty() {
        None
    } else {
        Some(Credential::new(token))
    }
}

/// The `databricks` CLI, invoked as a subprocess.
#[derive(Debug, Clone)]
pub struct DatabricksCli {
    program: String,
    target: AuthTarget,
}

impl DatabricksCli {
    pub fn new(program: impl Into<String>, target: AuthTarget) -> Self {
        Self {
            program: program.into(),
            target,
        }
    }

    async fn run(&self, args: &[&str], interactive: bool) -> Result<HelperOutput> {
        debug!(program = %self.program, ?args, "Running credential helper");
        let mut cmd = Command::new(&self.program);
        cmd.args(args).stderr(Stdio::piped());
        if interactive {
            cmd.stdin(Stdio::inherit()).stdout(Stdio::inherit());
        } else {
            cmd.stdin(Stdio::null()).stdout(Stdio::piped());
        }

        let output = cmd.output().await.map_err(|e| self.spawn_error(e))?;
        Ok(HelperOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn spawn_error(&self, e: io::Error) -> anyhow::Error {
        if e.kind() == io::ErrorKind::NotFound {
            Error::Auth(format!(
                "{} CLI not found. Please install the Databricks CLI.",
                self.program
            ))
            .into()
        } else {
            Error::Auth(format!("Failed to run {}: {}", self.program, e)).into()
        }
    }

    /// Look up a deployed app with `databricks apps get`.
    pub async fn get_app(&self, app_name: &str) -> Result<AppInfo> {
        let mut args = vec!["apps", "get", app_name, "--output", "json"];
        // Host-based auth is picked up from the environment by the CLI itself
        if let AuthTarget::Profile(ref profile) = self.target {
            args.extend(["--profile", profile.as_str()]);
        }

        let output = self.run(&args, false).await?;
        if !output.success {
            return Err(Error::Auth(format!(
                "Failed to get app URL for {}: {}",
                app_name,
                output.stderr.trim()
            ))
            .into());
        }
        serde_json::from_str(&output.stdout).map_err(|e| {
            Error::Config(format!("Failed to parse app data for {}: {}", app_name, e)).into()
        })
    }

    /// Resolve the base URL of a deployed app.
    pub async fn app_url(&self, app_name: &str) -> Result<String> {
        let app = self.get_app(app_name).await?;
        match app.url.filter(|u| !u.is_empty()) {
            Some(url) => Ok(url.trim_end_matches('/').to_string()),
            None => Err(Error::Config(format!("Could not get URL for app {}", app_name)).into()),
        }
    }
}

#[async_trait]
impl CredentialHelper for DatabricksCli {
    async fn token(&self) -> Result<HelperOutput> {
        let [flag, value] = self.target.cli_args();
        self.run(&["auth", "token", flag, value], false).await
    }

    async fn login(&self) -> Result<HelperOutput> {
        let [flag, value] = self.target.cli_args();
        self.run(&["auth", "login", flag, value], true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_json() {
        let out = r#"{"access_token": "eyJhbGci", "token_type": "Bearer", "expiry": "2026-01-01T00:00:00Z"}"#;
        assert_eq!(parse_token_output(out).unwrap().secret(), "eyJhbGci");
    }

    #[test]
    fn test_parse_token_raw() {
        assert_eq!(parse_token_output("  dapi123\n").unwrap().secret(), "dapi123");
    }

    #[test]
    fn test_parse_token_json_without_field_uses_raw_text() {
        assert_eq!(parse_token_output(r#"{"x":1}"#).unwrap().secret(), r#"{"x":1}"#);
    }

    #[test]
    fn test_parse_token_empty() {
        assert!(parse_token_output(" \n").is_none());
        assert!(parse_token_output(r#"{"access_token": ""}"#).is_none());
    }

    #[tokio::test]
    async fn test_missing_executable_is_auth_error() {
        let cli = DatabricksCli::new(
            "dbapp-definitely-not-installed",
            AuthTarget::Profile("dev".into()),
        );
        let err = cli.token().await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Auth(msg)) if msg.contains("not found")));
    }
}
