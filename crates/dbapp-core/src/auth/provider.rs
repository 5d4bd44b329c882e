use anyhow::Result;
use tracing::{debug, info, warn};

use crate::error::Error;

use super::{parse_token_output, Credential, CredentialHelper, TokenProbe};

enum Source {
    /// A personal access token supplied up front; never probed.
    Static(Credential),
    Helper {
        helper: Box<dyn CredentialHelper>,
        probe: Box<dyn TokenProbe>,
    },
}

/// Fetches, validates and caches a bearer token for one invocation.
pub struct CredentialProvider {
    source: Source,
    cached: Option<Credential>,
}

impl CredentialProvider {
    pub fn new(helper: Box<dyn CredentialHelper>, probe: Box<dyn TokenProbe>) -> Self {
        Self {
            source: Source::Helper { helper, probe },
            cached: None,
        }
    }

    pub fn from_static(token: impl Into<String>) -> Self {
        Self {
            source: Source::Static(Credential::new(token)),
            cached: None,
        }
    }

    /// Return a usable token.
    ///
    /// A cached token is reused while the probe accepts it. Otherwise a fresh
    /// token is fetched from the helper and probed; if that fails too, the
    /// helper's login flow runs and the token fetched afterwards is returned
    /// as-is.
    pub async fn get_token(&mut self) -> Result<Credential> {
        let (helper, probe) = match &self.source {
            Source::Static(credential) => return Ok(credential.clone()),
            Source::Helper { helper, probe } => (helper, probe),
        };

        if let Some(cached) = self.cached.take() {
            if probe.validate(&cached).await {
                self.cached = Some(cached.clone());
                return Ok(cached);
            }
            debug!(token = %cached.preview(), "Cached token was rejected");
        }

        let output = helper.token().await?;
        if output.success {
            if let Some(credential) = parse_token_output(&output.stdout) {
                if probe.validate(&credential).await {
                    debug!(token = %credential.preview(), "Using existing token");
                    self.cached = Some(credential.clone());
                    return Ok(credential);
                }
                debug!(token = %credential.preview(), "Existing token failed validation");
            }
        } else {
            debug!(stderr = %output.stderr.trim(), "Token helper reported no usable token");
        }

        warn!("No valid token found, attempting to login...");
        let login = helper.login().await?;
        if !login.success {
            return Err(Error::Auth(format!("Failed to login: {}", login.stderr.trim())).into());
        }

        let output = helper.token().await?;
        if !output.success {
            return Err(Error::Auth(format!(
                "Failed to get OAuth token: {}",
                output.stderr.trim()
            ))
            .into());
        }
        let credential = parse_token_output(&output.stdout).ok_or_else(|| {
            Error::Auth("Token helper returned no token after login".to_string())
        })?;

        info!(token = %credential.preview(), "Obtained token after login");
        self.cached = Some(credential.clone());
        Ok(credential)
    }
}

impl std::fmt::Debug for CredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            Source::Static(_) => "static",
            Source::Helper { .. } => "helper",
        };
        f.debug_struct("CredentialProvider")
            .field("source", &kind)
            .field("cached", &self.cached)
            .finish()
    }
}
