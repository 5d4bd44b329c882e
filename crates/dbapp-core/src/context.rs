//! Wiring shared by every command: configuration plus one credential cache.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::info;

use crate::api::{ApiClient, SharedCredentials, WorkspaceApi};
use crate::auth::{CredentialProvider, DatabricksCli, ScimProbe};
use crate::config::Config;

/// Everything one invocation needs to talk to an app or its workspace.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    credentials: SharedCredentials,
}

impl AppContext {
    /// A static provider when `DATABRICKS_TOKEN` is set, otherwise the
    /// `databricks` CLI with SCIM validation.
    pub fn new(config: Config) -> Result<Self> {
        let provider = match config.token {
            Some(ref token) => CredentialProvider::from_static(token.clone()),
            None => {
                let cli = DatabricksCli::new(config.cli_path(), config.auth_target()?);
                let probe = ScimProbe::new(config.host.clone())?;
                CredentialProvider::new(Box::new(cli), Box::new(probe))
            }
        };
        Ok(Self::with_provider(config, provider))
    }

    pub fn with_provider(config: Config, provider: CredentialProvider) -> Self {
        Self {
            config,
            credentials: Arc::new(Mutex::new(provider)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Explicit URL if given, otherwise looked up from `DATABRICKS_APP_NAME`.
    pub async fn resolve_app_url(&self, explicit: Option<&str>) -> Result<String> {
        if let Some(url) = explicit {
            return Ok(url.trim_end_matches('/').to_string());
        }
        let app_name = self.config.app_name()?;
        let cli = DatabricksCli::new(self.config.cli_path(), self.config.auth_target()?);
        let url = cli.app_url(app_name).await?;
        info!(%url, app = app_name, "Auto-detected app URL");
        Ok(url)
    }

    pub async fn app_client(&self, explicit: Option<&str>) -> Result<ApiClient> {
        let url = self.resolve_app_url(explicit).await?;
        ApiClient::new(url, self.credentials.clone())
    }

    pub fn workspace(&self) -> Result<WorkspaceApi> {
        let host = self.config.workspace_host()?;
        Ok(WorkspaceApi::new(ApiClient::new(host, self.credentials.clone())?))
    }
}
