use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::Credential;

/// Identity endpoint used to check that a token is accepted
pub const SCIM_ME_PATH: &str = "/api/2.0/preview/scim/v2/Me";

/// Validation probes should fail fast
const PROBE_TIMEOUT_SECS: u64 = 10;

/// Decides whether a token is currently accepted by the workspace.
#[async_trait]
pub trait TokenProbe: Send + Sync {
    async fn validate(&self, credential: &Credential) -> bool;
}

/// Probes the workspace SCIM `Me` endpoint; only a 200 counts as valid.
#[derive(Debug, Clone)]
pub struct ScimProbe {
    client: Client,
    host: Option<String>,
}

impl ScimProbe {
    /// Without a workspace host every token is reported invalid.
    pub fn new(host: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, host })
    }
}

#[async_trait]
impl TokenProbe for ScimProbe {
    async fn validate(&self, credential: &Credential) -> bool {
        let Some(ref host) = self.host else {
            debug!("No workspace host configured, cannot validate token");
            return false;
        };

        let url = format!("{}{}", host, SCIM_ME_PATH);
        match self
            .client
            .get(&url)
            .bearer_auth(credential.secret())
            .send()
            .await
        {
            Ok(resp) => {
                debug!(status = %resp.status(), token = %credential.preview(), "Token probe finished");
                resp.status() == StatusCode::OK
            }
            Err(e) => {
                debug!(error = %e, "Token probe request failed");
                false
            }
        }
    }
}
