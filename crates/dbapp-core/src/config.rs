//! Runtime configuration.
//!
//! Settings come from the process environment, with local overrides read
//! from `.env.local` and `.env` in the working directory. Variables already
//! set in the environment always win, then `.env.local`, then `.env`.

use std::path::Path;

use tracing::debug;

use crate::error::Error;

/// Local override files, highest precedence first
const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Default name of the Databricks CLI executable
const DEFAULT_CLI: &str = "databricks";

pub const ENV_PROFILE: &str = "DATABRICKS_CONFIG_PROFILE";
pub const ENV_HOST: &str = "DATABRICKS_HOST";
pub const ENV_TOKEN: &str = "DATABRICKS_TOKEN";
pub const ENV_APP_NAME: &str = "DATABRICKS_APP_NAME";
pub const ENV_CLI: &str = "DBAPP_DATABRICKS_CLI";

/// How the credential helper is pointed at a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthTarget {
    Profile(String),
    Host(String),
}

impl AuthTarget {
    /// Helper arguments selecting this target.
    pub fn cli_args(&self) -> [&str; 2] {
        match self {
            AuthTarget::Profile(profile) => ["--profile", profile.as_str()],
            AuthTarget::Host(host) => ["--host", host.as_str()],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub profile: Option<String>,
    pub host: Option<String>,
    pub token: Option<String>,
    pub app_name: Option<String>,
    pub cli_path: Option<String>,
}

impl Config {
    /// Load dotenv files from the working directory, then read the environment.
    pub fn load() -> Self {
        load_env_files(Path::new("."));
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            profile: get(ENV_PROFILE),
            host: get(ENV_HOST).map(|h| h.trim_end_matches('/').to_string()),
            token: get(ENV_TOKEN),
            app_name: get(ENV_APP_NAME),
            cli_path: get(ENV_CLI),
        }
    }

    /// Profile takes precedence over host.
    pub fn auth_target(&self) -> Result<AuthTarget, Error> {
        if let Some(ref profile) = self.profile {
            Ok(AuthTarget::Profile(profile.clone()))
        } else if let Some(ref host) = self.host {
            Ok(AuthTarget::Host(host.clone()))
        } else {
            Err(Error::Config(format!(
                "Neither {} nor {} environment variable is set",
                ENV_PROFILE, ENV_HOST
            )))
        }
    }

    pub fn workspace_host(&self) -> Result<&str, Error> {
        self.host
            .as_deref()
            .ok_or_else(|| Error::Config(format!("{} environment variable is not set", ENV_HOST)))
    }

    pub fn app_name(&self) -> Result<&str, Error> {
        self.app_name.as_deref().ok_or_else(|| {
            Error::Config(format!(
                "{} environment variable is not set. Provide --app-url explicitly.",
                ENV_APP_NAME
            ))
        })
    }

    pub fn cli_path(&self) -> &str {
        self.cli_path.as_deref().unwrap_or(DEFAULT_CLI)
    }
}

/// Load the override files found in `dir`. Missing files are skipped.
pub fn load_env_files(dir: &Path) {
    for name in ENV_FILES {
        let path = dir.join(name);
        match dotenvy::from_path(&path) {
            Ok(()) => debug!(path = %path.display(), "Loaded environment file"),
            Err(e) if e.not_found() => {}
            Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable environment file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_profile_wins_over_host() {
        let cfg = config(&[(ENV_PROFILE, "dev"), (ENV_HOST, "https://x.cloud.databricks.com")]);
        assert_eq!(cfg.auth_target().unwrap(), AuthTarget::Profile("dev".into()));
        assert_eq!(cfg.auth_target().unwrap().cli_args(), ["--profile", "dev"]);
    }

    #[test]
    fn test_host_target_strips_trailing_slash() {
        let cfg = config(&[(ENV_HOST, "https://x.cloud.databricks.com/")]);
        assert_eq!(
            cfg.auth_target().unwrap(),
            AuthTarget::Host("https://x.cloud.databricks.com".into())
        );
        assert_eq!(cfg.workspace_host().unwrap(), "https://x.cloud.databricks.com");
    }

    #[test]
    fn test_missing_target_is_config_error() {
        let cfg = config(&[(ENV_PROFILE, "  ")]);
        assert!(matches!(cfg.auth_target(), Err(Error::Config(_))));
        assert!(matches!(cfg.app_name(), Err(Error::Config(_))));
        assert_eq!(cfg.cli_path(), "databricks");
    }

    #[test]
    fn test_env_files_do_not_override_existing_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".env"),
            "DBAPP_TEST_ONLY_ENV=from-env\nDBAPP_TEST_BOTH=from-env\n",
        )
        .unwrap();
        std::fs::write(dir.path().join(".env.local"), "DBAPP_TEST_BOTH=from-local\n").unwrap();

        load_env_files(dir.path());

        assert_eq!(std::env::var("DBAPP_TEST_ONLY_ENV").unwrap(), "from-env");
        assert_eq!(std::env::var("DBAPP_TEST_BOTH").unwrap(), "from-local");
    }
}
