mod env;
mod types;


pub use types::*;

use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::intent::UNKNOWN_LABEL;
use crate::vault::{Secret, VaultProvider};

/// Primary vault key for the OpenAI credential, checked before `OPENAI_API_KEY`.
pub const OPENAI_KEY_VAR: &str = "CONCIERGE_OPENAI_API_KEY";
const OPENAI_KEY_FALLBACK_VAR: &str = "OPENAI_API_KEY";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to built-in defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str::<Self>(&content)?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject values the services cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.index.top_k == 0 {
            return Err(ConfigError::Invalid("index.top_k must be at least 1".into()));
        }
        if self.index.batch_size == 0 {
            return Err(ConfigError::Invalid(
                "index.batch_size must be at least 1".into(),
            ));
        }
        if self.index.collection.trim().is_empty() {
            return Err(ConfigError::Invalid("index.collection must not be empty".into()));
        }
        if self.index.backend == IndexBackend::Qdrant && self.index.qdrant_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "index.qdrant_url is required for the qdrant backend".into(),
            ));
        }
        if self.router.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "router.max_retries must be at least 1".into(),
            ));
        }
        if self.router.dispatch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "router.dispatch_timeout_secs must be at least 1".into(),
            ));
        }
        if self.router.routes.is_empty() {
            return Err(ConfigError::Invalid("router.routes must not be empty".into()));
        }
        for (label, endpoint) in self.router.routes.iter() {
            if label.trim().is_empty() || label.eq_ignore_ascii_case(UNKNOWN_LABEL) {
                return Err(ConfigError::Invalid(format!(
                    "router.routes has a reserved label: {label:?}"
                )));
            }
            if !(endpoint.url.starts_with("http://") || endpoint.url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "router.routes.{label}.url must be an http(s) URL"
                )));
            }
        }
        Ok(())
    }

    /// Resolve sensitive configuration values through the vault.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault backend fails.
    pub async fn resolve_secrets(&mut self, vault: &dyn VaultProvider) -> Result<(), ConfigError> {
        for key in [OPENAI_KEY_VAR, OPENAI_KEY_FALLBACK_VAR] {
            if let Some(val) = vault.get_secret(key).await? {
                self.secrets.openai_api_key = Some(Secret::new(val));
                break;
            }
        }
        Ok(())
    }

    /// The OpenAI credential, required by every command that talks to the model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecret`] when no key was resolved.
    pub fn openai_api_key(&self) -> Result<&Secret, ConfigError> {
        self.secrets
            .openai_api_key
            .as_ref()
            .ok_or(ConfigError::MissingSecret(OPENAI_KEY_VAR))
    }

    #[must_use]
    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_secs(self.router.dispatch_timeout_secs)
    }
}
