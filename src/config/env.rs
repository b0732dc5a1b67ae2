//! Process-start loader: `.env` file plus environment variables.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::debug;

use super::{ClientConfig, Credentials, Endpoint};
use crate::error::{ColloquyError, Result};

/// Model override read by every runner.
pub const MODEL_VAR: &str = "COLLOQUY_MODEL";

/// Snapshot of the variables colloquy cares about.
///
/// Built once by the binary; library code receives the resulting
/// [`ClientConfig`] values and never looks at the environment itself.
#[derive(Debug, Clone, Default)]
pub struct EnvLoader {
    vars: HashMap<String, String>,
}

/// Export the nearest `.env` into the process environment without
/// overriding variables that are already set.
///
/// Returns the file's path, or `None` when there is no `.env`. Call this
/// before anything reads the environment, `RUST_LOG` included.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(ColloquyError::Configuration(format!("unreadable .env: {e}"))),
    }
}

impl EnvLoader {
    /// Load `.env` if present, then capture the relevant variables.
    pub fn from_env() -> Self {
        match load_dotenv() {
            Ok(Some(path)) => debug!(path = %path.display(), "loaded .env"),
            Ok(None) => {}
            Err(e) => debug!(error = %e, "ignoring .env"),
        }
        Self::from_process()
    }

    /// Capture the relevant variables as the process currently sees them.
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Capture variables through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let keys = [
            Endpoint::OpenAi.api_key_var(),
            Endpoint::OpenAi.base_url_var(),
            Endpoint::OpenRouter.api_key_var(),
            Endpoint::OpenRouter.base_url_var(),
            MODEL_VAR,
        ];
        let vars = keys
            .iter()
            .filter_map(|key| lookup(key).map(|value| ((*key).to_string(), value)))
            .collect();
        Self { vars }
    }

    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Credentials for `endpoint`; the key stays `None` when unset so the
    /// failure surfaces when a client is built.
    pub fn credentials(&self, endpoint: Endpoint) -> Credentials {
        let creds = Credentials::for_endpoint(endpoint, self.get(endpoint.api_key_var()));
        match self.get(endpoint.base_url_var()) {
            Some(url) => creds.with_base_url(url),
            None => creds,
        }
    }

    /// Client config for `endpoint`, using `default_model` unless overridden.
    pub fn client_config(&self, endpoint: Endpoint, default_model: &str) -> ClientConfig {
        let model = self
            .get(MODEL_VAR)
            .unwrap_or_else(|| default_model.to_string());
        ClientConfig::new(self.credentials(endpoint), model)
    }
}
