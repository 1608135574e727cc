use std::env;

use crate::error::IntakeError;

/// Application-level constants
pub const APP_NAME: &str = "Caresheet";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    "caresheet=info".to_string()
}

/// Environment variable naming the store endpoint URL.
pub const STORE_URL_VAR: &str = "CARESHEET_STORE_URL";
/// Environment variable naming the store access key.
pub const STORE_KEY_VAR: &str = "CARESHEET_STORE_KEY";

/// Connection settings for the hosted store.
///
/// Both values are required at process start; a missing endpoint or key is
/// fatal, not a recoverable runtime condition.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

impl StoreConfig {
    pub fn new(url: &str, key: &str) -> Result<Self, IntakeError> {
        if url.trim().is_empty() {
            return Err(IntakeError::Config(format!(
                "store endpoint URL is empty (set {STORE_URL_VAR})"
            )));
        }
        if key.trim().is_empty() {
            return Err(IntakeError::Config(format!(
                "store access key is empty (set {STORE_KEY_VAR})"
            )));
        }
        Ok(Self {
            url: url.trim().trim_end_matches('/').to_string(),
            key: key.trim().to_string(),
        })
    }

    /// Read the endpoint and key from the environment, failing fast when
    /// either is absent.
    pub fn from_env() -> Result<Self, IntakeError> {
        let url = env::var(STORE_URL_VAR)
            .map_err(|_| IntakeError::Config(format!("{STORE_URL_VAR} is not set")))?;
        let key = env::var(STORE_KEY_VAR)
            .map_err(|_| IntakeError::Config(format!("{STORE_KEY_VAR} is not set")))?;
        Self::new(&url, &key)
    }
}
