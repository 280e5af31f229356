//! Client configuration.
//!
//! Sources are applied in order, later ones winning:
//! 1. Defaults
//! 2. A TOML file (when given)
//! 3. Environment variables prefixed with `CROSSBORDER_`
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CROSSBORDER_PARTNER_ID` | `partner_id` |
//! | `CROSSBORDER_BASE_URL` | `base_url` |
//! | `CROSSBORDER_ENCRYPTION_ENABLED` | `encryption_enabled` |
//! | `CROSSBORDER_PAYLOAD_KEY` | `payload_key` |
//! | `CROSSBORDER_TIMEOUT_SECS` | `timeout_secs` |
//!
//! The loaded value is read-only; services borrow it at construction.

use crate::error::ConfigurationError;
use crate::infrastructure::cipher::AesGcmCipher;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_PREFIX: &str = "CROSSBORDER_";

#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default)]
    pub partner_id: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Encrypt payment payloads on the plain `make_payment` path too.
    #[serde(default)]
    pub encryption_enabled: bool,

    /// Base64 of the 32-byte AES-256 payload key.
    #[serde(default)]
    pub payload_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            partner_id: String::new(),
            base_url: default_base_url(),
            encryption_enabled: false,
            payload_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("partner_id", &self.partner_id)
            .field("base_url", &self.base_url)
            .field("encryption_enabled", &self.encryption_enabled)
            .field("payload_key", &self.payload_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Loads defaults, then the optional file, then the environment, and validates.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(format!("{ENV_PREFIX}{name}")).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Read(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(content).map_err(|e| ConfigurationError::Read(e.to_string()))
    }

    /// Applies overrides looked up by unprefixed variable name.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(partner_id) = lookup("PARTNER_ID") {
            self.partner_id = partner_id;
        }
        if let Some(base_url) = lookup("BASE_URL") {
            self.base_url = base_url;
        }
        if let Some(flag) = lookup("ENCRYPTION_ENABLED") {
            self.encryption_enabled = flag.trim().parse().map_err(|_| {
                ConfigurationError::InvalidValue {
                    field: "encryption_enabled".to_string(),
                    message: format!("expected true or false, got `{flag}`"),
                }
            })?;
        }
        if let Some(key) = lookup("PAYLOAD_KEY") {
            self.payload_key = Some(key);
        }
        if let Some(secs) = lookup("TIMEOUT_SECS") {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigurationError::InvalidValue {
                    field: "timeout_secs".to_string(),
                    message: format!("expected a number of seconds, got `{secs}`"),
                }
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.partner_id.trim().is_empty() {
            return Err(ConfigurationError::MissingPartnerId);
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigurationError::InvalidValue {
                field: "base_url".to_string(),
                message: format!("`{}` is not an http(s) URL", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.encryption_enabled {
            self.payload_cipher()?
                .ok_or(ConfigurationError::EncryptionNotConfigured)?;
        }
        Ok(())
    }

    /// The configured AES cipher, if a key is present. A malformed key is an error
    /// even when encryption is disabled.
    pub fn payload_cipher(&self) -> Result<Option<AesGcmCipher>, ConfigurationError> {
        self.payload_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(AesGcmCipher::from_base64)
            .transpose()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://sandbox.api.mastercard.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
