//! IonQ adapter configuration.
//!
//! Configuration precedence (highest to lowest):
//! 1. Values set explicitly through the builder methods
//! 2. Environment variables (`IONQ_API_KEY`, `IONQ_API_URL`, `IONQ_DEVICE`)
//! 3. Configuration file (YAML, default `~/.arvak/ionq.yaml`)
//! 4. Default values

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::BASE_URL;
use crate::error::{IonqError, IonqResult};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "IONQ_API_KEY";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "IONQ_API_URL";
/// Environment variable overriding the target device.
pub const DEVICE_ENV: &str = "IONQ_DEVICE";

/// Settings for an [`IonqBackend`](crate::IonqBackend).
#[derive(Clone, Serialize, Deserialize)]
pub struct IonqConfig {
    /// Target device: `qpu` or `simulator`.
    #[serde(default = "default_device")]
    pub device: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix for derived job names (`{label}_{index}`).
    #[serde(default = "default_label")]
    pub label: String,

    /// Answer every job locally without contacting the service.
    #[serde(default)]
    pub debug: bool,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl fmt::Debug for IonqConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IonqConfig")
            .field("device", &self.device)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("label", &self.label)
            .field("debug", &self.debug)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_device() -> String {
    "qpu".into()
}

fn default_base_url() -> String {
    BASE_URL.into()
}

fn default_label() -> String {
    "job".into()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for IonqConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            api_key: None,
            base_url: default_base_url(),
            label: default_label(),
            debug: false,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl IonqConfig {
    /// `~/.arvak/ionq.yaml`, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".arvak").join("ionq.yaml"))
    }

    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> IonqResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| IonqError::Config(format!("{}: {e}", path.display())))?;
        serde_yaml_ng::from_str(&contents)
            .map_err(|e| IonqError::Config(format!("{}: {e}", path.display())))
    }

    /// Load the file (if any), then apply environment overrides.
    ///
    /// An explicit `path` must exist; the default path is skipped when
    /// absent.
    pub fn load(path: Option<&Path>) -> IonqResult<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(p) => {
                    debug!("Loading IonQ config from {}", p.display());
                    Self::from_file(p)?
                }
                None => Self::default(),
            },
        };
        Ok(config.merge_env(|name| std::env::var(name).ok()))
    }

    /// Override fields from variables that are set.
    ///
    /// Empty values count as unset.
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());
        if let Some(key) = var(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = var(API_URL_ENV) {
            self.base_url = url;
        }
        if let Some(device) = var(DEVICE_ENV) {
            self.device = device;
        }
        self
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The API key, or [`IonqError::MissingApiKey`].
    pub fn require_api_key(&self) -> IonqResult<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(IonqError::MissingApiKey)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
