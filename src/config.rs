//! # Kernel Configuration
//!
//! Boot-time settings for the kernel, loaded from environment variables or
//! a TOML document.
//!
//! ## Environment Variables
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `ANT_DEBUG` | `debug` | `true` |
//! | `ANT_DEFAULT_TYPE` | `default_type` | `json` |
//! | `ANT_PROTOCOL_VERSION` | `protocol_version` | `1.1` |
//! | `ANT_OUTPUT_BASE_LEVEL` | `output_base_level` | `0` |
//!
//! Unparseable values fall back to the default.
//!
//! ## TOML
//!
//! ```toml
//! debug = false
//! default_type = "html"
//!
//! [default_headers]
//! X-Powered-By = ["Ant-Framework"]
//! ```
//!
//! A `[default_headers]` table replaces the built-in set entirely.

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Kernel settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Expose failure details to clients
    pub debug: bool,
    /// Representation type used when the client's `Accept` names none
    pub default_type: String,
    /// Protocol version of the request synthesized when none exists (fault
    /// recovery, front-end input that could not be parsed)
    pub protocol_version: String,
    /// Output buffer depth left open after emission
    pub output_base_level: usize,
    /// Headers added to every prepared response
    pub default_headers: BTreeMap<String, Vec<String>>,
}

fn default_headers() -> BTreeMap<String, Vec<String>> {
    [
        ("Expires", "0"),
        ("X-Powered-By", "Ant-Framework"),
        ("Access-Control-Expose-Headers", "*"),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Credentials", "false"),
        ("Cache-Control", "no-cache"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), vec![v.to_string()]))
    .collect()
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            debug: true,
            default_type: "json".to_string(),
            protocol_version: "1.1".to_string(),
            output_base_level: 0,
            default_headers: default_headers(),
        }
    }
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl KernelConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Apply `ANT_*` overrides read through `lookup`.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(debug) = lookup("ANT_DEBUG").as_deref().and_then(parse_bool) {
            self.debug = debug;
        }
        if let Some(ty) = lookup("ANT_DEFAULT_TYPE").filter(|v| !v.trim().is_empty()) {
            self.default_type = ty.trim().to_ascii_lowercase();
        }
        if let Some(version) = lookup("ANT_PROTOCOL_VERSION").filter(|v| !v.trim().is_empty()) {
            self.protocol_version = version.trim().to_string();
        }
        if let Some(level) = lookup("ANT_OUTPUT_BASE_LEVEL").and_then(|v| v.trim().parse().ok()) {
            self.output_base_level = level;
        }
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or mistyped fields.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Parse`] when it is not valid configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
