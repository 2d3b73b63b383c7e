//! Configuration loading and management.
//!
//! Loads the JSON client configuration from disk with environment variable overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

/// Base URL for Microsoft Graph API.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Client configuration read from the `--config` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application (client) ID registered in Azure AD.
    #[serde(default)]
    pub client_id: String,

    /// Authority URL, e.g. `https://login.microsoftonline.com/<tenant>`.
    #[serde(default)]
    pub authority: String,

    /// Whitespace-delimited scopes, e.g. `https://graph.microsoft.com/.default`.
    #[serde(default)]
    pub scope: String,

    /// Graph API base URL.
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
}

fn default_graph_base_url() -> String {
    DEFAULT_GRAPH_BASE_URL.to_string()
}

impl Config {
    /// Load configuration from a JSON file with environment variable overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::Read)?;

        let mut config = Self::from_json(&content)?;

        // Apply environment variable overrides
        config.apply_overrides(|key| env::var(key).ok());

        // Validate required fields
        config.validate()?;

        debug!(
            "Loaded configuration from {:?} (client_id={}, authority={})",
            path, config.client_id, config.authority
        );
        Ok(config)
    }

    /// Parse configuration JSON without validating it.
    ///
    /// An empty document, or one that parses to a falsy JSON value (`null`,
    /// `{}`, `""`, ...), is rejected as `ConfigError::Empty`.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Err(ConfigError::Empty);
        }

        let value: serde_json::Value = serde_json::from_str(content).map_err(ConfigError::Parse)?;
        if is_falsy(&value) {
            return Err(ConfigError::Empty);
        }

        serde_json::from_value(value).map_err(ConfigError::Parse)
    }

    /// Apply `GRAPH_*` overrides from the given lookup function.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(client_id) = lookup("GRAPH_CLIENT_ID") {
            self.client_id = client_id;
        }

        if let Some(authority) = lookup("GRAPH_AUTHORITY") {
            self.authority = authority;
        }

        if let Some(scope) = lookup("GRAPH_SCOPE") {
            self.scope = scope;
        }

        if let Some(base_url) = lookup("GRAPH_BASE_URL") {
            self.graph_base_url = base_url;
        }
    }

    /// Validate that required configuration is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Missing("client_id"));
        }

        if self.authority.trim().is_empty() {
            return Err(ConfigError::Missing("authority"));
        }
        self.authority_url()?;

        if self.scopes().is_empty() {
            return Err(ConfigError::Missing("scope"));
        }

        parse_http_url("graph_base_url", &self.graph_base_url)?;

        Ok(())
    }

    /// The authority as a parsed URL.
    pub fn authority_url(&self) -> Result<Url, ConfigError> {
        parse_http_url("authority", &self.authority)
    }

    /// Individual scopes from the whitespace-delimited `scope` value.
    pub fn scopes(&self) -> Vec<String> {
        self.scope.split_whitespace().map(str::to_string).collect()
    }
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
    };

    let url = Url::parse(value.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

fn is_falsy(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
