//! Service Configuration
//!
//! Defines the configuration schema for the proxy server and its upstream
//! services.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Listen address settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerSettings>,

    /// Upstream service configurations keyed by service name
    #[serde(default)]
    pub services: HashMap<String, ServiceConfig>,
}

impl ProxyConfig {
    /// Effective server settings, falling back to defaults
    pub fn server(&self) -> ServerSettings {
        self.server.clone().unwrap_or_default()
    }
}

/// Listen address for the proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Host to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

/// Configuration for a single upstream service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Full upstream endpoint URL
    pub endpoint: String,

    /// Environment variable name for a single API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Optional list of environment variables for multiple keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_keys_env: Option<Vec<String>>,

    /// Raw API keys (alternative to the env var lists)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,

    /// Override for the minimum spacing window between uses of one key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_spacing_ms: Option<u64>,
}

impl ServiceConfig {
    /// Get all API keys for this service, in configuration order
    pub fn get_api_keys(&self) -> Vec<String> {
        let mut keys = Vec::new();

        // First, try the single key env var
        if let Some(env_var) = &self.api_key_env {
            if let Ok(key) = std::env::var(env_var) {
                keys.push(key);
            }
        }

        // Then, add any additional keys from the env var list
        if let Some(env_vars) = &self.api_keys_env {
            for env_var in env_vars {
                if let Ok(key) = std::env::var(env_var) {
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
            }
        }

        // Finally, raw keys from the config file
        for key in &self.keys {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }

        keys
    }
}
