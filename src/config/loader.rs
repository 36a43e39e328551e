//! Configuration Loader
//!
//! Loads and merges proxy configuration from the built-in defaults and
//! optional override files.

use crate::config::service::ProxyConfig;
use crate::error::{ProxyError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Configuration loader with support for multiple sources
#[derive(Debug)]
pub struct ConfigLoader {
    config: ProxyConfig,
}

impl ConfigLoader {
    /// Create a new config loader and load from default locations
    pub fn new() -> Result<Self> {
        let mut loader = Self {
            config: ProxyConfig {
                server: None,
                services: HashMap::new(),
            },
        };

        // Load built-in defaults first
        loader.load_builtin_defaults()?;

        // Then load from the file system (can override built-ins)
        loader.load_from_default_paths()?;

        Ok(loader)
    }

    /// Create a loader with a specific config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut loader = Self {
            config: ProxyConfig {
                server: None,
                services: HashMap::new(),
            },
        };

        loader.load_builtin_defaults()?;
        loader.load_from_file(path)?;

        Ok(loader)
    }

    /// Load built-in service defaults
    fn load_builtin_defaults(&mut self) -> Result<()> {
        let defaults = include_str!("../../services.json");
        let config: ProxyConfig = serde_json::from_str(defaults).map_err(|e| {
            ProxyError::Config(format!("Failed to parse built-in services.json: {}", e))
        })?;

        self.merge_config(config);
        Ok(())
    }

    /// Load configuration from default paths
    fn load_from_default_paths(&mut self) -> Result<()> {
        for path in Self::get_config_paths() {
            if path.exists() {
                self.load_from_file(&path)?;
            }
        }

        Ok(())
    }

    /// Get list of config paths to check
    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Environment variable
        if let Ok(custom_path) = std::env::var("STUDYBUDDY_CONFIG") {
            paths.push(PathBuf::from(custom_path));
        }

        // 2. Current directory
        paths.push(PathBuf::from("studybuddy.json"));

        // 3. User config directory
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("studybuddy").join("config.json"));
        }

        // 4. Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".studybuddy").join("config.json"));
        }

        paths
    }

    /// Load configuration from a specific file
    fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProxyError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: ProxyConfig = serde_json::from_str(&content).map_err(|e| {
            ProxyError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        self.merge_config(config);
        Ok(())
    }

    /// Merge another config into this one (later configs override earlier)
    fn merge_config(&mut self, other: ProxyConfig) {
        if other.server.is_some() {
            self.config.server = other.server;
        }

        for (name, service) in other.services {
            self.config.services.insert(name, service);
        }
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Take ownership of the configuration
    pub fn into_config(self) -> ProxyConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Loader seeded only with the built-in defaults, skipping any config
    /// files present on the test machine.
    fn builtin_only() -> ConfigLoader {
        let mut loader = ConfigLoader {
            config: ProxyConfig {
                server: None,
                services: HashMap::new(),
            },
        };
        loader.load_builtin_defaults().unwrap();
        loader
    }

    #[test]
    fn test_builtin_defaults_cover_all_services() {
        let loader = builtin_only();
        for service in ["groq", "gemini", "search"] {
            assert!(
                loader.config().services.contains_key(service),
                "missing built-in service {}",
                service
            );
        }
    }

    #[test]
    fn test_load_from_custom_file_overrides_endpoint() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{
                "services": {{
                    "groq": {{
                        "endpoint": "http://localhost:9999/v1/chat/completions",
                        "keys": ["local-key"]
                    }}
                }}
            }}"#
        )
        .unwrap();

        let loader = ConfigLoader::from_path(file.path()).unwrap();
        let groq = &loader.config().services["groq"];
        assert_eq!(groq.endpoint, "http://localhost:9999/v1/chat/completions");
        assert_eq!(groq.keys, vec!["local-key"]);

        // Untouched services keep their built-in endpoints
        assert!(loader.config().services["search"]
            .endpoint
            .contains("tavily"));
    }

    #[test]
    fn test_invalid_file_is_a_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let err = ConfigLoader::from_path(file.path()).unwrap_err();
        assert!(matches!(err, ProxyError::Config(_)));
    }

    #[test]
    fn test_server_settings_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "server": {{ "host": "0.0.0.0", "port": 9000 }} }}"#).unwrap();

        let loader = ConfigLoader::from_path(file.path()).unwrap();
        let server = loader.config().server();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 9000);
    }
}
