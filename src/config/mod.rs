//! Client configuration — where the Arogya backend lives.
//!
//! User-level config: `~/.arogya/config.yaml` (backend base URL).
//!
//! Resolution: CLI flag → config file → `AROGYA_API_URL` env → built-in
//! default (`http://127.0.0.1:5000`, the backend's development address).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Development default for the backend.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Top-level client configuration (user-level file).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

/// Path to `~/.arogya/`.
fn dirs_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|p| PathBuf::from(p).join(".arogya"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME")
            .ok()
            .map(|p| PathBuf::from(p).join(".arogya"))
    }
}

fn config_path() -> Option<PathBuf> {
    dirs_path().map(|p| p.join("config.yaml"))
}

impl ClientConfig {
    /// Load the user-level config file. Missing or unreadable files yield
    /// the empty default.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save to `~/.arogya/config.yaml`.
    pub fn save(&self) -> Result<(), String> {
        let Some(dir) = dirs_path() else {
            return Err("Cannot determine home directory".into());
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        let path = dir.join("config.yaml");
        let yaml = serde_yaml::to_string(self).map_err(|e| format!("YAML serialize error: {e}"))?;
        std::fs::write(&path, yaml)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        Ok(())
    }

    /// Resolve the backend URL: explicit CLI value → config file →
    /// `AROGYA_API_URL` → built-in default.
    pub fn resolve_api_url(&self, cli_override: Option<&str>) -> String {
        if let Some(url) = cli_override {
            return url.to_string();
        }
        if let Some(url) = &self.api_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("AROGYA_API_URL") {
            return url;
        }
        DEFAULT_API_URL.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_from_yaml_string() {
        let yaml = "api_url: https://wellness.example.com\n";
        let config: ClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.api_url, Some("https://wellness.example.com".into()));
    }

    #[test]
    fn round_trip_yaml() {
        let config = ClientConfig {
            api_url: Some("http://10.0.0.7:5000".into()),
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: ClientConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.api_url, Some("http://10.0.0.7:5000".into()));
    }

    #[test]
    fn empty_yaml_is_default() {
        let config: ClientConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.api_url.is_none());
    }

    #[test]
    fn cli_override_wins() {
        let config = ClientConfig {
            api_url: Some("http://from-config:5000".into()),
        };
        let url = config.resolve_api_url(Some("http://from-cli:5000"));
        assert_eq!(url, "http://from-cli:5000");
    }

    #[test]
    fn config_file_beats_default() {
        let config = ClientConfig {
            api_url: Some("http://from-config:5000".into()),
        };
        assert_eq!(config.resolve_api_url(None), "http://from-config:5000");
    }

    #[test]
    fn falls_back_to_builtin_default() {
        std::env::remove_var("AROGYA_API_URL");
        let config = ClientConfig::default();
        assert_eq!(config.resolve_api_url(None), DEFAULT_API_URL);
    }
}
