//! Worker configuration: the cache version token and precache manifest.
//!
//! This module handles loading and saving the worker configuration, which
//! names the current cache generation, the origin the planning app is
//! served from, and the fixed list of resources to pre-populate at install
//! time.
//!
//! Configuration is stored at `~/.config/plancache/config.json`. Editing
//! the precache list or bumping `cache_name` is the only supported
//! configuration; a new cache name makes the next activation discard the
//! previous generation wholesale.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "plancache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Current cache generation token. Bump when the app shell changes.
const DEFAULT_CACHE_NAME: &str = "planning-cache-v1";

/// Origin the planning app is served from; relative precache locators
/// resolve against it.
const DEFAULT_ORIGIN: &str = "http://localhost:8000/";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub cache_name: String,
    pub origin: String,
    pub precache: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            precache: vec![
                // App shell: the entry document, both as the start URL and
                // as the explicit file, plus the web-app manifest.
                ".".to_string(),
                "./index.html".to_string(),
                "manifest.json".to_string(),
                // Pinned CDN libraries the export features load.
                "https://cdnjs.cloudflare.com/ajax/libs/html2canvas/1.4.1/html2canvas.min.js"
                    .to_string(),
                "https://cdnjs.cloudflare.com/ajax/libs/jspdf/2.5.1/jspdf.umd.min.js".to_string(),
                "https://cdnjs.cloudflare.com/ajax/libs/xlsx/0.18.5/xlsx.full.min.js".to_string(),
                // Icons
                "icons/icon-192x192.png".to_string(),
                "icons/icon-512x512.png".to_string(),
            ],
        }
    }
}

impl WorkerConfig {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Root directory holding the named cache generations.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_manifest_covers_app_shell() {
        let config = WorkerConfig::default();
        assert_eq!(config.cache_name, "planning-cache-v1");
        assert_eq!(config.precache.len(), 8);
        assert!(config.precache.contains(&"./index.html".to_string()));
        assert!(config.precache.contains(&"manifest.json".to_string()));
        assert!(config
            .precache
            .iter()
            .any(|entry| entry.contains("cdnjs.cloudflare.com")));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = WorkerConfig::default();
        config.cache_name = "planning-cache-v2".to_string();
        config.precache = vec!["./index.html".to_string()];
        config.save_to(&path).unwrap();

        let loaded = WorkerConfig::load_from(&path).unwrap();
        assert_eq!(loaded.cache_name, "planning-cache-v2");
        assert_eq!(loaded.precache, vec!["./index.html".to_string()]);
    }

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"cache_name": "planning-cache-v9"}"#).unwrap();

        let loaded = WorkerConfig::load_from(&path).unwrap();
        assert_eq!(loaded.cache_name, "planning-cache-v9");
        assert_eq!(loaded.origin, "http://localhost:8000/");
        assert_eq!(loaded.precache.len(), 8);
    }
}
