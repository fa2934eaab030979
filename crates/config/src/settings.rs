// Application settings
// Loaded from ~/.config/gridmind/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// AI command settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AISettings {
    /// Command backend URL
    pub endpoint: String,

    /// Send surrounding non-empty cells along with the selection
    pub include_sheet_context: bool,

    /// Maximum rows of sheet context
    pub max_context_rows: usize,

    /// Maximum columns of sheet context
    pub max_context_cols: usize,
}

impl Default for AISettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000/api/excel/execute".to_string(),
            include_sheet_context: false, // Selection only unless asked
            max_context_rows: 200,
            max_context_cols: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Selection sync
    #[serde(rename = "selection.restoreOnDeselect")]
    pub restore_on_deselect: bool,

    #[serde(rename = "selection.restoreSettleMs")]
    pub restore_settle_ms: u64,

    // AI
    #[serde(rename = "ai", default)]
    pub ai: AISettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            restore_on_deselect: true,
            // Long enough to swallow the grid's synthetic select event after a
            // programmatic restore, short enough not to feel laggy.
            restore_settle_ms: 100,
            ai: AISettings::default(),
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gridmind");
        config_dir.join("settings.json")
    }

    /// Settle window the restore guard stays held after a restore.
    pub fn restore_settle(&self) -> Duration {
        Duration::from_millis(self.restore_settle_ms)
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        // Strip comments (lines starting with //)
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save settings to a specific file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |e: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, json).map_err(io_err)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Selection sync
    // Re-select the last selection when the grid drops it (focus loss etc.)
    "selection.restoreOnDeselect": true,
    "selection.restoreSettleMs": 100,

    // AI command backend
    "ai": {
        "endpoint": "http://localhost:8000/api/excel/execute",
        "include_sheet_context": false,
        "max_context_rows": 200,
        "max_context_cols": 20
    }
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
