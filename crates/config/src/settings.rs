// Application settings
// Loaded from ~/.config/sheetvault/settings.json

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How the header row is located
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeaderPolicy {
    /// First non-empty row within the first `import.headerWindowRows` rows
    #[default]
    Bounded,
    /// Last non-empty row of the whole sheet
    FullScan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Storage
    #[serde(rename = "store.path")]
    pub store_path: Option<PathBuf>,  // None = data dir default

    // Import
    #[serde(rename = "import.headerPolicy")]
    pub header_policy: HeaderPolicy,

    #[serde(rename = "import.headerWindowRows")]
    pub header_window_rows: usize,

    #[serde(rename = "import.maxColumnNameLength")]
    pub max_column_name_length: usize,

    // Display
    #[serde(rename = "display.rowAligned")]
    pub row_aligned: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_path: None,
            header_policy: HeaderPolicy::Bounded,
            header_window_rows: 3,
            max_column_name_length: 80,
            row_aligned: false,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"{
    // Database file (null = platform data directory)
    "store.path": null,

    // Header detection: "bounded" = first non-empty row in the window,
    // "fullScan" = last non-empty row of the sheet
    "import.headerPolicy": "bounded",
    "import.headerWindowRows": 3,

    // Longer column names are truncated
    "import.maxColumnNameLength": 80,

    // Place values by their source row instead of by position
    "display.rowAligned": false
}
"#;

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetvault");
        config_dir.join("settings.json")
    }

    /// Database path used when `store.path` is unset
    pub fn default_database_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sheetvault")
            .join("store.db")
    }

    /// Effective database path
    pub fn database_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(Self::default_database_path)
    }

    /// Load settings from disk, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            create_default_file(path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    log::warn!("Error parsing {}: {}; using default settings", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings JSON. Lines starting with `//` are comments.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");
        serde_json::from_str(&cleaned)
    }

    /// Save current settings to disk
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }
}

/// Create default settings file with comments
fn create_default_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            log::warn!("Error creating config directory: {}", e);
            return;
        }
    }

    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        log::warn!("Error writing default settings.json: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_file_parses_to_defaults() {
        assert_eq!(Settings::parse(DEFAULT_CONFIG).unwrap(), Settings::default());
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings = Settings::parse(r#"{ "import.headerPolicy": "fullScan" }"#).unwrap();
        assert_eq!(settings.header_policy, HeaderPolicy::FullScan);
        assert_eq!(settings.header_window_rows, 3);
        assert_eq!(settings.max_column_name_length, 80);
        assert!(settings.store_path.is_none());
    }

    #[test]
    fn test_comment_lines_stripped() {
        let json = "{\n  // where the data lives\n  \"store.path\": \"/tmp/x.db\",\n  \"display.rowAligned\": true\n}";
        let settings = Settings::parse(json).unwrap();
        assert_eq!(settings.database_path(), PathBuf::from("/tmp/x.db"));
        assert!(settings.row_aligned);
    }

    #[test]
    fn test_load_missing_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings::load_from(&path);
        assert_eq!(settings, Settings::default());
        assert!(path.exists());
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            header_policy: HeaderPolicy::FullScan,
            header_window_rows: 5,
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_unset_store_path_uses_data_dir() {
        let path = Settings::default().database_path();
        assert!(path.ends_with("sheetvault/store.db"));
    }
}
