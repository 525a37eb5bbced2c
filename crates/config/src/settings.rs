// Application settings
// Loaded from ~/.config/cellboard/settings.json

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Board
    /// Dashboard file used for startup and every refresh; None = discover
    #[serde(rename = "board.configPath")]
    pub config_path: Option<PathBuf>,

    // Refresh
    #[serde(rename = "refresh.intervalMs")]
    pub refresh_interval_ms: u64,

    #[serde(rename = "refresh.rebuildOnStructureChange")]
    pub rebuild_on_structure_change: bool,

    // Gauge
    #[serde(rename = "gauge.min")]
    pub gauge_min: f64,

    #[serde(rename = "gauge.max")]
    pub gauge_max: f64,

    // History
    #[serde(rename = "history.enabled")]
    pub history_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_path: None,
            refresh_interval_ms: 1000,
            rebuild_on_structure_change: false,
            gauge_min: 0.0,
            gauge_max: 120.0,
            history_enabled: true,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cellboard");
        config_dir.join("settings.json")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();

        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(&path);
            return settings;
        }

        Self::load_from(&path)
    }

    /// Load settings from a specific file. Never fails: unreadable or
    /// malformed files are reported and defaults are used.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(settings) => settings.sanitized(),
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
    pub fn parse(contents: &str) -> Result<Self, String> {
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        serde_json::from_str(&cleaned).map_err(|e| e.to_string())
    }

    /// Refresh interval, never below 50ms.
    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.refresh_interval_ms.max(50))
    }

    /// Swap an inverted gauge range and widen an empty one.
    fn sanitized(mut self) -> Self {
        if self.gauge_min > self.gauge_max {
            std::mem::swap(&mut self.gauge_min, &mut self.gauge_max);
        }
        if self.gauge_min == self.gauge_max {
            self.gauge_max = self.gauge_min + 1.0;
        }
        self
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("Error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Dashboard file (null = look for config.json next to the working
    // directory or the executable)
    "board.configPath": null,

    // Reload the dashboard file this often
    "refresh.intervalMs": 1000,

    // Rebuild the dashboard when columns or cells are added or removed
    "refresh.rebuildOnStructureChange": false,

    // Gauge scale
    "gauge.min": 0,
    "gauge.max": 120,

    // Record value changes per cell for the detail panel
    "history.enabled": true
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("Error writing default settings.json: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_with_comments_and_partial_keys() {
        let json = r#"{
            // only the interval
            "refresh.intervalMs": 250
        }"#;
        let settings = Settings::parse(json).unwrap();
        assert_eq!(settings.refresh_interval_ms, 250);
        assert_eq!(settings.gauge_max, 120.0);
        assert!(settings.history_enabled);
        assert_eq!(settings.config_path, None);
    }

    #[test]
    fn test_load_from_malformed_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ nope").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_configured_board_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"board.configPath": "/srv/board/config.json", "refresh.intervalMs": 500}"#,
        )
        .unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!(settings.config_path, Some(PathBuf::from("/srv/board/config.json")));
        assert_eq!(settings.refresh_interval_ms, 500);
    }

    #[test]
    fn test_default_file_template_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        Settings::default().create_default_file(&path);
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_gauge_range_sanitized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"gauge.min": 100, "gauge.max": 10}"#).unwrap();
        let settings = Settings::load_from(&path);
        assert_eq!((settings.gauge_min, settings.gauge_max), (10.0, 100.0));
    }

    #[test]
    fn test_refresh_interval_floor() {
        let settings = Settings {
            refresh_interval_ms: 0,
            ..Settings::default()
        };
        assert_eq!(settings.refresh_interval().as_millis(), 50);
    }
}
