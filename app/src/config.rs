use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use gtk::glib;
use serde::Deserialize;
use tracing::warn;

const CONFIG_ENV: &str = "KESTREL_CONFIG";
const CONFIG_FILE: &str = "config.toml";
const CONFIG_DIR: &str = "kestrel";

/// Dashboard configuration, loaded from an optional TOML file.
///
/// Missing file means defaults; a malformed file warns and falls back to
/// defaults, matching the monitor's best-effort posture.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Page loaded when the dashboard starts.
    pub default_uri: String,
    /// Cadence of the heap-usage worker.
    pub heap_sample_interval_ms: u64,
    /// Cadence of the HUD poll.
    pub hud_refresh_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_uri: "https://example.com".to_string(),
            heap_sample_interval_ms: 1000,
            hud_refresh_interval_ms: 2000,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let path = config_path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed config");
                Self::default()
            }
        }
    }

    pub fn heap_sample_interval(&self) -> Duration {
        Duration::from_millis(self.heap_sample_interval_ms)
    }

    pub fn hud_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.hud_refresh_interval_ms)
    }
}

fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    glib::user_config_dir().join(CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_keys() {
        let config: AppConfig = toml::from_str("default_uri = \"https://gnome.org\"").unwrap();
        assert_eq!(config.default_uri, "https://gnome.org");
        assert_eq!(config.heap_sample_interval_ms, 1000);
        assert_eq!(config.hud_refresh_interval_ms, 2000);
    }

    #[test]
    fn intervals_convert_to_durations() {
        let config: AppConfig = toml::from_str("hud_refresh_interval_ms = 500").unwrap();
        assert_eq!(config.hud_refresh_interval(), Duration::from_millis(500));
        assert_eq!(config.heap_sample_interval(), Duration::from_millis(1000));
    }
}
