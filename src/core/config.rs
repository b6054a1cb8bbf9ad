use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::time::Duration;

use super::geo::Coordinate;

/// Application settings, persisted as settings.json.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Directory holding alerts.json and shelters.json
    pub data_dir: PathBuf,
    /// Used when no location is given on the command line
    #[serde(default)]
    pub home_location: Option<Coordinate>,
    /// How long to wait for a location fix
    #[serde(default = "default_location_timeout_ms")]
    pub location_timeout_ms: u64,
    /// Alarm played for urgent alerts (needs the `sound` feature)
    #[serde(default)]
    pub alarm_sound: Option<PathBuf>,
    /// Minimum seconds between repeat alarms for the same alert kind
    #[serde(default = "default_alert_cooldown_seconds")]
    pub alert_cooldown_seconds: u32,
    /// Seconds between checks in watch mode
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
}

fn default_location_timeout_ms() -> u64 {
    5000
}

fn default_alert_cooldown_seconds() -> u32 {
    300
}

fn default_poll_interval_seconds() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            home_location: None,
            location_timeout_ms: default_location_timeout_ms(),
            alarm_sound: None,
            alert_cooldown_seconds: default_alert_cooldown_seconds(),
            poll_interval_seconds: default_poll_interval_seconds(),
        }
    }
}

impl Settings {
    /// Seconds between watch-mode checks, never below one.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds.max(1))
    }

    /// Cooldown actually applied to repeat alarms.
    ///
    /// Always longer than one poll interval, so an alert that stays active
    /// does not sound again on the very next watch tick.
    pub fn effective_alert_cooldown(&self) -> Duration {
        let configured = Duration::from_secs(u64::from(self.alert_cooldown_seconds));
        configured.max(self.poll_interval() + Duration::from_secs(1))
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(app_config_dir: PathBuf) -> Self {
        Self {
            config_path: app_config_dir.join("settings.json"),
        }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Settings {
        if self.config_path.exists() {
            match fs::read_to_string(&self.config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(settings) => return settings,
                    Err(e) => log::warn!(
                        "Ignoring invalid {}: {}",
                        self.config_path.display(),
                        e
                    ),
                },
                Err(e) => log::warn!("Could not read {}: {}", self.config_path.display(), e),
            }
        }
        Settings::default()
    }

    pub fn save(&self, settings: &Settings) -> io::Result<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.config_path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().join("nested"));

        let default = manager.load();
        assert_eq!(default, Settings::default());
        assert_eq!(default.location_timeout_ms, 5000);

        let new_settings = Settings {
            data_dir: PathBuf::from("/tmp/shelters"),
            home_location: Some(Coordinate::new(40.7128, -74.0060)),
            poll_interval_seconds: 10,
            ..Settings::default()
        };

        manager.save(&new_settings).unwrap();
        let loaded = manager.load();

        assert_eq!(loaded, new_settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(manager.config_path(), r#"{"data_dir": "/srv/data"}"#).unwrap();

        let loaded = manager.load();
        assert_eq!(loaded.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(loaded.home_location, None);
        assert_eq!(loaded.alert_cooldown_seconds, 300);
        assert_eq!(loaded.poll_interval_seconds, 30);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::new(dir.path().to_path_buf());
        fs::write(manager.config_path(), "not json").unwrap();

        assert_eq!(manager.load(), Settings::default());
    }

    #[test]
    fn test_cooldown_outlasts_poll_interval() {
        let short_cooldown = Settings {
            alert_cooldown_seconds: 3,
            poll_interval_seconds: 30,
            ..Settings::default()
        };
        assert_eq!(short_cooldown.effective_alert_cooldown(), Duration::from_secs(31));

        let long_cooldown = Settings {
            alert_cooldown_seconds: 600,
            poll_interval_seconds: 30,
            ..Settings::default()
        };
        assert_eq!(long_cooldown.effective_alert_cooldown(), Duration::from_secs(600));

        let zero_interval = Settings {
            alert_cooldown_seconds: 0,
            poll_interval_seconds: 0,
            ..Settings::default()
        };
        assert_eq!(zero_interval.poll_interval(), Duration::from_secs(1));
        assert_eq!(zero_interval.effective_alert_cooldown(), Duration::from_secs(2));
    }
}
