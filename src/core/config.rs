use crate::core::dirs::get_config_directory;
use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default minimum gap between automatic refreshes, in minutes.
const DEFAULT_REFRESH_INTERVAL_MINUTES: i64 = 1;

#[derive(Serialize, Deserialize, Debug)]
pub struct SyncConfig {
    /// Root folder holding the plugin checkouts.
    pub root: PathBuf,
    /// Minimum minutes between automatic refreshes; 0 disables auto-refresh.
    pub auto_refresh_interval_minutes: i64,
    pub last_refresh: Option<chrono::DateTime<chrono::Utc>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            auto_refresh_interval_minutes: DEFAULT_REFRESH_INTERVAL_MINUTES,
            last_refresh: None,
        }
    }
}

impl SyncConfig {
    pub fn load_or_create() -> Result<Self> {
        let config_dir = get_config_directory()?;
        let config_file = config_dir.join("config.json");

        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_dir = get_config_directory()?;
        std::fs::create_dir_all(&config_dir)?;

        let config_file = config_dir.join("config.json");
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_file, content)?;

        Ok(())
    }

    /// Whether enough time has passed since the last refresh for the host to
    /// trigger another automatic one.
    pub fn should_auto_refresh(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        if self.auto_refresh_interval_minutes <= 0 {
            return false;
        }
        match self.last_refresh {
            None => true,
            Some(last) => now - last >= chrono::Duration::minutes(self.auto_refresh_interval_minutes),
        }
    }

    pub fn mark_refreshed(&mut self, now: chrono::DateTime<chrono::Utc>) -> Result<()> {
        self.last_refresh = Some(now);
        self.save()
    }
}
