use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub reminder: ReminderSettings,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CalendarConfig {
    /// Override for the data directory holding the record files.
    pub data_dir: Option<PathBuf>,
    pub default_category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReminderSettings {
    /// Lead time applied when a reminder is set without one.
    pub default_lead_minutes: i64,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self { default_lead_minutes: crate::reminder::DEFAULT_LEAD_MINUTES }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calendar: CalendarConfig { data_dir: None, default_category: None },
            reminder: ReminderSettings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }
}

fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "datebook", "datebook")
        .context("Failed to determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.reminder.default_lead_minutes, 30);
        assert!(config.calendar.data_dir.is_none());
    }

    #[test]
    fn test_config_round_trips_through_toml() -> Result<()> {
        let mut config = Config::default();
        config.calendar.default_category = Some("work".to_string());
        config.reminder.default_lead_minutes = 15;

        let text = toml::to_string_pretty(&config)?;
        let parsed: Config = toml::from_str(&text)?;
        assert_eq!(parsed.calendar.default_category, Some("work".to_string()));
        assert_eq!(parsed.reminder.default_lead_minutes, 15);
        Ok(())
    }
}
