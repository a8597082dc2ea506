//! User configuration at ~/.config/printcal/config.toml

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigParseError, PrintCalError, PrintCalResult};

static DEFAULT_CALENDAR_DIR: &str = "~/calendars";

fn default_calendar_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CALENDAR_DIR)
}

fn is_default_calendar_dir(p: &PathBuf) -> bool {
    *p == default_calendar_dir()
}

fn is_false(b: &bool) -> bool {
    !b
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_calendar_dir", skip_serializing_if = "is_default_calendar_dir")]
    pub calendar_dir: PathBuf,

    /// Per-calendar display settings, keyed by calendar name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub calendars: BTreeMap<String, CalendarSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarSettings {
    /// Hidden from the agenda
    #[serde(default, skip_serializing_if = "is_false")]
    pub disabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<CalendarColors>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarColors {
    pub background: String,
    pub text: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            calendar_dir: default_calendar_dir(),
            calendars: BTreeMap::new(),
        }
    }
}

impl UserConfig {
    pub fn config_path() -> PrintCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PrintCalError::Config("Could not determine config directory".into()))?
            .join("printcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location. A missing file gives the defaults.
    pub fn load() -> PrintCalResult<Self> {
        Ok(Self::load_from(&Self::config_path()?)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigParseError> {
        let config: UserConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Parse TOML text. Malformed text is an error, never the defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigParseError> {
        Ok(toml::from_str(content)?)
    }

    pub fn save_to(&self, path: &Path) -> PrintCalResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| PrintCalError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// The calendar directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.calendar_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn is_disabled(&self, name: &str) -> bool {
        self.calendars.get(name).is_some_and(|c| c.disabled)
    }

    pub fn colors(&self, name: &str) -> Option<&CalendarColors> {
        self.calendars.get(name).and_then(|c| c.colors.as_ref())
    }

    /// Set the disabled flag, creating settings for `name` if needed.
    pub fn set_disabled(&mut self, name: &str, disabled: bool) {
        self.calendars.entry(name.to_string()).or_default().disabled = disabled;
    }
}
