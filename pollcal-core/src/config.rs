//! Global pollcal configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_COLOR, DEFAULT_HOUR_HEIGHT_PX, DEFAULT_TITLE, MIN_BLOCK_HEIGHT_PX};
use crate::error::{PollCalError, PollCalResult};
use crate::event::RecordDefaults;
use crate::store::{EventStore, FileSlot};
use crate::timeline::TimelineLayout;

static DEFAULT_STORE_PATH: &str = "~/.local/share/pollcal/events.json";

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

fn default_hour_height() -> u32 {
    DEFAULT_HOUR_HEIGHT_PX
}

fn default_min_block_height() -> u32 {
    MIN_BLOCK_HEIGHT_PX
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// Configuration at ~/.config/pollcal/config.toml, overridable with
/// `POLLCAL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PollCalConfig {
    /// File holding the event list. `~` is expanded.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    #[serde(default = "default_hour_height")]
    pub hour_height_px: u32,

    #[serde(default = "default_min_block_height")]
    pub min_block_height_px: u32,

    #[serde(default = "default_color")]
    pub default_color: String,

    #[serde(default = "default_title")]
    pub default_title: String,
}

impl Default for PollCalConfig {
    fn default() -> Self {
        PollCalConfig {
            store_path: default_store_path(),
            hour_height_px: default_hour_height(),
            min_block_height_px: default_min_block_height(),
            default_color: default_color(),
            default_title: default_title(),
        }
    }
}

impl PollCalConfig {
    /// Load the user's config, creating a commented default file on first run.
    pub fn load() -> PollCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file (which may be missing) plus the environment.
    pub fn load_from(path: &Path) -> PollCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("POLLCAL"))
            .build()
            .map_err(|e| PollCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PollCalError::Config(e.to_string()))
    }

    pub fn config_path() -> PollCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PollCalError::Config("Could not determine config directory".into()))?
            .join("pollcal");

        Ok(config_dir.join("config.toml"))
    }

    pub fn store_path(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.store_path.to_string_lossy()).into_owned();
        PathBuf::from(expanded)
    }

    /// Store backed by the configured file.
    pub fn open_store(&self) -> EventStore<FileSlot> {
        EventStore::with_defaults(FileSlot::new(self.store_path()), self.record_defaults())
    }

    pub fn record_defaults(&self) -> RecordDefaults {
        RecordDefaults {
            title: self.default_title.clone(),
            color: self.default_color.clone(),
        }
    }

    pub fn timeline(&self) -> TimelineLayout {
        TimelineLayout::new(self.hour_height_px).with_min_block_height(self.min_block_height_px)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PollCalResult<()> {
        let contents = format!(
            "\
# pollcal configuration

# Where events are stored:
# store_path = \"{DEFAULT_STORE_PATH}\"

# Pixel height of one hour on the day timeline:
# hour_height_px = {DEFAULT_HOUR_HEIGHT_PX}

# Smallest block height, so short events stay clickable:
# min_block_height_px = {MIN_BLOCK_HEIGHT_PX}

# Color and title for events created without one:
# default_color = \"{DEFAULT_COLOR}\"
# default_title = \"{DEFAULT_TITLE}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PollCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PollCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
