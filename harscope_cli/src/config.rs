//! Configuration directories and persisted viewer preferences

use anyhow::{Context, Result};
use harscope_core::RowSize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Smallest detail pane, in lines
pub const MIN_DETAIL_HEIGHT: u16 = 6;
/// Largest detail pane, in lines
pub const MAX_DETAIL_HEIGHT: u16 = 40;

/// Get the configuration directory path
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("harscope")
    }

    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".harscope")
    }
}

/// Get the preferences file path
pub fn preferences_file() -> PathBuf {
    config_dir().join("preferences.yml")
}

/// Get the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Get the log file written while the viewer owns the terminal
pub fn log_file() -> PathBuf {
    logs_dir().join("harscope.log")
}

/// Ensure all config directories exist
pub fn ensure_dirs() -> Result<()> {
    let config = config_dir();
    let logs = logs_dir();

    fs::create_dir_all(&config).context("Failed to create config directory")?;
    fs::create_dir_all(&logs).context("Failed to create logs directory")?;

    Ok(())
}

/// UI preferences. None of these affect what the view contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Two-line table rows
    #[serde(default)]
    pub big_rows: bool,

    /// Show the category chips bar
    #[serde(default = "default_true")]
    pub show_filters: bool,

    /// Show the timeline overview
    #[serde(default = "default_true")]
    pub show_overview: bool,

    /// Detail pane height in lines
    #[serde(default = "default_detail_height")]
    pub detail_pane_height: u16,
}

fn default_true() -> bool {
    true
}

fn default_detail_height() -> u16 {
    14
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            big_rows: false,
            show_filters: true,
            show_overview: true,
            detail_pane_height: default_detail_height(),
        }
    }
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file is missing
    /// or unreadable
    pub fn load() -> Self {
        let path = preferences_file();
        match Self::load_from(&path) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Ignoring preferences at {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load preferences from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).context("Failed to read preferences file")?;
        let mut prefs: Preferences =
            serde_yaml::from_str(&content).context("Failed to parse preferences file")?;
        prefs.clamp_detail_height();

        Ok(prefs)
    }

    /// Save preferences to file
    pub fn save(&self) -> Result<()> {
        ensure_dirs()?;
        self.save_to(&preferences_file())
    }

    /// Save preferences to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize preferences")?;
        fs::write(path, content).context("Failed to write preferences file")?;
        Ok(())
    }

    pub fn row_size(&self) -> RowSize {
        if self.big_rows {
            RowSize::Big
        } else {
            RowSize::Compact
        }
    }

    /// Grow or shrink the detail pane, staying within bounds
    pub fn resize_detail(&mut self, delta: i16) {
        self.detail_pane_height = self.detail_pane_height.saturating_add_signed(delta);
        self.clamp_detail_height();
    }

    fn clamp_detail_height(&mut self) {
        self.detail_pane_height = self
            .detail_pane_height
            .clamp(MIN_DETAIL_HEIGHT, MAX_DETAIL_HEIGHT);
    }
}
