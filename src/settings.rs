use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};
use crate::sankey::formatters::{OutputFormat, DEFAULT_SANKEYMATIC_URL};

/// User defaults read from `~/.config/fireflow/settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_sankeymatic_url")]
    pub sankeymatic_url: String,
    #[serde(default)]
    pub exclude_accounts: Vec<String>,
    #[serde(default)]
    pub exclude_categories: Vec<String>,
    #[serde(default)]
    pub exclude_budgets: Vec<String>,
    #[serde(default)]
    pub exclude_tags: Vec<String>,
}

fn default_sankeymatic_url() -> String {
    DEFAULT_SANKEYMATIC_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            sankeymatic_url: default_sankeymatic_url(),
            exclude_accounts: Vec::new(),
            exclude_categories: Vec::new(),
            exclude_budgets: Vec::new(),
            exclude_tags: Vec::new(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fireflow")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn settings_file_exists() -> bool {
    settings_path().exists()
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> Settings {
    let path = settings_path();
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FlowError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}
