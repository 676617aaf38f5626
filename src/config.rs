use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::selector::Distribution;
use crate::store::schema::DEFAULT_SAVE_KEY;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Namespace prefix for every stored key.
    #[serde(default = "default_save_key")]
    pub save_key: String,
    /// `embedded`, a JSON file path, or an http(s) URL.
    #[serde(default = "default_question_source")]
    pub question_source: String,
    #[serde(default)]
    pub distribution: Distribution,
    /// Overrides the platform data directory for stored progress.
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_save_key() -> String {
    DEFAULT_SAVE_KEY.to_string()
}
fn default_question_source() -> String {
    "embedded".to_string()
}
fn default_theme() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_key: default_save_key(),
            question_source: default_question_source(),
            distribution: Distribution::default(),
            data_dir: None,
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file gives defaults; an unreadable or malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;
            config.normalize();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leveltest")
            .join("config.toml")
    }

    /// Reset blank values left behind by hand-edited files.
    pub fn normalize(&mut self) {
        self.save_key = self.save_key.trim().to_string();
        if self.save_key.is_empty() {
            self.save_key = default_save_key();
        }
        self.question_source = self.question_source.trim().to_string();
        if self.question_source.is_empty() {
            self.question_source = default_question_source();
        }
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
        if self.data_dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
            self.data_dir = None;
        }
    }

    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(PathBuf::from)
    }
}
