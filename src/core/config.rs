use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::constants::DEFAULT_REPLY_TIMEOUT_SECS;

/// Persistent settings, loaded from `config.toml` in the platform config
/// directory. Every field is optional; a missing file yields the defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Local markdown file served as the canned reply.
    pub reply_file: Option<String>,
    /// HTTP resource served as the canned reply; takes precedence over
    /// `reply_file` when both are set.
    pub reply_url: Option<String>,
    /// UI theme name ("dark" or "light").
    pub theme: Option<String>,
    /// Enable markdown rendering for assistant messages.
    pub markdown: Option<bool>,
    /// Enable syntax highlighting for fenced code blocks when markdown is enabled.
    pub syntax: Option<bool>,
    /// Bound on a single reply fetch, in seconds.
    pub reply_timeout_secs: Option<u64>,
    /// Append a plain-text transcript of the conversation to this file.
    pub transcript_file: Option<String>,
    /// Write tracing diagnostics to this file (the terminal belongs to the TUI).
    pub debug_log_file: Option<String>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn std::error::Error>> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let proj_dirs = ProjectDirs::from("org", "permacommons", "causerie")
            .ok_or("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn syntax_enabled(&self) -> bool {
        self.syntax.unwrap_or(true)
    }

    pub fn reply_timeout(&self) -> Duration {
        Duration::from_secs(self.reply_timeout_secs.unwrap_or(DEFAULT_REPLY_TIMEOUT_SECS))
    }
}
