// Configuration loaded from ~/.jobdesk/rc
//
// Format is one `key=value` per line. Blank lines and lines starting with '#'
// are skipped.

use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use crate::models::Role;

/// Default delivered status code for staff quick changes
pub const DEFAULT_DELIVERED_STATUS: &str = "delivered";

/// Default page size for job lists
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Hard bounds for page size
pub const MIN_PAGE_LIMIT: u32 = 1;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_location: PathBuf,
    pub role: Role,
    pub delivered_status: String,
    pub page_limit: u32,
}

impl Config {
    /// Home directory: $HOME first (tests override it), then the platform default
    pub fn home_dir() -> Result<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            if !home.is_empty() {
                return Ok(PathBuf::from(home));
            }
        }
        dirs::home_dir().context("Could not determine home directory")
    }

    pub fn config_dir() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join(".jobdesk"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("rc"))
    }

    /// Defaults rooted at the given config directory
    pub fn defaults(config_dir: &Path) -> Self {
        Self {
            data_location: config_dir.join("jobs.db"),
            role: Role::Staff,
            delivered_status: DEFAULT_DELIVERED_STATUS.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Load the rc file, falling back to defaults when it does not exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let config_dir = Self::config_dir()?;

        if !config_path.exists() {
            return Ok(Self::defaults(&config_dir));
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        Self::parse(&content, &config_dir)
    }

    /// Parse rc content. Relative data paths resolve against `config_dir`.
    pub fn parse(content: &str, config_dir: &Path) -> Result<Self> {
        let mut config = Self::defaults(config_dir);

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                anyhow::bail!("Malformed config line {}: '{}'", line_no + 1, line);
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        config_dir.join(path)
                    } else {
                        path
                    };
                }
                "user.role" => {
                    config.role = Role::from_str(value).ok_or_else(|| {
                        anyhow::anyhow!("Invalid user.role '{}' (expected admin or staff)", value)
                    })?;
                }
                "workflow.delivered" => {
                    if value.is_empty() {
                        anyhow::bail!("workflow.delivered cannot be empty");
                    }
                    config.delivered_status = value.to_string();
                }
                "list.limit" => {
                    let limit: u32 = value
                        .parse()
                        .with_context(|| format!("Invalid list.limit '{}'", value))?;
                    config.page_limit = limit.clamp(MIN_PAGE_LIMIT, MAX_PAGE_LIMIT);
                }
                other => {
                    log::warn!("Ignoring unknown config key '{}'", other);
                }
            }
        }

        Ok(config)
    }
}
