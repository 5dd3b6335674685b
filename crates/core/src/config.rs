//! Application configuration loaded from defaults, a TOML file and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Origin used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Prefix for environment overrides (`INSIGHTIQ_API_BASE`, ...).
pub const ENV_PREFIX: &str = "INSIGHTIQ";

static CONFIG_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("insightiq")
});

const DEFAULT_CONFIG: &str = r#"# InsightIQ client configuration.
# Every key can also be set through the environment, e.g. INSIGHTIQ_API_BASE.

# Origin serving the /api endpoints.
api_base = "http://localhost:8000"

# File remembering the last selected domain.
# state_path = "/home/user/.config/insightiq/state.json"

# Directory receiving exported insight text.
# export_dir = "."
"#;

/// Runtime settings for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Single origin for every API call, fixed for the process lifetime.
    pub api_base: String,
    /// Durable key-value file holding the selected domain.
    pub state_path: PathBuf,
    /// Destination directory for exported insight text.
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            state_path: CONFIG_ROOT.join("state.json"),
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load configuration from `path` (optional) layered under the environment.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let mut config: AppConfig = settings
            .try_deserialize()
            .context("failed to deserialize configuration")?;
        config.api_base = config.api_base.trim_end_matches('/').to_string();
        Ok(config)
    }
}

/// Location of the user configuration file.
pub fn config_path() -> PathBuf {
    CONFIG_ROOT.join("config.toml")
}

/// Write a commented default configuration file when none exists yet.
pub fn ensure_default_config() -> Result<()> {
    write_default_config(config_path())
}

fn write_default_config(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.state_path.ends_with("state.json"));
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "api_base = \"https://intel.example.com/\"\nexport_dir = \"/tmp/exports\"\n",
        )?;
        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.api_base, "https://intel.example.com");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
        Ok(())
    }

    #[test]
    fn default_file_is_written_once_and_parses() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/config.toml");
        write_default_config(&path)?;
        assert!(path.exists());
        fs::write(&path, "api_base = \"http://kept\"\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "api_base = \"http://kept\"\n");
        Ok(())
    }
}
