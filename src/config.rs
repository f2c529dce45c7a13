use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::DEFAULT_DELAY_THRESHOLD;

pub const DEFAULT_DATABASE: &str = "data/flights.sqlite3";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Contents of `flightstats.toml`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FlightstatsConfig {
    pub database: Option<String>,
    /// Minutes of departure delay that count as "delayed"
    pub delay_threshold: Option<u32>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Values given on the command line; they win over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub delay_threshold: Option<u32>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Fully resolved runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database: PathBuf,
    pub delay_threshold: u32,
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn resolve(config: Option<&FlightstatsConfig>, overrides: Overrides) -> Self {
        let config = config.cloned().unwrap_or_default();
        Self {
            database: overrides
                .database
                .or_else(|| config.database.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            delay_threshold: overrides
                .delay_threshold
                .or(config.delay_threshold)
                .unwrap_or(DEFAULT_DELAY_THRESHOLD),
            host: overrides
                .host
                .or(config.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(config.port).unwrap_or(DEFAULT_PORT),
        }
    }
}

impl FlightstatsConfig {
    /// A config with every default written out, used by `flightstats init`
    pub fn with_defaults() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            delay_threshold: Some(DEFAULT_DELAY_THRESHOLD),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("flightstats.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<FlightstatsConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FlightstatsConfig = toml::from_str(&contents)
        .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &FlightstatsConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
