use crate::format::{DEFAULT_PATTERN, DurationFormat, Field};
use crate::stopwatch::TickUnit;
use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::path::PathBuf;

pub const APP_DIR: &str = ".durfmt";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub stopwatch: StopwatchConfig,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    /// Pattern used by `time` and `render` when no `--format` is given
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Append milliseconds in the `1h 2m 3s` style
    #[serde(default)]
    pub units_include_millis: bool,
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            units_include_millis: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StopwatchConfig {
    #[serde(default)]
    pub unit: TickUnit,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StateConfig {
    /// Optional override for state directory (for testing)
    pub state_dir_override: Option<PathBuf>,
}

impl DisplayConfig {
    /// Validate that the pattern builds a format that can also parse
    pub fn validate(&self) -> Result<()> {
        let format = self.format()?;
        if !format.has(Field::Seconds) {
            anyhow::bail!(
                "Display pattern '{}' has no seconds field",
                self.pattern
            );
        }
        Ok(())
    }

    pub fn format(&self) -> Result<DurationFormat> {
        DurationFormat::new(&self.pattern)
            .with_context(|| format!("Invalid display pattern '{}'", self.pattern))
    }
}

impl Config {
    /// Validate all configuration
    pub fn validate(&self) -> Result<()> {
        self.display.validate()?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let home = home::home_dir().context("Could not find home directory")?;
    Ok(home.join(APP_DIR).join("config.toml"))
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let loader = ConfigBuilder::builder()
        .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
        .build()
        .context("Failed to build config loader")?;

    let config: Config = loader
        .try_deserialize()
        .context("Failed to parse config file")?;

    config.validate()?;
    Ok(config)
}

pub fn save_to_path<P: AsRef<Path>>(config: &Config, path: P) -> Result<()> {
    let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;

    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml_string).context("Failed to write config file")?;

    Ok(())
}

/// Set a dotted key (e.g. `display.pattern`) in the TOML file at `path`.
///
/// The value is stored as a boolean when it reads as one, otherwise as a
/// string. The resulting file must still load as a valid config.
pub fn set_in_path<P: AsRef<Path>>(path: P, key: &str, value: &str) -> Result<Config> {
    let path = path.as_ref();
    let mut table: toml::Table = if path.exists() {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        content.parse().context("Failed to parse config file")?
    } else {
        toml::Table::new()
    };

    let mut parts: Vec<&str> = key.split('.').collect();
    let leaf = parts
        .pop()
        .filter(|leaf| !leaf.is_empty())
        .with_context(|| format!("Invalid key: '{key}'"))?;

    let mut current = &mut table;
    for part in parts {
        current = current
            .entry(part)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()))
            .as_table_mut()
            .with_context(|| format!("Key '{part}' is not a section"))?;
    }

    let parsed = match value {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        other => toml::Value::String(other.to_string()),
    };
    current.insert(leaf.to_string(), parsed);

    let config: Config = toml::Value::Table(table.clone())
        .try_into()
        .with_context(|| format!("Invalid value for '{key}'"))?;
    config.validate()?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&table).context("Failed to serialize config")?;
    std::fs::write(path, content).context("Failed to write config file")?;

    Ok(config)
}
