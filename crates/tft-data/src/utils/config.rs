//! Fusion configuration management utilities.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;

pub const CONFIG_FILE_NAME: &str = "tft-data.toml";

/// Release and language selection stored in tft-data.toml.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FusionConfig {
    /// Community Dragon version path segment, e.g. `latest` or `14.1`.
    pub community_dragon: String,
    /// Data Dragon release, e.g. `14.1.1`. The newest release is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dragon: Option<String>,
    /// Set mutator selecting champions and traits, e.g. `TFTSet10`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    pub languages: Vec<String>,
    pub output_dir: Utf8PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides_dir: Option<Utf8PathBuf>,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            community_dragon: "latest".to_string(),
            data_dragon: None,
            set: None,
            languages: vec!["en_us".to_string()],
            output_dir: Utf8PathBuf::from("data"),
            overrides_dir: None,
        }
    }
}

/// Values given on the command line. Each one that is set replaces the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub community_dragon: Option<String>,
    pub data_dragon: Option<String>,
    pub set: Option<String>,
    pub languages: Vec<String>,
    pub output_dir: Option<Utf8PathBuf>,
    pub overrides_dir: Option<Utf8PathBuf>,
}

impl FusionConfig {
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(community_dragon) = overrides.community_dragon {
            self.community_dragon = community_dragon;
        }
        if overrides.data_dragon.is_some() {
            self.data_dragon = overrides.data_dragon;
        }
        if overrides.set.is_some() {
            self.set = overrides.set;
        }
        if !overrides.languages.is_empty() {
            self.languages = overrides.languages;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if overrides.overrides_dir.is_some() {
            self.overrides_dir = overrides.overrides_dir;
        }
        self
    }

    /// The configured set mutator.
    pub fn require_set(&self) -> Result<&str, CliError> {
        self.set
            .as_deref()
            .ok_or(CliError::MissingSetting { name: "set" })
    }
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns the default configuration file path (tft-data.toml next to the executable).
pub fn default_config_path() -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads the configuration from `path`, or from the default location.
///
/// An explicitly given file must exist. A missing default file yields the
/// default configuration. Returns the path the configuration was read from.
pub fn load_config(
    path: Option<&Utf8Path>,
) -> Result<(FusionConfig, Option<Utf8PathBuf>), CliError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok((FusionConfig::default(), None)),
        },
    };

    let content = fs::read_to_string(&path)?;
    let cfg = parse_config(&path, &content)?;
    tracing::debug!("Loaded configuration from {}", path);
    Ok((cfg, Some(path)))
}

fn parse_config(path: &Utf8Path, content: &str) -> Result<FusionConfig, CliError> {
    toml::from_str(content).map_err(|e| CliError::config_parse_error(path.to_path_buf(), e))
}

/// Saves the configuration to `path`.
pub fn save_config(path: &Utf8Path, cfg: &FusionConfig) -> io::Result<()> {
    let content = toml::to_string_pretty(cfg).map_err(io::Error::other)?;
    fs::write(path, content)
}
