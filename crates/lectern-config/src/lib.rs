//! Configuration system for lectern.
//!
//! lectern uses TOML configuration files named `.lectern.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.lectern.toml` files found, then loading `~/.lectern.toml` as the global config with lowest
//! precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawCollection, RawConfig, RawSearchSettings, parse_config_file, parse_config_str,
};
pub use resolve::{is_url, resolve_base_path};
use serde::Serialize;
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for lectern.
///
/// This represents the fully resolved configuration after merging all discovered
/// `.lectern.toml` files according to precedence rules.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Search-related settings.
    pub search: SearchSettings,
    /// Collections with per-collection defaults, sorted by id.
    pub collections: Vec<Collection>,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.lectern.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Looks up a configured collection by id.
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML, in the same shape as a `.lectern.toml` file.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableConfig {
            search: &self.search,
            collection: self
                .collections
                .iter()
                .map(|c| {
                    (
                        c.id.as_str(),
                        SerializableCollection {
                            title: c.title.as_deref(),
                            divisions: &c.divisions,
                        },
                    )
                })
                .collect(),
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSettings {
    /// Where shards, info files and section content live: an absolute directory or an
    /// `http(s)://` base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    /// Whether stem shards are consulted.
    pub stemming: bool,
    /// Remote search endpoint tried before the local index.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Per-request timeout for remote fetches, in milliseconds.
    pub server_timeout_ms: u64,
    /// CSS class wrapped around highlighted matches.
    pub highlight_class: String,
}

impl SearchSettings {
    /// Returns the remote request timeout.
    pub fn server_timeout(&self) -> Duration {
        Duration::from_millis(self.server_timeout_ms)
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_path: None,
            stemming: true,
            server_url: None,
            server_timeout_ms: 5000,
            highlight_class: "highlight".to_string(),
        }
    }
}

/// A collection with its configured defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    /// Collection id, as used in shard paths.
    pub id: String,
    /// Display title.
    pub title: Option<String>,
    /// Default division filter (book codes). Empty means every division.
    pub divisions: Vec<String>,
    /// Whether this collection was defined in the global config.
    pub is_global: bool,
}

/// Effective config in file shape.
#[derive(Serialize)]
struct SerializableConfig<'a> {
    /// `[search]` table.
    search: &'a SearchSettings,
    /// `[collection.<id>]` tables.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    collection: BTreeMap<&'a str, SerializableCollection<'a>>,
}

/// One `[collection.<id>]` table.
#[derive(Serialize)]
struct SerializableCollection<'a> {
    /// Display title.
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    /// Default division filter.
    divisions: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(config.search.stemming);
        assert_eq!(config.search.highlight_class, "highlight");
        assert_eq!(config.search.server_timeout(), Duration::from_millis(5000));
        assert!(config.collections.is_empty());
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let config = Config {
            search: SearchSettings {
                base_path: Some("/srv/texts".into()),
                stemming: false,
                ..SearchSettings::default()
            },
            collections: vec![Collection {
                id: "eng_kjv".into(),
                title: Some("King James Version".into()),
                divisions: vec!["JN".into()],
                is_global: false,
            }],
            config_root: None,
        };

        let toml = config.settings_to_toml().unwrap();
        assert!(toml.contains("[search]"));
        assert!(toml.contains("[collection.eng_kjv]"));

        let raw = parse_config_str(&toml, Path::new("effective.toml")).unwrap();
        let search = raw.search.unwrap();
        assert_eq!(search.base_path.as_deref(), Some("/srv/texts"));
        assert_eq!(search.stemming, Some(false));
        assert_eq!(search.server_url, None);
        let collections = raw.collection.unwrap();
        assert_eq!(collections["eng_kjv"].divisions, Some(vec!["JN".to_string()]));
    }

    #[test]
    fn collection_lookup() {
        let config = Config {
            collections: vec![Collection {
                id: "a".into(),
                title: None,
                divisions: Vec::new(),
                is_global: true,
            }],
            ..Config::default()
        };
        assert!(config.collection("a").is_some_and(|c| c.is_global));
        assert!(config.collection("b").is_none());
    }
}
