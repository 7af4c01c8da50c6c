//! Configuration file parsing.
//!
//! Parses individual `.lectern.toml` files into `RawConfig` structures whose fields are all
//! optional until merging.

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::ConfigError;

/// Raw configuration as parsed directly from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here and ignore parent and global configs.
    pub root: Option<bool>,
    /// Search settings section.
    pub search: Option<RawSearchSettings>,
    /// Collection definitions: id -> collection defaults.
    pub collection: Option<HashMap<String, RawCollection>>,
}

/// Raw search settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSearchSettings {
    /// Directory or base URL holding the published collections.
    pub base_path: Option<String>,
    /// Whether stem shards are consulted.
    pub stemming: Option<bool>,
    /// Remote search endpoint.
    pub server_url: Option<String>,
    /// Remote request timeout in milliseconds.
    pub server_timeout_ms: Option<u64>,
    /// Highlight class name.
    pub highlight_class: Option<String>,
}

/// Raw collection definition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCollection {
    /// Display title.
    pub title: Option<String>,
    /// Default division filter.
    pub divisions: Option<Vec<String>>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&contents, path)
}

/// Parses configuration from a string, attributing errors to `path`.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns true if the file at `path` declares `root = true`.
///
/// Unreadable or malformed files are treated as non-root; the error surfaces later when the
/// file is parsed for real.
pub fn is_root_config(path: &Path) -> bool {
    parse_config_file(path).is_ok_and(|config| config.root == Some(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<RawConfig, ConfigError> {
        parse_config_str(contents, Path::new("test.toml"))
    }

    #[test]
    fn empty_file_parses() {
        let config = parse("").unwrap();
        assert!(config.root.is_none());
        assert!(config.search.is_none());
        assert!(config.collection.is_none());
    }

    #[test]
    fn parses_all_sections() {
        let config = parse(
            r#"
root = true

[search]
base_path = "texts"
stemming = false
server_url = "https://example.org/search"
server_timeout_ms = 1500
highlight_class = "hit"

[collection.eng_kjv]
title = "King James Version"
divisions = ["MT", "JN"]
"#,
        )
        .unwrap();

        assert_eq!(config.root, Some(true));
        let search = config.search.unwrap();
        assert_eq!(search.base_path.as_deref(), Some("texts"));
        assert_eq!(search.stemming, Some(false));
        assert_eq!(search.server_timeout_ms, Some(1500));
        assert_eq!(search.highlight_class.as_deref(), Some("hit"));
        let kjv = &config.collection.unwrap()["eng_kjv"];
        assert_eq!(kjv.title.as_deref(), Some("King James Version"));
        assert_eq!(kjv.divisions.as_deref().map(<[String]>::len), Some(2));
    }

    #[test]
    fn partial_collection_parses() {
        let config = parse("[collection.web]\n").unwrap();
        let web = &config.collection.unwrap()["web"];
        assert!(web.title.is_none());
        assert!(web.divisions.is_none());
    }

    #[test]
    fn type_errors_name_the_file() {
        let err = parse("[search]\nstemming = \"yes\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
        assert!(err.to_string().contains("test.toml"));
    }

    #[test]
    fn root_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".lectern.toml");

        fs::write(&path, "root = true\n").unwrap();
        assert!(is_root_config(&path));

        fs::write(&path, "root = false\n").unwrap();
        assert!(!is_root_config(&path));

        fs::write(&path, "root = [").unwrap();
        assert!(!is_root_config(&path));

        assert!(!is_root_config(&dir.path().join("missing.toml")));
    }
}
