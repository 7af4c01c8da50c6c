//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`.

use std::{collections::BTreeMap, path::PathBuf};

use crate::{
    Collection, Config, ConfigError, SearchSettings,
    discovery::is_global_config,
    parse::{RawConfig, RawSearchSettings},
    resolve::resolve_base_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory containing the config file.
    fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default()
    }
}

/// Merges configuration files into a single resolved `Config`.
///
/// Configs are given highest precedence first. Scalar settings take the first defined value;
/// collections merge by id and the first definition wins completely.
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let Some(first) = configs.first() else {
        return Ok(Config::default());
    };

    let search = merge_search_settings(configs)?;
    let collections = merge_collections(configs);

    Ok(Config {
        search,
        collections,
        config_root: Some(first.dir()),
    })
}

/// Merges search settings, lowest precedence first so closer files overwrite.
fn merge_search_settings(configs: &[ParsedConfig]) -> Result<SearchSettings, ConfigError> {
    let mut result = SearchSettings::default();
    for parsed in configs.iter().rev() {
        if let Some(ref search) = parsed.config.search {
            apply_raw_search(&mut result, search, parsed)?;
        }
    }
    Ok(result)
}

/// Applies raw search settings to result, resolving `base_path` against the defining file.
fn apply_raw_search(
    result: &mut SearchSettings,
    raw: &RawSearchSettings,
    source: &ParsedConfig,
) -> Result<(), ConfigError> {
    if let Some(ref v) = raw.base_path {
        result.base_path = Some(resolve_base_path(v, &source.dir())?);
    }
    if let Some(v) = raw.stemming {
        result.stemming = v;
    }
    if let Some(ref v) = raw.server_url {
        result.server_url = Some(v.clone());
    }
    if let Some(v) = raw.server_timeout_ms {
        result.server_timeout_ms = v;
    }
    if let Some(ref v) = raw.highlight_class {
        result.highlight_class = v.clone();
    }
    Ok(())
}

/// Merges collections by id. The first definition wins; output is sorted by id.
fn merge_collections(configs: &[ParsedConfig]) -> Vec<Collection> {
    let mut merged: BTreeMap<String, Collection> = BTreeMap::new();

    for parsed in configs {
        let Some(ref collections) = parsed.config.collection else {
            continue;
        };
        let is_global = is_global_config(&parsed.path);
        for (id, raw) in collections {
            merged.entry(id.clone()).or_insert_with(|| Collection {
                id: id.clone(),
                title: raw.title.clone(),
                divisions: raw
                    .divisions
                    .iter()
                    .flatten()
                    .map(|code| code.trim().to_uppercase())
                    .filter(|code| !code.is_empty())
                    .collect(),
                is_global,
            });
        }
    }

    merged.into_values().collect()
}
