//! Shared context for running CLI commands.

use std::{env, path::PathBuf, process::ExitCode};

use lectern_config::Config;
use lectern_index::{
    DivisionFilter, Fetcher, FetcherContentStore, SearchOptions, ServerSearch, ShardStore,
    TextSearch,
};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// The orchestrator as configured from `.lectern.toml`.
pub type Engine = TextSearch<Fetcher, FetcherContentStore<Fetcher>>;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (default if no config files were found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = Config::load(&cwd).map_err(|e| {
            eprintln!("error: failed to load configuration: {e}");
            ExitCode::FAILURE
        })?;
        debug!(root = ?config.config_root, "configuration loaded");
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used by `init`, which must work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Returns a fetcher for the configured `base_path`.
    pub fn fetcher(&self) -> Result<Fetcher, ExitCode> {
        let Some(base) = self.config.search.base_path.as_deref() else {
            eprintln!("error: no base_path configured");
            eprintln!("Run 'lectern init' to create a configuration file, then set [search] base_path.");
            return Err(ExitCode::FAILURE);
        };
        Fetcher::from_base(base, self.config.search.server_timeout()).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Returns a shard store for metadata lookups.
    pub fn shard_store(&self) -> Result<ShardStore<Fetcher>, ExitCode> {
        self.fetcher().map(ShardStore::new)
    }

    /// Builds the search orchestrator from the configuration.
    pub fn engine(&self) -> Result<Engine, ExitCode> {
        let fetcher = self.fetcher()?;
        let search = &self.config.search;

        let server = match search.server_url.as_deref() {
            Some(url) => Some(ServerSearch::new(url, search.server_timeout()).map_err(|e| {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            })?),
            None => None,
        };

        let options = SearchOptions {
            stemming: search.stemming,
            highlight_class: search.highlight_class.clone(),
            server,
        };
        Ok(TextSearch::new(
            fetcher.clone(),
            FetcherContentStore::new(fetcher),
            options,
        ))
    }

    /// Returns the division filter for a search: explicit codes win over the collection's
    /// configured default.
    pub fn divisions(&self, collection_id: &str, explicit: &[String]) -> DivisionFilter {
        if !explicit.is_empty() {
            return DivisionFilter::new(explicit);
        }
        self.config
            .collection(collection_id)
            .map(|c| DivisionFilter::new(&c.divisions))
            .unwrap_or_default()
    }
}

/// Builds the single-threaded runtime a command runs its async work on.
pub fn runtime() -> Result<Runtime, ExitCode> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            eprintln!("error: failed to start async runtime: {e}");
            ExitCode::FAILURE
        })
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use lectern_config::{Collection, SearchSettings};

    use super::*;

    fn context(search: SearchSettings) -> CommandContext {
        CommandContext {
            cwd: PathBuf::from("/"),
            config: Config {
                search,
                collections: vec![Collection {
                    id: "eng_kjv".into(),
                    title: None,
                    divisions: vec!["JN".into()],
                    is_global: false,
                }],
                config_root: None,
            },
        }
    }

    #[test]
    fn explicit_divisions_override_configured() {
        let ctx = context(SearchSettings::default());
        assert_eq!(ctx.divisions("eng_kjv", &[]).codes(), ["JN"]);
        assert_eq!(ctx.divisions("eng_kjv", &["rv".into()]).codes(), ["RV"]);
        assert!(ctx.divisions("other", &[]).is_empty());
    }

    #[test]
    fn missing_base_path_fails() {
        let ctx = context(SearchSettings::default());
        assert!(ctx.fetcher().is_err());
    }

    #[test]
    fn base_path_selects_transport() {
        let local = context(SearchSettings {
            base_path: Some("/srv/texts".into()),
            ..SearchSettings::default()
        });
        assert!(matches!(local.fetcher(), Ok(Fetcher::Fs(_))));

        let remote = context(SearchSettings {
            base_path: Some("https://example.org/texts".into()),
            ..SearchSettings::default()
        });
        assert!(matches!(remote.fetcher(), Ok(Fetcher::Http(_))));
    }
}
