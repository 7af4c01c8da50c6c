//! Configuration validation.
//!
//! Reports non-fatal problems with a loaded configuration.

use std::{fmt, path::Path};

use crate::{Config, resolve::is_url};

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No `base_path` is configured.
    NoBasePath,
    /// A filesystem `base_path` does not exist or is not a directory.
    BasePathMissing {
        /// The configured path.
        path: String,
    },
    /// `server_url` is not an `http(s)://` URL.
    ServerUrlInvalid {
        /// The configured value.
        url: String,
    },
    /// `highlight_class` is empty.
    EmptyHighlightClass,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBasePath => write!(f, "no base_path configured in [search]"),
            Self::BasePathMissing { path } => {
                write!(f, "base_path is not a directory: {path}")
            }
            Self::ServerUrlInvalid { url } => {
                write!(f, "server_url is not an http(s) URL: {url}")
            }
            Self::EmptyHighlightClass => write!(f, "highlight_class is empty"),
        }
    }
}

/// Checks a configuration for problems.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let search = &config.search;

    match search.base_path.as_deref() {
        None => warnings.push(ConfigWarning::NoBasePath),
        Some(base) if !is_url(base) && !Path::new(base).is_dir() => {
            warnings.push(ConfigWarning::BasePathMissing {
                path: base.to_string(),
            });
        }
        Some(_) => {}
    }

    if let Some(url) = search.server_url.as_deref()
        && !is_url(url)
    {
        warnings.push(ConfigWarning::ServerUrlInvalid {
            url: url.to_string(),
        });
    }

    if search.highlight_class.trim().is_empty() {
        warnings.push(ConfigWarning::EmptyHighlightClass);
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SearchSettings, test_support::TestDir};

    fn with_search(search: SearchSettings) -> Config {
        Config {
            search,
            ..Config::default()
        }
    }

    #[test]
    fn default_config_lacks_base_path() {
        assert_eq!(validate_config(&Config::default()), [ConfigWarning::NoBasePath]);
    }

    #[test]
    fn existing_directory_and_url_are_clean() {
        let test_dir = TestDir::new();
        let dir = test_dir.dir("texts");
        let local = with_search(SearchSettings {
            base_path: Some(dir.to_string_lossy().into_owned()),
            ..SearchSettings::default()
        });
        assert!(validate_config(&local).is_empty());

        let remote = with_search(SearchSettings {
            base_path: Some("https://example.org/texts".into()),
            server_url: Some("https://example.org/search".into()),
            ..SearchSettings::default()
        });
        assert!(validate_config(&remote).is_empty());
    }

    #[test]
    fn reports_each_problem() {
        let test_dir = TestDir::new();
        let file = test_dir.file("texts", "not a directory");
        let config = with_search(SearchSettings {
            base_path: Some(file.to_string_lossy().into_owned()),
            server_url: Some("example.org/search".into()),
            highlight_class: " ".into(),
            ..SearchSettings::default()
        });

        let warnings = validate_config(&config);
        assert_eq!(warnings.len(), 3);
        assert!(matches!(warnings[0], ConfigWarning::BasePathMissing { .. }));
        assert_eq!(
            warnings[1].to_string(),
            "server_url is not an http(s) URL: example.org/search"
        );
        assert_eq!(warnings[2], ConfigWarning::EmptyHighlightClass);
    }
}
