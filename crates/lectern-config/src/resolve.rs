//! Path resolution for `base_path`.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ConfigError;

/// Returns true if `base` is an `http://` or `https://` URL.
pub fn is_url(base: &str) -> bool {
    base.starts_with("http://") || base.starts_with("https://")
}

/// Resolves a configured `base_path` against the directory of the file that defined it.
///
/// URLs pass through untouched. Tilde paths expand to the home directory; relative paths
/// are joined onto `config_dir`. The path is not required to exist.
pub fn resolve_base_path(base: &str, config_dir: &Path) -> Result<String, ConfigError> {
    if is_url(base) {
        return Ok(base.to_string());
    }

    let expanded = expand_tilde(base)?;
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    };
    Ok(absolute.to_string_lossy().into_owned())
}

/// Expands a leading `~` to the home directory.
fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Returns the home directory.
fn home_dir() -> Result<PathBuf, ConfigError> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(ConfigError::NoHomeDirectory)
}
