//! Environment/runtime helpers

use std::path::{Path, PathBuf};

/// Load `.env` if present and return the file that was read.
///
/// Runs before logging is installed, so callers report the result themselves.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Load a specific env file; `None` when it is missing or unreadable.
pub fn load_dotenv_from(path: &Path) -> Option<PathBuf> {
    dotenvy::from_path(path).ok().map(|()| path.to_path_buf())
}

/// Read an environment variable and parse it, ignoring unset or malformed values.
pub fn var_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse::<T>().ok())
}
