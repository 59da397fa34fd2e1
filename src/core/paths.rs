// src/core/paths.rs

use crate::constants::{
    CLI_HOME_ENV_SUFFIX, CLIENT_SETTINGS_FILENAME, DEFAULT_HOME_DIR, ENV_PREFIX,
    IMPERATIVE_SETTINGS_FILENAME, PROFILES_DIR, SETTINGS_DIR,
};
use lazy_static::lazy_static;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

lazy_static! {
    static ref DEFAULT_CLI_HOME: Mutex<Option<PathBuf>> = Mutex::new(None);
}

/// Errors resolving the profile root or the client settings location.
#[derive(Error, Debug)]
pub enum PathError {
    /// The platform reports no home directory.
    #[error("Could not find the user's home directory.")]
    HomeDirNotFound,
    /// The platform reports no configuration directory.
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    /// A `~` or `$VAR` in the profile root could not be expanded.
    #[error("Failed to expand profile root '{value}': {message}")]
    Expansion {
        /// The unexpanded value.
        value: String,
        /// Why expansion failed.
        message: String,
    },
}

/// The name of the environment variable that overrides the profile root (`ZOWE_CLI_HOME`).
pub fn cli_home_env_var() -> String {
    format!("{}{}", ENV_PREFIX, CLI_HOME_ENV_SUFFIX)
}

/// Resolves the profile root.
///
/// Priority: explicit override (e.g. from client settings), then the
/// `ZOWE_CLI_HOME` environment variable, then `<user-home>/.zowe`.
pub fn resolve_cli_home(override_value: Option<&str>) -> Result<PathBuf, PathError> {
    if let Some(value) = override_value.filter(|v| !v.trim().is_empty()) {
        return expand_home_template(value);
    }
    match env::var(cli_home_env_var()) {
        Ok(value) if !value.trim().is_empty() => {
            log::debug!("Profile root taken from {}", cli_home_env_var());
            expand_home_template(&value)
        }
        _ => get_default_cli_home(),
    }
}

/// Returns `<user-home>/.zowe`.
///
/// This function is memoized: the first call computes and caches the path,
/// subsequent calls return the cached value.
pub fn get_default_cli_home() -> Result<PathBuf, PathError> {
    let mut cached = DEFAULT_CLI_HOME
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let home = dirs::home_dir()
        .ok_or(PathError::HomeDirNotFound)?
        .join(DEFAULT_HOME_DIR);

    *cached = Some(home.clone());
    Ok(home)
}

/// Expands `~` and environment variables (`$VAR`) in a profile root value.
pub fn expand_home_template(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template.trim()).map_err(|e| PathError::Expansion {
        value: template.to_string(),
        message: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// `<root>/profiles`, the directory every profile manager is rooted at.
pub fn profiles_dir(cli_home: &Path) -> PathBuf {
    cli_home.join(PROFILES_DIR)
}

/// `<root>/profiles/<type>`.
pub fn type_dir(cli_home: &Path, profile_type: &str) -> PathBuf {
    profiles_dir(cli_home).join(profile_type)
}

/// `<root>/settings/imperative.json`.
pub fn imperative_settings_path(cli_home: &Path) -> PathBuf {
    cli_home.join(SETTINGS_DIR).join(IMPERATIVE_SETTINGS_FILENAME)
}

/// Returns the path to the client `settings.toml` (`~/.config/zprofiles/settings.toml`).
pub fn client_settings_path() -> Result<PathBuf, PathError> {
    dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join(CLIENT_SETTINGS_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_name_follows_prefix_convention() {
        assert_eq!(cli_home_env_var(), "ZOWE_CLI_HOME");
    }

    #[test]
    fn test_explicit_override_wins() {
        let resolved = resolve_cli_home(Some("/srv/zowe-home")).unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/zowe-home"));
    }

    #[test]
    fn test_blank_override_is_ignored() {
        // Falls through to the environment or the default; both are absolute.
        let resolved = resolve_cli_home(Some("   ")).unwrap();
        assert_ne!(resolved, PathBuf::from("   "));
    }

    #[test]
    fn test_default_home_is_memoized() {
        let first = get_default_cli_home().unwrap();
        let second = get_default_cli_home().unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with(DEFAULT_HOME_DIR));
    }

    #[test]
    fn test_layout_helpers() {
        let root = Path::new("/home/user/.zowe");
        assert_eq!(
            type_dir(root, "zosmf"),
            PathBuf::from("/home/user/.zowe/profiles/zosmf")
        );
        assert_eq!(
            imperative_settings_path(root),
            PathBuf::from("/home/user/.zowe/settings/imperative.json")
        );
    }
}
