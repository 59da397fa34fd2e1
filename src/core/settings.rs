// src/core/settings.rs

use crate::{
    core::paths::{self, PathError},
    models::ClientSettings,
};
use std::{fs, path::Path};
use thiserror::Error;

/// Errors loading or creating the client settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings location could not be resolved.
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// The settings file could not be read or written.
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid TOML.
    #[error("Failed to parse client settings: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// The default settings could not be serialized.
    #[error("Failed to serialize client settings: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Loads `~/.config/zprofiles/settings.toml`, writing the defaults on first use.
pub fn load_client_settings() -> Result<ClientSettings, SettingsError> {
    let path = paths::client_settings_path()?;
    load_client_settings_from(&path)
}

/// Loads client settings from an explicit path, creating it with defaults if missing.
pub fn load_client_settings_from(path: &Path) -> Result<ClientSettings, SettingsError> {
    if !path.exists() {
        let default_settings = ClientSettings::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_string = toml::to_string_pretty(&default_settings)?;
        fs::write(path, toml_string)?;
        log::debug!("Wrote default client settings to {}", path.display());
        Ok(default_settings)
    } else {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_CREDENTIAL_SERVICE;
    use tempfile::tempdir;

    #[test]
    fn test_missing_settings_are_created_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let settings = load_client_settings_from(&path).unwrap();

        assert_eq!(settings, ClientSettings::default());
        assert!(path.exists());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains(DEFAULT_CREDENTIAL_SERVICE));
    }

    #[test]
    fn test_existing_settings_are_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "credential_service = \"Team-Plugin\"\nprofile_types = [\"zosmf\", \"tso\", \"ssh\"]\n",
        )
        .unwrap();

        let settings = load_client_settings_from(&path).unwrap();

        assert_eq!(settings.credential_service, "Team-Plugin");
        assert_eq!(settings.profile_types, vec!["zosmf", "tso", "ssh"]);
        assert!(!settings.restricted_host);
    }

    #[test]
    fn test_malformed_settings_are_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "profile_types = 42").unwrap();

        assert!(matches!(
            load_client_settings_from(&path),
            Err(SettingsError::TomlParse(_))
        ));
    }
}
