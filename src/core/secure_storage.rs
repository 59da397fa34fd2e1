//! # Secure Storage
//!
//! Decides, from `<root>/settings/imperative.json`, whether secure credential
//! storage is configured, and if so installs a credential-manager backend into
//! the shared [`CredentialSlot`] before any profile load needs a secret.

use crate::{
    constants::{DEFAULT_CREDENTIAL_SERVICE, SECURE_MODULE_NAME},
    core::{
        credentials::{CredentialBackend, CredentialManager, CredentialSlot, KeyringBackend},
        paths,
    },
    models::ImperativeSettings,
};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

/// Errors reading the imperative settings file.
#[derive(Error, Debug)]
pub enum SecureStorageError {
    /// The settings file exists but could not be read.
    #[error("Failed to read settings file '{}': {source}", .path.display())]
    Read {
        /// The settings file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid JSON.
    #[error("Failed to parse settings file '{}': {source}", .path.display())]
    Parse {
        /// The settings file.
        path: PathBuf,
        /// The underlying parsing error.
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies a secret-storage backend for a module name, or `None` when the module
/// cannot be used in the current host.
pub trait BackendProvider: fmt::Debug + Send + Sync {
    /// The backend for `module_name`, if it can be used on this host.
    fn load(&self, module_name: &str, restricted_host: bool) -> Option<Arc<dyn CredentialBackend>>;
}

/// Serves the OS keychain for `keytar`/`keyring` on unrestricted hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBackendProvider;

impl BackendProvider for DefaultBackendProvider {
    fn load(&self, module_name: &str, restricted_host: bool) -> Option<Arc<dyn CredentialBackend>> {
        if restricted_host {
            log::debug!(
                "Secret storage module '{}' is not reachable from a restricted host",
                module_name
            );
            return None;
        }
        match module_name {
            "keytar" | "keyring" => Some(Arc::new(KeyringBackend)),
            other => {
                log::debug!("Unknown secret storage module '{}'", other);
                None
            }
        }
    }
}

/// What a call to [`SecureStorageActivator::activate`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// The settings file names no credential manager (or could not be read).
    Disabled,
    /// A credential manager was already in place; nothing was touched.
    AlreadyInitialized,
    /// Secure storage is configured but no backend could be obtained.
    BackendUnavailable,
    /// A backend was installed under the given service namespace.
    Installed {
        /// The namespace secrets are stored under.
        service: String,
    },
}

/// Reads the credential-manager override from an imperative settings file.
pub fn read_credential_manager_override(
    settings_path: &Path,
) -> Result<Option<String>, SecureStorageError> {
    let content = fs::read_to_string(settings_path).map_err(|source| SecureStorageError::Read {
        path: settings_path.to_path_buf(),
        source,
    })?;
    let settings: ImperativeSettings =
        serde_json::from_str(&content).map_err(|source| SecureStorageError::Parse {
            path: settings_path.to_path_buf(),
            source,
        })?;
    Ok(settings
        .overrides
        .credential_manager_name()
        .map(str::to_string))
}

/// Whether secure credential storage is configured under `cli_home`.
///
/// Any read or parse failure is logged and treated as "not active".
pub fn is_secure_storage_enabled(cli_home: &Path) -> bool {
    credential_manager_name(cli_home).is_some()
}

fn credential_manager_name(cli_home: &Path) -> Option<String> {
    let settings_path = paths::imperative_settings_path(cli_home);
    match read_credential_manager_override(&settings_path) {
        Ok(name) => name,
        Err(SecureStorageError::Read { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            log::debug!("No settings file at {}", settings_path.display());
            None
        }
        Err(e) => {
            log::warn!("{}; secure credential storage is treated as inactive", e);
            None
        }
    }
}

/// Installs the credential backend when the settings file asks for one.
#[derive(Debug)]
pub struct SecureStorageActivator {
    cli_home: PathBuf,
    service: String,
    provider: Box<dyn BackendProvider>,
    slot: Arc<CredentialSlot>,
}

impl SecureStorageActivator {
    /// `service` falls back to the default namespace when `None` or blank.
    pub fn new(
        cli_home: impl Into<PathBuf>,
        service: Option<&str>,
        provider: Box<dyn BackendProvider>,
        slot: Arc<CredentialSlot>,
    ) -> Self {
        let service = service
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CREDENTIAL_SERVICE)
            .to_string();
        Self {
            cli_home: cli_home.into(),
            service,
            provider,
            slot,
        }
    }

    /// The service namespace a backend is installed under.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The slot the backend is installed into.
    pub fn slot(&self) -> &Arc<CredentialSlot> {
        &self.slot
    }

    /// Installs a credential manager if secure storage is configured and none is in place.
    ///
    /// Never fails; every degraded path is reported through [`Activation`].
    pub fn activate(&self, already_initialized: bool, restricted_host: bool) -> Activation {
        if already_initialized || self.slot.is_installed() {
            log::debug!("Credential manager already initialized; skipping activation");
            return Activation::AlreadyInitialized;
        }

        let Some(manager_name) = credential_manager_name(&self.cli_home) else {
            log::debug!(
                "No credential manager override under {}",
                self.cli_home.display()
            );
            return Activation::Disabled;
        };

        let Some(backend) = self.provider.load(SECURE_MODULE_NAME, restricted_host) else {
            log::warn!(
                "Secure credential storage is configured ('{}') but no backend is available",
                manager_name
            );
            return Activation::BackendUnavailable;
        };

        let manager = CredentialManager::new(self.service.clone(), manager_name, backend);
        match self.slot.install(manager) {
            Ok(()) => {
                log::info!(
                    "Installed credential manager for service '{}'",
                    self.service
                );
                Activation::Installed {
                    service: self.service.clone(),
                }
            }
            Err(_) => {
                log::warn!("A credential manager was installed concurrently; keeping it");
                Activation::AlreadyInitialized
            }
        }
    }
}
