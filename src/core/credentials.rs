//! # Credentials
//!
//! Secret-storage backends and the one-time installation cell through which the
//! installed credential manager is shared with every profile manager.

use keyring::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use thiserror::Error;

/// Credential backend errors
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The OS keychain rejected the operation.
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    /// A managed placeholder has no stored secret.
    #[error("Secret not found for account: {0}")]
    NotFound(String),

    /// A managed placeholder was read with no credential manager installed.
    #[error("No credential manager is installed; cannot resolve secure field '{0}'")]
    NotInstalled(String),
}

/// A key/value secret store addressed by service namespace and account.
pub trait CredentialBackend: fmt::Debug + Send + Sync {
    /// The stored secret, or `None` when there is no entry.
    fn get_password(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError>;

    /// Stores `secret`, replacing any existing entry.
    fn set_password(&self, service: &str, account: &str, secret: &str)
    -> Result<(), CredentialError>;

    /// Returns `true` when an entry existed and was removed.
    fn delete_password(&self, service: &str, account: &str) -> Result<bool, CredentialError>;
}

/// OS keychain backend (macOS Keychain, Windows Credential Manager, Secret Service).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringBackend;

impl CredentialBackend for KeyringBackend {
    fn get_password(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError> {
        let entry = Entry::new(service, account)?;
        match entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                log::debug!("Keychain: no entry for {}/{}", service, account);
                Ok(None)
            }
            Err(e) => Err(CredentialError::Keyring(e)),
        }
    }

    fn set_password(
        &self,
        service: &str,
        account: &str,
        secret: &str,
    ) -> Result<(), CredentialError> {
        let entry = Entry::new(service, account)?;
        entry.set_password(secret)?;
        log::debug!("Keychain store: service={}, account={}", service, account);
        Ok(())
    }

    fn delete_password(&self, service: &str, account: &str) -> Result<bool, CredentialError> {
        let entry = Entry::new(service, account)?;
        match entry.delete_credential() {
            Ok(()) => Ok(true),
            Err(keyring::Error::NoEntry) => Ok(false), // Already deleted
            Err(e) => Err(CredentialError::Keyring(e)),
        }
    }
}

/// In-process backend. Secrets live only as long as the value.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryBackend {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all services.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CredentialBackend for MemoryBackend {
    fn get_password(&self, service: &str, account: &str) -> Result<Option<String>, CredentialError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn set_password(
        &self,
        service: &str,
        account: &str,
        secret: &str,
    ) -> Result<(), CredentialError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            (service.to_string(), account.to_string()),
            secret.to_string(),
        );
        Ok(())
    }

    fn delete_password(&self, service: &str, account: &str) -> Result<bool, CredentialError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .remove(&(service.to_string(), account.to_string()))
            .is_some())
    }
}

/// A backend bound to a service namespace, as installed by the secure-storage activator.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    service: String,
    display_name: String,
    backend: Arc<dyn CredentialBackend>,
}

impl CredentialManager {
    /// Binds `backend` to `service`. `display_name` is what placeholders on disk name.
    pub fn new(
        service: impl Into<String>,
        display_name: impl Into<String>,
        backend: Arc<dyn CredentialBackend>,
    ) -> Self {
        Self {
            service: service.into(),
            display_name: display_name.into(),
            backend,
        }
    }

    /// The service namespace.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The name written into `managed by ...` placeholders.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The placeholder written to disk in place of a secure value.
    pub fn managed_marker(&self) -> String {
        format!("managed by {}", self.display_name)
    }

    /// Reads the secret stored for `account`.
    pub fn load(&self, account: &str) -> Result<Option<String>, CredentialError> {
        self.backend.get_password(&self.service, account)
    }

    /// Stores the secret for `account`.
    pub fn save(&self, account: &str, secret: &str) -> Result<(), CredentialError> {
        self.backend.set_password(&self.service, account, secret)
    }

    /// Removes the secret for `account`. Returns `true` when one existed.
    pub fn delete(&self, account: &str) -> Result<bool, CredentialError> {
        self.backend.delete_password(&self.service, account)
    }
}

/// Account under which a secure profile property is stored: `<type>_<name>_<property>`.
pub fn secure_account(profile_type: &str, profile_name: &str, property: &str) -> String {
    format!("{}_{}_{}", profile_type, profile_name, property)
}

/// Whether an on-disk value is a "managed by ..." placeholder.
pub fn is_managed_marker(value: &str) -> bool {
    value.starts_with("managed by ")
}

/// One-time installation cell for the process credential manager.
///
/// Shared (behind an `Arc`) between the activator that fills it and the profile
/// managers that read it. Once filled it is never cleared.
#[derive(Debug, Default)]
pub struct CredentialSlot {
    manager: OnceLock<CredentialManager>,
}

impl CredentialSlot {
    /// An empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the manager. Returns it back if a manager was already installed.
    pub fn install(&self, manager: CredentialManager) -> Result<(), CredentialManager> {
        self.manager.set(manager)
    }

    /// The installed manager, if any.
    pub fn get(&self) -> Option<&CredentialManager> {
        self.manager.get()
    }

    /// Whether a manager has been installed.
    pub fn is_installed(&self) -> bool {
        self.manager.get().is_some()
    }
}
