// src/state.rs

use crate::{
    core::{
        credentials::CredentialSlot,
        manager_registry::ProfileManagerRegistry,
        paths,
        profile_cache::{ProfileCache, RefreshReport},
        secure_storage::{Activation, BackendProvider, DefaultBackendProvider, SecureStorageActivator},
        settings,
    },
    models::ClientSettings,
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc};

/// Everything a command needs: settings, the credential slot and a refreshed cache.
///
/// Built once per process by [`AppState::bootstrap`] and handed to the command
/// handlers explicitly.
#[derive(Debug)]
pub struct AppState {
    /// The client settings in effect.
    pub settings: ClientSettings,
    /// The resolved profile root.
    pub cli_home: PathBuf,
    /// The credential slot shared with every profile manager.
    pub credentials: Arc<CredentialSlot>,
    /// What secure-storage activation did at startup.
    pub activation: Activation,
    /// The profile cache, refreshed at startup.
    pub cache: ProfileCache,
    last_refresh: RefreshReport,
}

impl AppState {
    /// Loads the client settings and builds the state with the OS keychain provider.
    ///
    /// `home_override` replaces the profile root named in the settings.
    pub fn bootstrap(home_override: Option<String>) -> Result<Self> {
        let mut settings =
            settings::load_client_settings().context("Failed to load client settings")?;
        if home_override.is_some() {
            settings.cli_home = home_override;
        }
        Self::from_settings(settings, Box::new(DefaultBackendProvider))
    }

    /// Resolves the profile root, activates secure storage, then performs the first refresh.
    ///
    /// Activation runs before the refresh so that profiles holding secure fields
    /// can be resolved on the first load.
    pub fn from_settings(
        settings: ClientSettings,
        provider: Box<dyn BackendProvider>,
    ) -> Result<Self> {
        let cli_home = paths::resolve_cli_home(settings.cli_home.as_deref())?;
        log::debug!("Using profile root {}", cli_home.display());

        let credentials = Arc::new(CredentialSlot::new());
        let activator = SecureStorageActivator::new(
            &cli_home,
            Some(&settings.credential_service),
            provider,
            Arc::clone(&credentials),
        );
        let activation = activator.activate(false, settings.restricted_host);

        let registry = ProfileManagerRegistry::with_file_managers(&cli_home, Arc::clone(&credentials));
        let mut cache = ProfileCache::new(registry);
        let last_refresh = cache.refresh(&settings);

        Ok(Self {
            settings,
            cli_home,
            credentials,
            activation,
            cache,
            last_refresh,
        })
    }

    /// Rebuilds the cache from disk using the configured type registry.
    pub fn refresh(&mut self) -> &RefreshReport {
        self.last_refresh = self.cache.refresh(&self.settings);
        &self.last_refresh
    }

    /// The report of the most recent refresh.
    pub fn last_refresh(&self) -> &RefreshReport {
        &self.last_refresh
    }
}
