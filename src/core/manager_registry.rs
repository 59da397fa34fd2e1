// src/core/manager_registry.rs

use crate::core::{
    credentials::CredentialSlot,
    paths,
    profile_manager::{FileProfileManager, ProfileError, ProfileManager},
};
use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

/// Builds the manager for one profile type, rooted at `<root>/profiles`.
pub trait ManagerFactory: fmt::Debug + Send + Sync {
    /// Builds the manager for `profile_type`, failing when the type is not declared.
    fn create(
        &self,
        profiles_root: &Path,
        profile_type: &str,
    ) -> Result<Arc<dyn ProfileManager>, ProfileError>;
}

/// Builds [`FileProfileManager`]s sharing one credential slot.
#[derive(Debug)]
pub struct FileManagerFactory {
    credentials: Arc<CredentialSlot>,
}

impl FileManagerFactory {
    /// A factory whose managers resolve secrets through `credentials`.
    pub fn new(credentials: Arc<CredentialSlot>) -> Self {
        Self { credentials }
    }
}

impl ManagerFactory for FileManagerFactory {
    fn create(
        &self,
        profiles_root: &Path,
        profile_type: &str,
    ) -> Result<Arc<dyn ProfileManager>, ProfileError> {
        let manager = FileProfileManager::new(profiles_root, profile_type, self.credentials.clone())?;
        Ok(Arc::new(manager))
    }
}

/// Lazily constructs and memoizes one manager per profile type.
///
/// Successful constructions are kept for the lifetime of the registry; failed
/// ones are logged and retried on the next request.
#[derive(Debug)]
pub struct ProfileManagerRegistry {
    cli_home: PathBuf,
    factory: Box<dyn ManagerFactory>,
    managers: Mutex<HashMap<String, Arc<dyn ProfileManager>>>,
}

impl ProfileManagerRegistry {
    /// A registry rooted at `cli_home` that builds managers with `factory`.
    pub fn new(cli_home: impl Into<PathBuf>, factory: Box<dyn ManagerFactory>) -> Self {
        Self {
            cli_home: cli_home.into(),
            factory,
            managers: Mutex::new(HashMap::new()),
        }
    }

    /// A registry of file-backed managers reading secrets through `credentials`.
    pub fn with_file_managers(cli_home: impl Into<PathBuf>, credentials: Arc<CredentialSlot>) -> Self {
        Self::new(cli_home, Box::new(FileManagerFactory::new(credentials)))
    }

    /// The profile root.
    pub fn cli_home(&self) -> &Path {
        &self.cli_home
    }

    /// Returns the manager for `profile_type`, constructing it on first request.
    ///
    /// `None` means "type not loadable"; the construction error is logged at debug level.
    pub fn get_manager(&self, profile_type: &str) -> Option<Arc<dyn ProfileManager>> {
        // Held across construction: a type is never built twice.
        let mut managers = self.managers.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(manager) = managers.get(profile_type) {
            return Some(Arc::clone(manager));
        }

        let profiles_root = paths::profiles_dir(&self.cli_home);
        match self.factory.create(&profiles_root, profile_type) {
            Ok(manager) => {
                log::debug!("Constructed profile manager for type '{}'", profile_type);
                managers.insert(profile_type.to_string(), Arc::clone(&manager));
                Some(manager)
            }
            Err(e) => {
                log::debug!(
                    "Could not construct profile manager for type '{}': {}",
                    profile_type,
                    e
                );
                None
            }
        }
    }

    /// Types with a memoized manager, sorted.
    pub fn cached_types(&self) -> Vec<String> {
        let managers = self.managers.lock().unwrap_or_else(PoisonError::into_inner);
        let mut types: Vec<String> = managers.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::write_type;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[derive(Debug)]
    struct CountingFactory {
        inner: FileManagerFactory,
        calls: Arc<AtomicUsize>,
    }

    impl ManagerFactory for CountingFactory {
        fn create(
            &self,
            profiles_root: &Path,
            profile_type: &str,
        ) -> Result<Arc<dyn ProfileManager>, ProfileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create(profiles_root, profile_type)
        }
    }

    fn counting_registry(home: &Path) -> (ProfileManagerRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = CountingFactory {
            inner: FileManagerFactory::new(Arc::new(CredentialSlot::new())),
            calls: calls.clone(),
        };
        (ProfileManagerRegistry::new(home, Box::new(factory)), calls)
    }

    #[test]
    fn test_same_type_returns_identical_handle() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let (registry, calls) = counting_registry(home.path());

        let first = registry.get_manager("zosmf").unwrap();
        let second = registry.get_manager("zosmf").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.cached_types(), vec!["zosmf"]);
    }

    #[test]
    fn test_failed_construction_is_absent_and_not_memoized() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let (registry, calls) = counting_registry(home.path());

        assert!(registry.get_manager("rse").is_none());
        assert!(registry.get_manager("rse").is_none());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(registry.cached_types().is_empty());
    }

    #[test]
    fn test_manager_is_rooted_at_profiles_dir() {
        let home = tempdir().unwrap();
        write_type(home.path(), "tso", None);
        let registry =
            ProfileManagerRegistry::with_file_managers(home.path(), Arc::new(CredentialSlot::new()));

        let manager = registry.get_manager("tso").unwrap();
        assert_eq!(manager.profile_type(), "tso");
        assert_eq!(registry.cli_home(), home.path());
    }
}
