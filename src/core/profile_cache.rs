//! # Profile Cache
//!
//! Holds the in-memory indices over every profile of every registered type.
//! `refresh` rebuilds them wholesale from the per-type managers; all lookups in
//! between are served from memory. `get_names_for_type`, `direct_load`,
//! `get_schema` and the mutations go to the managers directly and leave the
//! indices untouched until the next refresh.
//!
//! Refresh is tolerant to partial failure: a type whose manager cannot be built,
//! or whose profiles fail to load, is logged and skipped while the others load.

use crate::{
    constants::{BASE_PROFILE_TYPE, DEFAULT_PROFILE_TYPE},
    core::{
        manager_registry::ProfileManagerRegistry,
        profile_manager::{LoadRequest, ProfileError, ProfileManager, SaveRequest},
        url_validator,
    },
    dev_utils,
    models::{
        ClientSettings, LoadedProfile, ProfileAttributes, ProfileTypeConfiguration,
        ProfileValidation, PropertySchema, ValidationSetting, ValidationState,
    },
};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};
use thiserror::Error;

/// Represents errors surfaced by cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No cached profile matched a named lookup.
    #[error("Could not find profile named: {name}.")]
    ProfileNotFound {
        /// The requested name.
        name: String,
    },
    /// The manager for the type could not be constructed.
    #[error("No profile manager is available for type \"{profile_type}\".")]
    ManagerUnavailable {
        /// The type without a manager.
        profile_type: String,
    },
    /// The manager rejected the operation.
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Supplies the ordered set of active profile types at refresh time.
pub trait TypeRegistry {
    /// The active types, in refresh order.
    fn registered_api_types(&self) -> Vec<String>;
}

impl<T: AsRef<str>> TypeRegistry for [T] {
    fn registered_api_types(&self) -> Vec<String> {
        self.iter().map(|t| t.as_ref().to_string()).collect()
    }
}

impl<T: AsRef<str>, const N: usize> TypeRegistry for [T; N] {
    fn registered_api_types(&self) -> Vec<String> {
        self.as_slice().registered_api_types()
    }
}

impl<T: AsRef<str>> TypeRegistry for Vec<T> {
    fn registered_api_types(&self) -> Vec<String> {
        self.as_slice().registered_api_types()
    }
}

impl TypeRegistry for ClientSettings {
    fn registered_api_types(&self) -> Vec<String> {
        self.profile_types.clone()
    }
}

/// The result of one per-type piece of refresh work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// The work succeeded.
    Loaded(T),
    /// Nothing to load, an expected condition (no default set, no profiles).
    Absent,
    /// An unexpected failure, already logged. Holds the error message.
    Failed(String),
}

impl<T> LoadOutcome<T> {
    /// Whether this is an unexpected failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// What refresh obtained for one registered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRefresh {
    /// The registered type.
    pub profile_type: String,
    /// `false` when the type's manager could not be constructed.
    pub manager_available: bool,
    /// Number of profiles of the type that were indexed.
    pub profiles: LoadOutcome<usize>,
    /// Name of the type's default profile.
    pub default_profile: LoadOutcome<String>,
}

/// The aggregate outcome of a refresh. Refresh itself never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Name of the base profile that was prepended, if any.
    pub base: LoadOutcome<String>,
    /// One entry per registered type, in registry order.
    pub types: Vec<TypeRefresh>,
}

impl RefreshReport {
    /// Count of unexpected failures and unloadable types.
    pub fn failures(&self) -> usize {
        let base = usize::from(self.base.is_failed());
        let per_type: usize = self
            .types
            .iter()
            .map(|t| {
                usize::from(!t.manager_available)
                    + usize::from(t.profiles.is_failed())
                    + usize::from(t.default_profile.is_failed())
            })
            .sum();
        base + per_type
    }

    /// Whether the refresh hit no failure at all.
    pub fn is_clean(&self) -> bool {
        self.failures() == 0
    }
}

/// In-memory indices over the profiles of all registered types.
#[derive(Debug)]
pub struct ProfileCache {
    registry: ProfileManagerRegistry,
    all_profiles: Vec<LoadedProfile>,
    all_types: Vec<String>,
    profiles_by_type: HashMap<String, Vec<LoadedProfile>>,
    default_profile_by_type: HashMap<String, LoadedProfile>,
    profiles_for_validation: Vec<ProfileValidation>,
    profiles_validation_setting: Vec<ValidationSetting>,
}

impl ProfileCache {
    /// An empty cache over `registry`. Call [`ProfileCache::refresh`] to populate it.
    pub fn new(registry: ProfileManagerRegistry) -> Self {
        Self {
            registry,
            all_profiles: Vec::new(),
            all_types: Vec::new(),
            profiles_by_type: HashMap::new(),
            default_profile_by_type: HashMap::new(),
            profiles_for_validation: Vec::new(),
            profiles_validation_setting: Vec::new(),
        }
    }

    /// The manager registry backing the cache.
    pub fn registry(&self) -> &ProfileManagerRegistry {
        &self.registry
    }

    /// The memoized manager for `profile_type`, constructing it on first use.
    pub fn get_cli_profile_manager(&self, profile_type: &str) -> Option<Arc<dyn ProfileManager>> {
        self.registry.get_manager(profile_type)
    }

    // --- Refresh ---

    /// Clears and rebuilds every index from the managers of the registered types.
    ///
    /// The base profile, when the `base` type has a default, is placed first; the
    /// other profiles follow in registry order. Per-type failures are logged and
    /// reported, never propagated.
    pub fn refresh<R: TypeRegistry + ?Sized>(&mut self, type_registry: &R) -> RefreshReport {
        let _timer = dev_utils::BlockTimer::new("ProfileCache::refresh");

        self.all_profiles.clear();
        self.profiles_by_type.clear();
        self.default_profile_by_type.clear();

        let base = self.refresh_base();

        let mut seen = HashSet::new();
        let mut types = Vec::new();
        for profile_type in type_registry.registered_api_types() {
            if !seen.insert(profile_type.clone()) {
                log::debug!("Type '{}' is registered twice; ignoring repeat", profile_type);
                continue;
            }
            types.push(self.refresh_type(&profile_type));
        }

        self.profiles_for_validation.clear();

        log::debug!(
            "Refreshed {} profile(s) across {} type(s)",
            self.all_profiles.len(),
            types.len()
        );
        RefreshReport { base, types }
    }

    fn refresh_base(&mut self) -> LoadOutcome<String> {
        let Some(manager) = self.registry.get_manager(BASE_PROFILE_TYPE) else {
            return LoadOutcome::Absent;
        };
        match manager.load(LoadRequest::Default) {
            Ok(profile) => {
                let name = profile.name.clone();
                self.all_profiles.insert(0, profile);
                LoadOutcome::Loaded(name)
            }
            Err(e) if e.is_no_default() => LoadOutcome::Absent,
            Err(e) => {
                log::warn!("Failed to load the base profile: {}", e);
                LoadOutcome::Failed(e.to_string())
            }
        }
    }

    fn refresh_type(&mut self, profile_type: &str) -> TypeRefresh {
        let Some(manager) = self.registry.get_manager(profile_type) else {
            return TypeRefresh {
                profile_type: profile_type.to_string(),
                manager_available: false,
                profiles: LoadOutcome::Absent,
                default_profile: LoadOutcome::Absent,
            };
        };

        // Captured once; see `clear_all_types`.
        if self.all_types.is_empty() {
            self.all_types = manager
                .configurations()
                .iter()
                .map(|config| config.profile_type.clone())
                .collect();
        }

        let profiles = match manager.load_all() {
            Ok(all) => {
                let of_type: Vec<LoadedProfile> = all
                    .into_iter()
                    .filter(|profile| profile.profile_type == profile_type)
                    .collect();
                if of_type.is_empty() {
                    LoadOutcome::Absent
                } else {
                    let count = of_type.len();
                    self.all_profiles.extend(of_type.iter().cloned());
                    self.profiles_by_type
                        .insert(profile_type.to_string(), of_type);
                    LoadOutcome::Loaded(count)
                }
            }
            Err(e) => {
                log::warn!("Failed to load profiles of type '{}': {}", profile_type, e);
                LoadOutcome::Failed(e.to_string())
            }
        };

        let default_profile = match manager.load(LoadRequest::Default) {
            Ok(profile) => {
                let name = profile.name.clone();
                self.default_profile_by_type
                    .insert(profile_type.to_string(), profile);
                LoadOutcome::Loaded(name)
            }
            Err(e) if e.is_no_default() => {
                log::debug!("{}", e);
                LoadOutcome::Absent
            }
            Err(e) => {
                log::warn!(
                    "Failed to load the default profile of type '{}': {}",
                    profile_type,
                    e
                );
                LoadOutcome::Failed(e.to_string())
            }
        };

        TypeRefresh {
            profile_type: profile_type.to_string(),
            manager_available: true,
            profiles,
            default_profile,
        }
    }

    // --- Lookups ---

    /// The first cached profile named `name` (and of `profile_type`, when given).
    ///
    /// # Errors
    /// Returns `CacheError::ProfileNotFound` when nothing matches.
    pub fn load_named_profile(
        &self,
        name: &str,
        profile_type: Option<&str>,
    ) -> Result<LoadedProfile, CacheError> {
        self.all_profiles
            .iter()
            .find(|profile| profile.matches(name, profile_type))
            .cloned()
            .ok_or_else(|| CacheError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// The default profile of `profile_type` (`zosmf` when `None`).
    pub fn get_default_profile(&self, profile_type: Option<&str>) -> Option<&LoadedProfile> {
        self.default_profile_by_type
            .get(profile_type.unwrap_or(DEFAULT_PROFILE_TYPE))
    }

    /// The profiles of `profile_type` (`zosmf` when `None`).
    pub fn get_profiles(&self, profile_type: Option<&str>) -> Option<&[LoadedProfile]> {
        self.profiles_by_type
            .get(profile_type.unwrap_or(DEFAULT_PROFILE_TYPE))
            .map(Vec::as_slice)
    }

    /// Every cached profile, base profile first.
    pub fn all_profiles(&self) -> &[LoadedProfile] {
        &self.all_profiles
    }

    /// The declared types, captured from the first manager seen by a refresh.
    ///
    /// Not recomputed by later refreshes; call [`Self::clear_all_types`] to recapture.
    pub fn get_all_types(&self) -> &[String] {
        &self.all_types
    }

    /// Forgets the captured type list so the next refresh captures it again.
    pub fn clear_all_types(&mut self) {
        self.all_types.clear();
    }

    /// The last cached profile of type `base`.
    pub fn get_base_profile(&self) -> Option<&LoadedProfile> {
        self.all_profiles
            .iter()
            .rev()
            .find(|profile| profile.profile_type == BASE_PROFILE_TYPE)
    }

    // --- Live manager access ---

    /// Names of the profiles of `profile_type`, read live from its manager.
    pub fn get_names_for_type(&self, profile_type: &str) -> Vec<String> {
        let Some(manager) = self.registry.get_manager(profile_type) else {
            return Vec::new();
        };
        manager.profile_names().unwrap_or_else(|e| {
            log::warn!("Failed to list profiles of type '{}': {}", profile_type, e);
            Vec::new()
        })
    }

    /// Loads one profile live from its manager, bypassing the indices.
    pub fn direct_load(&self, profile_type: &str, name: &str) -> Option<LoadedProfile> {
        let manager = self.registry.get_manager(profile_type)?;
        match manager.load(LoadRequest::Named(name)) {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::warn!("Direct load of '{}' ({}) failed: {}", name, profile_type, e);
                None
            }
        }
    }

    /// Loads one profile live, distinguishing "does not exist" from other failures.
    ///
    /// # Errors
    /// `ManagerUnavailable` when the type has no manager; any load failure other
    /// than `NotFound` is returned as is.
    pub fn load_existing(
        &self,
        profile_type: &str,
        name: &str,
    ) -> Result<Option<LoadedProfile>, CacheError> {
        let manager = self.manager_or_err(profile_type)?;
        match manager.load(LoadRequest::Named(name)) {
            Ok(profile) => Ok(Some(profile)),
            Err(ProfileError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The declared property schema of `profile_type`; empty when unknown.
    pub fn get_schema(&self, profile_type: &str) -> BTreeMap<String, PropertySchema> {
        self.configuration_of(profile_type)
            .map(|config| config.schema.properties)
            .unwrap_or_default()
    }

    fn configuration_of(&self, profile_type: &str) -> Option<ProfileTypeConfiguration> {
        let manager = self.registry.get_manager(profile_type)?;
        manager
            .configurations()
            .iter()
            .find(|config| config.profile_type == profile_type)
            .cloned()
    }

    // --- Mutations ---

    /// Writes a profile through its type's manager, overwriting any existing one.
    ///
    /// The indices are not updated; refresh to observe the change.
    pub fn save_profile(
        &self,
        data: ProfileAttributes,
        name: &str,
        profile_type: &str,
    ) -> Result<ProfileAttributes, CacheError> {
        let manager = self.manager_or_err(profile_type)?;
        let saved = manager.save(SaveRequest {
            name: name.to_string(),
            profile_type: profile_type.to_string(),
            profile: data,
            overwrite: true,
        })?;
        log::debug!("{}", saved.message);
        Ok(saved.profile)
    }

    /// Deletes a profile through its type's manager.
    ///
    /// The indices are not updated; refresh to observe the change.
    pub fn delete_profile_on_disk(&self, profile: &LoadedProfile) -> Result<(), CacheError> {
        let manager = self.manager_or_err(&profile.profile_type)?;
        manager.delete(&profile.name, &profile.profile_type)?;
        Ok(())
    }

    fn manager_or_err(&self, profile_type: &str) -> Result<Arc<dyn ProfileManager>, CacheError> {
        self.registry
            .get_manager(profile_type)
            .ok_or_else(|| CacheError::ManagerUnavailable {
                profile_type: profile_type.to_string(),
            })
    }

    // --- Validation bookkeeping ---

    /// Validates a cached profile locally and records the outcome.
    ///
    /// `Unverified` when validation is disabled for the name; `Active` when the
    /// profile is cached, carries every schema-required property and its host
    /// forms a valid URL; `Inactive` otherwise.
    pub fn check_profile(&mut self, name: &str) -> ValidationState {
        let status = if !self.is_validation_enabled(name) {
            ValidationState::Unverified
        } else {
            match self.all_profiles.iter().find(|profile| profile.name == name) {
                Some(profile) if self.is_complete(profile) => ValidationState::Active,
                _ => ValidationState::Inactive,
            }
        };

        log::debug!("Profile '{}' validated as {}", name, status);
        self.profiles_for_validation.retain(|entry| entry.name != name);
        self.profiles_for_validation.push(ProfileValidation {
            name: name.to_string(),
            status,
        });
        status
    }

    fn is_complete(&self, profile: &LoadedProfile) -> bool {
        let required_present = self
            .configuration_of(&profile.profile_type)
            .map(|config| {
                config
                    .schema
                    .required
                    .iter()
                    .all(|prop| profile.profile.get(prop).is_some_and(|v| !v.is_null()))
            })
            .unwrap_or(true);

        let host_valid = match profile.profile.get("host") {
            None | Some(Value::Null) => true,
            Some(_) => profile.host().is_some_and(|host| {
                let candidate = match profile.port() {
                    Some(port) => format!("https://{}:{}", host, port),
                    None => format!("https://{}", host),
                };
                let parsed = url_validator::validate_and_parse_url(&candidate);
                parsed.valid && parsed.host.is_some_and(|h| !h.is_empty())
            }),
        };

        required_present && host_valid
    }

    /// The last recorded validation status for `name`.
    pub fn validation_status(&self, name: &str) -> Option<ValidationState> {
        self.profiles_for_validation
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.status)
    }

    /// Recorded validation statuses, in check order.
    pub fn profiles_for_validation(&self) -> &[ProfileValidation] {
        &self.profiles_for_validation
    }

    /// Enables or disables validation for `name`. Survives refresh.
    pub fn set_validation_setting(&mut self, name: &str, enabled: bool) {
        match self
            .profiles_validation_setting
            .iter_mut()
            .find(|setting| setting.name == name)
        {
            Some(setting) => setting.enabled = enabled,
            None => self.profiles_validation_setting.push(ValidationSetting {
                name: name.to_string(),
                enabled,
            }),
        }
    }

    /// Validation is enabled unless explicitly disabled for the name.
    pub fn is_validation_enabled(&self, name: &str) -> bool {
        self.profiles_validation_setting
            .iter()
            .find(|setting| setting.name == name)
            .is_none_or(|setting| setting.enabled)
    }

    /// Per-profile validation switches, in the order they were set.
    pub fn profiles_validation_setting(&self) -> &[ValidationSetting] {
        &self.profiles_validation_setting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        credentials::CredentialSlot,
        test_support::{attrs, write_profile, write_type},
    };
    use serde_json::json;
    use std::path::Path;
    use tempfile::tempdir;

    fn cache_for(home: &Path) -> ProfileCache {
        ProfileCache::new(ProfileManagerRegistry::with_file_managers(
            home,
            Arc::new(CredentialSlot::new()),
        ))
    }

    /// base (default "shared"), zosmf (a, b; default a), tso (c; no default).
    fn populated_home(home: &Path) {
        write_type(home, "base", Some("shared"));
        write_profile(home, "base", "shared", "host: sysplex.example.com\nuser: ibmuser\n");
        write_type(home, "zosmf", Some("a"));
        write_profile(home, "zosmf", "a", "host: a.example.com\nport: 443\n");
        write_profile(home, "zosmf", "b", "host: b.example.com\nport: 1443\n");
        write_type(home, "tso", None);
        write_profile(home, "tso", "c", "host: c.example.com\naccount: ACCT\n");
    }

    fn names(profiles: &[LoadedProfile]) -> Vec<&str> {
        profiles.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_refresh_indexes_base_first_then_registry_order() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());

        let report = cache.refresh(&["zosmf", "tso"]);

        assert!(report.is_clean());
        assert_eq!(report.base, LoadOutcome::Loaded("shared".to_string()));
        assert_eq!(cache.all_profiles().len(), 1 + 2 + 1);
        assert_eq!(names(cache.all_profiles()), vec!["shared", "a", "b", "c"]);

        let zosmf = cache.get_profiles(Some("zosmf")).unwrap();
        assert_eq!(names(zosmf), vec!["a", "b"]);
        assert!(zosmf.iter().all(|p| p.profile_type == "zosmf"));
        assert_eq!(names(cache.get_profiles(Some("tso")).unwrap()), vec!["c"]);
    }

    #[test]
    fn test_unloadable_type_is_skipped() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());

        let report = cache.refresh(&["zosmf", "rse", "tso"]);

        let rse = report
            .types
            .iter()
            .find(|t| t.profile_type == "rse")
            .unwrap();
        assert!(!rse.manager_available);
        assert_eq!(report.failures(), 1);
        assert!(cache.get_profiles(Some("rse")).is_none());
        assert_eq!(cache.all_profiles().len(), 4);
        assert!(cache.get_profiles(Some("tso")).is_some());
    }

    #[test]
    fn test_missing_base_default_is_silent() {
        let home = tempdir().unwrap();
        write_type(home.path(), "base", None);
        write_type(home.path(), "zosmf", None);
        write_profile(home.path(), "zosmf", "a", "host: a\n");
        let mut cache = cache_for(home.path());

        let report = cache.refresh(&["zosmf"]);

        assert_eq!(report.base, LoadOutcome::Absent);
        assert!(report.is_clean());
        assert!(cache.get_base_profile().is_none());
        assert_eq!(names(cache.all_profiles()), vec!["a"]);
        assert!(cache.get_default_profile(None).is_none());
    }

    #[test]
    fn test_default_failure_keeps_type_profiles() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", Some("ghost"));
        write_profile(home.path(), "zosmf", "a", "host: a\n");
        let mut cache = cache_for(home.path());

        let report = cache.refresh(&["zosmf"]);

        let zosmf = report.types.first().unwrap();
        assert!(zosmf.default_profile.is_failed());
        assert_eq!(zosmf.profiles, LoadOutcome::Loaded(1));
        assert!(cache.get_default_profile(Some("zosmf")).is_none());
        assert_eq!(names(cache.get_profiles(None).unwrap()), vec!["a"]);
    }

    #[test]
    fn test_named_lookup_and_not_found() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());
        cache.refresh(&["zosmf", "tso"]);

        let b = cache.load_named_profile("b", None).unwrap();
        assert_eq!(b.port(), Some(1443));
        assert!(cache.load_named_profile("b", Some("tso")).is_err());
        assert!(matches!(
            cache.load_named_profile("nonexistent", None),
            Err(CacheError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_defaults_and_base_lookup() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());
        cache.refresh(&["zosmf", "tso"]);

        assert_eq!(cache.get_default_profile(None).map(|p| p.name.as_str()), Some("a"));
        assert!(cache.get_default_profile(Some("tso")).is_none());
        assert_eq!(
            cache.get_base_profile().and_then(LoadedProfile::host),
            Some("sysplex.example.com")
        );
    }

    #[test]
    fn test_all_types_are_captured_once() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());

        cache.refresh(&["zosmf"]);
        assert_eq!(cache.get_all_types(), ["base", "tso", "zosmf"]);

        write_type(home.path(), "ssh", None);
        cache.refresh(&["ssh", "zosmf"]);
        assert_eq!(cache.get_all_types(), ["base", "tso", "zosmf"]);

        cache.clear_all_types();
        cache.refresh(&["ssh", "zosmf"]);
        assert_eq!(cache.get_all_types(), ["base", "ssh", "tso", "zosmf"]);
    }

    #[test]
    fn test_repeated_type_is_indexed_once() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());

        let report = cache.refresh(&vec!["zosmf".to_string(), "zosmf".to_string()]);

        assert_eq!(report.types.len(), 1);
        assert_eq!(names(cache.all_profiles()), vec!["shared", "a", "b"]);
    }

    #[test]
    fn test_live_access_bypasses_the_indices() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());
        cache.refresh(&["zosmf"]);

        write_profile(home.path(), "zosmf", "late", "host: late.example.com\n");

        assert_eq!(cache.get_profiles(None).unwrap().len(), 2);
        assert_eq!(cache.get_names_for_type("zosmf"), vec!["a", "b", "late"]);
        assert_eq!(
            cache.direct_load("zosmf", "late").and_then(|p| p.host().map(str::to_string)),
            Some("late.example.com".to_string())
        );
        assert!(cache.direct_load("zosmf", "missing").is_none());
        assert!(cache.get_names_for_type("rse").is_empty());
    }

    #[test]
    fn test_schema_lookup() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let cache = cache_for(home.path());

        let schema = cache.get_schema("zosmf");
        assert!(schema.contains_key("host"));
        assert!(schema.get("password").is_some_and(|p| p.secure));
        assert!(cache.get_schema("rse").is_empty());
    }

    #[test]
    fn test_mutations_need_a_refresh_to_show() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        let mut cache = cache_for(home.path());
        cache.refresh(&["zosmf"]);

        let saved = cache
            .save_profile(attrs(json!({ "host": "new.example.com" })), "new", "zosmf")
            .unwrap();
        assert_eq!(saved.get("host"), Some(&json!("new.example.com")));
        assert!(cache.load_named_profile("new", None).is_err());

        cache.refresh(&["zosmf"]);
        let new = cache.load_named_profile("new", Some("zosmf")).unwrap();

        cache.delete_profile_on_disk(&new).unwrap();
        assert!(cache.load_named_profile("new", None).is_ok());
        cache.refresh(&["zosmf"]);
        assert!(cache.load_named_profile("new", None).is_err());

        assert!(matches!(
            cache.save_profile(attrs(json!({ "host": "h" })), "x", "rse"),
            Err(CacheError::ManagerUnavailable { .. })
        ));
    }

    #[test]
    fn test_validation_statuses_and_settings() {
        let home = tempdir().unwrap();
        populated_home(home.path());
        write_profile(home.path(), "zosmf", "broken", "host: not a host\n");
        let mut cache = cache_for(home.path());
        cache.refresh(&["zosmf"]);

        assert_eq!(cache.check_profile("a"), ValidationState::Active);
        assert_eq!(cache.check_profile("broken"), ValidationState::Inactive);
        assert_eq!(cache.check_profile("ghost"), ValidationState::Inactive);

        cache.set_validation_setting("b", false);
        assert_eq!(cache.check_profile("b"), ValidationState::Unverified);
        assert_eq!(cache.validation_status("a"), Some(ValidationState::Active));
        assert_eq!(cache.profiles_for_validation().len(), 4);

        cache.refresh(&["zosmf"]);
        assert!(cache.profiles_for_validation().is_empty());
        assert!(!cache.is_validation_enabled("b"));
        assert!(cache.is_validation_enabled("a"));
    }

    /// A zosmf manager whose bulk load fails while its default still resolves.
    #[derive(Debug)]
    struct BrokenListingManager {
        configurations: Vec<ProfileTypeConfiguration>,
    }

    impl BrokenListingManager {
        fn new() -> Self {
            Self {
                configurations: vec![ProfileTypeConfiguration {
                    profile_type: "zosmf".to_string(),
                    schema: Default::default(),
                }],
            }
        }
    }

    impl ProfileManager for BrokenListingManager {
        fn profile_type(&self) -> &str {
            "zosmf"
        }

        fn configurations(&self) -> &[ProfileTypeConfiguration] {
            &self.configurations
        }

        fn load_all(&self) -> Result<Vec<LoadedProfile>, ProfileError> {
            Err(ProfileError::Io {
                path: "profiles/zosmf".into(),
                source: std::io::Error::other("disk unavailable"),
            })
        }

        fn load(&self, request: LoadRequest<'_>) -> Result<LoadedProfile, ProfileError> {
            let name = match request {
                LoadRequest::Default => "lpar1",
                LoadRequest::Named(name) => name,
            };
            Ok(LoadedProfile::new(
                name,
                "zosmf",
                attrs(json!({ "host": "lpar1.example.com" })),
            ))
        }

        fn save(&self, request: SaveRequest) -> Result<crate::core::profile_manager::SavedProfile, ProfileError> {
            Err(ProfileError::InvalidName(request.name))
        }

        fn delete(&self, name: &str, _profile_type: &str) -> Result<(), ProfileError> {
            Err(ProfileError::InvalidName(name.to_string()))
        }

        fn profile_names(&self) -> Result<Vec<String>, ProfileError> {
            Ok(Vec::new())
        }
    }

    #[derive(Debug)]
    struct BrokenListingFactory;

    impl crate::core::manager_registry::ManagerFactory for BrokenListingFactory {
        fn create(
            &self,
            profiles_root: &Path,
            profile_type: &str,
        ) -> Result<Arc<dyn ProfileManager>, ProfileError> {
            if profile_type != "zosmf" {
                return Err(ProfileError::UnknownType {
                    profile_type: profile_type.to_string(),
                    root: profiles_root.to_path_buf(),
                });
            }
            Ok(Arc::new(BrokenListingManager::new()))
        }
    }

    #[test]
    fn test_failed_bulk_load_still_resolves_the_default() {
        let home = tempdir().unwrap();
        let mut cache = ProfileCache::new(ProfileManagerRegistry::new(
            home.path(),
            Box::new(BrokenListingFactory),
        ));

        let report = cache.refresh(&["zosmf"]);

        assert_eq!(report.base, LoadOutcome::Absent);
        let zosmf = report.types.first().unwrap();
        assert!(zosmf.manager_available);
        assert!(zosmf.profiles.is_failed());
        assert_eq!(zosmf.default_profile, LoadOutcome::Loaded("lpar1".to_string()));
        assert_eq!(report.failures(), 1);
        assert!(!report.is_clean());

        assert_eq!(
            cache.get_default_profile(None).map(|p| p.name.as_str()),
            Some("lpar1")
        );
        assert!(cache.get_profiles(None).is_none());
        assert!(cache.all_profiles().is_empty());
        assert_eq!(cache.get_all_types(), ["zosmf".to_string()]);
    }
}
