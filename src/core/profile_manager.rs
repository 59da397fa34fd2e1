//! # Profile Manager
//!
//! A manager owns the profiles of one declared type under `<root>/profiles`.
//! The on-disk layout is one directory per type holding `<type>_meta.yaml`
//! (default pointer + type configuration) and one `<name>.yaml` per profile.
//!
//! Secure properties (schema `secure: true`) are kept in the installed
//! credential manager when there is one; the YAML then holds a
//! `managed by ...` placeholder that is resolved again on load.

use crate::{
    constants::{META_FILE_SUFFIX, PROFILE_EXTENSION},
    core::credentials::{
        self, CredentialError, CredentialManager, CredentialSlot, is_managed_marker,
    },
    models::{LoadedProfile, ProfileAttributes, ProfileMeta, ProfileTypeConfiguration},
};
use serde_json::Value;
use std::{
    fmt, fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use walkdir::WalkDir;

/// Represents errors that can occur while loading, saving or deleting profiles.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The type has no default profile. Expected and non-fatal for callers that scan.
    #[error("No default profile set for type \"{profile_type}\".")]
    NoDefault {
        /// The type without a default.
        profile_type: String,
    },
    /// The named profile does not exist on disk.
    #[error("Profile \"{name}\" of type \"{profile_type}\" does not exist.")]
    NotFound {
        /// The requested profile name.
        name: String,
        /// The requested profile type.
        profile_type: String,
    },
    /// No `<type>_meta.yaml` declares the type.
    #[error("Profile type \"{profile_type}\" is not declared under '{}'.", .root.display())]
    UnknownType {
        /// The undeclared type.
        profile_type: String,
        /// The profiles directory that was scanned.
        root: PathBuf,
    },
    /// A save without overwrite hit an existing profile.
    #[error("Profile \"{name}\" of type \"{profile_type}\" already exists.")]
    AlreadyExists {
        /// The conflicting name.
        name: String,
        /// The type of the conflicting profile.
        profile_type: String,
    },
    /// A save is missing properties the type's schema requires.
    #[error("Profile \"{name}\" is missing required properties: {}", .missing.join(", "))]
    MissingRequired {
        /// The profile being saved.
        name: String,
        /// The absent property names.
        missing: Vec<String>,
    },
    /// The name cannot be used as a file name.
    #[error("Invalid profile name '{0}'.")]
    InvalidName(String),
    /// A filesystem I/O error occurred.
    #[error("Filesystem Error at '{}': {source}", .path.display())]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A profile or meta file is not valid YAML.
    #[error("Failed to parse YAML file at '{}': {source}", .path.display())]
    Yaml {
        /// The file that failed to parse.
        path: PathBuf,
        /// The underlying parsing error.
        #[source]
        source: serde_yaml::Error,
    },
    /// A profile or meta document could not be serialized.
    #[error("Failed to serialize to YAML: {0}")]
    YamlSerialize(#[source] serde_yaml::Error),
    /// A secure property could not be read from or written to the credential store.
    #[error("Secure field error for profile \"{name}\": {source}")]
    Credential {
        /// The profile whose secure field failed.
        name: String,
        /// The underlying credential error.
        #[source]
        source: CredentialError,
    },
}

impl ProfileError {
    /// Whether this is the expected "no default profile set" condition.
    pub fn is_no_default(&self) -> bool {
        matches!(self, Self::NoDefault { .. })
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Which profile a [`ProfileManager::load`] call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest<'a> {
    /// The profile the type's meta file marks as default.
    Default,
    /// A profile by name.
    Named(&'a str),
}

/// Parameters of a [`ProfileManager::save`] call.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    /// The profile name.
    pub name: String,
    /// The profile type.
    pub profile_type: String,
    /// The body to write, with secure values in clear.
    pub profile: ProfileAttributes,
    /// Whether an existing profile may be replaced.
    pub overwrite: bool,
}

/// The result of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedProfile {
    /// The file that was written.
    pub path: PathBuf,
    /// The saved body, with secure values in clear.
    pub profile: ProfileAttributes,
    /// Whether an existing profile was replaced.
    pub overwritten: bool,
    /// A human-readable summary.
    pub message: String,
}

/// The operations the profile cache needs from a per-type manager.
pub trait ProfileManager: fmt::Debug + Send + Sync {
    /// The type this manager was constructed for.
    fn profile_type(&self) -> &str;

    /// Every type configuration visible to this manager, in declaration order.
    fn configurations(&self) -> &[ProfileTypeConfiguration];

    /// Loads every profile of every visible type.
    fn load_all(&self) -> Result<Vec<LoadedProfile>, ProfileError>;

    /// Loads one profile of this manager's type, resolving secure fields.
    fn load(&self, request: LoadRequest<'_>) -> Result<LoadedProfile, ProfileError>;

    /// Validates and writes a profile, moving secure fields to the credential store.
    fn save(&self, request: SaveRequest) -> Result<SavedProfile, ProfileError>;

    /// Removes a profile file and its stored secrets.
    fn delete(&self, name: &str, profile_type: &str) -> Result<(), ProfileError>;

    /// Names of the profiles of this manager's own type, sorted.
    fn profile_names(&self) -> Result<Vec<String>, ProfileError>;
}

/// A [`ProfileManager`] backed by YAML files under `<root>/profiles`.
#[derive(Debug)]
pub struct FileProfileManager {
    profiles_root: PathBuf,
    profile_type: String,
    configurations: Vec<ProfileTypeConfiguration>,
    credentials: Arc<CredentialSlot>,
}

impl FileProfileManager {
    /// Scans the meta files under `profiles_root` and builds a manager for `profile_type`.
    ///
    /// # Errors
    /// Returns `ProfileError::UnknownType` if no meta file declares the type.
    pub fn new(
        profiles_root: impl Into<PathBuf>,
        profile_type: &str,
        credentials: Arc<CredentialSlot>,
    ) -> Result<Self, ProfileError> {
        let profiles_root = profiles_root.into();
        let configurations = discover_configurations(&profiles_root);

        if !configurations
            .iter()
            .any(|config| config.profile_type == profile_type)
        {
            return Err(ProfileError::UnknownType {
                profile_type: profile_type.to_string(),
                root: profiles_root,
            });
        }

        Ok(Self {
            profiles_root,
            profile_type: profile_type.to_string(),
            configurations,
            credentials,
        })
    }

    fn configuration_for(&self, profile_type: &str) -> Result<&ProfileTypeConfiguration, ProfileError> {
        self.configurations
            .iter()
            .find(|config| config.profile_type == profile_type)
            .ok_or_else(|| ProfileError::UnknownType {
                profile_type: profile_type.to_string(),
                root: self.profiles_root.clone(),
            })
    }

    fn type_dir(&self, profile_type: &str) -> PathBuf {
        self.profiles_root.join(profile_type)
    }

    fn meta_path(&self, profile_type: &str) -> PathBuf {
        self.type_dir(profile_type)
            .join(format!("{}{}", profile_type, META_FILE_SUFFIX))
    }

    fn profile_path(&self, profile_type: &str, name: &str) -> PathBuf {
        self.type_dir(profile_type)
            .join(format!("{}.{}", name, PROFILE_EXTENSION))
    }

    fn read_meta(&self, profile_type: &str) -> Result<ProfileMeta, ProfileError> {
        let path = self.meta_path(profile_type);
        let content = fs::read_to_string(&path).map_err(|e| ProfileError::io(&path, e))?;
        serde_yaml::from_str(&content).map_err(|source| ProfileError::Yaml { path, source })
    }

    fn write_meta(&self, profile_type: &str, meta: &ProfileMeta) -> Result<(), ProfileError> {
        let yaml = serde_yaml::to_string(meta).map_err(ProfileError::YamlSerialize)?;
        write_atomic(&self.meta_path(profile_type), &yaml)
    }

    fn names_for(&self, profile_type: &str) -> Result<Vec<String>, ProfileError> {
        let dir = self.type_dir(profile_type);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ProfileError::io(&dir, e)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == PROFILE_EXTENSION)
            })
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .filter(|stem| !is_meta_stem(stem, profile_type))
            .collect();
        names.sort();
        Ok(names)
    }

    fn load_profile(&self, profile_type: &str, name: &str) -> Result<LoadedProfile, ProfileError> {
        validate_name(name)?;
        let configuration = self.configuration_for(profile_type)?;
        let path = self.profile_path(profile_type, name);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProfileError::NotFound {
                    name: name.to_string(),
                    profile_type: profile_type.to_string(),
                });
            }
            Err(e) => return Err(ProfileError::io(&path, e)),
        };

        let mut profile: ProfileAttributes = serde_yaml::from_str::<Option<ProfileAttributes>>(&content)
            .map_err(|source| ProfileError::Yaml {
                path: path.clone(),
                source,
            })?
            .unwrap_or_default();

        for property in configuration.schema.secure_properties() {
            let is_placeholder = matches!(
                profile.get(property),
                Some(Value::String(value)) if is_managed_marker(value)
            );
            if !is_placeholder {
                continue;
            }
            let account = credentials::secure_account(profile_type, name, property);
            let manager = self.credentials.get().ok_or_else(|| ProfileError::Credential {
                name: name.to_string(),
                source: CredentialError::NotInstalled(property.to_string()),
            })?;
            let secret = manager
                .load(&account)
                .and_then(|secret| secret.ok_or(CredentialError::NotFound(account)))
                .map_err(|source| ProfileError::Credential {
                    name: name.to_string(),
                    source,
                })?;
            profile.insert(property.to_string(), decode_secret(secret));
        }

        log::trace!("Loaded profile '{}' of type '{}'", name, profile_type);
        Ok(LoadedProfile {
            name: name.to_string(),
            profile_type: profile_type.to_string(),
            profile,
            message: format!(
                "Profile \"{}\" of type \"{}\" loaded successfully.",
                name, profile_type
            ),
        })
    }

    /// Moves secure values into the credential store, returning the on-disk body.
    fn store_secure_fields(
        &self,
        manager: &CredentialManager,
        configuration: &ProfileTypeConfiguration,
        name: &str,
        profile: &ProfileAttributes,
    ) -> Result<ProfileAttributes, ProfileError> {
        let mut on_disk = profile.clone();
        for property in configuration.schema.secure_properties() {
            let Some(value) = profile.get(property).filter(|v| !v.is_null()) else {
                continue;
            };
            let account = credentials::secure_account(&configuration.profile_type, name, property);
            manager
                .save(&account, &encode_secret(value))
                .map_err(|source| ProfileError::Credential {
                    name: name.to_string(),
                    source,
                })?;
            on_disk.insert(property.to_string(), Value::String(manager.managed_marker()));
        }
        Ok(on_disk)
    }
}

impl ProfileManager for FileProfileManager {
    fn profile_type(&self) -> &str {
        &self.profile_type
    }

    fn configurations(&self) -> &[ProfileTypeConfiguration] {
        &self.configurations
    }

    fn load_all(&self) -> Result<Vec<LoadedProfile>, ProfileError> {
        let mut loaded = Vec::new();
        for configuration in &self.configurations {
            let profile_type = &configuration.profile_type;
            for name in self.names_for(profile_type)? {
                match self.load_profile(profile_type, &name) {
                    Ok(profile) => loaded.push(profile),
                    Err(e) => log::warn!("Skipping profile '{}' of type '{}': {}", name, profile_type, e),
                }
            }
        }
        Ok(loaded)
    }

    fn load(&self, request: LoadRequest<'_>) -> Result<LoadedProfile, ProfileError> {
        match request {
            LoadRequest::Named(name) => self.load_profile(&self.profile_type, name),
            LoadRequest::Default => {
                let meta = self.read_meta(&self.profile_type)?;
                let name = meta.default_profile.ok_or_else(|| ProfileError::NoDefault {
                    profile_type: self.profile_type.clone(),
                })?;
                self.load_profile(&self.profile_type, &name)
            }
        }
    }

    fn save(&self, request: SaveRequest) -> Result<SavedProfile, ProfileError> {
        let SaveRequest {
            name,
            profile_type,
            profile,
            overwrite,
        } = request;
        validate_name(&name)?;
        let configuration = self.configuration_for(&profile_type)?;

        let missing: Vec<String> = configuration
            .schema
            .required
            .iter()
            .filter(|prop| profile.get(prop.as_str()).is_none_or(Value::is_null))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(ProfileError::MissingRequired { name, missing });
        }

        let path = self.profile_path(&profile_type, &name);
        let overwritten = path.exists();
        if overwritten && !overwrite {
            return Err(ProfileError::AlreadyExists { name, profile_type });
        }

        let on_disk = match self.credentials.get() {
            Some(manager) => self.store_secure_fields(manager, configuration, &name, &profile)?,
            None => profile.clone(),
        };
        let yaml = serde_yaml::to_string(&on_disk).map_err(ProfileError::YamlSerialize)?;
        write_atomic(&path, &yaml)?;

        if let Some(manager) = self.credentials.get().filter(|_| overwritten) {
            drop_stale_secrets(manager, configuration, &name, &profile);
        }

        let mut meta = self.read_meta(&profile_type)?;
        if meta.default_profile.is_none() {
            log::info!("Profile '{}' is now the default for type '{}'", name, profile_type);
            meta.default_profile = Some(name.clone());
            self.write_meta(&profile_type, &meta)?;
        }

        log::info!("Saved profile '{}' of type '{}'", name, profile_type);
        Ok(SavedProfile {
            path,
            profile,
            overwritten,
            message: format!(
                "Profile (\"{}\" of type \"{}\") successfully written",
                name, profile_type
            ),
        })
    }

    fn delete(&self, name: &str, profile_type: &str) -> Result<(), ProfileError> {
        validate_name(name)?;
        let configuration = self.configuration_for(profile_type)?;
        let path = self.profile_path(profile_type, name);

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProfileError::NotFound {
                    name: name.to_string(),
                    profile_type: profile_type.to_string(),
                });
            }
            Err(e) => return Err(ProfileError::io(&path, e)),
        }

        if let Some(manager) = self.credentials.get() {
            for property in configuration.schema.secure_properties() {
                let account = credentials::secure_account(profile_type, name, property);
                if let Err(e) = manager.delete(&account) {
                    log::warn!("Failed to remove secure value '{}': {}", account, e);
                }
            }
        }

        let mut meta = self.read_meta(profile_type)?;
        if meta.default_profile.as_deref() == Some(name) {
            meta.default_profile = None;
            self.write_meta(profile_type, &meta)?;
        }

        log::info!("Deleted profile '{}' of type '{}'", name, profile_type);
        Ok(())
    }

    fn profile_names(&self) -> Result<Vec<String>, ProfileError> {
        self.names_for(&self.profile_type)
    }
}

/// Reads every `<dir>/<dir>_meta.yaml` one level below `profiles_root`, ordered by directory name.
///
/// Unreadable or malformed meta files are logged and skipped.
fn discover_configurations(profiles_root: &Path) -> Vec<ProfileTypeConfiguration> {
    let mut configurations = Vec::new();
    let walker = WalkDir::new(profiles_root)
        .min_depth(2)
        .max_depth(2)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry under {}: {}", profiles_root.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let Some(dir_name) = path
            .parent()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
        else {
            continue;
        };
        if entry.file_name().to_string_lossy() != format!("{}{}", dir_name, META_FILE_SUFFIX) {
            continue;
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| {
                serde_yaml::from_str::<ProfileMeta>(&content).map_err(|e| e.to_string())
            });
        match parsed {
            Ok(meta) => configurations.push(meta.configuration),
            Err(e) => log::warn!("Ignoring meta file '{}': {}", path.display(), e),
        }
    }
    configurations
}

/// Removes stored secrets for secure properties the new body no longer carries.
fn drop_stale_secrets(
    manager: &CredentialManager,
    configuration: &ProfileTypeConfiguration,
    name: &str,
    profile: &ProfileAttributes,
) {
    for property in configuration.schema.secure_properties() {
        if profile.get(property).is_some_and(|v| !v.is_null()) {
            continue;
        }
        let account = credentials::secure_account(&configuration.profile_type, name, property);
        match manager.delete(&account) {
            Ok(true) => log::debug!("Removed stale secure value '{}'", account),
            Ok(false) => {}
            Err(e) => log::warn!("Failed to remove secure value '{}': {}", account, e),
        }
    }
}

fn is_meta_stem(stem: &str, profile_type: &str) -> bool {
    stem.strip_suffix("_meta") == Some(profile_type)
}

fn validate_name(name: &str) -> Result<(), ProfileError> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\'])
        || name.ends_with("_meta");
    if invalid {
        return Err(ProfileError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Secrets are stored as JSON text so numbers and booleans survive the round trip.
fn encode_secret(value: &Value) -> String {
    value.to_string()
}

fn decode_secret(secret: String) -> Value {
    serde_json::from_str(&secret).unwrap_or(Value::String(secret))
}

/// Write to a temp file first, then rename.
fn write_atomic(path: &Path, contents: &str) -> Result<(), ProfileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ProfileError::io(parent, e))?;
    }
    let temp_path = path.with_extension("yaml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ProfileError::io(&temp_path, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.sync_all())
        .map_err(|e| ProfileError::io(&temp_path, e))?;
    fs::rename(&temp_path, path).map_err(|e| ProfileError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::MemoryBackend;
    use crate::core::test_support::{attrs, write_profile, write_type};
    use serde_json::json;
    use tempfile::tempdir;

    fn manager(home: &Path, profile_type: &str, slot: Arc<CredentialSlot>) -> FileProfileManager {
        FileProfileManager::new(crate::core::paths::profiles_dir(home), profile_type, slot).unwrap()
    }

    fn installed_slot() -> (Arc<CredentialSlot>, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let slot = Arc::new(CredentialSlot::new());
        slot.install(CredentialManager::new("Zowe-Plugin", "@zowe/cli", backend.clone()))
            .unwrap();
        (slot, backend)
    }

    #[test]
    fn test_construction_fails_for_undeclared_type() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);

        let result = FileProfileManager::new(
            crate::core::paths::profiles_dir(home.path()),
            "tso",
            Arc::new(CredentialSlot::new()),
        );
        assert!(matches!(result, Err(ProfileError::UnknownType { .. })));
    }

    #[test]
    fn test_configurations_are_ordered_by_directory() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        write_type(home.path(), "base", None);
        write_type(home.path(), "tso", None);
        fs::write(home.path().join("profiles/tso/stray.txt"), "x").unwrap();

        let mgr = manager(home.path(), "tso", Arc::new(CredentialSlot::new()));
        let types: Vec<&str> = mgr
            .configurations()
            .iter()
            .map(|c| c.profile_type.as_str())
            .collect();
        assert_eq!(types, vec!["base", "tso", "zosmf"]);
    }

    #[test]
    fn test_load_default_and_named() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", Some("lpar1"));
        write_profile(home.path(), "zosmf", "lpar1", "host: lpar1.example.com\nport: 443\n");
        write_profile(home.path(), "zosmf", "lpar2", "host: lpar2.example.com\n");
        let mgr = manager(home.path(), "zosmf", Arc::new(CredentialSlot::new()));

        let default = mgr.load(LoadRequest::Default).unwrap();
        assert_eq!(default.name, "lpar1");
        assert_eq!(default.port(), Some(443));

        let named = mgr.load(LoadRequest::Named("lpar2")).unwrap();
        assert_eq!(named.host(), Some("lpar2.example.com"));
        assert_eq!(named.profile_type, "zosmf");

        assert_eq!(mgr.profile_names().unwrap(), vec!["lpar1", "lpar2"]);
    }

    #[test]
    fn test_missing_default_is_distinguishable() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let mgr = manager(home.path(), "zosmf", Arc::new(CredentialSlot::new()));

        let err = mgr.load(LoadRequest::Default).unwrap_err();
        assert!(err.is_no_default());

        let err = mgr.load(LoadRequest::Named("ghost")).unwrap_err();
        assert!(matches!(err, ProfileError::NotFound { .. }));
        assert!(!err.is_no_default());
    }

    #[test]
    fn test_load_all_spans_every_declared_type() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        write_type(home.path(), "tso", None);
        write_profile(home.path(), "zosmf", "a", "host: a\n");
        write_profile(home.path(), "tso", "b", "account: ACCT\n");
        write_profile(home.path(), "tso", "broken", "host: [unclosed\n");
        let mgr = manager(home.path(), "zosmf", Arc::new(CredentialSlot::new()));

        let all = mgr.load_all().unwrap();
        let ids: Vec<(&str, &str)> = all
            .iter()
            .map(|p| (p.profile_type.as_str(), p.name.as_str()))
            .collect();
        assert_eq!(ids, vec![("tso", "b"), ("zosmf", "a")]);
    }

    #[test]
    fn test_save_sets_first_default_and_overwrites() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let mgr = manager(home.path(), "zosmf", Arc::new(CredentialSlot::new()));

        let first = mgr
            .save(SaveRequest {
                name: "lpar1".to_string(),
                profile_type: "zosmf".to_string(),
                profile: attrs(json!({ "host": "one", "port": 1443 })),
                overwrite: true,
            })
            .unwrap();
        assert!(!first.overwritten);
        assert_eq!(mgr.load(LoadRequest::Default).unwrap().name, "lpar1");

        let second = mgr
            .save(SaveRequest {
                name: "lpar1".to_string(),
                profile_type: "zosmf".to_string(),
                profile: attrs(json!({ "host": "two" })),
                overwrite: true,
            })
            .unwrap();
        assert!(second.overwritten);
        assert_eq!(second.profile.get("host"), Some(&json!("two")));
        assert_eq!(
            mgr.load(LoadRequest::Named("lpar1")).unwrap().host(),
            Some("two")
        );
    }

    #[test]
    fn test_save_rejects_missing_required_and_conflicts() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        write_profile(home.path(), "zosmf", "taken", "host: h\n");
        let mgr = manager(home.path(), "zosmf", Arc::new(CredentialSlot::new()));

        let missing = mgr
            .save(SaveRequest {
                name: "nohost".to_string(),
                profile_type: "zosmf".to_string(),
                profile: attrs(json!({ "port": 443 })),
                overwrite: true,
            })
            .unwrap_err();
        assert!(matches!(missing, ProfileError::MissingRequired { ref missing, .. } if missing == &vec!["host".to_string()]));

        let conflict = mgr
            .save(SaveRequest {
                name: "taken".to_string(),
                profile_type: "zosmf".to_string(),
                profile: attrs(json!({ "host": "h2" })),
                overwrite: false,
            })
            .unwrap_err();
        assert!(matches!(conflict, ProfileError::AlreadyExists { .. }));

        let bad_name = mgr
            .save(SaveRequest {
                name: "../escape".to_string(),
                profile_type: "zosmf".to_string(),
                profile: attrs(json!({ "host": "h" })),
                overwrite: true,
            })
            .unwrap_err();
        assert!(matches!(bad_name, ProfileError::InvalidName(_)));
    }

    #[test]
    fn test_secure_fields_round_trip_through_credential_store() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let (slot, backend) = installed_slot();
        let mgr = manager(home.path(), "zosmf", slot);

        mgr.save(SaveRequest {
            name: "lpar1".to_string(),
            profile_type: "zosmf".to_string(),
            profile: attrs(json!({ "host": "h", "user": "ibmuser", "password": "s3cret" })),
            overwrite: true,
        })
        .unwrap();

        let on_disk = fs::read_to_string(home.path().join("profiles/zosmf/lpar1.yaml")).unwrap();
        assert!(!on_disk.contains("s3cret"));
        assert!(on_disk.contains("managed by @zowe/cli"));
        assert_eq!(backend.len(), 2);

        let loaded = mgr.load(LoadRequest::Named("lpar1")).unwrap();
        assert_eq!(loaded.user(), Some("ibmuser"));
        assert_eq!(loaded.profile.get("password"), Some(&json!("s3cret")));

        mgr.delete("lpar1", "zosmf").unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_overwrite_drops_secrets_no_longer_present() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        let (slot, backend) = installed_slot();
        let mgr = manager(home.path(), "zosmf", slot);

        let save = |profile| {
            mgr.save(SaveRequest {
                name: "lpar1".to_string(),
                profile_type: "zosmf".to_string(),
                profile,
                overwrite: true,
            })
        };
        save(attrs(json!({ "host": "h", "user": "ibmuser", "password": "old" }))).unwrap();
        assert_eq!(backend.len(), 2);

        save(attrs(json!({ "host": "h", "user": "ibmuser", "password": null }))).unwrap();

        assert_eq!(backend.len(), 1);
        let loaded = mgr.load(LoadRequest::Named("lpar1")).unwrap();
        assert_eq!(loaded.user(), Some("ibmuser"));
        assert_eq!(loaded.profile.get("password"), Some(&Value::Null));

        save(attrs(json!({ "host": "h" }))).unwrap();
        assert!(backend.is_empty());
    }

    #[test]
    fn test_managed_field_without_credential_manager_fails() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", None);
        write_profile(
            home.path(),
            "zosmf",
            "lpar1",
            "host: h\npassword: managed by @zowe/cli\n",
        );
        let mgr = manager(home.path(), "zosmf", Arc::new(CredentialSlot::new()));

        let err = mgr.load(LoadRequest::Named("lpar1")).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::Credential {
                source: CredentialError::NotInstalled(_),
                ..
            }
        ));
    }

    #[test]
    fn test_delete_clears_default_pointer() {
        let home = tempdir().unwrap();
        write_type(home.path(), "zosmf", Some("lpar1"));
        write_profile(home.path(), "zosmf", "lpar1", "host: h\n");
        let mgr = manager(home.path(), "zosmf", Arc::new(CredentialSlot::new()));

        mgr.delete("lpar1", "zosmf").unwrap();

        assert!(mgr.load(LoadRequest::Default).unwrap_err().is_no_default());
        assert!(matches!(
            mgr.delete("lpar1", "zosmf"),
            Err(ProfileError::NotFound { .. })
        ));
    }
}
