// src/models.rs

use crate::constants::{DEFAULT_CREDENTIAL_SERVICE, DEFAULT_PROFILE_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// The attribute bag of a profile (host, port, user, type-specific fields).
pub type ProfileAttributes = Map<String, Value>;

// --- PROFILE MODELS ---

/// A named, typed snapshot of connection attributes as produced by a manager load.
///
/// Identity is the `(name, profile_type)` pair. The cache never mutates a loaded
/// profile; a fresh snapshot replaces it on the next refresh.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoadedProfile {
    /// The profile name, unique within its type.
    pub name: String,
    /// The profile type, e.g. `zosmf`.
    #[serde(rename = "type")]
    pub profile_type: String,
    /// The connection attributes.
    #[serde(default)]
    pub profile: ProfileAttributes,
    /// Human-readable note from the manager that produced the snapshot.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl LoadedProfile {
    /// Builds a snapshot without a manager message.
    pub fn new(
        name: impl Into<String>,
        profile_type: impl Into<String>,
        profile: ProfileAttributes,
    ) -> Self {
        Self {
            name: name.into(),
            profile_type: profile_type.into(),
            profile,
            message: String::new(),
        }
    }

    /// Matches on name and, when given, on type.
    pub fn matches(&self, name: &str, profile_type: Option<&str>) -> bool {
        self.name == name && profile_type.is_none_or(|t| self.profile_type == t)
    }

    /// The `host` attribute, when it is a string.
    pub fn host(&self) -> Option<&str> {
        self.profile.get("host").and_then(Value::as_str)
    }

    /// The port, accepting either a JSON number or a numeric string.
    pub fn port(&self) -> Option<u16> {
        match self.profile.get("port")? {
            Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// The `user` attribute, when it is a string.
    pub fn user(&self) -> Option<&str> {
        self.profile.get("user").and_then(Value::as_str)
    }
}

// --- `<type>_meta.yaml` MODELS ---

/// The per-type meta file: the default profile pointer plus the type's configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMeta {
    /// Name of the type's default profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// The declared type configuration.
    pub configuration: ProfileTypeConfiguration,
}

/// A declared profile type and the schema its profiles follow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProfileTypeConfiguration {
    /// The declared type name.
    #[serde(rename = "type")]
    pub profile_type: String,
    /// The schema its profiles follow.
    #[serde(default)]
    pub schema: ProfileSchema,
}

/// The JSON-schema-like description of a profile type.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ProfileSchema {
    /// The schema `type`, normally `object`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Short human-readable title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Longer human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The recognized properties by name.
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySchema>,
    /// Properties a saved profile must carry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ProfileSchema {
    /// Names of the properties flagged `secure`, in schema order.
    pub fn secure_properties(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, prop)| prop.secure)
            .map(|(name, _)| name.as_str())
    }
}

/// A JSON-schema `type`, either a single name or a union such as `["string", "null"]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum SchemaType {
    /// A single type name.
    Single(String),
    /// A union of type names.
    Union(Vec<String>),
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => f.write_str(name),
            Self::Union(names) => f.write_str(&names.join(" | ")),
        }
    }
}

/// The descriptor of one recognized profile property.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PropertySchema {
    /// The JSON type of the value.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<SchemaType>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the value belongs in the credential store.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub secure: bool,
    /// The command-line option this property maps to, kept verbatim.
    #[serde(
        rename = "optionDefinition",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub option_definition: Option<Value>,
}

// --- `settings/imperative.json` MODELS ---

/// The subset of the imperative settings file that decides secure-storage activity.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ImperativeSettings {
    /// The `overrides` section.
    #[serde(default)]
    pub overrides: SettingsOverrides,
}

/// Values are kept loose: a `false` or `null` override is legal and means "not active".
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// The `CredentialManager` override.
    #[serde(rename = "CredentialManager", default)]
    pub credential_manager: Option<Value>,
    /// The older `credential-manager` spelling.
    #[serde(rename = "credential-manager", default)]
    pub legacy_credential_manager: Option<Value>,
}

impl SettingsOverrides {
    /// The first non-empty string naming a credential manager, camel-case key first.
    pub fn credential_manager_name(&self) -> Option<&str> {
        [&self.credential_manager, &self.legacy_credential_manager]
            .into_iter()
            .filter_map(|value| value.as_ref().and_then(Value::as_str))
            .find(|name| !name.is_empty())
    }
}

// --- `settings.toml` MODELS (client configuration) ---

fn default_credential_service() -> String {
    DEFAULT_CREDENTIAL_SERVICE.to_string()
}

fn default_profile_types() -> Vec<String> {
    vec![DEFAULT_PROFILE_TYPE.to_string()]
}

/// Client-side settings: the type registry, the credential namespace and host traits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Service namespace under which secrets are stored in the credential store.
    #[serde(default = "default_credential_service")]
    pub credential_service: String,
    /// The ordered set of active profile types, refreshed in this order.
    #[serde(default = "default_profile_types")]
    pub profile_types: Vec<String>,
    /// Set when running in a restricted, browser-like host without a native keychain.
    #[serde(default)]
    pub restricted_host: bool,
    /// Optional profile root override, takes precedence over the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_home: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            credential_service: default_credential_service(),
            profile_types: default_profile_types(),
            restricted_host: false,
            cli_home: None,
        }
    }
}

// --- URL MODELS ---

/// The outcome of parsing a user-supplied host URL. All fields are `None` when invalid.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Whether the URL parsed and named a host.
    pub valid: bool,
    /// The scheme without the trailing colon.
    pub protocol: Option<String>,
    /// The host name or address.
    pub host: Option<String>,
    /// `Some(0)` when the URL names no explicit port.
    pub port: Option<u16>,
}

impl ParsedUrl {
    /// The result for a URL that failed to parse.
    pub fn invalid() -> Self {
        Self {
            valid: false,
            protocol: None,
            host: None,
            port: None,
        }
    }
}

// --- VALIDATION MODELS ---

/// The local validation status of a profile.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationState {
    /// Cached, complete and with a valid host.
    Active,
    /// Missing, incomplete or with an invalid host.
    Inactive,
    /// Validation is disabled for the profile.
    Unverified,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unverified => "unverified",
        };
        f.write_str(label)
    }
}

/// The last recorded validation status of a profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileValidation {
    /// The profile name.
    pub name: String,
    /// The recorded status.
    pub status: ValidationState,
}

/// Whether validation is enabled for a profile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidationSetting {
    /// The profile name.
    pub name: String,
    /// Whether validation runs for it.
    pub enabled: bool,
}
