// src/constants.rs

/// The name of the default profile root directory under the user's home (`~/.zowe`).
pub const DEFAULT_HOME_DIR: &str = ".zowe";

/// The prefix of every environment variable the CLI home honours.
pub const ENV_PREFIX: &str = "ZOWE";

/// The suffix appended to [`ENV_PREFIX`] to name the profile root override variable.
pub const CLI_HOME_ENV_SUFFIX: &str = "_CLI_HOME";

/// The directory (inside the profile root) holding one sub-directory per profile type.
pub const PROFILES_DIR: &str = "profiles";

/// The directory (inside the profile root) holding the settings file.
pub const SETTINGS_DIR: &str = "settings";

/// The settings file inspected to decide whether secure storage is active.
pub const IMPERATIVE_SETTINGS_FILENAME: &str = "imperative.json";

/// Suffix of the per-type meta file (`<type>_meta.yaml`).
pub const META_FILE_SUFFIX: &str = "_meta.yaml";

/// Extension of profile files on disk.
pub const PROFILE_EXTENSION: &str = "yaml";

/// The implicit, always-checked cross-cutting profile type.
pub const BASE_PROFILE_TYPE: &str = "base";

/// The type used by lookups when the caller does not name one.
pub const DEFAULT_PROFILE_TYPE: &str = "zosmf";

/// The secret-storage module requested from the backend provider.
pub const SECURE_MODULE_NAME: &str = "keytar";

/// Service namespace used for credential entries when settings leave it unset.
pub const DEFAULT_CREDENTIAL_SERVICE: &str = "Zowe-Plugin";

/// The port assumed when the literal `:443` appears in a host URL.
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// The name of the client settings file (in `~/.config/zprofiles/`).
pub const CLIENT_SETTINGS_FILENAME: &str = "settings.toml";
