// src/core/mod.rs

pub mod credentials;
/// Lazily built, memoized per-type profile managers.
pub mod manager_registry;
/// Profile root resolution and on-disk layout.
pub mod paths;
pub mod profile_cache;
pub mod profile_manager;
pub mod secure_storage;
/// Client settings loading.
pub mod settings;
/// Host URL validation.
pub mod url_validator;

#[cfg(test)]
pub(crate) mod test_support;
