// src/cli/handlers/mod.rs

// One module per CLI command.

/// Validates cached profiles.
pub mod check;
/// Output helpers shared by the handlers.
pub mod commons;
/// Shows a type's default profile.
pub mod default;
/// Deletes a profile.
pub mod delete;
/// Lists cached profiles.
pub mod list;
/// Prints a type's schema.
pub mod schema;
/// Reports secure storage status.
pub mod secure;
/// Creates or updates a profile.
pub mod set;
/// Displays one profile.
pub mod show;
/// Lists declared profile types.
pub mod types;
/// Validates a host URL.
pub mod url;
