//! Mainframe connection profile discovery, caching and validation.

include!(concat!(env!("OUT_DIR"), "/translations.rs"));

/// Command-line parsing and the per-command handlers.
pub mod cli;
/// File names, directory names and defaults shared across modules.
pub mod constants;
/// The profile engine.
pub mod core;
/// Debug-build helpers.
pub mod dev_utils;
/// Serializable data types for profiles, settings and validation.
pub mod models;
/// Per-process application state.
pub mod state;
