// src/cli/handlers/secure.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    core::{
        paths,
        secure_storage::{self, Activation},
    },
    state::AppState,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows whether secure credential storage is configured and active."
)]
struct SecureArgs {}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let _secure_args = SecureArgs::try_parse_from(&args)?;

    let settings_path = paths::imperative_settings_path(&state.cli_home);
    let configured = secure_storage::is_secure_storage_enabled(&state.cli_home);

    println!("\n--- {} ---", t!("secure.header"));
    println!(
        "  {:<20} {}",
        t!("secure.label.settings_file").blue(),
        settings_path.display()
    );
    println!(
        "  {:<20} {}",
        t!("secure.label.configured").blue(),
        if configured { "yes".green() } else { "no".yellow() }
    );
    println!(
        "  {:<20} {}",
        t!("secure.label.service").blue(),
        state.settings.credential_service
    );

    let status = match &state.activation {
        Activation::Installed { service } => {
            format!(t!("secure.status.installed"), service = service).green()
        }
        Activation::AlreadyInitialized => t!("secure.status.already_initialized").green(),
        Activation::Disabled => t!("secure.status.disabled").dimmed(),
        Activation::BackendUnavailable => t!("secure.status.unavailable").red(),
    };
    println!("  {:<20} {}", t!("secure.label.status").blue(), status);

    if let Some(manager) = state.credentials.get() {
        println!(
            "  {:<20} {}",
            t!("secure.label.manager").blue(),
            manager.display_name()
        );
    }
    Ok(())
}
