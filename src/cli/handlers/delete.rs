// src/cli/handlers/delete.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::{
    models::{LoadedProfile, ProfileAttributes},
    state::AppState,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Deletes a profile and its stored secrets."
)]
struct DeleteArgs {
    /// The profile type.
    profile_type: String,

    /// The profile name.
    name: String,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    yes: bool,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let delete_args = DeleteArgs::try_parse_from(&args)?;

    let profile = resolve_target(state, &delete_args.profile_type, &delete_args.name)?;

    if !delete_args.yes && !confirm_delete(&profile.name)? {
        return Ok(());
    }

    log::info!(
        "Deleting profile '{}' of type '{}'",
        profile.name,
        profile.profile_type
    );
    state.cache.delete_profile_on_disk(&profile)?;
    state.refresh();

    println!(
        "{} {}",
        t!("common.success"),
        format_args!(t!("delete.success.deleted"), name = profile.name.cyan())
    );
    Ok(())
}

/// Finds the profile to delete. A profile file that exists but cannot be loaded
/// is still a valid target.
fn resolve_target(state: &AppState, profile_type: &str, name: &str) -> Result<LoadedProfile> {
    if let Some(profile) = state
        .cache
        .load_named_profile(name, Some(profile_type))
        .ok()
        .or_else(|| state.cache.direct_load(profile_type, name))
    {
        return Ok(profile);
    }

    if state
        .cache
        .get_names_for_type(profile_type)
        .iter()
        .any(|existing| existing == name)
    {
        log::warn!("Profile '{}' cannot be loaded; deleting it by name", name);
        return Ok(LoadedProfile::new(name, profile_type, ProfileAttributes::new()));
    }

    Err(anyhow!(
        t!("delete.error.not_found"),
        name = name,
        profile_type = profile_type
    ))
}

fn confirm_delete(name: &str) -> Result<bool> {
    println!(
        "\n{}",
        format!(t!("delete.warning.header"), name = name).red().bold()
    );
    if !Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("common.prompt.are_you_sure"))
        .default(false)
        .interact()?
    {
        println!("\n{}", t!("common.info.operation_cancelled"));
        return Ok(false);
    }
    Ok(true)
}
