// src/cli/handlers/default.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{constants::DEFAULT_PROFILE_TYPE, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Shows the default profile of a type.")]
struct DefaultArgs {
    /// The profile type (defaults to `zosmf`).
    profile_type: Option<String>,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let default_args = DefaultArgs::try_parse_from(&args)?;
    let profile_type = default_args
        .profile_type
        .as_deref()
        .unwrap_or(DEFAULT_PROFILE_TYPE);

    match state.cache.get_default_profile(Some(profile_type)) {
        Some(profile) => println!(
            "{} {}",
            format!(t!("default.info.header"), profile_type = profile_type).green(),
            profile.name.cyan().bold()
        ),
        None => println!(
            "{}",
            format!(t!("default.info.none"), profile_type = profile_type).yellow()
        ),
    }
    Ok(())
}
