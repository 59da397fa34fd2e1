// src/cli/handlers/show.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Displays a cached profile with its secure values masked."
)]
struct ShowArgs {
    /// The profile name.
    name: String,

    /// Restrict the lookup to one profile type.
    #[arg(long = "type", short = 't')]
    profile_type: Option<String>,

    /// Print the profile as JSON.
    #[arg(long)]
    json: bool,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let show_args = ShowArgs::try_parse_from(&args)?;
    let profile = state
        .cache
        .load_named_profile(&show_args.name, show_args.profile_type.as_deref())?;

    let schema = state.cache.get_schema(&profile.profile_type);
    let attributes = commons::masked_attributes(&profile, &schema);

    if show_args.json {
        println!("{}", serde_json::to_string_pretty(&attributes)?);
        return Ok(());
    }

    println!(
        "\n--- {} '{}' ({}) ---",
        t!("show.header"),
        profile.name.yellow(),
        profile.profile_type.green()
    );
    commons::print_attributes(&attributes);

    let is_default = state
        .cache
        .get_default_profile(Some(profile.profile_type.as_str()))
        .is_some_and(|d| d.name == profile.name);
    if is_default {
        println!("\n  {}", t!("show.info.is_default").dimmed());
    }
    Ok(())
}
