// src/cli/handlers/list.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{models::LoadedProfile, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists the cached profiles, grouped by type.")]
struct ListArgs {
    /// Only list profiles of this type.
    profile_type: Option<String>,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let list_args = ListArgs::try_parse_from(&args)?;

    let types = match list_args.profile_type {
        Some(profile_type) => vec![profile_type],
        None => {
            if let Some(base) = state.cache.get_base_profile() {
                println!("\n{} {}", t!("list.label.base").green().bold(), base.name.cyan());
            }
            state.settings.profile_types.clone()
        }
    };

    for profile_type in &types {
        print_type(state, profile_type);
    }
    Ok(())
}

fn print_type(state: &AppState, profile_type: &str) {
    println!("\n{}", profile_type.green().bold());

    let profiles: &[LoadedProfile] = state.cache.get_profiles(Some(profile_type)).unwrap_or(&[]);
    if profiles.is_empty() {
        println!("  {}", t!("list.info.none").dimmed());
        return;
    }

    let default_name = state
        .cache
        .get_default_profile(Some(profile_type))
        .map(|p| p.name.as_str());

    for profile in profiles {
        let marker = if Some(profile.name.as_str()) == default_name {
            format!(" ({})", t!("list.label.default")).yellow().to_string()
        } else {
            String::new()
        };
        let host = profile.host().unwrap_or("-");
        println!("  {}{}  {}", profile.name.cyan(), marker, host.dimmed());
    }
}
