// src/cli/handlers/types.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::state::AppState;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists every declared profile type and marks the registered ones."
)]
struct TypesArgs {
    /// Recapture the declared types from disk before listing.
    #[arg(long)]
    reload: bool,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let types_args = TypesArgs::try_parse_from(&args)?;
    if types_args.reload {
        state.cache.clear_all_types();
        state.refresh();
    }

    let all_types = state.cache.get_all_types();
    if all_types.is_empty() {
        println!("{}", t!("types.info.none").yellow());
        return Ok(());
    }

    println!("\n{}:", t!("types.info.header"));
    for profile_type in all_types {
        let registered = state.settings.profile_types.contains(profile_type);
        let count = state
            .cache
            .get_profiles(Some(profile_type.as_str()))
            .map_or(0, <[_]>::len);
        if registered {
            println!(
                "  {} {}",
                profile_type.cyan(),
                format!(t!("types.info.count"), count = count).dimmed()
            );
        } else {
            println!("  {} {}", profile_type.dimmed(), t!("types.info.unregistered").dimmed());
        }
    }
    Ok(())
}
