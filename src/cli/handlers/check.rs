// src/cli/handlers/check.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{models::ValidationState, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Validates cached profiles locally and reports their status."
)]
struct CheckArgs {
    /// Profiles to check. All cached profiles when omitted.
    names: Vec<String>,

    /// Turn validation off for the named profiles before checking.
    #[arg(long, conflicts_with = "enable")]
    disable: bool,

    /// Turn validation back on for the named profiles before checking.
    #[arg(long)]
    enable: bool,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let check_args = CheckArgs::try_parse_from(&args)?;

    let names: Vec<String> = if check_args.names.is_empty() {
        state
            .cache
            .all_profiles()
            .iter()
            .map(|p| p.name.clone())
            .collect()
    } else {
        check_args.names
    };

    for name in &names {
        if check_args.disable || check_args.enable {
            state.cache.set_validation_setting(name, check_args.enable);
        }
        let status = state.cache.check_profile(name);
        let label = match status {
            ValidationState::Active => status.to_string().green(),
            ValidationState::Inactive => status.to_string().red(),
            ValidationState::Unverified => status.to_string().yellow(),
        };
        println!("  {:<24} {}", name.cyan(), label);
    }
    Ok(())
}
