// src/cli/handlers/url.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{core::url_validator, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Validates a host URL and shows its parts.")]
struct UrlArgs {
    /// The URL to validate, e.g. `https://host:443`.
    input: String,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, _state: &mut AppState) -> Result<()> {
    let url_args = UrlArgs::try_parse_from(&args)?;
    let parsed = url_validator::validate_and_parse_url(&url_args.input);

    if !parsed.valid {
        println!("{} {}", t!("url.info.invalid").red().bold(), url_args.input);
        return Ok(());
    }

    println!("{} {}", t!("url.info.valid").green().bold(), url_args.input);
    let fields = [
        (t!("url.label.protocol"), parsed.protocol.unwrap_or_default()),
        (t!("url.label.host"), parsed.host.unwrap_or_default()),
        (
            t!("url.label.port"),
            parsed.port.map(|p| p.to_string()).unwrap_or_default(),
        ),
    ];
    for (label, value) in fields {
        println!("  {:<10} {}", label.blue(), value);
    }
    Ok(())
}
