// src/cli/handlers/schema.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use crate::state::AppState;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Prints the property schema of a profile type.")]
struct SchemaArgs {
    /// The profile type.
    profile_type: String,
}

/// Runs the command with its own arguments.
pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let schema_args = SchemaArgs::try_parse_from(&args)?;
    let schema = state.cache.get_schema(&schema_args.profile_type);
    if schema.is_empty() {
        return Err(anyhow!(
            t!("schema.error.unknown_type"),
            profile_type = schema_args.profile_type
        ));
    }

    println!("\n--- {} '{}' ---", t!("schema.header"), schema_args.profile_type.yellow());
    let width = schema.keys().map(String::len).max().unwrap_or(0);
    for (name, property) in &schema {
        let kind = property
            .property_type
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());
        let secure = if property.secure {
            format!(" [{}]", t!("schema.label.secure")).red().to_string()
        } else {
            String::new()
        };
        let description = property.description.as_deref().unwrap_or("");
        println!(
            "  {:<width$}  {}{}  {}",
            name.cyan(),
            kind.green(),
            secure,
            description.dimmed(),
            width = width
        );
    }
    Ok(())
}
