// src/bin/zprofiles.rs

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser};
use colored::*;
use zprofiles::{
    cli::{Cli, handlers},
    state::AppState,
    t,
};

// --- Command Definition and Registry ---

/// Defines a command, its aliases, and its handler function.
/// Every handler parses its own arguments and works on the shared application state.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppState) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "list",
        aliases: &["ls"],
        handler: handlers::list::handle,
    },
    CommandDefinition {
        name: "show",
        aliases: &[],
        handler: handlers::show::handle,
    },
    CommandDefinition {
        name: "default",
        aliases: &[],
        handler: handlers::default::handle,
    },
    CommandDefinition {
        name: "types",
        aliases: &[],
        handler: handlers::types::handle,
    },
    CommandDefinition {
        name: "schema",
        aliases: &[],
        handler: handlers::schema::handle,
    },
    CommandDefinition {
        name: "set",
        aliases: &[],
        handler: handlers::set::handle,
    },
    CommandDefinition {
        name: "delete",
        aliases: &["rm"],
        handler: handlers::delete::handle,
    },
    CommandDefinition {
        name: "url",
        aliases: &[],
        handler: handlers::url::handle,
    },
    CommandDefinition {
        name: "check",
        aliases: &[],
        handler: handlers::check::handle,
    },
    CommandDefinition {
        name: "secure",
        aliases: &[],
        handler: handlers::secure::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Sets up logging, parses arguments, dispatches to the handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let mut args = cli.args.into_iter();
    let Some(command_name) = args.next() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let command = find_command(&command_name)
        .ok_or_else(|| anyhow!(t!("error.unknown_command"), name = command_name))?;

    let mut state = AppState::bootstrap(cli.home)?;
    let failures = state.last_refresh().failures();
    if failures > 0 {
        log::warn!("{} profile load(s) failed during refresh", failures);
    }

    (command.handler)(args.collect(), &mut state)
}
