//! Command-line front end: one command per invocation, dispatched by name.

pub mod commands;
pub mod context;
pub mod output;
pub mod registry;

use std::io;

use thiserror::Error;

use obras_config::ConfigError;
use obras_core::CoreError;

use crate::errors::AppError;
pub use context::CliContext;

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Unknown command `{name}`.{}", suggestion_hint(.suggestion))]
    UnknownCommand {
        name: String,
        suggestion: Option<&'static str>,
    },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(name) => format!(" Did you mean `{name}`?"),
        None => " Type `help` to see available commands.".into(),
    }
}

/// Runs the command named by `args[0]`; prints the overview when `args` is empty.
pub fn run(context: &mut CliContext, args: &[String]) -> CommandResult {
    let Some((name, rest)) = args.split_first() else {
        commands::system::print_overview(context);
        return Ok(());
    };
    let name = name.to_lowercase();
    match context.registry.handler(&name) {
        Some(handler) => handler(context, rest),
        None => Err(CommandError::UnknownCommand {
            suggestion: context.registry.suggest(&name),
            name,
        }),
    }
}

/// Loads settings from the environment's home directory and runs `args`.
pub fn run_cli(args: &[String]) -> Result<(), CommandError> {
    let mut context = CliContext::load()?;
    if !context.config.ui_color_enabled {
        colored::control::set_override(false);
    }
    crate::init(&context.config.log_filter);
    run(&mut context, args)
}
