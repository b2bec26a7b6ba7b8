use std::sync::Arc;

use tokio::net::TcpListener;

use obras_core::{MemoryStore, ObraStore, SystemClock, CURRENT_SCHEMA_VERSION};

use crate::{
    cli::{context::CliContext, output, registry::CommandEntry, CommandError, CommandResult},
    errors::AppError,
    http::{self, AppState},
    utils::build_info,
};

pub(crate) fn serve_definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "serve",
        "Run the HTTP API (in-memory data with --memory)",
        "serve [--memory]",
        cmd_serve,
    )]
}

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
    ]
}

pub(crate) fn print_overview(context: &CliContext) {
    output::section("Available commands");
    for entry in context.registry.list() {
        println!("  {:<10} {}", entry.name, entry.description);
    }
    output::info("Use `help <command>` for details.");
}

fn cmd_serve(context: &mut CliContext, args: &[String]) -> CommandResult {
    let in_memory = args.iter().any(|arg| arg == "--memory");
    let store: Arc<dyn ObraStore> = if in_memory {
        output::warning("Serving in-memory data; nothing will be saved.");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(context.open_store()?)
    };
    let state = AppState::new(store, Arc::new(SystemClock), context.offset()?);
    let address = context.config.bind_address();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|err| AppError::Server(format!("cannot bind {address}: {err}")))?;
        output::info(format!("Listening on http://{address}"));
        http::serve(listener, state).await
    })?;
    Ok(())
}

fn cmd_version(_context: &mut CliContext, _args: &[String]) -> CommandResult {
    let meta = build_info::current();
    output::section(format!("obras {}", meta.version));
    output::two_column(&[
        ("Data schema", format!("v{CURRENT_SCHEMA_VERSION}")),
        (
            "Build hash",
            format!("{} ({})", meta.git_hash, meta.git_status),
        ),
        ("Built at", meta.timestamp.to_string()),
        ("Target", meta.target.to_string()),
        ("Profile", meta.profile.to_string()),
        ("Rustc", meta.rustc.to_string()),
    ]);
    Ok(())
}

fn cmd_help(context: &mut CliContext, args: &[String]) -> CommandResult {
    let Some(name) = args.first().map(|name| name.to_lowercase()) else {
        print_overview(context);
        return Ok(());
    };
    match context.command(&name) {
        Some(entry) => {
            output::section(format!("Help: {}", entry.name));
            output::two_column(&[
                ("description", entry.description.to_string()),
                ("usage", entry.usage.to_string()),
            ]);
            Ok(())
        }
        None => Err(CommandError::UnknownCommand {
            suggestion: context.registry.suggest(&name),
            name,
        }),
    }
}
