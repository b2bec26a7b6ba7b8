use obras_config::SETTABLE_KEYS;

use crate::cli::{context::CliContext, output, registry::CommandEntry, CommandError, CommandResult};

const USAGE: &str = "config [show|set <key> <value>|backup [note]|backups|restore <file>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "Show or change settings and manage their backups",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut CliContext, args: &[String]) -> CommandResult {
    let Some((action, rest)) = args.split_first() else {
        return show(context);
    };
    match action.to_lowercase().as_str() {
        "show" => show(context),
        "set" => set(context, rest),
        "backup" => backup(context, rest),
        "backups" => list_backups(context),
        "restore" => restore(context, rest),
        _ => Err(CommandError::InvalidArguments(format!("usage: {USAGE}"))),
    }
}

fn show(context: &CliContext) -> CommandResult {
    let config = &context.config;
    output::section("Configuration");
    output::two_column(&[
        ("Config file", context.config_path().display().to_string()),
        ("Data dir", context.data_dir().display().to_string()),
        ("Listen", config.bind_address()),
        ("UTC offset", format!("{} min", config.utc_offset_minutes)),
        ("Currency", config.currency_symbol.clone()),
        (
            "Separators",
            format!(
                "decimal `{}`, grouping `{}`",
                config.decimal_separator, config.grouping_separator
            ),
        ),
        ("Backups kept", config.backup_retention.to_string()),
        ("Log filter", config.log_filter.clone()),
        ("Color", config.ui_color_enabled.to_string()),
    ]);
    Ok(())
}

fn set(context: &mut CliContext, args: &[String]) -> CommandResult {
    let (key, value) = match args {
        [key, value @ ..] if !value.is_empty() => (key.to_lowercase(), value.join(" ")),
        _ => {
            return Err(CommandError::InvalidArguments(format!(
                "usage: config set <key> <value> (keys: {})",
                SETTABLE_KEYS.join(", ")
            )))
        }
    };
    let mut effective = context
        .config_manager
        .update(|config| config.set_value(&key, &value))?;
    effective.apply_env_overrides()?;
    context.config = effective;
    output::success(format!("Set {key} = {}", value.trim()));
    Ok(())
}

fn backup(context: &mut CliContext, args: &[String]) -> CommandResult {
    let note = args.join(" ");
    let note = Some(note.as_str()).filter(|note| !note.trim().is_empty());
    let backup = context.config_manager.backup(note)?;
    output::success(format!("Configuration backup created: {}", backup.name));
    Ok(())
}

fn list_backups(context: &CliContext) -> CommandResult {
    let backups = context.config_manager.list_backups()?;
    if backups.is_empty() {
        output::info("No configuration backups found.");
        return Ok(());
    }
    output::section("Configuration backups");
    for backup in backups {
        let created = backup
            .created_at
            .map(|stamp| stamp.format("%d/%m/%Y %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".into());
        println!("  {:<48}  {}", backup.name, created);
    }
    Ok(())
}

fn restore(context: &mut CliContext, args: &[String]) -> CommandResult {
    let name = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: config restore <file>".into()))?;
    let mut restored = context.config_manager.restore(name)?;
    restored.apply_env_overrides()?;
    context.config = restored;
    output::success(format!("Configuration restored from {name}"));
    Ok(())
}
