use crate::cli::{context::CliContext, output, registry::CommandEntry, CommandError, CommandResult};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "backup",
            "Snapshot the data file into the backups directory",
            "backup [note]",
            cmd_backup,
        ),
        CommandEntry::new("backups", "List data backups, newest first", "backups", cmd_backups),
        CommandEntry::new(
            "restore",
            "Replace the data file with a backup",
            "restore <file>",
            cmd_restore,
        ),
    ]
}

fn cmd_backup(context: &mut CliContext, args: &[String]) -> CommandResult {
    let store = context.open_store()?;
    let note = args.join(" ");
    let info = store.backup(Some(note.as_str()).filter(|note| !note.trim().is_empty()))?;
    output::success(format!("Backup created: {}", info.name));
    Ok(())
}

fn cmd_backups(context: &mut CliContext, _args: &[String]) -> CommandResult {
    let store = context.open_store()?;
    let backups = store.list_backups()?;
    if backups.is_empty() {
        output::info("No backups found.");
        return Ok(());
    }
    output::section("Backups");
    for backup in backups {
        let created = backup
            .created_at
            .map(|stamp| stamp.format("%d/%m/%Y %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".into());
        let kind = if backup.automatic { "auto" } else { "manual" };
        println!(
            "  {:<48}  {:<6}  {:<23}  {:>8} B",
            backup.name, kind, created, backup.size_bytes
        );
    }
    Ok(())
}

fn cmd_restore(context: &mut CliContext, args: &[String]) -> CommandResult {
    let name = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: restore <file>".into()))?;
    let store = context.open_store()?;
    let restored = store.restore_backup(name)?;
    output::success(format!(
        "Restored {} ({} projects, {} expenses)",
        name,
        restored.obras.len(),
        restored.anotes.len()
    ));
    Ok(())
}
