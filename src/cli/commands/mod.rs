pub mod backup;
pub mod config;
pub mod projects;
pub mod system;

use obras_domain::RowId;

use super::{registry::CommandEntry, CommandError};

/// Every command, in the order `help` lists them.
pub fn all() -> Vec<CommandEntry> {
    let mut entries = Vec::new();
    entries.extend(system::serve_definitions());
    entries.extend(projects::definitions());
    entries.extend(backup::definitions());
    entries.extend(config::definitions());
    entries.extend(system::definitions());
    entries
}

/// Reads the project id expected at `args[0]`.
pub(crate) fn require_id(args: &[String], usage: &str) -> Result<RowId, CommandError> {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))?;
    raw.parse()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a valid project id")))
}

/// Value following `--flag`, if the flag is present.
pub(crate) fn flag_value<'a>(
    args: &'a [String],
    flag: &str,
) -> Result<Option<&'a str>, CommandError> {
    match args.iter().position(|arg| arg == flag) {
        Some(index) => args
            .get(index + 1)
            .map(|value| Some(value.as_str()))
            .ok_or_else(|| CommandError::InvalidArguments(format!("{flag} needs a value"))),
        None => Ok(None),
    }
}
