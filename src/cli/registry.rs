use std::collections::HashMap;

use strsim::levenshtein;

use super::{context::CliContext, CommandResult};

/// Largest edit distance still offered as a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

pub type CommandHandler = fn(&mut CliContext, &[String]) -> CommandResult;

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

/// Commands by name, remembering registration order for help output.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandEntry>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: CommandEntry) {
        let name = entry.name;
        if self.commands.insert(name, entry).is_none() {
            self.order.push(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.commands.get(name)
    }

    pub fn list(&self) -> Vec<&CommandEntry> {
        self.order
            .iter()
            .filter_map(|name| self.commands.get(name))
            .collect()
    }

    pub fn handler(&self, name: &str) -> Option<CommandHandler> {
        self.commands.get(name).map(|entry| entry.handler)
    }

    /// Closest registered name to `input`, if it is close enough to be a typo.
    pub fn suggest(&self, input: &str) -> Option<&'static str> {
        self.order
            .iter()
            .map(|name| (levenshtein(name, input), *name))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut CliContext, _: &[String]) -> CommandResult {
        Ok(())
    }

    #[test]
    fn registration_order_is_kept() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("weeks", "", "", noop));
        registry.register(CommandEntry::new("backup", "", "", noop));
        registry.register(CommandEntry::new("weeks", "", "", noop));
        let names: Vec<_> = registry.list().iter().map(|entry| entry.name).collect();
        assert_eq!(names, vec!["weeks", "backup"]);
    }

    #[test]
    fn typos_get_suggestions() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandEntry::new("summary", "", "", noop));
        registry.register(CommandEntry::new("backups", "", "", noop));
        assert_eq!(registry.suggest("sumary"), Some("summary"));
        assert_eq!(registry.suggest("bakcups"), Some("backups"));
        assert_eq!(registry.suggest("zzzzzzzzzz"), None);
    }
}
