//! Shell command table: who may run each command and how `help` groups them.

use strsim::levenshtein;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Sections of the `help` listing, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Account,
    Entries,
    Reports,
    Shell,
}

impl CommandGroup {
    pub const ORDER: [CommandGroup; 4] = [
        CommandGroup::Account,
        CommandGroup::Entries,
        CommandGroup::Reports,
        CommandGroup::Shell,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CommandGroup::Account => "Account",
            CommandGroup::Entries => "Ledger entries",
            CommandGroup::Reports => "Reports",
            CommandGroup::Shell => "Shell",
        }
    }
}

/// Checked by the shell before a handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Open,
    LoggedIn,
    Admin,
}

impl Gate {
    pub fn requirement(self) -> Option<&'static str> {
        match self {
            Gate::Open => None,
            Gate::LoggedIn => Some("a logged-in user"),
            Gate::Admin => Some("an administrator"),
        }
    }
}

pub struct CommandEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub group: CommandGroup,
    pub gate: Gate,
    pub handler: CommandHandler,
}

impl CommandEntry {
    /// Open command; the group is assigned when the entry is registered.
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
            group: CommandGroup::Shell,
            gate: Gate::Open,
            handler,
        }
    }

    pub fn logged_in(mut self) -> Self {
        self.gate = Gate::LoggedIn;
        self
    }

    pub fn admin_only(mut self) -> Self {
        self.gate = Gate::Admin;
        self
    }

    /// Argument part of the usage line, empty for bare commands.
    pub fn arguments(&self) -> &'static str {
        self.usage
            .split_once(' ')
            .map(|(_, rest)| rest)
            .unwrap_or_default()
    }
}

#[derive(Default)]
pub struct CommandTable {
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `entries` under `group`; a later entry with the same name replaces the earlier one.
    pub fn register_group(&mut self, group: CommandGroup, entries: Vec<CommandEntry>) {
        for mut entry in entries {
            entry.group = group;
            match self.entries.iter_mut().find(|known| known.name == entry.name) {
                Some(known) => *known = entry,
                None => self.entries.push(entry),
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    /// Non-empty groups in display order, entries in registration order.
    pub fn grouped(&self) -> Vec<(CommandGroup, Vec<&CommandEntry>)> {
        CommandGroup::ORDER
            .into_iter()
            .map(|group| {
                let members: Vec<&CommandEntry> = self
                    .entries
                    .iter()
                    .filter(|entry| entry.group == group)
                    .collect();
                (group, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect()
    }

    /// Closest command name within the suggestion distance; ties go to the earlier entry.
    pub fn nearest(&self, input: &str) -> Option<&'static str> {
        let input = input.to_lowercase();
        let mut ranked: Vec<(usize, &'static str)> = self
            .names()
            .map(|name| (levenshtein(name, &input), name))
            .collect();
        ranked.sort_by_key(|(distance, _)| *distance);
        ranked
            .first()
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .map(|(_, name)| *name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
        Ok(())
    }

    fn table() -> CommandTable {
        let mut table = CommandTable::new();
        table.register_group(
            CommandGroup::Reports,
            vec![CommandEntry::new("summary", "Totals", "summary [period]", noop).logged_in()],
        );
        table.register_group(
            CommandGroup::Account,
            vec![
                CommandEntry::new("login", "Open", "login <identity>", noop),
                CommandEntry::new("users", "List", "users", noop).admin_only(),
            ],
        );
        table
    }

    #[test]
    fn groups_follow_display_order() {
        let table = table();
        let groups: Vec<CommandGroup> = table.grouped().into_iter().map(|(group, _)| group).collect();
        assert_eq!(groups, vec![CommandGroup::Account, CommandGroup::Reports]);
        assert_eq!(table.get("users").map(|entry| entry.gate), Some(Gate::Admin));
        assert_eq!(table.get("summary").map(|entry| entry.arguments()), Some("[period]"));
        assert_eq!(table.get("users").map(|entry| entry.arguments()), Some(""));
    }

    #[test]
    fn nearest_name_is_suggested_within_distance() {
        let table = table();
        assert_eq!(table.nearest("SUMARY"), Some("summary"));
        assert_eq!(table.nearest("loggin"), Some("login"));
        assert_eq!(table.nearest("approve-everyone"), None);
    }
}
