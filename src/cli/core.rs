//! Core CLI loop, dispatch, and shell context helpers.

use std::io;

use chrono::{Local, NaiveDate};
use dialoguer::{theme::ColorfulTheme, Confirm, Password};
use rustyline::error::ReadlineError;

use crate::{
    config::{Config, ConfigError, ConfigManager},
    core::services::{Period, TransactionService},
    errors::LedgerError,
    ledger::{parse_date, CategoryStore, LedgerStore, Owner},
    session::{SessionState, UserDirectory},
};

use super::commands;
use super::output;
use super::registry::{CommandTable, Gate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

/// Errors reported to the user; the shell keeps running.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Not logged in: log in first with `login <identity> <secret>`.")]
    NotLoggedIn,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// Errors that stop the shell.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub commands: CommandTable,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub users: UserDirectory,
    pub session: SessionState,
    pub service: Option<TransactionService>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_config_manager(mode, ConfigManager::new()?)
    }

    pub fn with_config_manager(mode: CliMode, config_manager: ConfigManager) -> Result<Self, CliError> {
        let mut table = CommandTable::new();
        commands::register_all(&mut table);

        let config = config_manager.load()?;
        let users = UserDirectory::open(config_manager.data_path(&config.users_file))?;

        Ok(ShellContext {
            mode,
            commands: table,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            users,
            session: SessionState::new(),
            service: None,
            running: true,
        })
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.commands.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        match self.session.user() {
            Some(user) => format!("ledger({user})> "),
            None => "ledger> ".to_string(),
        }
    }

    /// Applies a session transition in place.
    pub(crate) fn transition(&mut self, step: impl FnOnce(SessionState) -> SessionState) {
        let current = self.session.clone();
        self.session = step(current);
    }

    /// Opens the owner-scoped ledger for `owner` and records the login on the session.
    pub(crate) fn open_session(&mut self, owner: Owner) {
        let store = LedgerStore::new(
            self.config_manager.data_path(&self.config.ledger_file),
            owner.clone(),
        )
        .with_write_mode(self.config.write_mode);
        let categories =
            CategoryStore::new(self.config_manager.data_path(&self.config.categories_file));
        self.service = Some(TransactionService::new(store, categories));
        self.transition(|session| session.login(owner));
    }

    pub(crate) fn close_session(&mut self) {
        self.service = None;
        self.transition(SessionState::logout);
    }

    pub(crate) fn service(&mut self) -> Result<&mut TransactionService, CommandError> {
        self.service.as_mut().ok_or(CommandError::NotLoggedIn)
    }

    pub(crate) fn current_user(&self) -> Result<Owner, CommandError> {
        self.session.user().cloned().ok_or(CommandError::NotLoggedIn)
    }

    pub(crate) fn require_admin(&self) -> Result<(), CommandError> {
        let user = self.current_user()?;
        if self.users.is_admin(&user) {
            Ok(())
        } else {
            Err(LedgerError::Access(format!("`{user}` is not an administrator")).into())
        }
    }

    pub(crate) fn persist_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Reads a secret from the terminal; script mode must pass it inline.
    pub(crate) fn read_secret(&self, prompt: &str) -> Result<String, CommandError> {
        if self.mode == CliMode::Script {
            return Err(CommandError::InvalidArguments(
                "secret must be passed as an argument in script mode".into(),
            ));
        }
        Ok(Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact()?)
    }

    /// Runs `command` once its gate admits the current session.
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some((gate, handler)) = self
            .commands
            .get(command)
            .map(|entry| (entry.gate, entry.handler))
        else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        self.admit(gate)?;
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    fn admit(&self, gate: Gate) -> Result<(), CommandError> {
        match gate {
            Gate::Open => Ok(()),
            Gate::LoggedIn => self.current_user().map(|_| ()),
            Gate::Admin => self.require_admin(),
        }
    }

    #[cfg(test)]
    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        crate::cli::shell::handle_line(self, line)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        if let Some(best) = self.commands.nearest(input) {
            output::info(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()
            .map_err(|err| CliError::Command(err.to_string()))
    }

    pub(crate) fn report_error(&mut self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                self.print_error(&message);
                output::hint("Use `help <command>` for usage details.");
                Ok(())
            }
            CommandError::Ledger(LedgerError::NotFound(id)) => {
                self.transition(|session| session.clear_stale(id));
                self.print_error(&format!("Record {id} no longer exists."));
                output::hint("Use `list` to see current record ids.");
                Ok(())
            }
            CommandError::Ledger(LedgerError::Conflict(path)) => {
                self.print_error(&format!(
                    "`{}` was changed by someone else; nothing was written.",
                    path.display()
                ));
                output::hint("Run `list` to reload, then repeat the command.");
                Ok(())
            }
            other => {
                self.print_error(&other.to_string());
                Ok(())
            }
        }
    }

    pub(crate) fn print_error(&self, message: &str) {
        output::error(message);
    }

    pub(crate) fn print_warning(&self, message: &str) {
        output::warning(message);
    }
}

pub(crate) fn parse_day(input: &str) -> Result<NaiveDate, CommandError> {
    if input.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    Ok(parse_date(input)?)
}

/// `all`, `YYYY` or `YYYY-MM`.
pub(crate) fn parse_period(input: Option<&str>) -> Result<Period, CommandError> {
    let Some(raw) = input.map(str::trim) else {
        return Ok(Period::all());
    };
    if raw.eq_ignore_ascii_case("all") {
        return Ok(Period::all());
    }
    let invalid = || CommandError::InvalidArguments(format!("invalid period `{raw}` (use YYYY or YYYY-MM)"));
    match raw.split_once('-') {
        Some((year, month)) => {
            let year = year.parse::<i32>().map_err(|_| invalid())?;
            let month = month.parse::<u32>().map_err(|_| invalid())?;
            if !(1..=12).contains(&month) {
                return Err(invalid());
            }
            Ok(Period::month(year, month))
        }
        None => raw.parse::<i32>().map(Period::year).map_err(|_| invalid()),
    }
}

#[cfg(test)]
pub(crate) fn process_script(base: &std::path::Path, lines: &[&str]) -> Result<ShellContext, CliError> {
    let manager = ConfigManager::with_base_dir(base.to_path_buf())?;
    let mut app = ShellContext::with_config_manager(CliMode::Script, manager)?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err)?,
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RecordId;
    use tempfile::tempdir;

    #[test]
    fn period_argument_forms() {
        assert_eq!(parse_period(None).unwrap(), Period::all());
        assert_eq!(parse_period(Some("2024")).unwrap(), Period::year(2024));
        assert_eq!(parse_period(Some("2024-03")).unwrap(), Period::month(2024, 3));
        assert!(parse_period(Some("2024-13")).is_err());
        assert!(parse_period(Some("march")).is_err());
    }

    #[test]
    fn commands_require_login() {
        let dir = tempdir().unwrap();
        let mut app = process_script(dir.path(), &[]).unwrap();
        assert!(matches!(
            app.process_line("add expense 2024-05-02 10 Food Lunch"),
            Err(CommandError::NotLoggedIn)
        ));
        assert!(matches!(app.process_line("list"), Err(CommandError::NotLoggedIn)));
        assert!(matches!(app.process_line("users"), Err(CommandError::NotLoggedIn)));
        assert!(matches!(app.process_line("help list"), Ok(LoopControl::Continue)));
    }

    #[test]
    fn edit_reference_survives_until_finished_or_stale() {
        let dir = tempdir().unwrap();
        let app = process_script(
            dir.path(),
            &[
                "login admin admin123",
                "add expense 2024-05-02 89.90 Food Groceries",
                "add expense 2024-05-03 10 Transport Bus",
                "edit 2",
                "delete 2",
            ],
        )
        .unwrap();
        assert_eq!(app.session.editing(), None);

        let mut app = process_script(
            dir.path(),
            &["login admin admin123", "edit 1", "edit amount=95"],
        )
        .unwrap();
        assert_eq!(app.session.editing(), None);
        let records = app.service().unwrap().list(Period::all()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId(1));
        assert_eq!(records[0].amount, rust_decimal::Decimal::new(-95, 0));
    }

    #[test]
    fn non_admin_cannot_approve() {
        let dir = tempdir().unwrap();
        let app = process_script(
            dir.path(),
            &[
                "register ana pw",
                "register bia pw",
                "login admin admin123",
                "approve ana",
                "logout",
                "login ana pw",
                "approve bia",
            ],
        )
        .unwrap();
        let statuses = app.users.users();
        let bia = statuses.iter().find(|user| user.identity == "bia").unwrap();
        assert!(!bia.approved);
        assert_eq!(app.session.user(), Some(&Owner::new("ana")));
    }
}
