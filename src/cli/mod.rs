//! Line-oriented shell over the ledger: interactive with completion and history, or
//! scripted from stdin when `LEDGER_CLI_SCRIPT` is set.

pub mod commands;
pub mod core;
pub mod output;
mod registry;
mod shell;

pub use self::core::{CliError, CliMode, CommandError, ShellContext};
pub use shell::run_cli;
