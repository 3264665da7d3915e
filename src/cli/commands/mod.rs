pub mod access;
pub mod entries;
pub mod reports;
pub mod system;

use crate::cli::registry::{CommandGroup, CommandTable};

pub(crate) fn register_all(table: &mut CommandTable) {
    table.register_group(CommandGroup::Account, access::definitions());
    table.register_group(CommandGroup::Entries, entries::definitions());
    table.register_group(CommandGroup::Reports, reports::definitions());
    table.register_group(CommandGroup::Shell, system::definitions());
}
