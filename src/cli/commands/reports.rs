use crate::cli::core::{parse_period, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{Period, SummaryService};
use crate::ledger::parse_magnitude;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "summary",
            "Totals, category breakdown and goal progress; a year adds monthly totals",
            "summary [all|YYYY|YYYY-MM]",
            cmd_summary,
        )
        .logged_in(),
        CommandEntry::new(
            "goal",
            "Show or set the savings goal",
            "goal [amount|clear]",
            cmd_goal,
        )
        .logged_in(),
    ]
}

fn cmd_summary(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let period = parse_period(args.first().copied())?;
    let period = context.session.context(period)?.period;
    let records = context.service()?.list(period)?;
    let rendered =
        output::render_summary(period, &records, context.config.savings_goal, &context.config)?;
    output::block(&rendered);
    Ok(())
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().copied() {
        None => {
            let records = context.service()?.list(Period::all())?;
            let saved = SummaryService::savings_total(&records)?;
            output::block(&output::render_goal(saved, context.config.savings_goal, &context.config));
            Ok(())
        }
        Some(raw) if raw.eq_ignore_ascii_case("clear") => {
            context.config.savings_goal = None;
            context.persist_config()?;
            output::success("Savings goal cleared.");
            Ok(())
        }
        Some(raw) => {
            let goal = parse_magnitude(raw).map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            context.config.savings_goal = Some(goal);
            context.persist_config()?;
            output::success(format!("Savings goal set to {goal}."));
            Ok(())
        }
    }
}
