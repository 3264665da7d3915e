use crate::cli::core::{parse_day, parse_period, CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::core::services::{EntryEdit, EntryInput, Period};
use crate::errors::LedgerError;
use crate::ledger::{parse_magnitude, AddOutcome, RecordId, TransactionKind};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            "Record an income, expense or investment",
            "add <income|expense|investment> <YYYY-MM-DD|today> <amount> <category> <description...>",
            cmd_add,
        )
        .logged_in(),
        CommandEntry::new(
            "edit",
            "Select a record for editing, or change fields of it",
            "edit [id] [date=..] [kind=..] [amount=..] [category=..] [description=..]",
            cmd_edit,
        )
        .logged_in(),
        CommandEntry::new("delete", "Remove a record", "delete <id>", cmd_delete).logged_in(),
        CommandEntry::new(
            "list",
            "List records for a period",
            "list [all|YYYY|YYYY-MM]",
            cmd_list,
        )
        .logged_in(),
        CommandEntry::new(
            "categories",
            "Show category labels",
            "categories [kind]",
            cmd_categories,
        )
        .logged_in(),
        CommandEntry::new(
            "category-add",
            "Add a category label",
            "category-add <kind> <label...>",
            cmd_category_add,
        )
        .logged_in(),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 5 {
        return Err(CommandError::InvalidArguments(
            "usage: add <kind> <date> <amount> <category> <description...>".into(),
        ));
    }
    let input = EntryInput {
        kind: args[0].parse()?,
        date: parse_day(args[1])?,
        magnitude: parse_magnitude(args[2])?,
        category: args[3].to_string(),
        description: args[4..].join(" "),
    };
    let record = context.service()?.add(input)?;
    context.transition(|session| session.reset_form());
    output::success(format!(
        "Recorded {} #{} ({} {}).",
        record.kind, record.id, record.category, record.amount
    ));
    Ok(())
}

fn parse_edit(pairs: &[&str]) -> Result<EntryEdit, CommandError> {
    let mut edit = EntryEdit::default();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected field=value, got `{pair}`"))
        })?;
        match key.trim().to_lowercase().as_str() {
            "date" => edit.date = Some(parse_day(value)?),
            "kind" => edit.kind = Some(value.parse::<TransactionKind>()?),
            "amount" => edit.magnitude = Some(parse_magnitude(value)?),
            "category" => edit.category = Some(value.to_string()),
            "description" => edit.description = Some(value.to_string()),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown field `{other}` (date, kind, amount, category, description)"
                )))
            }
        }
    }
    Ok(edit)
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (explicit, fields) = match args.first().map(|arg| arg.parse::<RecordId>()) {
        Some(Ok(id)) => (Some(id), &args[1..]),
        _ => (None, args),
    };
    let id = explicit
        .or_else(|| context.session.editing())
        .ok_or_else(|| CommandError::InvalidArguments("usage: edit <id> [field=value...]".into()))?;

    if fields.is_empty() {
        let records = context.service()?.list(Period::all())?;
        let record = records
            .iter()
            .find(|record| record.id == id)
            .ok_or(LedgerError::NotFound(id))?;
        output::block(&output::render_records(std::slice::from_ref(record), &context.config));
        context.transition(|session| session.begin_edit(id));
        output::info(format!("Editing #{id}. Use `edit field=value ...` to change it."));
        return Ok(());
    }

    let edit = parse_edit(fields)?;
    let record = context.service()?.edit(id, edit)?;
    if context.session.editing() == Some(id) {
        context.transition(|session| session.finish_edit());
    }
    output::success(format!("Updated #{}.", record.id));
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id: RecordId = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: delete <id>".into()))?
        .parse()?;
    let removed = context.service()?.remove(id)?;
    context.transition(|session| session.clear_stale(id));
    output::success(format!("Deleted #{} ({}).", removed.id, removed.description));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let period = parse_period(args.first().copied())?;
    let label = context.session.context(period)?.period.label();
    let records = context.service()?.list(period)?;
    if records.is_empty() {
        output::info(format!("No records for {label}."));
        return Ok(());
    }
    output::section(format!("Records for {label}"));
    output::block(&output::render_records(&records, &context.config));
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kinds = match args.first() {
        Some(raw) => vec![raw.parse::<TransactionKind>()?],
        None => TransactionKind::ALL.to_vec(),
    };
    let registry = context.service()?.categories()?;
    output::section("Categories");
    for kind in kinds {
        output::info(format!("  {:<11} {}", kind, registry.labels(kind).join(", ")));
    }
    Ok(())
}

fn cmd_category_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(CommandError::InvalidArguments(
            "usage: category-add <kind> <label...>".into(),
        ));
    }
    let kind: TransactionKind = args[0].parse()?;
    let label = args[1..].join(" ");
    match context.service()?.add_category(kind, &label)? {
        AddOutcome::Added => output::success(format!("Added {kind} category `{}`.", label.trim())),
        AddOutcome::AlreadyExists => {
            output::info(format!("{kind} category `{}` already exists.", label.trim()))
        }
    }
    Ok(())
}
