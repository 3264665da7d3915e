use colored::Colorize;
use rust_decimal::Decimal;
use std::fmt;

use crate::{
    config::Config,
    core::services::{summary_service::checked_total, CategoryTotal, Period, SummaryService},
    currency::{format_currency_value, format_date, format_percent},
    errors::LedgerError,
    ledger::{Transaction, TransactionKind},
};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[ok]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Hint => ("HINT", ""),
        MessageKind::Section => ("INFO", ""),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => {
            let (label, icon) = build_label(kind);
            if icon.is_empty() {
                format!("{label}: {text}")
            } else {
                format!("{label}: {icon} {text}")
            }
        }
    };

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.dimmed().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Unstyled block of pre-rendered lines.
pub fn block(text: &str) {
    for line in text.lines() {
        println!("{line}");
    }
}

fn money(config: &Config, amount: Decimal) -> String {
    format_currency_value(amount, &config.currency, &config.locale, &config.format)
}

/// Records as a fixed-width table, amounts signed.
pub fn render_records(records: &[Transaction], config: &Config) -> String {
    let mut out = format!(
        "{:>4}  {:<10}  {:<10}  {:<14}  {:>16}  {}\n",
        "Id", "Date", "Kind", "Category", "Amount", "Description"
    );
    for record in records {
        out.push_str(&format!(
            "{:>4}  {:<10}  {:<10}  {:<14}  {:>16}  {}\n",
            record.id,
            format_date(&config.locale, record.date),
            record.kind,
            record.category,
            money(config, record.amount),
            record.description
        ));
    }
    out
}

fn render_breakdown(
    out: &mut String,
    title: &str,
    groups: &[CategoryTotal],
    config: &Config,
) -> Result<(), LedgerError> {
    if groups.is_empty() {
        return Ok(());
    }
    let total = groups
        .iter()
        .try_fold(Decimal::ZERO, |total, (_, amount)| checked_total(total, *amount))?;
    out.push_str(&format!("{title}\n"));
    for (category, amount) in groups {
        let share = amount.checked_div(total).unwrap_or(Decimal::ZERO);
        out.push_str(&format!(
            "  {:<16}{:>16}  {:>4}\n",
            category,
            money(config, *amount),
            format_percent(share)
        ));
    }
    Ok(())
}

/// Period totals, per-category breakdowns (magnitudes) and savings goal progress.
/// A whole-year period also gets a month-by-month table.
pub fn render_summary(
    period: Period,
    records: &[Transaction],
    goal: Option<Decimal>,
    config: &Config,
) -> Result<String, LedgerError> {
    let summary = SummaryService::summarize(records)?;
    let mut out = format!("Summary for {}\n", period.label());
    let rows = [
        ("Income", summary.totals.income.abs()),
        ("Expense", summary.totals.expense.abs()),
        ("Investment", summary.totals.investment.abs()),
        ("Net balance", summary.net_balance),
    ];
    for (label, amount) in rows {
        out.push_str(&format!("  {:<16}{:>16}\n", label, money(config, amount)));
    }

    render_breakdown(&mut out, "Income by category", &summary.income_by_category, config)?;
    render_breakdown(&mut out, "Expense by category", &summary.expense_by_category, config)?;
    render_breakdown(
        &mut out,
        "Investment by category",
        &summary.investment_by_category,
        config,
    )?;

    let top = SummaryService::top_n_categories(records, TransactionKind::Expense, 3)?;
    if !top.is_empty() {
        let names: Vec<&str> = top.iter().map(|(category, _)| category.as_str()).collect();
        out.push_str(&format!("Top expenses: {}\n", names.join(", ")));
    }

    if let (Some(year), None) = (period.year, period.month) {
        out.push_str(&render_monthly(year, records, config)?);
    }

    out.push_str(&render_goal(SummaryService::savings_total(records)?, goal, config));
    Ok(out)
}

/// Month-by-month magnitudes for `year`, with the signed net per month.
pub fn render_monthly(
    year: i32,
    records: &[Transaction],
    config: &Config,
) -> Result<String, LedgerError> {
    let mut out = format!(
        "Monthly totals for {year}\n  {:<6}{:>16}{:>16}{:>16}{:>16}\n",
        "Month", "Income", "Expense", "Investment", "Net"
    );
    for (month, totals) in SummaryService::monthly_totals(records, year)? {
        out.push_str(&format!(
            "  {:<6}{:>16}{:>16}{:>16}{:>16}\n",
            format!("{month:02}"),
            money(config, totals.income.abs()),
            money(config, totals.expense.abs()),
            money(config, totals.investment.abs()),
            money(config, totals.net()?)
        ));
    }
    Ok(out)
}

pub fn render_goal(saved: Decimal, goal: Option<Decimal>, config: &Config) -> String {
    let Some(goal) = goal else {
        return "Savings goal: not set\n".to_string();
    };
    match SummaryService::goal_progress(saved, goal) {
        Ok(progress) => format!(
            "Savings goal: {} of {} ({})\n",
            money(config, saved),
            money(config, goal),
            format_percent(progress)
        ),
        Err(LedgerError::DivisionByZero) => "Savings goal: undefined (goal is zero)\n".to_string(),
        Err(err) => format!("Savings goal: {err}\n"),
    }
}
