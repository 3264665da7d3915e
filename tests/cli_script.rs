use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use regex::Regex;
use std::fs;

fn script(home: &std::path::Path, input: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("ledger_cli").unwrap();
    cmd.env("LEDGER_CLI_SCRIPT", "1")
        .env("FINANCE_LEDGER_HOME", home)
        .env("RUST_LOG", "off")
        .write_stdin(input.to_string())
        .assert()
        .success()
}

#[test]
fn script_mode_records_and_summarises() {
    let home = tempfile::tempdir().unwrap();
    let input = "\
login admin admin123
add income 2024-01-05 5000 Salary January pay
add expense 2024-01-07 1500 Rent \"Flat, January\"
add investment 2024-01-20 1000 Stocks Index fund
goal 30000
summary 2024-01
summary 2024
exit
";
    script(home.path(), input)
        .stdout(contains("Logged in as admin."))
        .stdout(contains("Net balance").and(contains("R$ 2.500,00")))
        .stdout(contains("Savings goal: R$ 1.000,00 of R$ 30.000,00 (3%)"))
        .stdout(contains("Monthly totals for 2024"));

    let ledger = fs::read_to_string(home.path().join("ledger.csv")).unwrap();
    let row = Regex::new(r#"(?m)^2,admin,2024-01-07,Expense,\"Flat, January\",Rent,-1500$"#).unwrap();
    assert!(row.is_match(&ledger), "unexpected ledger:\n{ledger}");
    assert!(ledger.starts_with("Id,Owner,Date,Kind,Description,Category,Amount\n"));

    let config = fs::read_to_string(home.path().join("config").join("config.json")).unwrap();
    assert!(config.contains("\"savings_goal\": \"30000\""));
}

#[test]
fn ids_stay_stable_after_delete() {
    let home = tempfile::tempdir().unwrap();
    let input = "\
login admin admin123
add expense 2024-03-01 10 Food Coffee
add expense 2024-03-02 20 Food Lunch
add expense 2024-03-03 30 Food Dinner
delete 1
edit 3 amount=35
list 2024-03
";
    let output = script(home.path(), input).get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    let ids: Vec<&str> = Regex::new(r"(?m)^\s+(\d+)  \d{2}/03/2024")
        .unwrap()
        .captures_iter(&stdout)
        .filter_map(|caps| caps.get(1).map(|id| id.as_str()))
        .collect();
    assert_eq!(ids, vec!["2", "3"]);
    assert!(stdout.contains("R$ -35,00"));
}

#[test]
fn pending_users_cannot_open_the_ledger() {
    let home = tempfile::tempdir().unwrap();
    script(
        home.path(),
        "register ana pw\nlogin ana pw\nlist\n",
    )
    .stdout(contains("Registered `ana`"))
    .stdout(contains("waiting for administrator approval"))
    .stdout(contains("log in first"));
}

#[test]
fn invalid_input_is_reported_and_nothing_is_written() {
    let home = tempfile::tempdir().unwrap();
    script(
        home.path(),
        "login admin admin123\nadd expense 2024-01-01 abc Food Tea\nadd expense 2024-01-01 0 Food Tea\nlist\n",
    )
    .stdout(contains("`abc` is not a valid amount"))
    .stdout(contains("amount must be positive"))
    .stdout(contains("No records for all time."));
}

#[test]
fn unknown_command_gets_a_suggestion() {
    let home = tempfile::tempdir().unwrap();
    script(home.path(), "sumary\n")
        .stdout(contains("Unknown command `sumary`"))
        .stdout(contains("Suggestion: `summary`?"));
}

#[test]
fn new_category_is_registered_on_write() {
    let home = tempfile::tempdir().unwrap();
    script(
        home.path(),
        "login admin admin123\nadd expense today 12,50 Pets Food bowl\ncategories expense\ncategory-add expense Pets\n",
    )
    .stdout(contains("Pets"))
    .stdout(contains("Expense category `Pets` already exists."));

    let categories = fs::read_to_string(home.path().join("categories.csv")).unwrap();
    assert!(categories.starts_with("Income,Expense,Investment\n"));
    assert!(categories.contains(",Pets,"));
}
