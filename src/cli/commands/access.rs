use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::cli::registry::CommandEntry;
use crate::ledger::Owner;
use crate::session::{AccessDecision, DenialReason, Registration};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "login",
            "Open your ledger",
            "login <identity> [secret]",
            cmd_login,
        ),
        CommandEntry::new("logout", "Close the current session", "logout", cmd_logout).logged_in(),
        CommandEntry::new(
            "register",
            "Request an account (needs administrator approval)",
            "register <identity> [secret]",
            cmd_register,
        ),
        CommandEntry::new(
            "approve",
            "Approve a pending account (administrators)",
            "approve <identity>",
            cmd_approve,
        )
        .admin_only(),
        CommandEntry::new(
            "users",
            "List accounts and their status (administrators)",
            "users",
            cmd_users,
        )
        .admin_only(),
    ]
}

fn credentials(context: &ShellContext, args: &[&str], usage: &str) -> Result<(String, String), CommandError> {
    let identity = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))?
        .to_string();
    let secret = match args.get(1) {
        Some(secret) => secret.to_string(),
        None => context.read_secret("Secret")?,
    };
    Ok((identity, secret))
}

fn cmd_login(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (identity, secret) = credentials(context, args, "login <identity> [secret]")?;
    match context.users.authenticate(&identity, &secret)? {
        AccessDecision::Granted => {
            context.open_session(Owner::new(identity.trim()));
            output::success(format!("Logged in as {}.", identity.trim()));
        }
        AccessDecision::Pending => {
            output::warning("Account is waiting for administrator approval.");
        }
        AccessDecision::Denied(DenialReason::UnknownUser) => {
            output::error(format!("Unknown user `{}`.", identity.trim()));
        }
        AccessDecision::Denied(DenialReason::WrongSecret) => {
            output::error("Wrong secret.");
        }
    }
    Ok(())
}

fn cmd_logout(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let user = context.current_user()?;
    context.close_session();
    output::success(format!("Logged out {user}."));
    Ok(())
}

fn cmd_register(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (identity, secret) = credentials(context, args, "register <identity> [secret]")?;
    match context.users.register(&identity, &secret)? {
        Registration::Created => {
            output::success(format!(
                "Registered `{}`. Wait for an administrator to approve it.",
                identity.trim()
            ));
        }
        Registration::AlreadyExists => {
            output::warning(format!("`{}` is already registered.", identity.trim()));
        }
    }
    Ok(())
}

fn cmd_approve(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let identity = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: approve <identity>".into()))?;
    context.users.approve(identity)?;
    output::success(format!("Approved `{identity}`."));
    Ok(())
}

fn cmd_users(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output::section("Users");
    for user in context.users.users() {
        let status = if user.approved { "approved" } else { "pending" };
        let role = if user.admin { "admin" } else { "user" };
        output::info(format!("  {:<28} {:<9} {}", user.identity, status, role));
    }
    Ok(())
}
