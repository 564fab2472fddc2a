//! login command - authenticate a user and resolve its groups

use super::{print_principal, CommandContext};
use anyhow::Result;
use colored::Colorize;
use keyward_core::types::BasicLogin;

pub async fn execute(ctx: &CommandContext, username: &str, password: String) -> Result<()> {
    let config = ctx.directory()?;
    let trust = ctx.trust()?;

    let login = BasicLogin {
        username: username.to_string(),
        password,
    };

    let outcome = ctx.provider().login_user(&login, config, &trust).await?;

    if ctx.is_json() {
        return ctx.print_json(&outcome);
    }

    ctx.info(&format!("{} {}", "Authenticated".green().bold(), outcome.user.login_name));
    print_principal(&outcome.user);
    for group in &outcome.groups {
        print_principal(group);
    }
    Ok(())
}
