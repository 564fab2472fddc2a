//! search command - free-text user and group search

use super::CommandContext;
use anyhow::Result;
use keyward_core::types::PrincipalKind;

pub async fn execute(ctx: &CommandContext, text: &str, kind: Option<&str>) -> Result<()> {
    let config = ctx.directory()?;
    let trust = ctx.trust()?;

    let kind = kind.map(str::parse::<PrincipalKind>).transpose()?;

    let principals = ctx
        .provider()
        .search_principals(text, kind, config, &trust)
        .await?;

    ctx.info(&format!("{} principals found", principals.len()));
    ctx.print_principals(&principals)
}
