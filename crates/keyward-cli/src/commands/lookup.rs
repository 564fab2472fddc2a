//! lookup command - resolve a principal by distinguished name

use super::CommandContext;
use anyhow::Result;

pub async fn execute(ctx: &CommandContext, dn: &str, scope: &str) -> Result<()> {
    let config = ctx.directory()?;
    let trust = ctx.trust()?;

    let principal = ctx.provider().get_principal(dn, scope, config, &trust).await?;

    ctx.print_principals(std::slice::from_ref(&principal))
}
