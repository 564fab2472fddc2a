//! check-config command - validate the directory configuration

use super::CommandContext;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigSummary {
    enabled: bool,
    servers: Vec<String>,
    user_search_base: String,
    group_search_base: String,
    access_mode: String,
    custom_ca: bool,
    verify_service_account: bool,
    allow_unauthenticated_fallback: bool,
}

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let config = ctx.directory()?;
    let trust = ctx.trust()?;

    let summary = ConfigSummary {
        enabled: config.enabled,
        servers: config.servers.iter().map(|s| config.server_url(s)).collect(),
        user_search_base: config.user_search_base.clone(),
        group_search_base: config.group_search_base().to_string(),
        access_mode: config.access_mode.to_string(),
        custom_ca: trust.ca_pem.is_some(),
        verify_service_account: config.verify_service_account,
        allow_unauthenticated_fallback: config.allow_unauthenticated_fallback,
    };

    if ctx.is_json() {
        return ctx.print_json(&summary);
    }

    println!("{}", "Configuration OK".green().bold());
    for server in &summary.servers {
        println!("  server:      {}", server);
    }
    println!("  user base:   {}", summary.user_search_base);
    println!("  group base:  {}", summary.group_search_base);
    println!("  access mode: {}", summary.access_mode);
    Ok(())
}
