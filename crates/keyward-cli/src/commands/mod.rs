//! CLI command implementations

pub mod check_config;
pub mod login;
pub mod lookup;
pub mod search;

use std::sync::Arc;

use anyhow::{bail, Result};
use colored::Colorize;
use keyward_auth::{ActiveDirectoryProvider, LdapClient};
use keyward_core::types::Principal;
use keyward_core::{ActiveDirectoryConfig, KeywardConfig, TrustMaterial};
use serde::Serialize;

use crate::OutputFormat;

/// Context passed to all commands
pub struct CommandContext {
    pub config: KeywardConfig,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    pub fn new(config: KeywardConfig, output_format: OutputFormat, quiet: bool) -> Self {
        Self {
            config,
            output_format,
            quiet,
        }
    }

    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Print info message if not quiet
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            eprintln!("{}", msg);
        }
    }

    /// Directory configuration, refusing to run when the provider is off
    pub fn directory(&self) -> Result<&ActiveDirectoryConfig> {
        let directory = &self.config.directory;
        if !directory.enabled {
            bail!("Active Directory provider is disabled (set directory.enabled or KEYWARD_AD_ENABLED=true)");
        }
        directory.validate()?;
        Ok(directory)
    }

    pub fn trust(&self) -> Result<TrustMaterial> {
        Ok(TrustMaterial::from_config(&self.config.directory)?)
    }

    pub fn provider(&self) -> ActiveDirectoryProvider {
        ActiveDirectoryProvider::new(Arc::new(LdapClient::new()))
    }

    /// Write a value to stdout as pretty JSON
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Write principals in the selected output format
    pub fn print_principals(&self, principals: &[Principal]) -> Result<()> {
        if self.is_json() {
            return self.print_json(&principals);
        }
        for principal in principals {
            print_principal(principal);
        }
        Ok(())
    }
}

/// One-line text rendering of a principal
pub fn print_principal(principal: &Principal) {
    let kind = match principal.kind {
        keyward_core::types::PrincipalKind::User => "user ".cyan(),
        keyward_core::types::PrincipalKind::Group => "group".magenta(),
    };
    let mut flags = Vec::new();
    if principal.is_self {
        flags.push("self");
    }
    if principal.is_member_of {
        flags.push("member");
    }

    println!(
        "{}  {}  {}  {}{}",
        kind,
        principal.display_name.bold(),
        principal.login_name,
        principal.id.dimmed(),
        if flags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", flags.join(","))
        }
    );
}
