//! Keyward - Active Directory authentication and principal lookup
//!
//! Command-line front end for the directory provider: log a user in,
//! resolve a principal by DN, or search users and groups.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use keyward_core::KeywardConfig;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::CommandContext;

#[derive(Parser)]
#[command(name = "keyward")]
#[command(author = "Keyward Team")]
#[command(version = keyward_core::VERSION)]
#[command(about = "Active Directory authentication and principal lookup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "KEYWARD_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "KEYWARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate a user and list its groups
    Login {
        /// Username, optionally qualified as DOMAIN\user or user@domain
        username: String,

        /// Password
        #[arg(long, env = "KEYWARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Look up a principal by distinguished name
    Lookup {
        /// Distinguished name
        dn: String,

        /// Principal scope (user or group)
        #[arg(short, long, default_value = "user")]
        scope: String,
    },

    /// Search users and groups by free text
    Search {
        /// Search text
        text: String,

        /// Restrict results to one kind (user or group)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Validate the directory configuration
    CheckConfig,
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<keyward_core::Error>() {
            Some(err) => eprintln!("{} {}", format!("[{}]", err.code()).as_str().red().bold(), err),
            None => eprintln!("{} {:#}", "error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => KeywardConfig::from_file(path)?,
        None => KeywardConfig::from_env(),
    };

    init_logging(&config, cli.log_level.as_deref());

    match &cli.config {
        Some(path) => debug!("Loaded configuration from {}", path),
        None => debug!("Loaded configuration from environment"),
    }
    debug!(
        "Directory servers: {:?}, enabled: {}",
        config.directory.servers, config.directory.enabled
    );

    let ctx = CommandContext::new(config, cli.output, cli.quiet);

    match cli.command {
        Commands::Login { username, password } => {
            commands::login::execute(&ctx, &username, password.unwrap_or_default()).await
        }
        Commands::Lookup { dn, scope } => commands::lookup::execute(&ctx, &dn, &scope).await,
        Commands::Search { text, kind } => commands::search::execute(&ctx, &text, kind.as_deref()).await,
        Commands::CheckConfig => commands::check_config::execute(&ctx),
    }
}

fn init_logging(config: &KeywardConfig, level: Option<&str>) {
    let level = level.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json = config.logging.format.eq_ignore_ascii_case("json");

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_target(true).with_writer(std::io::stderr)))
        .with(filter)
        .init();
}
