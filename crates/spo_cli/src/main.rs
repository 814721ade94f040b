use std::sync::Arc;

use clap::{Parser, Subcommand};
use spo_cli::commands::externaluser_list_cmd::{self, ExternalUserCommands};
use spo_cli::commands::field_set_cmd::{self, FieldCommands};
use spo_cli::commands::list_webhook_get_cmd::{self, ListCommands, WebhookCommands};
use spo_cli::commands::{build_client, to_json};
use spo_cli::config::AppConfig;
use spo_cli::errors::Error;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// spo-batch CLI: Run SharePoint Online client queries
#[derive(Parser, Debug)]
#[command(name = "spo-batch")]
#[command(about = "Run SharePoint Online client queries", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage site and list columns
    #[command(subcommand)]
    Field(FieldCommands),

    /// Manage external users
    #[command(subcommand)]
    Externaluser(ExternalUserCommands),

    /// Manage lists
    #[command(subcommand)]
    List(ListCommands),

    /// Show the CLI version
    Version,
}

async fn run(cli: &Cli) -> Result<(), Error> {
    if let Commands::Version = cli.command {
        println!(
            "spo-batch version {}",
            option_env!("SPO_BATCH_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
        );
        return Ok(());
    }

    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let client = build_client(&config);
    let app = config.connection.application_name.as_str();

    match &cli.command {
        Commands::Field(FieldCommands::Set(args)) => {
            field_set_cmd::execute(args, &client, app).await?;
        }
        Commands::Externaluser(ExternalUserCommands::List(args)) => {
            let users = externaluser_list_cmd::execute(
                args,
                Arc::new(client),
                config.connection.admin_url.as_deref(),
                app,
            )
            .await?;
            if !users.is_empty() {
                println!("{}", to_json(&users)?);
            }
        }
        Commands::List(ListCommands::Webhook(WebhookCommands::Get(args))) => {
            match list_webhook_get_cmd::execute(args, &client, app).await? {
                Some(subscription) => println!("{}", to_json(&subscription)?),
                None => println!("No webhooks found"),
            }
        }
        Commands::Version => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("SPO_BATCH_LOG"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli).await {
        error!(exit_code = e.exit_code(), "Command failed");
        eprintln!("{e}");
        std::process::exit(e.exit_code());
    }
}
