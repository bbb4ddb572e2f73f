//! Extension Manager CLI
//!
//! Installs, updates and toggles extensions for an assistant host.

mod cli;
mod commands;
mod error;
mod interactive;
mod telemetry;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, SettingsAction};
use commands::CommandContext;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
    if cli.verbose {
        tracing::debug!("Verbose mode enabled");
    }

    let Some(command) = cli.command else {
        println!("{} Extension Manager CLI", "extman".green().bold());
        println!();
        println!("Run {} for available commands.", "extman --help".cyan());
        return Ok(());
    };

    let ctx = CommandContext::resolve(cli.home, cli.workspace, cli.consent)?;
    execute_command(&ctx, command).await
}

async fn execute_command(ctx: &CommandContext, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Install {
            source,
            reference,
            auto_update,
            pre_release,
        } => commands::run_install(ctx, &source, reference, auto_update, pre_release).await,
        Commands::Link { path } => commands::run_link(ctx, &path).await,
        Commands::Uninstall { name } => commands::run_uninstall(ctx, &name).await,
        Commands::Update { name, all } => commands::run_update(ctx, name.as_deref(), all).await,
        Commands::Enable { name, scope } => commands::run_enable(ctx, &name, scope.into()).await,
        Commands::Disable { name, scope } => commands::run_disable(ctx, &name, scope.into()).await,
        Commands::List { json } => commands::run_list(ctx, json).await,
        Commands::Validate { path } => commands::run_validate(ctx, &path).await,
        Commands::Settings { action } => match action {
            SettingsAction::Set {
                name,
                setting,
                value,
                scope,
            } => commands::run_settings_set(ctx, &name, &setting, &value, scope.into()).await,
            SettingsAction::List { name } => commands::run_settings_list(ctx, &name).await,
        },
    }
}
