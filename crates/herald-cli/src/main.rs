//! CLI entry point: wires the settings store and dispatches commands.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use herald_cli::settings_store::{default_settings_path, default_tracks_dir};
use herald_cli::{Cli, CliError, Commands, JsonFileSettingsRepository, handlers};
use herald_core::SettingsService;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings_path = match cli.settings_file {
        Some(path) => path,
        None => default_settings_path()?,
    };
    let tracks_dir = match cli.tracks_dir {
        Some(dir) => dir,
        None => default_tracks_dir()?,
    };

    let repo = Arc::new(JsonFileSettingsRepository::new(settings_path));
    let service = SettingsService::new(repo.clone());

    match command {
        Commands::Play(args) => {
            let settings = service.get().await.map_err(CliError::from)?;
            handlers::play::execute(args, &settings, &tracks_dir).await?;
        }
        Commands::Atmospheres => {
            let settings = service.get().await.map_err(CliError::from)?;
            handlers::atmospheres::execute(&settings, &tracks_dir);
        }
        Commands::Categories => {
            let settings = service.get().await.map_err(CliError::from)?;
            handlers::categories::execute(&settings);
        }
        Commands::Settings { command } => {
            handlers::settings::execute(&service, &repo, command).await?;
        }
    }
    Ok(())
}
