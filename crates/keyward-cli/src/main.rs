//! Keyward CLI entrypoint.

use anyhow::Result;
use clap::Parser;
use keyward_trace::{TracingConfig, init_tracer};
use std::path::PathBuf;

mod client;
mod commands;
mod config;
mod handlers;
mod server;
mod settings;

use commands::{Commands, ConfigCommands, LicenseCommands, ProductCommands};
use config::CliConfig;
use settings::ServerConfig;

#[derive(Parser)]
#[command(name = "keyward")]
#[command(author, version, about = "Keyward license server and admin client", long_about = None)]
struct Cli {
    /// Server configuration file
    #[arg(long, global = true, env = "KEYWARD_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let settings = ServerConfig::load(cli.config.as_deref())?.with_args(args);
            server::traced(&settings.tracing, server::serve(&settings)).await?;
        }
        Commands::Migrate { database_url } => {
            let settings = ServerConfig::load(cli.config.as_deref())?;
            let database_url = database_url.or(settings.database_url.clone());
            server::traced(
                &settings.tracing,
                server::migrate(database_url.as_deref(), settings.max_connections),
            )
            .await?;
        }
        Commands::Products { command } => {
            init_client_tracing()?;
            let config = CliConfig::load()?;
            match command {
                ProductCommands::Create { name, description } => {
                    handlers::create_product(&config, name, description).await?
                }
                ProductCommands::List => handlers::list_products(&config).await?,
                ProductCommands::Delete { id } => handlers::delete_product(&config, &id).await?,
            }
        }
        Commands::Licenses { command } => {
            init_client_tracing()?;
            let config = CliConfig::load()?;
            match command {
                LicenseCommands::Create(args) => handlers::create_license(&config, args).await?,
                LicenseCommands::Get { key } => handlers::get_license(&config, &key).await?,
                LicenseCommands::List => handlers::list_licenses(&config).await?,
                LicenseCommands::Delete { key } => handlers::delete_license(&config, &key).await?,
                LicenseCommands::Activate(args) => handlers::activate_license(&config, args).await?,
                LicenseCommands::Validate(args) => handlers::validate_license(&config, args).await?,
            }
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&CliConfig::load()?)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}

/// Client commands only log warnings unless `RUST_LOG` says otherwise.
fn init_client_tracing() -> Result<()> {
    init_tracer(&TracingConfig {
        default_filter: "warn".to_string(),
        ..TracingConfig::default()
    })?;
    Ok(())
}
