//! Epilepsy screening - Main Entry Point

use clap::Parser;
use epilepsy_screen::cli::{cmd_inspect, cmd_predict, cmd_serve, Cli, Commands};
use epilepsy_screen::config::{AppConfig, Variant};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epilepsy_screen=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => {
            cmd_serve(args.into_config()).await?;
        }
        Some(Commands::Predict(args)) => {
            cmd_predict(args)?;
        }
        Some(Commands::Inspect { variant, model }) => {
            cmd_inspect(variant, model)?;
        }
        None => {
            cmd_serve(AppConfig::from_env(Variant::Forest)).await?;
        }
    }

    Ok(())
}
