mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repo_map=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    if let Commands::Languages = cli.command {
        return cli::languages(cli.format);
    }

    cli::check_root(&cli.root)?;
    let status = cli::load_status(&cli).await?;

    if let Commands::Map = cli.command {
        return cli::show_map(&status, cli.format);
    }

    let map = cli::require_map(&status)?;
    match &cli.command {
        Commands::Usages { file, symbol } => cli::usages(map, file, symbol, cli.format)?,
        Commands::Dependents { file } => cli::dependents(map, file, cli.format)?,
        Commands::Unused => cli::unused(map, cli.format)?,
        Commands::Orphans => cli::orphans(map, cli.format)?,
        Commands::Graph => cli::graph(map, cli.format)?,
        Commands::Cycles => cli::cycles(map, cli.format)?,
        Commands::Map | Commands::Languages => {}
    }

    Ok(())
}
