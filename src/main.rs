use anyhow::Result;
use clap::Parser;

use os_workflow::cli::{Cli, Command};
use os_workflow::commands;
use os_workflow::config::WorkflowConfig;
use os_workflow::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => WorkflowConfig::load_from(path)?,
        None => WorkflowConfig::load()?,
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Command::Steps { tipo } => commands::steps(tipo.into()),
        Command::Status { os_id, tipo } => commands::status(&config, os_id, tipo.into()).await?,
        Command::Save {
            os_id,
            tipo,
            step,
            data,
            draft,
        } => commands::save(&config, os_id, tipo.into(), step, &data, draft).await?,
        Command::Demo { tipo } => commands::demo(tipo.into()).await?,
    }

    Ok(())
}
