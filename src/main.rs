mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use provisionkit::config::Config;
use provisionkit::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = Config::load_with(cli.config)?;
    observability::init_tracing(&config.logging.level);

    match cli.command {
        Commands::Files(command) => {
            let connector = config.connector();
            commands::run_files(connector.as_ref(), command).await?
        }
        Commands::Template(command) => {
            let connector = config.connector();
            commands::run_template(connector.as_ref(), config.template_descriptor(), command)
                .await?
        }
        Commands::Config => commands::show_config(&config)?,
    }

    Ok(())
}
