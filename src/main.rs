mod azure;
mod cli;
mod commands;
mod config;
mod error;
mod generator;
mod output;
mod server;
mod store;
mod submitter;
#[cfg(test)]
mod test_support;
mod types;

use std::error::Error;
use std::io;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, SessionCommands, SettingsCommands};
use config::Config;
use error::Result;

const DEFAULT_LOG_FILTER: &str = "devops_pusher=info,tower_http=info";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");

        if verbose {
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("Caused by: {cause}");
                source = cause.source();
            }
        }

        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    output::set_json_output(cli.json);

    match cli.command {
        // Commands that don't require config
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "devops-pusher", &mut io::stdout());
        }
        Commands::Init => {
            commands::init::run().await?;
        }
        Commands::Models => {
            commands::models::list();
        }
        command => {
            let config = Config::load()?;

            match command {
                Commands::Serve(args) => {
                    commands::serve::run(&config, args).await?;
                }
                Commands::Generate(args) => {
                    commands::generate::run(&config, args).await?;
                }
                Commands::Push(args) => {
                    commands::push::run(&config, args).await?;
                }
                Commands::Settings { action } => match action {
                    SettingsCommands::Show { user } => {
                        commands::settings::show(&config, &user).await?;
                    }
                    SettingsCommands::Set(args) => {
                        commands::settings::set(&config, args).await?;
                    }
                },
                Commands::Session { action } => match action {
                    SessionCommands::Create { user } => {
                        commands::session::create(&config, &user).await?;
                    }
                    SessionCommands::Revoke { token } => {
                        commands::session::revoke(&config, &token).await?;
                    }
                },
                Commands::Completions { .. } | Commands::Init | Commands::Models => {
                    // Already handled above
                }
            }
        }
    }

    Ok(())
}
