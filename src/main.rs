//! Oracle Forge command-line front end.

use clap::Parser;
use oracle_forge::app::{App, render};
use oracle_forge::cli::{Cli, Command};
use oracle_forge::config::Config;
use oracle_forge::error::AppError;
use oracle_forge_client::CancellationToken;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::resolve(cli.config.as_deref(), cli.api_url.clone()) {
        Ok(config) => config,
        Err(err) => return fail(AppError::from(err)),
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => fail(err),
    }
}

async fn run(command: Command, config: &Config) -> Result<(), AppError> {
    let app = Arc::new(App::new(config, CancellationToken::new())?);

    // Ctrl-C cancels the running command; at an idle prompt it shuts down.
    let on_signal = Arc::clone(&app);
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if on_signal.interrupt() {
                info!("interrupt received, cancelling the running command");
            } else {
                info!("interrupt received, shutting down");
                on_signal.shutdown_token().cancel();
                break;
            }
        }
    });

    match command {
        Command::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            app.run_shell(stdin, tokio::io::stdout()).await
        }
        command => {
            let data = app.execute(command).await?;
            println!("{}", render(&data));
            Ok(())
        }
    }
}

fn fail(err: AppError) -> ExitCode {
    error!(error = %err, "command failed");
    eprintln!("{}", err.banner());
    ExitCode::from(err.exit_code())
}
