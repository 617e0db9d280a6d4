pub mod commands;
mod runner;

use clap::Parser;
use commands::Commands;
use log::{error, info};
use shared::{env, logger};

/// Renders an escape-time fractal across a pool of workers that pull rows
/// from a single coordinator.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    env::init();
    logger::init();

    let cli = Cli::parse();

    let succeeded = match cli.command {
        Commands::Coordinator(args) => {
            let config = args.into_config();
            match coordinator::run_server(&config).await {
                Ok(report) => {
                    info!(
                        "Coordinator done: {} rows from {} workers",
                        report.rows_rendered,
                        report.chunks_per_worker.len()
                    );
                    true
                }
                Err(e) => {
                    error!("Coordinator error: {}", e);
                    false
                }
            }
        }
        Commands::Worker(args) => {
            let worker = args.into_config();
            match worker::run_worker(&worker).await {
                Ok(report) => {
                    info!(
                        "Worker {} done: {} rows in {} chunks",
                        worker.name, report.rows_computed, report.chunks_computed
                    );
                    true
                }
                Err(e) => {
                    error!("Worker error: {}", e);
                    false
                }
            }
        }
        Commands::Local(args) => {
            let config = args.into_config();
            match runner::run_local(&config).await {
                Ok(report) => {
                    info!(
                        "Local run done: {} rows in {} chunks",
                        report.rows_rendered, report.chunks_rendered
                    );
                    true
                }
                Err(e) => {
                    error!("Local run error: {}", e);
                    false
                }
            }
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
}
