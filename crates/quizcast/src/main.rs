// SPDX-FileCopyrightText: 2026 Quizcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quizcast - a webhook-fed quiz notification scheduler.
//!
//! This is the binary entry point.

mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Quizcast - a webhook-fed quiz notification scheduler.
#[derive(Parser, Debug)]
#[command(name = "quizcast", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot, scheduler, and HTTP gateway.
    Serve,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration/startup errors are fatal and abort process start.
    let config = match quizcast_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            for error in &errors {
                eprintln!("quizcast: config error: {error}");
            }
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_new(&config.service.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run(config).await {
                tracing::error!(error = %e, "quizcast exited with error");
                std::process::exit(1);
            }
        }
        None => {
            println!("quizcast: use --help for available commands");
        }
    }
}
