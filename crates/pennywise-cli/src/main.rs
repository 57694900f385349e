//! Pennywise CLI - Personal finance forecaster
//!
//! Usage:
//!   pennywise init                      Initialize database
//!   pennywise import --file CSV         Import transactions
//!   pennywise add -d "Coffee" -a -4.50  Add a transaction by hand
//!   pennywise predict                   Next-month and six-month predictions
//!   pennywise recommend                 AI recommendations
//!   pennywise serve --port 3000         Start web server

mod cli;
mod commands;


use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use pennywise_core::TextGenerator;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.db.as_deref())?;
    let today = Utc::now().date_naive();
    let user = cli.user.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&config),
        Commands::Serve { host, port } => commands::cmd_serve(config, host, port).await,
        Commands::Template { kind } => commands::cmd_template(kind),
        Commands::Import { file, accounts } => {
            let store = commands::open_store(&config)?;
            if accounts {
                commands::cmd_import_accounts(&store, user, &file)
            } else {
                commands::cmd_import(&store, user, &file)
            }
        }
        Commands::Add {
            description,
            amount,
            date,
            category,
        } => {
            let store = commands::open_store(&config)?;
            commands::cmd_add(
                &store,
                user,
                &description,
                amount,
                date.as_deref(),
                category.as_deref(),
                today,
            )
        }
        Commands::Transactions { days } => {
            let store = commands::open_store(&config)?;
            commands::cmd_transactions_list(&store, user, days, today)
        }
        Commands::Accounts => {
            let store = commands::open_store(&config)?;
            commands::cmd_accounts(&store, user)
        }
        Commands::Predict {
            file,
            json,
            outlook,
        } => {
            let store = commands::open_store(&config)?;
            let ai = commands::open_ai(&config);
            let options = commands::PredictOptions {
                file: file.as_deref(),
                json,
                outlook,
            };
            commands::cmd_predict(
                &store,
                ai.as_ref().map(|a| a as &dyn TextGenerator),
                &config.forecast,
                user,
                today,
                &options,
            )
            .await
        }
        Commands::Recommend { tips } => {
            let store = commands::open_store(&config)?;
            let ai = commands::open_ai(&config);
            commands::cmd_recommend(
                &store,
                ai.as_ref().map(|a| a as &dyn TextGenerator),
                &config.forecast,
                user,
                today,
                tips,
            )
            .await
        }
    }
}
