//! Vitals CLI - Financial health analytics
//!
//! Usage:
//!   vitals init                                   Initialize database
//!   vitals add --user me --income 5000 --expenses 3000
//!   vitals health --user me                       Ratios and predicted savings rate
//!   vitals serve --port 3000                      Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
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

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Users { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(UsersAction::List) => commands::cmd_users_list(&db),
                Some(UsersAction::Add { username }) => commands::cmd_users_add(&db, &username),
            }
        }
        Commands::Add {
            user,
            income,
            expenses,
            debts,
            investments,
            date,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_add(
                &db,
                &user,
                income,
                expenses,
                debts,
                investments,
                date.as_deref(),
            )
        }
        Commands::History { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_history(&db, &user, json)
        }
        Commands::Health { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let predictor = commands::load_predictor(&config).await?;
            commands::cmd_health(&db, &predictor, &user, json)
        }
        Commands::Anomalies { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_anomalies(&db, &config, &user, json)
        }
        Commands::Forecast { user, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_forecast(&db, &user, json)
        }
        Commands::Plan {
            target,
            savings,
            years,
        } => commands::cmd_plan(target, savings, years),
        Commands::Advise {
            risk,
            savings,
            investments,
        } => commands::cmd_advise(&risk, savings, investments),
        Commands::Model { action } => match action {
            ModelAction::Status => commands::cmd_model_status(&config),
            ModelAction::Train { force } => commands::cmd_model_train(&config, force).await,
        },
        Commands::Serve {
            port,
            host,
            cors_origins,
        } => {
            commands::cmd_serve(&cli.db, &host, port, cli.no_encrypt, config, cors_origins).await
        }
    }
}
