//! Burn Rate CLI - Decay-weighted spending curves
//!
//! Usage:
//!   burnrate init                              Initialize database
//!   burnrate import --file CSV --account Visa  Import a bank export
//!   burnrate burn                              Show burn rate curves
//!   burnrate export --from 2024-01-01 -o tx.csv Export transactions
//!   burnrate serve --port 3000                 Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

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

    run(cli).await
}

/// Dispatch a parsed command line.
///
/// Engine configuration is only loaded by commands that use it.
async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => {
            let config = commands::load_config(config_path)?;
            commands::cmd_init(&cli.db, &config, cli.no_encrypt)
        }
        Commands::Import {
            file,
            account,
            format,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file, &account, format.as_deref())
        }
        Commands::Burn { intensity, json } => {
            let config = commands::load_config(config_path)?;
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_burn(&db, &config, intensity, json)
        }
        Commands::Feedback { group, sentiment } => {
            let config = commands::load_config(config_path)?;
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_feedback(&db, &config, &group, &sentiment)
        }
        Commands::Intensity { value } => {
            let config = commands::load_config(config_path)?;
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_intensity(&db, &config, value)
        }
        Commands::Categories { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(CategoriesAction::List) => commands::cmd_categories_list(&db),
                Some(CategoriesAction::Add { name, group }) => {
                    commands::cmd_categories_add(&db, &name, group.as_deref())
                }
                Some(CategoriesAction::Group { category, group }) => {
                    commands::cmd_categories_group(&db, &category, &group)
                }
                Some(CategoriesAction::Delete { category }) => {
                    commands::cmd_categories_delete(&db, &category)
                }
            }
        }
        Commands::Rules { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(RulesAction::List) => commands::cmd_rules_list(&db),
                Some(RulesAction::Add {
                    category,
                    pattern,
                    pattern_type,
                    priority,
                    account,
                }) => commands::cmd_rules_add(
                    &db,
                    &category,
                    &pattern,
                    &pattern_type,
                    priority,
                    account,
                ),
                Some(RulesAction::Delete { id }) => commands::cmd_rules_delete(&db, id),
                Some(RulesAction::Test { description }) => {
                    commands::cmd_rules_test(&db, &description)
                }
                Some(RulesAction::Suggest { description }) => {
                    commands::cmd_rules_suggest(&description)
                }
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, 20),
                Some(TransactionsAction::List { limit }) => {
                    commands::cmd_transactions_list(&db, limit)
                }
                Some(TransactionsAction::Review { limit }) => {
                    commands::cmd_transactions_review(&db, limit)
                }
                Some(TransactionsAction::Categorize {
                    category,
                    ids,
                    create_rule,
                }) => commands::cmd_transactions_categorize(&db, &category, &ids, create_rule),
                Some(TransactionsAction::Flag {
                    id,
                    recurring,
                    explosion,
                }) => commands::cmd_transactions_flag(&db, id, recurring, explosion),
            }
        }
        Commands::Export {
            output,
            from,
            to,
            account,
            category,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_export(
                &db,
                output.as_deref(),
                from.as_deref(),
                to.as_deref(),
                account,
                category.as_deref(),
            )
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            let config = commands::load_config(config_path)?;
            commands::cmd_serve(
                &cli.db,
                config,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::HashPassword { password } => commands::cmd_hash_password(&password),
    }
}
