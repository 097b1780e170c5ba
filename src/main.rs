//! sqlview CLI - Page through and search the tables of any SQLite file
//!
//! Usage:
//!   sqlview tables <FILE>            - List tables and columns
//!   sqlview show <FILE> [-t T] [-p N] - Print one page of a table
//!   sqlview search <FILE> <TEXT>      - Print rows containing TEXT
//!   sqlview export <FILE> <DEST>      - Save a copy under a new name
//!   sqlview browse [FILE]             - Interactive browser

mod cli;

use anyhow::{bail, Result};
use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("sqlview={}", log_level).parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let (config, config_path) = cli::commands::load_config(cli.config.as_deref())?;
    let page_size = cli.page_size.unwrap_or(config.browser.page_size);
    if page_size == 0 {
        bail!("Page size must be greater than zero");
    }

    match cli.command {
        Commands::Tables { file } => cli::commands::tables(&file),
        Commands::Show {
            file,
            table,
            page,
            json,
        } => cli::commands::show(&file, table.as_deref(), page, json, page_size, &config),
        Commands::Search { file, text, table } => {
            cli::commands::search(&file, &text, table.as_deref(), page_size, &config)
        }
        Commands::Export { file, dest } => cli::commands::export(&file, &dest),
        Commands::Browse { file } => cli::browse::run(file, page_size, config, &config_path),
    }
}
