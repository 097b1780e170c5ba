//! CLI definitions and command implementations for sqlview.

pub mod browse;
pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sqlview - Page through and search the tables of any SQLite file
#[derive(Parser)]
#[command(name = "sqlview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ~/.config/sqlview/sqlview.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Rows per page (overrides the config file)
    #[arg(long, global = true)]
    pub page_size: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every table and its columns
    Tables {
        /// SQLite database file
        file: PathBuf,
    },

    /// Print one page of a table
    Show {
        /// SQLite database file
        file: PathBuf,

        /// Table to show (default: first table alphabetically)
        #[arg(short, long)]
        table: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the first page of rows containing TEXT in any column
    Search {
        /// SQLite database file
        file: PathBuf,

        /// Text to look for
        text: String,

        /// Table to search (default: first table alphabetically)
        #[arg(short, long)]
        table: Option<String>,
    },

    /// Write a full copy of the database to a new file
    Export {
        /// SQLite database file
        file: PathBuf,

        /// Destination file
        dest: PathBuf,
    },

    /// Browse a database interactively
    Browse {
        /// SQLite database file (default: the last file browsed)
        file: Option<PathBuf>,
    },
}
