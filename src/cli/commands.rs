//! Command implementations for the sqlview CLI.
//!
//! One-shot commands:
//! - tables: List tables and their columns
//! - show: Print one page of a table
//! - search: Print the first page of matching rows
//! - export: Save the database under a new name

use anyhow::{bail, Context, Result};
use colored::Colorize;
use sqlview::value::truncate;
use sqlview::{Config, StorageSession, TableNavigator};
use std::path::{Path, PathBuf};

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(sqlview::config::default_config_path);
    let config = Config::load_or_default(&path)?;
    Ok((config, path))
}

/// Open an existing database and position a navigator on `table`.
fn open_existing<'s>(
    session: &'s mut StorageSession,
    file: &Path,
    page_size: usize,
    table: Option<&str>,
) -> Result<TableNavigator<'s>> {
    if !file.exists() {
        bail!("Database file not found: {}", file.display());
    }

    let mut nav = TableNavigator::with_page_size(session, page_size)?;
    nav.open_file(file)
        .with_context(|| format!("Cannot open database: {}", file.display()))?;

    if let Some(table) = table {
        nav.switch_table(table)?;
    }
    Ok(nav)
}

/// List every table with its columns
pub fn tables(file: &Path) -> Result<()> {
    let mut session = StorageSession::new();
    let nav = open_existing(&mut session, file, sqlview::DEFAULT_PAGE_SIZE, None)?;

    if nav.tables().is_empty() {
        println!("{}", "No tables found.".yellow());
        return Ok(());
    }

    println!(
        "\n{} {} table(s) in {}:\n",
        "Found".green(),
        nav.tables().len().to_string().green().bold(),
        file.display()
    );

    for table in nav.tables() {
        println!("  {}", table.white().bold());
        for column in nav.table_columns(table)? {
            println!("      {}", column.dimmed());
        }
    }

    println!();
    Ok(())
}

/// Print one page of a table
pub fn show(
    file: &Path,
    table: Option<&str>,
    page: usize,
    json: bool,
    page_size: usize,
    config: &Config,
) -> Result<()> {
    let mut session = StorageSession::new();
    let mut nav = open_existing(&mut session, file, page_size, table)?;
    nav.go_to_page(page)?;

    if json {
        let output = serde_json::json!({
            "table": nav.current_table(),
            "page": nav.page_number(),
            "offset": nav.offset(),
            "columns": nav.columns(),
            "rows": nav.current_rows(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_page(&nav, config.display.max_cell_width, false);
    Ok(())
}

/// Print the first page of rows containing `text`
pub fn search(
    file: &Path,
    text: &str,
    table: Option<&str>,
    page_size: usize,
    config: &Config,
) -> Result<()> {
    let mut session = StorageSession::new();
    let mut nav = open_existing(&mut session, file, page_size, table)?;
    nav.search_text_in_current_table(text)?;

    if nav.current_rows().is_empty() {
        println!("{} {:?}", "No rows contain".yellow(), text);
        return Ok(());
    }

    print_page(&nav, config.display.max_cell_width, false);
    Ok(())
}

/// Save the database under a new name
pub fn export(file: &Path, dest: &Path) -> Result<()> {
    if !file.exists() {
        bail!("Database file not found: {}", file.display());
    }
    let mut session = StorageSession::new();
    session.load_file(file)?;
    session
        .save_as_new_file(dest)
        .with_context(|| format!("Cannot export to {}", dest.display()))?;

    println!("  {} Saved as {}", "✓".green(), dest.display());
    Ok(())
}

/// Render the navigator's current page, marking the selected row when
/// `show_cursor` is set.
pub fn print_page(nav: &TableNavigator<'_>, max_cell_width: usize, show_cursor: bool) {
    let Some(table) = nav.current_table() else {
        println!("{}", "No tables in this file.".yellow());
        return;
    };

    let range = match nav.current_rows().len() {
        0 => "no rows".to_string(),
        n => format!("rows {}-{}", nav.offset() + 1, nav.offset() + n),
    };
    let mut header = format!(
        "{} {} {}",
        table.white().bold(),
        format!("page {}", nav.page_number()).cyan(),
        range.dimmed()
    );
    if let Some(filter) = nav.search_filter() {
        header.push_str(&format!(" {}", format!("search {:?}", filter).yellow()));
    }
    println!("\n{}", header);

    if nav.current_rows().is_empty() {
        return;
    }

    println!("    {}", nav.columns().join(" | ").dimmed());
    for (i, row) in nav.current_rows().iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .map(|v| truncate(&v.to_string(), max_cell_width))
            .collect();
        let line = cells.join(" | ");
        if show_cursor && i == nav.current_row_index() {
            println!("  {} {}", ">".green().bold(), line.bold());
        } else {
            println!("    {}", line);
        }
    }
}
