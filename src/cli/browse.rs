//! Interactive browse loop.
//!
//! Each line typed at the prompt is parsed into a [`BrowseCommand`] and
//! applied to the navigator. Engine errors are printed and the loop goes on.

use super::commands::print_page;
use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Input, Select};
use sqlview::{Config, StorageSession, TableNavigator};
use std::path::{Path, PathBuf};
use tracing::warn;

const HELP: &str = "\
  n / p          next / previous page
  first / last   first / last page
  j / k          move selection down / up
  home / end     first / last row of the page
  s <row>        select row (1-based, on this page)
  t [table]      switch table (pick from a list without a name)
  / <text>       search all columns of the current table
  clear          drop the search filter
  d              show the selected row in full
  open <file>    open another database
  save           commit pending changes
  saveas <file>  save a copy under a new name
  h              this help
  q              quit";

/// One action typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    PageDown,
    PageUp,
    FirstPage,
    LastPage,
    Down,
    Up,
    LineStart,
    LineEnd,
    Select(usize),
    Table(Option<String>),
    Search(String),
    ClearSearch,
    Details,
    Open(PathBuf),
    Save,
    SaveAs(PathBuf),
    Help,
    Quit,
}

impl BrowseCommand {
    /// Parse a prompt line. Empty input means "next page".
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        if let Some(text) = line.strip_prefix('/') {
            return Ok(Self::Search(text.trim().to_string()));
        }

        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (line, ""),
        };

        let command = match word {
            "" | "n" | "next" => Self::PageDown,
            "p" | "prev" => Self::PageUp,
            "first" => Self::FirstPage,
            "last" => Self::LastPage,
            "j" | "down" => Self::Down,
            "k" | "up" => Self::Up,
            "home" => Self::LineStart,
            "end" => Self::LineEnd,
            "s" | "select" => match arg.parse::<usize>() {
                Ok(row) if row > 0 => Self::Select(row - 1),
                _ => bail!("Usage: s <row number>"),
            },
            "t" | "table" => Self::Table((!arg.is_empty()).then(|| arg.to_string())),
            "clear" => Self::ClearSearch,
            "d" | "details" => Self::Details,
            "open" if !arg.is_empty() => Self::Open(PathBuf::from(arg)),
            "save" => Self::Save,
            "saveas" if !arg.is_empty() => Self::SaveAs(PathBuf::from(arg)),
            "open" | "saveas" => bail!("Usage: {} <file>", word),
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => bail!("Unknown command: {} (type h for help)", other),
        };
        Ok(command)
    }
}

/// Run the interactive loop on `file`, or on the last file browsed.
pub fn run(
    file: Option<PathBuf>,
    page_size: usize,
    mut config: Config,
    config_path: &Path,
) -> Result<()> {
    let Some(file) = file.or_else(|| config.recent_file.clone()) else {
        bail!("No database given and no recent file in the config");
    };

    let mut session = StorageSession::new();
    let mut nav = TableNavigator::with_page_size(&mut session, page_size)?;
    nav.open_file(&file)?;
    remember(&mut config, config_path, &file);

    println!("{} {}", "Opened".green(), file.display());
    println!("{}", "Type h for help.".dimmed());
    print_page(&nav, config.display.max_cell_width, true);

    loop {
        let line: String = Input::new()
            .with_prompt("sqlview")
            .allow_empty(true)
            .interact_text()?;

        let command = match BrowseCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        if command == BrowseCommand::Quit {
            break;
        }

        match apply(&mut nav, command, &mut config, config_path) {
            Ok(true) => print_page(&nav, config.display.max_cell_width, true),
            Ok(false) => {}
            Err(e) => println!("{} {:#}", "Error:".red().bold(), e),
        }
    }

    Ok(())
}

/// Apply one command. Returns whether the page should be redrawn.
fn apply(
    nav: &mut TableNavigator<'_>,
    command: BrowseCommand,
    config: &mut Config,
    config_path: &Path,
) -> Result<bool> {
    match command {
        BrowseCommand::PageDown => nav.page_down()?,
        BrowseCommand::PageUp => nav.page_up()?,
        BrowseCommand::FirstPage => nav.move_first_page()?,
        BrowseCommand::LastPage => nav.move_last_page()?,
        BrowseCommand::Down => nav.move_down_one(),
        BrowseCommand::Up => nav.move_up_one(),
        BrowseCommand::LineStart => nav.move_line_start(),
        BrowseCommand::LineEnd => nav.move_line_end(),
        BrowseCommand::Select(row) => nav.select_row(row),
        BrowseCommand::Table(Some(name)) => nav.switch_table(&name)?,
        BrowseCommand::Table(None) => {
            let Some(name) = pick_table(nav)? else {
                return Ok(false);
            };
            nav.switch_table(&name)?;
        }
        BrowseCommand::Search(text) => {
            nav.search_text_in_current_table(&text)?;
            if nav.current_rows().is_empty() {
                println!("{} {:?}", "No rows contain".yellow(), text);
            }
        }
        BrowseCommand::ClearSearch => nav.clear_search()?,
        BrowseCommand::Details => {
            let details = nav.current_row_details();
            if details.is_empty() {
                println!("{}", "No row selected.".yellow());
            } else {
                println!("\n{}", details);
            }
            return Ok(false);
        }
        BrowseCommand::Open(path) => {
            nav.open_file(&path)?;
            remember(config, config_path, &path);
            println!("{} {}", "Opened".green(), path.display());
        }
        BrowseCommand::Save => {
            nav.session().save_file()?;
            println!("  {} File saved", "✓".green());
            return Ok(false);
        }
        BrowseCommand::SaveAs(path) => {
            nav.session_mut().save_as_new_file(&path)?;
            println!("  {} Saved as {}", "✓".green(), path.display());
            return Ok(false);
        }
        BrowseCommand::Help => {
            println!("{}", HELP);
            return Ok(false);
        }
        BrowseCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn pick_table(nav: &TableNavigator<'_>) -> Result<Option<String>> {
    if nav.tables().is_empty() {
        println!("{}", "No tables in this file.".yellow());
        return Ok(None);
    }

    let current = nav
        .current_table()
        .and_then(|t| nav.tables().iter().position(|name| name == t))
        .unwrap_or(0);

    let choice = Select::new()
        .with_prompt("Select a table")
        .items(nav.tables())
        .default(current)
        .interact_opt()?;

    Ok(choice.map(|i| nav.tables()[i].clone()))
}

/// Record `file` as the most recent database; failures only get logged.
fn remember(config: &mut Config, config_path: &Path, file: &Path) {
    let file = file.canonicalize().unwrap_or_else(|_| file.to_path_buf());
    config.recent_file = Some(file);
    if let Err(e) = config.save(config_path) {
        warn!("Cannot update recent file in {}: {:#}", config_path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_navigation() -> Result<()> {
        assert_eq!(BrowseCommand::parse("")?, BrowseCommand::PageDown);
        assert_eq!(BrowseCommand::parse(" p ")?, BrowseCommand::PageUp);
        assert_eq!(BrowseCommand::parse("last")?, BrowseCommand::LastPage);
        assert_eq!(BrowseCommand::parse("j")?, BrowseCommand::Down);
        assert_eq!(BrowseCommand::parse("end")?, BrowseCommand::LineEnd);
        assert_eq!(BrowseCommand::parse("s 3")?, BrowseCommand::Select(2));
        assert_eq!(BrowseCommand::parse("q")?, BrowseCommand::Quit);
        Ok(())
    }

    #[test]
    fn test_parse_arguments() -> Result<()> {
        assert_eq!(
            BrowseCommand::parse("/ John Doe ")?,
            BrowseCommand::Search("John Doe".to_string())
        );
        assert_eq!(
            BrowseCommand::parse("t books")?,
            BrowseCommand::Table(Some("books".to_string()))
        );
        assert_eq!(BrowseCommand::parse("t")?, BrowseCommand::Table(None));
        assert_eq!(
            BrowseCommand::parse("saveas backup copy.db")?,
            BrowseCommand::SaveAs(PathBuf::from("backup copy.db"))
        );
        Ok(())
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(BrowseCommand::parse("s 0").is_err());
        assert!(BrowseCommand::parse("s x").is_err());
        assert!(BrowseCommand::parse("open").is_err());
        assert!(BrowseCommand::parse("frobnicate").is_err());
    }
}
