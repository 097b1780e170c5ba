//! TableNavigator - paged, searchable view over one table of the open file.
//!
//! The navigator caches the table list, the current page of rows and a
//! cursor (`offset` of the page plus `current_row_index` inside it). Every
//! page load replaces the cached rows wholesale; a failed query leaves the
//! previous page, offset and cursor untouched.
//!
//! A search installs a filter that stays active while paging. Switching
//! table, resetting or calling [`TableNavigator::clear_search`] drops it.

use crate::error::{Error, Result};
use crate::storage::query::{self, Page, SearchFilter};
use crate::storage::StorageSession;
use crate::value::{format_row, Row};
use std::path::Path;
use tracing::debug;

/// Rows per page when no other size is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest row offset SQLite takes in `OFFSET`.
const MAX_OFFSET: usize = i64::MAX as usize;

pub struct TableNavigator<'s> {
    session: &'s mut StorageSession,
    tables: Vec<String>,
    current_table: Option<String>,
    columns: Vec<String>,
    current_rows: Vec<Row>,
    current_row_index: usize,
    page_size: usize,
    offset: usize,
    filter: Option<SearchFilter>,
}

impl<'s> TableNavigator<'s> {
    /// Bind a navigator to `session` with the default page size.
    ///
    /// Nothing is queried until [`reset_navigation`](Self::reset_navigation).
    pub fn new(session: &'s mut StorageSession) -> Self {
        Self {
            session,
            tables: Vec::new(),
            current_table: None,
            columns: Vec::new(),
            current_rows: Vec::new(),
            current_row_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
            filter: None,
        }
    }

    pub fn with_page_size(session: &'s mut StorageSession, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        let mut navigator = Self::new(session);
        navigator.page_size = page_size;
        Ok(navigator)
    }

    /// Load `path` into the session and start over on its first table.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.session.load_file(path)?;
        self.reset_navigation()
    }

    /// Re-read the table list and show the first page of the first table.
    pub fn reset_navigation(&mut self) -> Result<()> {
        let tables = query::list_tables(self.session.connection()?)?;
        debug!("[navigator] Found {} table(s)", tables.len());

        let first = tables.first().cloned();
        self.tables = tables;
        self.commit_page(first, None, 0, 0)
    }

    /// Reload the page at the current offset.
    pub fn load_current_rows(&mut self) -> Result<()> {
        self.commit_page(
            self.current_table.clone(),
            self.filter.clone(),
            self.offset,
            self.current_row_index,
        )
    }

    // ------------ Page navigation ------------

    pub fn move_first_page(&mut self) -> Result<()> {
        self.load_at(0)
    }

    /// Jump to the page holding the last row (offset 0 for an empty table).
    pub fn move_last_page(&mut self) -> Result<()> {
        let Some(table) = self.current_table.as_deref() else {
            return Ok(());
        };
        let total = query::count_rows(self.session.connection()?, table, self.filter.as_ref())?;
        let offset = if total > 0 {
            ((total - 1) / self.page_size) * self.page_size
        } else {
            0
        };
        self.load_at(offset)
    }

    pub fn page_up(&mut self) -> Result<()> {
        self.load_at(self.offset.saturating_sub(self.page_size))
    }

    /// Advance one page. There is no upper bound: paging past the end
    /// yields a short or empty page, up to [`Error::PageOutOfRange`].
    pub fn page_down(&mut self) -> Result<()> {
        let offset = self.offset.checked_add(self.page_size);
        self.load_at(within_range(offset)?)
    }

    /// Jump to a 1-based page number; page 0 is treated as page 1.
    pub fn go_to_page(&mut self, page: usize) -> Result<()> {
        let offset = page.saturating_sub(1).checked_mul(self.page_size);
        self.load_at(within_range(offset)?)
    }

    // ------------ Row navigation ------------

    pub fn move_up_one(&mut self) {
        if !self.current_rows.is_empty() {
            self.current_row_index = self.current_row_index.saturating_sub(1);
        }
    }

    pub fn move_down_one(&mut self) {
        if !self.current_rows.is_empty() {
            self.current_row_index = (self.current_row_index + 1).min(self.current_rows.len() - 1);
        }
    }

    pub fn move_line_start(&mut self) {
        if !self.current_rows.is_empty() {
            self.current_row_index = 0;
        }
    }

    pub fn move_line_end(&mut self) {
        if !self.current_rows.is_empty() {
            self.current_row_index = self.current_rows.len() - 1;
        }
    }

    /// Select a row of the current page directly, clamped to the page.
    pub fn select_row(&mut self, index: usize) {
        if !self.current_rows.is_empty() {
            self.current_row_index = index.min(self.current_rows.len() - 1);
        }
    }

    // ------------ Table switch & search ------------

    /// Make `name` the current table and show its first page.
    ///
    /// Only names from the last [`reset_navigation`](Self::reset_navigation)
    /// are accepted.
    pub fn switch_table(&mut self, name: &str) -> Result<()> {
        if !self.tables.iter().any(|t| t == name) {
            return Err(Error::UnknownTable(name.to_string()));
        }
        self.commit_page(Some(name.to_string()), None, 0, 0)
    }

    /// Show rows of the current table where any column contains `text`.
    ///
    /// Matching uses SQLite's `LIKE`, so ASCII letters compare
    /// case-insensitively. The filter stays in effect for later paging.
    pub fn search_text_in_current_table(&mut self, text: &str) -> Result<()> {
        let Some(table) = self.current_table.clone() else {
            return Ok(());
        };
        let columns = query::list_columns(self.session.connection()?, &table)?;
        if columns.is_empty() {
            return Ok(());
        }

        debug!("[navigator] Searching {} for {:?}", table, text);
        self.commit_page(Some(table), Some(SearchFilter::new(columns, text)), 0, 0)
    }

    /// Drop the search filter and go back to the first unfiltered page.
    pub fn clear_search(&mut self) -> Result<()> {
        self.commit_page(self.current_table.clone(), None, 0, 0)
    }

    // ------------ Data retrieval ------------

    /// One display line per row of the current page.
    pub fn current_rows_text(&self) -> Vec<String> {
        self.current_rows.iter().map(|row| format_row(row)).collect()
    }

    /// `column: value` lines for the selected row, or an empty string.
    pub fn current_row_details(&self) -> String {
        let Some(row) = self.current_rows.get(self.current_row_index) else {
            return String::new();
        };

        let width = self.columns.iter().map(|c| c.chars().count()).max().unwrap_or(0);
        row.iter()
            .enumerate()
            .map(|(i, value)| {
                let name = self
                    .columns
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| format!("#{}", i));
                format!("{:<width$} : {}", name, value, width = width)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Column names of one of the discovered tables.
    pub fn table_columns(&self, name: &str) -> Result<Vec<String>> {
        if !self.tables.iter().any(|t| t == name) {
            return Err(Error::UnknownTable(name.to_string()));
        }
        query::list_columns(self.session.connection()?, name)
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn current_table(&self) -> Option<&str> {
        self.current_table.as_deref()
    }

    /// Column names of the rows on the current page.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn current_rows(&self) -> &[Row] {
        &self.current_rows
    }

    pub fn current_row_index(&self) -> usize {
        self.current_row_index
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 1-based number of the current page.
    pub fn page_number(&self) -> usize {
        self.offset / self.page_size + 1
    }

    /// Active search text, if a search is in effect.
    pub fn search_filter(&self) -> Option<&str> {
        self.filter.as_ref().map(SearchFilter::text)
    }

    pub fn session(&self) -> &StorageSession {
        &*self.session
    }

    /// Mutable access for save/export. Loading a different file through
    /// this handle leaves the navigator stale until it is reset.
    pub fn session_mut(&mut self) -> &mut StorageSession {
        &mut *self.session
    }

    fn load_at(&mut self, offset: usize) -> Result<()> {
        self.commit_page(
            self.current_table.clone(),
            self.filter.clone(),
            offset,
            self.current_row_index,
        )
    }

    /// Fetch a page and, only if that succeeds, replace the whole cursor.
    fn commit_page(
        &mut self,
        table: Option<String>,
        filter: Option<SearchFilter>,
        offset: usize,
        row_index: usize,
    ) -> Result<()> {
        let page = match table.as_deref() {
            Some(name) => query::select_page(
                self.session.connection()?,
                name,
                filter.as_ref(),
                self.page_size,
                offset,
            )?,
            None => Page::default(),
        };

        self.current_table = table;
        self.filter = filter;
        self.offset = offset;
        self.columns = page.columns;
        self.current_rows = page.rows;
        self.current_row_index = row_index.min(self.current_rows.len().saturating_sub(1));
        Ok(())
    }
}

fn within_range(offset: Option<usize>) -> Result<usize> {
    offset
        .filter(|offset| *offset <= MAX_OFFSET)
        .ok_or(Error::PageOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use tempfile::TempDir;

    fn books_session(temp_dir: &TempDir, rows: usize) -> Result<StorageSession> {
        let mut session = StorageSession::new();
        session.load_file(temp_dir.path().join("library.db"))?;
        session.execute_batch(
            "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT, author TEXT);
             CREATE TABLE series (id INTEGER PRIMARY KEY, title TEXT);
             INSERT INTO series (title) VALUES ('Dune Chronicles'), ('Discworld');",
        )?;
        for i in 1..=rows {
            session.connection()?.execute(
                "INSERT INTO books (title, author) VALUES (?1, ?2)",
                [format!("Book {}", i), format!("Author {}", i % 4)],
            )?;
        }
        Ok(session)
    }

    #[test]
    fn test_reset_picks_first_table_alphabetically() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 3)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;

        assert_eq!(nav.tables(), ["books", "series"]);
        assert_eq!(nav.current_table(), Some("books"));
        assert_eq!(nav.columns(), ["id", "title", "author"]);
        assert_eq!(nav.current_rows().len(), 3);
        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.current_row_index(), 0);
        Ok(())
    }

    #[test]
    fn test_reset_without_file_fails() {
        let mut session = StorageSession::new();
        let mut nav = TableNavigator::new(&mut session);
        assert!(matches!(nav.reset_navigation(), Err(Error::NoFileLoaded)));
    }

    #[test]
    fn test_empty_database_has_no_current_table() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = StorageSession::new();
        let mut nav = TableNavigator::new(&mut session);
        nav.open_file(temp_dir.path().join("empty.db"))?;

        assert!(nav.tables().is_empty());
        assert_eq!(nav.current_table(), None);
        assert!(nav.current_rows().is_empty());

        // Everything is a harmless no-op without a table
        nav.page_down()?;
        nav.move_last_page()?;
        nav.search_text_in_current_table("x")?;
        nav.move_down_one();
        assert!(nav.current_rows().is_empty());
        assert_eq!(nav.current_row_index(), 0);
        assert_eq!(nav.current_row_details(), "");
        Ok(())
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut session = StorageSession::new();
        assert!(matches!(
            TableNavigator::with_page_size(&mut session, 0),
            Err(Error::InvalidPageSize)
        ));
    }

    #[test]
    fn test_row_moves_saturate() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 4)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;

        nav.move_up_one();
        assert_eq!(nav.current_row_index(), 0);

        for _ in 0..10 {
            nav.move_down_one();
        }
        assert_eq!(nav.current_row_index(), 3);

        nav.move_line_start();
        assert_eq!(nav.current_row_index(), 0);
        nav.move_line_end();
        assert_eq!(nav.current_row_index(), 3);

        nav.select_row(1);
        assert_eq!(nav.current_row_index(), 1);
        nav.select_row(99);
        assert_eq!(nav.current_row_index(), 3);
        Ok(())
    }

    #[test]
    fn test_page_load_clamps_row_index() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 13)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;

        nav.move_line_end();
        assert_eq!(nav.current_row_index(), 9);

        nav.page_down()?;
        assert_eq!(nav.current_rows().len(), 3);
        assert_eq!(nav.current_row_index(), 2);

        nav.page_up()?;
        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.current_row_index(), 2);
        Ok(())
    }

    #[test]
    fn test_page_up_floors_at_zero() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 5)?;
        let mut nav = TableNavigator::with_page_size(&mut session, 2)?;
        nav.reset_navigation()?;

        nav.page_down()?;
        nav.page_up()?;
        nav.page_up()?;
        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.current_rows().len(), 2);
        Ok(())
    }

    #[test]
    fn test_move_last_page() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 20)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;

        // Exactly two full pages: last page starts at 10, not 20
        nav.move_last_page()?;
        assert_eq!(nav.offset(), 10);
        assert_eq!(nav.current_rows().len(), 10);
        assert_eq!(nav.page_number(), 2);

        nav.move_first_page()?;
        assert_eq!(nav.offset(), 0);

        nav.go_to_page(2)?;
        assert_eq!(nav.offset(), 10);
        nav.go_to_page(0)?;
        assert_eq!(nav.offset(), 0);
        Ok(())
    }

    #[test]
    fn test_huge_page_numbers_are_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 20)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;
        nav.page_down()?;

        assert!(matches!(nav.go_to_page(usize::MAX), Err(Error::PageOutOfRange)));
        assert_eq!(nav.offset(), 10);
        assert_eq!(nav.current_rows().len(), 10);

        // The furthest page SQLite can still address is empty, one more is not
        nav.go_to_page(MAX_OFFSET / 10 + 1)?;
        assert_eq!(nav.offset(), MAX_OFFSET / 10 * 10);
        assert!(nav.current_rows().is_empty());

        assert!(matches!(nav.page_down(), Err(Error::PageOutOfRange)));
        assert_eq!(nav.offset(), MAX_OFFSET / 10 * 10);

        nav.move_first_page()?;
        assert_eq!(nav.current_rows().len(), 10);
        Ok(())
    }

    #[test]
    fn test_switch_table_resets_cursor() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 15)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;
        nav.page_down()?;
        nav.move_down_one();

        nav.switch_table("series")?;
        assert_eq!(nav.current_table(), Some("series"));
        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.current_row_index(), 0);
        assert_eq!(nav.columns(), ["id", "title"]);
        assert_eq!(nav.current_rows().len(), 2);
        Ok(())
    }

    #[test]
    fn test_switch_to_unknown_table_keeps_state() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 15)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;
        nav.page_down()?;

        let err = nav.switch_table("books; DROP TABLE books").unwrap_err();
        assert!(matches!(err, Error::UnknownTable(_)));
        assert_eq!(nav.current_table(), Some("books"));
        assert_eq!(nav.offset(), 10);
        assert_eq!(nav.current_rows().len(), 5);
        assert!(nav.table_columns("nope").is_err());
        Ok(())
    }

    #[test]
    fn test_failed_load_leaves_page_untouched() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 15)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;
        nav.move_down_one();

        // Table disappears behind the navigator's back
        nav.session().execute_batch("DROP TABLE books;")?;
        assert!(matches!(nav.page_down(), Err(Error::Sqlite(_))));

        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.current_rows().len(), 10);
        assert_eq!(nav.current_row_index(), 1);
        Ok(())
    }

    #[test]
    fn test_search_is_sticky_while_paging() -> Result<()> {
        let temp_dir = TempDir::new()?;
        // Author 1 appears for ids 1, 5, 9, 13, 17, 21, 25
        let mut session = books_session(&temp_dir, 25)?;
        let mut nav = TableNavigator::with_page_size(&mut session, 3)?;
        nav.reset_navigation()?;
        nav.page_down()?;

        nav.search_text_in_current_table("Author 1")?;
        assert_eq!(nav.search_filter(), Some("Author 1"));
        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.current_rows().len(), 3);

        nav.page_down()?;
        assert_eq!(nav.offset(), 3);
        assert_eq!(nav.current_rows().len(), 3);
        assert!(nav
            .current_rows()
            .iter()
            .all(|row| row[2] == Value::from("Author 1")));

        nav.move_last_page()?;
        assert_eq!(nav.offset(), 6);
        assert_eq!(nav.current_rows().len(), 1);
        assert_eq!(nav.current_rows()[0][0], Value::Integer(25));

        nav.clear_search()?;
        assert_eq!(nav.search_filter(), None);
        assert_eq!(nav.offset(), 0);
        assert_eq!(nav.current_rows()[1][0], Value::Integer(2));
        Ok(())
    }

    #[test]
    fn test_switch_table_drops_search() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 5)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;

        nav.search_text_in_current_table("Book 3")?;
        assert_eq!(nav.current_rows().len(), 1);

        nav.switch_table("series")?;
        assert_eq!(nav.search_filter(), None);
        nav.switch_table("books")?;
        assert_eq!(nav.current_rows().len(), 5);
        Ok(())
    }

    #[test]
    fn test_row_details_lists_columns() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut session = books_session(&temp_dir, 2)?;
        let mut nav = TableNavigator::new(&mut session);
        nav.reset_navigation()?;
        nav.move_down_one();

        assert_eq!(
            nav.current_row_details(),
            "id     : 2\ntitle  : Book 2\nauthor : Author 2"
        );
        assert_eq!(
            nav.current_rows_text(),
            vec![
                "(1, 'Book 1', 'Author 1')".to_string(),
                "(2, 'Book 2', 'Author 2')".to_string(),
            ]
        );
        assert_eq!(nav.table_columns("series")?, vec!["id", "title"]);
        Ok(())
    }
}
