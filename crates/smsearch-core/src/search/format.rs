//! Output formats for ranked results.
//!
//! Every search produces one canonical `Vec<ScoredResult>`; the shape handed
//! to callers is chosen by a [`ResultFormatter`]:
//!
//! - [`RowFormatter`] - a list of [`ResultRow`] objects, one per result
//! - [`TableFormatter`] - a columnar [`ResultTable`] with one array per field
//!
//! The two shapes carry the same fields and convert into each other without
//! loss ([`ResultTable::from_rows`] / [`ResultTable::into_rows`]).

use super::types::{RecordId, ScoredResult, SearchError, SearchMethod};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output format selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Rows,
    Table,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Rows => "rows",
            OutputFormat::Table => "table",
        }
    }

    /// Formats `results` with the formatter for this format.
    pub fn format(&self, results: &[ScoredResult]) -> FormattedResults {
        match self {
            OutputFormat::Rows => FormattedResults::Rows(RowFormatter.format(results)),
            OutputFormat::Table => FormattedResults::Table(TableFormatter.format(results)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = SearchError;

    /// Parses a format name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidArgument` for unsupported names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rows" => Ok(OutputFormat::Rows),
            "table" => Ok(OutputFormat::Table),
            other => Err(SearchError::InvalidArgument(format!(
                "unsupported output format '{other}' (expected 'rows' or 'table')"
            ))),
        }
    }
}

/// One result as a flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub search_method: SearchMethod,
    pub id: RecordId,
    pub text: String,
    /// Absent for vector results
    pub score: Option<f32>,
    pub rank: usize,
}

impl From<&ScoredResult> for ResultRow {
    fn from(result: &ScoredResult) -> Self {
        Self {
            search_method: result.method,
            id: result.id,
            text: result.text.clone(),
            score: result.score,
            rank: result.rank,
        }
    }
}

impl From<ResultRow> for ScoredResult {
    fn from(row: ResultRow) -> Self {
        Self {
            method: row.search_method,
            id: row.id,
            text: row.text,
            score: row.score,
            rank: row.rank,
        }
    }
}

/// Results in columnar form: entry `i` of every column belongs to result `i`.
///
/// Deserializing a table whose columns differ in length fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableColumns")]
pub struct ResultTable {
    pub search_method: Vec<SearchMethod>,
    pub id: Vec<RecordId>,
    pub text: Vec<String>,
    pub score: Vec<Option<f32>>,
    pub rank: Vec<usize>,
}

impl ResultTable {
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        let mut table = Self::with_capacity(rows.len());
        for row in rows {
            table.search_method.push(row.search_method);
            table.id.push(row.id);
            table.text.push(row.text);
            table.score.push(row.score);
            table.rank.push(row.rank);
        }
        table
    }

    /// Converts back to one row per result.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidArgument` if the columns differ in length.
    pub fn into_rows(self) -> Result<Vec<ResultRow>, SearchError> {
        self.check_columns()?;
        Ok(self
            .search_method
            .into_iter()
            .zip(self.id)
            .zip(self.text)
            .zip(self.score)
            .zip(self.rank)
            .map(|((((search_method, id), text), score), rank)| ResultRow {
                search_method,
                id,
                text,
                score,
                rank,
            })
            .collect())
    }

    /// Checks that every column holds one entry per result.
    pub fn check_columns(&self) -> Result<(), SearchError> {
        let lengths = [
            ("search_method", self.search_method.len()),
            ("text", self.text.len()),
            ("score", self.score.len()),
            ("rank", self.rank.len()),
        ];
        match lengths.iter().find(|(_, len)| *len != self.id.len()) {
            Some((column, len)) => Err(SearchError::InvalidArgument(format!(
                "table column '{}' has {} entries but 'id' has {}",
                column,
                len,
                self.id.len()
            ))),
            None => Ok(()),
        }
    }

    /// Number of results (length of every column).
    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            search_method: Vec::with_capacity(capacity),
            id: Vec::with_capacity(capacity),
            text: Vec::with_capacity(capacity),
            score: Vec::with_capacity(capacity),
            rank: Vec::with_capacity(capacity),
        }
    }
}

/// Unchecked columns as they appear on the wire.
#[derive(Deserialize)]
struct TableColumns {
    search_method: Vec<SearchMethod>,
    id: Vec<RecordId>,
    text: Vec<String>,
    score: Vec<Option<f32>>,
    rank: Vec<usize>,
}

impl TryFrom<TableColumns> for ResultTable {
    type Error = SearchError;

    fn try_from(columns: TableColumns) -> Result<Self, Self::Error> {
        let table = ResultTable {
            search_method: columns.search_method,
            id: columns.id,
            text: columns.text,
            score: columns.score,
            rank: columns.rank,
        };
        table.check_columns()?;
        Ok(table)
    }
}

/// Strategy turning ranked results into an output shape.
pub trait ResultFormatter {
    type Output;

    fn format(&self, results: &[ScoredResult]) -> Self::Output;
}

/// Formats results as a list of rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowFormatter;

impl ResultFormatter for RowFormatter {
    type Output = Vec<ResultRow>;

    fn format(&self, results: &[ScoredResult]) -> Self::Output {
        results.iter().map(ResultRow::from).collect()
    }
}

/// Formats results as a columnar table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableFormatter;

impl ResultFormatter for TableFormatter {
    type Output = ResultTable;

    fn format(&self, results: &[ScoredResult]) -> Self::Output {
        ResultTable::from_rows(RowFormatter.format(results))
    }
}

/// Results in whichever shape was requested.
///
/// Serializes as the bare shape (a JSON array for rows, an object of arrays
/// for a table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormattedResults {
    Rows(Vec<ResultRow>),
    Table(ResultTable),
}

impl FormattedResults {
    pub fn format(&self) -> OutputFormat {
        match self {
            FormattedResults::Rows(_) => OutputFormat::Rows,
            FormattedResults::Table(_) => OutputFormat::Table,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FormattedResults::Rows(rows) => rows.len(),
            FormattedResults::Table(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts back to rows regardless of the shape.
    pub fn into_rows(self) -> Result<Vec<ResultRow>, SearchError> {
        match self {
            FormattedResults::Rows(rows) => Ok(rows),
            FormattedResults::Table(table) => table.into_rows(),
        }
    }
}
