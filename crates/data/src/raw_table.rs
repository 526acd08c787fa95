//! Untyped CSV tables with lowercase headers and exact-duplicate removal.

use std::collections::HashSet;
use std::io::Read;

use crate::error::{InputError, Result};

/// A CSV source read into memory as strings.
///
/// Headers are lowercased on read; cells are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    source_name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Reads a CSV stream. Short rows are padded with empty cells so every
    /// row has one cell per header.
    ///
    /// # Errors
    /// Returns `InputError::Csv` if the stream is not valid CSV.
    pub fn from_reader<R: Read>(source_name: &str, reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| InputError::csv(source_name, e))?
            .iter()
            .map(str::to_lowercase)
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| InputError::csv(source_name, e))?;
            let mut row: Vec<String> = record.iter().map(ToString::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self {
            source_name: source_name.to_string(),
            headers,
            rows,
        })
    }

    /// Builds a table from already-split cells. Headers are lowercased.
    #[must_use]
    pub fn from_parts(source_name: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            source_name: source_name.to_string(),
            headers: headers.iter().map(|h| h.to_lowercase()).collect(),
            rows,
        }
    }

    #[must_use]
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact (already lowercase) name.
    ///
    /// # Errors
    /// Returns `InputError::MissingColumn` if no header matches.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.optional_column(name)
            .ok_or_else(|| InputError::missing_column(&self.source_name, name))
    }

    #[must_use]
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Drops rows whose every cell equals an earlier row's. First occurrence wins.
    #[must_use]
    pub fn dedup(self) -> Self {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        let rows: Vec<Vec<String>> = self
            .rows
            .into_iter()
            .filter(|row| seen.insert(row.clone()))
            .collect();

        tracing::debug!(
            source = %self.source_name,
            removed = before - rows.len(),
            "removed duplicate rows"
        );

        Self { rows, ..self }
    }
}
