//! Error types for loading the raw trader and sentiment sources.

use thiserror::Error;

/// Fatal problems with an input source. Any of these halts the pipeline
/// before a single stage runs.
#[derive(Debug, Error)]
pub enum InputError {
    /// The source could not be opened or read.
    #[error("cannot read {source_name}: {error}")]
    Io {
        /// Which input failed ("trades" or "sentiment").
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    /// The CSV framing is broken (bad quoting, invalid UTF-8, ...).
    #[error("malformed CSV in {source_name}: {error}")]
    Csv {
        /// Which input failed.
        source_name: String,
        #[source]
        error: csv::Error,
    },

    /// A column the pipeline depends on is absent after lowercasing headers.
    #[error("{source_name} is missing required column '{column}'")]
    MissingColumn {
        /// Which input failed.
        source_name: String,
        /// The lowercase column name that was expected.
        column: String,
    },
}

impl InputError {
    pub(crate) fn io(source_name: &str, error: std::io::Error) -> Self {
        Self::Io {
            source_name: source_name.to_string(),
            error,
        }
    }

    pub(crate) fn csv(source_name: &str, error: csv::Error) -> Self {
        Self::Csv {
            source_name: source_name.to_string(),
            error,
        }
    }

    pub(crate) fn missing_column(source_name: &str, column: &str) -> Self {
        Self::MissingColumn {
            source_name: source_name.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InputError>;
