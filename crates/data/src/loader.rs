//! Loading and cleaning of the trader history and the sentiment index.
//!
//! Both sources go through the same steps: lowercase the headers, drop exact
//! duplicate rows, parse the date column and silently drop the rows where it
//! does not parse. Numeric cells that fail to parse become `None` and the row
//! is kept.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use trade_mood_core::{Amount, SentimentRecord, TradeRecord};

use crate::dates::{parse_day_first_datetime, parse_standard_date};
use crate::error::{InputError, Result};
use crate::raw_table::RawTable;

pub const TRADES_SOURCE: &str = "trades";
pub const SENTIMENT_SOURCE: &str = "sentiment";

pub const COL_TIMESTAMP: &str = "timestamp ist";
pub const COL_SIDE: &str = "side";
pub const COL_CLOSED_PNL: &str = "closed pnl";
pub const COL_SIZE_USD: &str = "size usd";
pub const COL_EXECUTION_PRICE: &str = "execution price";
pub const COL_DATE: &str = "date";
pub const COL_VALUE: &str = "value";
pub const COL_CLASSIFICATION: &str = "classification";

/// Cleaned trader rows, in input order.
pub type TradeTable = Vec<TradeRecord>;
/// Cleaned sentiment rows, in input order.
pub type SentimentTable = Vec<SentimentRecord>;

pub struct DataLoader;

impl DataLoader {
    /// Loads both sources from CSV files.
    ///
    /// # Errors
    /// Returns `InputError` if a file cannot be read, is not valid CSV, or
    /// lacks a required column.
    pub fn load_paths(
        trades_path: impl AsRef<Path>,
        sentiment_path: impl AsRef<Path>,
    ) -> Result<(TradeTable, SentimentTable)> {
        let trades =
            File::open(trades_path.as_ref()).map_err(|e| InputError::io(TRADES_SOURCE, e))?;
        let sentiment = File::open(sentiment_path.as_ref())
            .map_err(|e| InputError::io(SENTIMENT_SOURCE, e))?;
        Self::load_readers(trades, sentiment)
    }

    /// Loads both sources from in-memory or streamed CSV bytes.
    ///
    /// # Errors
    /// Returns `InputError` if a stream is not valid CSV or lacks a required column.
    pub fn load_readers<T: Read, S: Read>(
        trades: T,
        sentiment: S,
    ) -> Result<(TradeTable, SentimentTable)> {
        let trades = Self::clean_trades(RawTable::from_reader(TRADES_SOURCE, trades)?)?;
        let sentiment = Self::clean_sentiment(RawTable::from_reader(SENTIMENT_SOURCE, sentiment)?)?;
        Ok((trades, sentiment))
    }

    /// Deduplicates raw trader rows and parses them.
    ///
    /// # Errors
    /// Returns `InputError::MissingColumn` if any trade column is absent.
    pub fn clean_trades(raw: RawTable) -> Result<TradeTable> {
        let timestamp = raw.column(COL_TIMESTAMP)?;
        let side = raw.column(COL_SIDE)?;
        let closed_pnl = raw.column(COL_CLOSED_PNL)?;
        let size_usd = raw.column(COL_SIZE_USD)?;
        let execution_price = raw.column(COL_EXECUTION_PRICE)?;

        let raw = raw.dedup();
        let records: TradeTable = raw
            .rows()
            .iter()
            .filter_map(|row| {
                Some(TradeRecord {
                    timestamp: parse_day_first_datetime(&row[timestamp])?,
                    side: row[side].clone(),
                    closed_pnl: parse_amount(&row[closed_pnl]),
                    size_usd: parse_amount(&row[size_usd]),
                    execution_price: parse_float(&row[execution_price]),
                })
            })
            .collect();

        tracing::debug!(
            kept = records.len(),
            dropped = raw.len() - records.len(),
            "parsed trade timestamps"
        );
        Ok(records)
    }

    /// Deduplicates raw sentiment rows and parses them.
    ///
    /// # Errors
    /// Returns `InputError::MissingColumn` if `date` or `value` is absent.
    pub fn clean_sentiment(raw: RawTable) -> Result<SentimentTable> {
        let date = raw.column(COL_DATE)?;
        let value = raw.column(COL_VALUE)?;
        let classification = raw.optional_column(COL_CLASSIFICATION);

        let raw = raw.dedup();
        let records: SentimentTable = raw
            .rows()
            .iter()
            .filter_map(|row| {
                Some(SentimentRecord {
                    date: parse_standard_date(&row[date])?,
                    value: parse_float(&row[value]),
                    classification: classification
                        .map(|idx| row[idx].trim().to_string())
                        .filter(|c| !c.is_empty()),
                })
            })
            .collect();

        tracing::debug!(
            kept = records.len(),
            dropped = raw.len() - records.len(),
            "parsed sentiment dates"
        );
        Ok(records)
    }
}

/// Parses a money cell, accepting scientific notation.
///
/// Values outside `Decimal` range are kept as floats. Blank, invalid or
/// non-finite → `None`.
fn parse_amount(cell: &str) -> Option<Amount> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .map(Amount::Exact)
        .ok()
        .or_else(|| parse_float(cell).map(Amount::Float))
}

/// Parses a finite float. Blank, invalid or non-finite → `None`.
fn parse_float(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
