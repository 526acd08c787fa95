//! Record types flowing through the trade/sentiment pipeline.
//!
//! Each stage consumes one of these tables by reference and produces a new
//! one; nothing is mutated in place.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Label given to every row when there are too few rows to cluster.
pub const SINGLE_CLUSTER_LABEL: &str = "Single Cluster";

/// A money cell or total: exact while it fits a `Decimal`, a float beyond that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Amount {
    Exact(Decimal),
    Float(f64),
}

impl Amount {
    #[must_use]
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Exact(d) => d.to_f64().unwrap_or(f64::NAN),
            Self::Float(v) => v,
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::Exact(value)
    }
}

/// One cleaned row of the trader history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Parsed (day-first) trade timestamp.
    pub timestamp: NaiveDateTime,
    /// Raw side text, e.g. `"BUY "` or `"sell"`.
    pub side: String,
    pub closed_pnl: Option<Amount>,
    pub size_usd: Option<Amount>,
    pub execution_price: Option<f64>,
}

impl TradeRecord {
    /// Calendar day the trade belongs to.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// One cleaned row of the market sentiment index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub date: NaiveDate,
    /// Index value; `None` when the cell was empty or not numeric.
    pub value: Option<f64>,
    /// Free-text regime name carried by some sources ("Fear", "Extreme Greed").
    pub classification: Option<String>,
}

/// Per-day totals of the trader history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_pnl: Amount,
    pub total_volume: Amount,
    /// Sample standard deviation of execution price; `None` with fewer than two prices.
    pub price_risk: Option<f64>,
}

/// A daily aggregate joined with that day's sentiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub date: NaiveDate,
    pub total_pnl: f64,
    pub total_volume: f64,
    pub price_risk: Option<f64>,
    pub sentiment_score: f64,
    /// Min-max normalized score over the merged table, in `[0, 1]`.
    pub sentiment_norm: f64,
}

impl MergedRecord {
    /// Names accepted by [`MergedRecord::feature`].
    pub const FEATURE_NAMES: [&'static str; 5] = [
        "total_pnl",
        "total_volume",
        "price_risk",
        "sentiment_score",
        "sentiment_norm",
    ];

    /// Value of a named numeric column, as used by feature selection.
    ///
    /// Returns `None` for unknown names and for missing values.
    #[must_use]
    pub fn feature(&self, name: &str) -> Option<f64> {
        match name {
            "total_pnl" => Some(self.total_pnl),
            "total_volume" => Some(self.total_volume),
            "price_risk" => self.price_risk,
            "sentiment_score" => Some(self.sentiment_score),
            "sentiment_norm" => Some(self.sentiment_norm),
            _ => None,
        }
    }
}

/// A merged row with its behavioral cluster.
///
/// Cluster ids come from centroid order and carry no meaning across runs;
/// `cluster_label` is a positional convenience, not a behavioral guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteredRecord {
    #[serde(flatten)]
    pub record: MergedRecord,
    pub cluster: usize,
    pub cluster_label: String,
}

/// Read access shared by merged and clustered rows.
pub trait SentimentRow {
    fn merged(&self) -> &MergedRecord;
}

impl SentimentRow for MergedRecord {
    fn merged(&self) -> &MergedRecord {
        self
    }
}

impl SentimentRow for ClusteredRecord {
    fn merged(&self) -> &MergedRecord {
        &self.record
    }
}

/// Label for a cluster id: the first three ids are named, the rest are generic.
#[must_use]
pub fn cluster_label(id: usize) -> String {
    match id {
        0 => "Steady Eddy".to_string(),
        1 => "Risk Lover".to_string(),
        2 => "Balanced Bob".to_string(),
        n => format!("Cluster {n}"),
    }
}
