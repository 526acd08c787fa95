//! Headline figures over the clustered table and the raw trade sides.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trade_mood_core::{ClusteredRecord, TradeRecord};

use crate::stats::mean;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub days: usize,
    pub avg_pnl: f64,
    pub avg_volume: f64,
    /// Most frequent cluster label; ties go to the alphabetically first label.
    pub dominant_cluster: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Latest day's normalized sentiment on a 0 to 100 scale.
    pub sentiment_gauge: f64,
}

impl DashboardSummary {
    #[must_use]
    pub fn from_table(table: &[ClusteredRecord]) -> Self {
        let pnl: Vec<f64> = table.iter().map(|r| r.record.total_pnl).collect();
        let volume: Vec<f64> = table.iter().map(|r| r.record.total_volume).collect();

        let mut label_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in table {
            *label_counts.entry(row.cluster_label.as_str()).or_default() += 1;
        }
        let mut dominant: Option<(&str, usize)> = None;
        for (label, count) in label_counts {
            if dominant.map_or(true, |(_, best)| count > best) {
                dominant = Some((label, count));
            }
        }

        let latest = table.iter().max_by_key(|r| r.record.date);

        Self {
            days: table.len(),
            avg_pnl: mean(&pnl),
            avg_volume: mean(&volume),
            dominant_cluster: dominant.map_or_else(|| "N/A".to_string(), |(l, _)| l.to_string()),
            start_date: table.iter().map(|r| r.record.date).min(),
            end_date: latest.map(|r| r.record.date),
            sentiment_gauge: latest.map_or(0.0, |r| r.record.sentiment_norm * 100.0),
        }
    }
}

/// Buy versus sell counts over the cleaned trades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideDistribution {
    pub buy: usize,
    pub sell: usize,
    /// Sides that are neither buy nor sell after normalization.
    pub other: usize,
}

/// Trims and capitalizes side text: `" bUY "` becomes `"Buy"`.
#[must_use]
pub fn normalize_side(side: &str) -> String {
    let mut chars = side.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

impl SideDistribution {
    #[must_use]
    pub fn from_trades(trades: &[TradeRecord]) -> Self {
        let mut dist = Self::default();
        for trade in trades {
            match normalize_side(&trade.side).as_str() {
                "Buy" => dist.buy += 1,
                "Sell" => dist.sell += 1,
                _ => dist.other += 1,
            }
        }
        dist
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.buy + self.sell + self.other
    }

    /// Share of buys among buys and sells; `None` without either.
    #[must_use]
    pub fn buy_ratio(&self) -> Option<f64> {
        let directional = self.buy + self.sell;
        (directional > 0).then(|| self.buy as f64 / directional as f64)
    }
}
