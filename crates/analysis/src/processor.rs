//! Daily aggregation of trades and the join with the sentiment index.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use trade_mood_core::{Amount, DailyAggregate, MergedRecord, SentimentRecord, TradeRecord};

use crate::stats::sample_std;

/// Running total that stays exact until a cell or the sum leaves `Decimal`
/// range, then falls back to a float sum.
#[derive(Debug)]
struct AmountSum {
    exact: Option<Decimal>,
    values: Vec<f64>,
}

impl Default for AmountSum {
    fn default() -> Self {
        Self {
            exact: Some(Decimal::ZERO),
            values: Vec::new(),
        }
    }
}

impl AmountSum {
    fn add(&mut self, amount: Amount) {
        self.values.push(amount.to_f64());
        self.exact = match (self.exact, amount) {
            (Some(total), Amount::Exact(d)) => total.checked_add(d),
            _ => None,
        };
    }

    fn total(mut self) -> Amount {
        match self.exact {
            Some(total) => Amount::Exact(total),
            None => {
                // fixed order keeps the float sum independent of input order
                self.values.sort_by(f64::total_cmp);
                Amount::Float(self.values.iter().sum())
            }
        }
    }
}

#[derive(Default)]
struct DayAccumulator {
    pnl: AmountSum,
    volume: AmountSum,
    prices: Vec<f64>,
}

pub struct DataProcessor;

impl DataProcessor {
    /// Groups trades by calendar day.
    ///
    /// Sums of PnL and size are exact decimals, so totals do not depend on
    /// input order. A day whose cells or total overflow `Decimal` is summed
    /// as floats in sorted order instead. Output is sorted by date.
    #[must_use]
    pub fn aggregate_daily(trades: &[TradeRecord]) -> Vec<DailyAggregate> {
        let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

        for trade in trades {
            let day = days.entry(trade.date()).or_default();
            if let Some(pnl) = trade.closed_pnl {
                day.pnl.add(pnl);
            }
            if let Some(size) = trade.size_usd {
                day.volume.add(size);
            }
            if let Some(price) = trade.execution_price {
                day.prices.push(price);
            }
        }

        days.into_iter()
            .map(|(date, mut day)| {
                // fixed order keeps the float std independent of input order
                day.prices.sort_by(f64::total_cmp);
                DailyAggregate {
                    date,
                    total_pnl: day.pnl.total(),
                    total_volume: day.volume.total(),
                    price_risk: sample_std(&day.prices),
                }
            })
            .collect()
    }

    /// Inner-joins daily aggregates with sentiment on the date and min-max
    /// normalizes the joined sentiment scores.
    ///
    /// Sentiment rows without a value are ignored. For repeated dates the
    /// first valued row wins.
    #[must_use]
    pub fn merge_sentiment(
        daily: &[DailyAggregate],
        sentiment: &[SentimentRecord],
    ) -> Vec<MergedRecord> {
        let mut scores: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for record in sentiment {
            let Some(value) = record.value else {
                continue;
            };
            match scores.get(&record.date) {
                None => {
                    scores.insert(record.date, value);
                }
                Some(first) if (*first - value).abs() > f64::EPSILON => {
                    tracing::warn!(
                        date = %record.date,
                        kept = first,
                        ignored = value,
                        "conflicting sentiment values for one date"
                    );
                }
                Some(_) => {}
            }
        }

        let mut merged: Vec<MergedRecord> = daily
            .iter()
            .filter_map(|day| {
                let score = *scores.get(&day.date)?;
                Some(MergedRecord {
                    date: day.date,
                    total_pnl: day.total_pnl.to_f64(),
                    total_volume: day.total_volume.to_f64(),
                    price_risk: day.price_risk,
                    sentiment_score: score,
                    sentiment_norm: 0.0,
                })
            })
            .collect();
        merged.sort_by_key(|r| r.date);

        Self::normalize_sentiment(merged)
    }

    /// Min-max scales `sentiment_score` into `sentiment_norm`.
    ///
    /// A constant score column maps every row to 0.
    #[must_use]
    pub fn normalize_sentiment(mut merged: Vec<MergedRecord>) -> Vec<MergedRecord> {
        let min = merged
            .iter()
            .map(|r| r.sentiment_score)
            .fold(f64::INFINITY, f64::min);
        let max = merged
            .iter()
            .map(|r| r.sentiment_score)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;

        if !merged.is_empty() && range <= 0.0 {
            tracing::warn!(
                score = min,
                rows = merged.len(),
                "sentiment is constant over the merged range, normalizing to 0"
            );
        }

        for record in &mut merged {
            record.sentiment_norm = if range > 0.0 {
                (record.sentiment_score - min) / range
            } else {
                0.0
            };
        }
        merged
    }

    /// Aggregates trades by day, joins sentiment and normalizes it.
    #[must_use]
    pub fn prepare(trades: &[TradeRecord], sentiment: &[SentimentRecord]) -> Vec<MergedRecord> {
        let daily = Self::aggregate_daily(trades);
        let merged = Self::merge_sentiment(&daily, sentiment);
        tracing::debug!(
            trades = trades.len(),
            days = daily.len(),
            merged = merged.len(),
            "prepared daily sentiment table"
        );
        merged
    }
}
