//! Plain-language observations about how trading relates to sentiment.

use trade_mood_core::{InsightsConfig, MergedRecord, SentimentRow};

use crate::stats::{mean, pearson_pairwise};

/// Returned alone when there is nothing to analyse.
pub const NO_DATA_INSIGHT: &str = "No data available";

/// Columns scanned for the strongest sentiment correlation, in scan order.
const CORRELATION_CANDIDATES: [&str; 3] = ["total_pnl", "total_volume", "price_risk"];

#[derive(Debug, Clone, Default)]
pub struct InsightEngine {
    config: InsightsConfig,
}

fn column(rows: &[&MergedRecord], name: &str) -> Vec<Option<f64>> {
    rows.iter().map(|r| r.feature(name)).collect()
}

impl InsightEngine {
    #[must_use]
    pub fn new(config: InsightsConfig) -> Self {
        Self { config }
    }

    /// Feature with the highest Pearson correlation against `sentiment_norm`.
    ///
    /// Ties keep the earlier column. `None` when every correlation is `NaN`.
    #[must_use]
    pub fn strongest_correlation<R: SentimentRow>(&self, table: &[R]) -> Option<(&'static str, f64)> {
        let rows: Vec<&MergedRecord> = table.iter().map(SentimentRow::merged).collect();
        let sentiment = column(&rows, "sentiment_norm");

        let mut best: Option<(&'static str, f64)> = None;
        for name in CORRELATION_CANDIDATES {
            let r = pearson_pairwise(&column(&rows, name), &sentiment);
            if r.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, b)| r > b) {
                best = Some((name, r));
            }
        }
        best
    }

    /// Mean daily PnL on fear days and on greed days, split on the raw score.
    ///
    /// An empty regime averages to `NaN`.
    #[must_use]
    pub fn fear_greed_means<R: SentimentRow>(&self, table: &[R]) -> (f64, f64) {
        let (fear, greed): (Vec<&MergedRecord>, Vec<&MergedRecord>) = table
            .iter()
            .map(SentimentRow::merged)
            .partition(|r| r.sentiment_score < self.config.fear_greed_threshold);

        let avg = |rows: Vec<&MergedRecord>| {
            mean(&rows.iter().map(|r| r.total_pnl).collect::<Vec<f64>>())
        };
        (avg(fear), avg(greed))
    }

    /// Correlation between daily price risk and normalized sentiment.
    #[must_use]
    pub fn risk_sentiment_correlation<R: SentimentRow>(&self, table: &[R]) -> f64 {
        let rows: Vec<&MergedRecord> = table.iter().map(SentimentRow::merged).collect();
        pearson_pairwise(&column(&rows, "price_risk"), &column(&rows, "sentiment_norm"))
    }

    /// Ordered insight strings: the strongest correlation, the fear/greed
    /// comparison, and the price risk link when it is strong enough.
    #[must_use]
    pub fn compute<R: SentimentRow>(&self, table: &[R]) -> Vec<String> {
        if table.is_empty() {
            return vec![NO_DATA_INSIGHT.to_string()];
        }

        let mut insights = Vec::with_capacity(3);

        insights.push(match self.strongest_correlation(table) {
            Some((name, r)) => format!("Strongest correlation with sentiment: {name} (corr={r:.2})"),
            None => "Strongest correlation with sentiment: n/a (corr=NaN)".to_string(),
        });

        let (fear, greed) = self.fear_greed_means(table);
        insights.push(if fear > greed {
            format!("Traders more profitable during FEAR (Avg PnL {fear:.2}) vs GREED ({greed:.2})")
        } else {
            format!("Traders earn more during GREED (Avg PnL {greed:.2}) vs FEAR ({fear:.2})")
        });

        let risk = self.risk_sentiment_correlation(table);
        if risk.abs() > self.config.risk_correlation_threshold {
            insights.push(format!("Price risk leads sentiment (corr={risk:.2})"));
        }

        tracing::debug!(count = insights.len(), "computed insights");
        insights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, pnl: f64, volume: f64, risk: Option<f64>, score: f64, norm: f64) -> MergedRecord {
        MergedRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            total_pnl: pnl,
            total_volume: volume,
            price_risk: risk,
            sentiment_score: score,
            sentiment_norm: norm,
        }
    }

    fn three_days() -> Vec<MergedRecord> {
        vec![
            row(1, 10.0, 100.0, None, 30.0, 0.0),
            row(2, -5.0, 100.0, None, 60.0, 0.6),
            row(3, 20.0, 100.0, None, 80.0, 1.0),
        ]
    }

    #[test]
    fn empty_table_gives_sentinel() {
        let table: Vec<MergedRecord> = Vec::new();
        assert_eq!(InsightEngine::default().compute(&table), vec![NO_DATA_INSIGHT]);
    }

    #[test]
    fn three_day_scenario() {
        let insights = InsightEngine::default().compute(&three_days());

        assert_eq!(
            insights,
            vec![
                "Strongest correlation with sentiment: total_pnl (corr=0.29)",
                "Traders more profitable during FEAR (Avg PnL 10.00) vs GREED (7.50)",
            ]
        );
    }

    #[test]
    fn tied_correlation_keeps_first_scanned_column() {
        let table: Vec<MergedRecord> = [(1, 3.0, 0.0), (2, -1.0, 0.25), (3, 4.0, 0.5), (4, 9.0, 1.0)]
            .into_iter()
            .map(|(day, pnl, norm)| row(day, pnl, 2.0 * pnl, None, 100.0 * norm, norm))
            .collect();
        let engine = InsightEngine::default();

        let (name, r) = engine.strongest_correlation(&table).unwrap();
        assert_eq!(name, "total_pnl");
        assert!(r > 0.0);
        assert!(engine.compute(&table)[0].starts_with("Strongest correlation with sentiment: total_pnl"));
    }

    #[test]
    fn greed_message_when_greed_earns_more() {
        let table = vec![
            row(1, -10.0, 100.0, None, 20.0, 0.0),
            row(2, 15.0, 300.0, None, 70.0, 1.0),
        ];
        let insights = InsightEngine::default().compute(&table);

        assert_eq!(
            insights[1],
            "Traders earn more during GREED (Avg PnL 15.00) vs FEAR (-10.00)"
        );
    }

    #[test]
    fn empty_regime_surfaces_as_nan() {
        let table = vec![row(1, 5.0, 1.0, None, 70.0, 0.0), row(2, 6.0, 2.0, None, 90.0, 1.0)];
        let (fear, greed) = InsightEngine::default().fear_greed_means(&table);

        assert!(fear.is_nan());
        assert!((greed - 5.5).abs() < 1e-12);
        let insights = InsightEngine::default().compute(&table);
        assert!(insights[1].starts_with("Traders earn more during GREED"));
    }

    #[test]
    fn strong_price_risk_link_is_reported() {
        let table = vec![
            row(1, 1.0, 10.0, Some(1.0), 10.0, 0.0),
            row(2, 1.0, 10.0, Some(2.0), 50.0, 0.5),
            row(3, 1.0, 10.0, Some(3.1), 90.0, 1.0),
        ];
        let insights = InsightEngine::default().compute(&table);

        assert_eq!(insights.len(), 3);
        assert!(insights[0].starts_with("Strongest correlation with sentiment: price_risk"));
        assert_eq!(insights[2], "Price risk leads sentiment (corr=1.00)");
    }

    #[test]
    fn all_nan_correlations_have_placeholder() {
        let table = vec![row(1, 1.0, 1.0, None, 50.0, 0.0), row(2, 1.0, 1.0, None, 50.0, 0.0)];
        let insights = InsightEngine::default().compute(&table);

        assert_eq!(insights[0], "Strongest correlation with sentiment: n/a (corr=NaN)");
        assert_eq!(insights.len(), 2);
    }

    #[test]
    fn threshold_comes_from_config() {
        let engine = InsightEngine::new(InsightsConfig {
            fear_greed_threshold: 70.0,
            risk_correlation_threshold: 0.3,
        });
        let (fear, greed) = engine.fear_greed_means(&three_days());

        assert!((fear - 2.5).abs() < 1e-12);
        assert!((greed - 20.0).abs() < 1e-12);
    }
}
