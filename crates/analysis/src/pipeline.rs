//! End-to-end run: aggregate, cluster, regress, summarize.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use trade_mood_core::{AppConfig, ClusteredRecord, SentimentRecord, TradeRecord};
use trade_mood_data::DataLoader;

use crate::clustering::{ClusterEngine, ElbowPoint};
use crate::insights::InsightEngine;
use crate::processor::DataProcessor;
use crate::regression::{RegressionModel, RegressionResult};
use crate::summary::{DashboardSummary, SideDistribution};

/// Everything one run produces. Each run owns its tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Merged daily table with cluster assignments, in date order.
    pub table: Vec<ClusteredRecord>,
    pub elbow_curve: Vec<ElbowPoint>,
    pub chosen_k: usize,
    /// `None` when too few complete days remain after lagging.
    pub regression: Option<RegressionResult>,
    pub insights: Vec<String>,
    pub summary: DashboardSummary,
    pub sides: SideDistribution,
}

pub struct Pipeline {
    config: AppConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Runs every stage over already-cleaned tables.
    ///
    /// # Errors
    /// Returns an error if the clustering features name an unknown column or
    /// the regression solve fails numerically.
    pub fn run(&self, trades: &[TradeRecord], sentiment: &[SentimentRecord]) -> Result<PipelineReport> {
        let merged = DataProcessor::prepare(trades, sentiment);
        tracing::info!(
            trades = trades.len(),
            sentiment_rows = sentiment.len(),
            days = merged.len(),
            "merged trades with sentiment"
        );

        let clustering = ClusterEngine::new(self.config.clustering.clone())
            .context("Invalid clustering configuration")?
            .cluster(&merged);
        tracing::info!(
            chosen_k = clustering.chosen_k,
            inertia = clustering.inertia,
            "clustered trader-days"
        );

        let regression =
            RegressionModel::fit(&clustering.records).context("Failed to fit sentiment regression")?;
        match &regression {
            Some(fit) => tracing::info!(
                n_obs = fit.n_obs,
                r_squared = fit.r_squared,
                mse = fit.mse,
                "fitted regression"
            ),
            None => tracing::warn!("not enough data for regression model"),
        }

        let insights = InsightEngine::new(self.config.insights.clone()).compute(&clustering.records);
        let summary = DashboardSummary::from_table(&clustering.records);
        let sides = SideDistribution::from_trades(trades);

        Ok(PipelineReport {
            table: clustering.records,
            elbow_curve: clustering.elbow_curve,
            chosen_k: clustering.chosen_k,
            regression,
            insights,
            summary,
            sides,
        })
    }

    /// Loads both CSV sources and runs the pipeline over them.
    ///
    /// # Errors
    /// Returns an error if either source is unreadable or lacks a required
    /// column, or if the regression solve fails.
    pub fn run_paths(
        &self,
        trades_path: impl AsRef<Path>,
        sentiment_path: impl AsRef<Path>,
    ) -> Result<PipelineReport> {
        let (trades, sentiment) = DataLoader::load_paths(trades_path.as_ref(), sentiment_path.as_ref())
            .with_context(|| {
                format!(
                    "Failed to load {} and {}",
                    trades_path.as_ref().display(),
                    sentiment_path.as_ref().display()
                )
            })?;
        self.run(&trades, &sentiment)
    }

    /// Runs over the source paths named in the configuration.
    ///
    /// # Errors
    /// See [`Pipeline::run_paths`].
    pub fn run_configured(&self) -> Result<PipelineReport> {
        let sources = &self.config.sources;
        self.run_paths(&sources.trades_path, &sources.sentiment_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use trade_mood_data::InputError;

    use crate::error::ClusteringError;

    fn trade(day: u32, hour: u32, pnl: i64, side: &str, price: f64) -> TradeRecord {
        TradeRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            side: side.to_string(),
            closed_pnl: Some(Decimal::from(pnl).into()),
            size_usd: Some(Decimal::from(100).into()),
            execution_price: Some(price),
        }
    }

    fn sentiment(day: u32, value: f64) -> SentimentRecord {
        SentimentRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            value: Some(value),
            classification: None,
        }
    }

    #[test]
    fn three_day_scenario_runs_end_to_end() {
        let trades = vec![
            trade(1, 9, 10, "BUY", 1.0),
            trade(2, 9, -5, "SELL", 1.0),
            trade(3, 9, 20, "BUY", 1.0),
        ];
        let sentiment = vec![sentiment(1, 30.0), sentiment(2, 60.0), sentiment(3, 80.0)];
        let report = Pipeline::new(AppConfig::default()).run(&trades, &sentiment).unwrap();

        assert_eq!(report.table.len(), 3);
        assert!(report.regression.is_none());
        assert_eq!(report.insights.len(), 2);
        assert_eq!(report.sides, SideDistribution { buy: 2, sell: 1, other: 0 });
        assert!((report.summary.sentiment_gauge - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs_still_produce_a_report() {
        let report = Pipeline::new(AppConfig::default()).run(&[], &[]).unwrap();

        assert!(report.table.is_empty());
        assert!(report.regression.is_none());
        assert_eq!(report.insights, vec!["No data available"]);
        assert_eq!(report.summary.dominant_cluster, "N/A");
    }

    #[test]
    fn report_serializes_flat_rows() {
        let trades = vec![trade(1, 9, 10, "BUY", 1.0), trade(1, 15, 2, "BUY", 3.0)];
        let report = Pipeline::new(AppConfig::default())
            .run(&trades, &[sentiment(1, 40.0)])
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();

        let row = &json["table"][0];
        assert_eq!(row["total_pnl"], 12.0);
        assert_eq!(row["cluster_label"], "Single Cluster");
        assert!(json["regression"].is_null());
    }

    #[test]
    fn unknown_clustering_feature_fails_the_run() {
        let mut config = AppConfig::default();
        config.clustering.features.push("leverage".to_string());
        let err = Pipeline::new(config).run(&[], &[]).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClusteringError>(),
            Some(ClusteringError::UnknownFeature(name)) if name == "leverage"
        ));
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = Pipeline::new(AppConfig::default())
            .run_paths("/nonexistent/trades.csv", "/nonexistent/sentiment.csv")
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<InputError>(),
            Some(InputError::Io { .. })
        ));
    }
}
