#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use crate::clustering::cluster_sizes;
use crate::pipeline::PipelineReport;

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────────\n";

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn format(report: &PipelineReport) -> String {
        let mut output = String::new();
        let summary = &report.summary;

        output.push('\n');
        output.push_str(HEAVY_RULE);
        output.push_str("               TRADER SENTIMENT ANALYSIS                       \n");
        output.push_str(HEAVY_RULE);
        output.push('\n');

        // Overview
        output.push_str("Overview\n");
        output.push_str(LIGHT_RULE);
        match (summary.start_date, summary.end_date) {
            (Some(start), Some(end)) => output.push_str(&format!(
                "Date Range:            {} to {}\n",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            )),
            _ => output.push_str("Date Range:            n/a\n"),
        }
        output.push_str(&format!("Days:                  {}\n", summary.days));
        output.push_str(&format!("Avg Daily PnL:         {:.2}\n", summary.avg_pnl));
        output.push_str(&format!("Avg Daily Volume:      {:.2}\n", summary.avg_volume));
        output.push_str(&format!(
            "Dominant Cluster:      {}\n",
            summary.dominant_cluster
        ));
        output.push_str(&format!(
            "Sentiment Gauge:       {:.1} / 100\n",
            summary.sentiment_gauge
        ));
        output.push('\n');

        // Trade sides
        output.push_str("Trade Sides\n");
        output.push_str(LIGHT_RULE);
        output.push_str(&format!("Buy:                   {}\n", report.sides.buy));
        output.push_str(&format!("Sell:                  {}\n", report.sides.sell));
        if report.sides.other > 0 {
            output.push_str(&format!("Other:                 {}\n", report.sides.other));
        }
        output.push_str(&format!("Total:                 {}\n", report.sides.total()));
        if let Some(ratio) = report.sides.buy_ratio() {
            output.push_str(&format!("Buy Ratio:             {:.1}%\n", ratio * 100.0));
        }
        output.push('\n');

        // Clusters
        output.push_str("Behavioral Clusters\n");
        output.push_str(LIGHT_RULE);
        output.push_str(&format!("Chosen k:              {}\n", report.chosen_k));
        for size in cluster_sizes(&report.table) {
            output.push_str(&format!(
                "  {:>2} {:<18} {} days\n",
                size.cluster, size.label, size.days
            ));
        }
        output.push('\n');

        // Regression
        output.push_str("PnL Regression\n");
        output.push_str(LIGHT_RULE);
        match &report.regression {
            Some(fit) => {
                output.push_str(&format!("MSE:                   {:.4}\n", fit.mse));
                output.push_str(&format!("R²:                    {:.4}\n", fit.r_squared));
                output.push('\n');
                output.push_str(&fit.summary());
                output.push('\n');
            }
            None => output.push_str("Not enough data for regression model.\n"),
        }
        output.push('\n');

        // Insights
        output.push_str("Insights\n");
        output.push_str(LIGHT_RULE);
        for insight in &report.insights {
            output.push_str(&format!("- {}\n", insight));
        }
        output.push_str(HEAVY_RULE);

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use trade_mood_core::AppConfig;

    #[test]
    fn empty_report_mentions_missing_regression() {
        let report = Pipeline::new(AppConfig::default()).run(&[], &[]).unwrap();
        let text = ReportFormatter::format(&report);

        assert!(text.contains("Not enough data for regression model."));
        assert!(text.contains("- No data available"));
        assert!(text.contains("Date Range:            n/a"));
        assert!(text.contains("Dominant Cluster:      N/A"));
        assert!(text.contains("Total:                 0"));
        assert!(!text.contains("Buy Ratio"));
    }

    #[test]
    fn report_lists_sides_and_cluster_sizes() {
        use chrono::NaiveDate;
        use rust_decimal::Decimal;
        use trade_mood_core::{SentimentRecord, TradeRecord};

        let trade = |hour: u32, side: &str| TradeRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            side: side.to_string(),
            closed_pnl: Some(Decimal::ONE.into()),
            size_usd: Some(Decimal::TEN.into()),
            execution_price: Some(f64::from(hour)),
        };
        let sentiment = SentimentRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            value: Some(40.0),
            classification: None,
        };
        let trades = vec![
            trade(9, "BUY"),
            trade(10, "BUY"),
            trade(11, "SELL"),
            trade(12, "BUY"),
        ];
        let report = Pipeline::new(AppConfig::default())
            .run(&trades, &[sentiment])
            .unwrap();
        let text = ReportFormatter::format(&report);

        assert!(text.contains("Total:                 4"));
        assert!(text.contains("Buy Ratio:             75.0%"));
        assert!(text.contains("   0 Single Cluster     1 days"));
    }
}
