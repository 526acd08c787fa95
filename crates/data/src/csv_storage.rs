use anyhow::{Context, Result};
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use trade_mood_core::ClusteredRecord;

pub const CLUSTERED_HEADER: [&str; 8] = [
    "date",
    "total_pnl",
    "total_volume",
    "price_risk",
    "sentiment_score",
    "sentiment_norm",
    "cluster",
    "cluster_label",
];

pub struct CsvStorage;

impl CsvStorage {
    /// Writes the clustered daily table to a CSV file.
    ///
    /// Format: date,total_pnl,total_volume,price_risk,sentiment_score,sentiment_norm,cluster,cluster_label
    ///
    /// # Errors
    /// Returns error if file cannot be created or writing fails
    pub fn write_clustered(path: impl AsRef<Path>, records: &[ClusteredRecord]) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
        Self::write_clustered_to(file, records)
    }

    /// Writes the clustered daily table to any writer, sorted by date.
    ///
    /// Missing `price_risk` is written as an empty cell.
    ///
    /// # Errors
    /// Returns error if writing fails
    pub fn write_clustered_to<W: Write>(writer: W, records: &[ClusteredRecord]) -> Result<()> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(CLUSTERED_HEADER)?;

        let mut sorted: Vec<&ClusteredRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.record.date);

        for row in sorted {
            let r = &row.record;
            writer.write_record(&[
                r.date.format("%Y-%m-%d").to_string(),
                r.total_pnl.to_string(),
                r.total_volume.to_string(),
                r.price_risk.map(|v| v.to_string()).unwrap_or_default(),
                r.sentiment_score.to_string(),
                r.sentiment_norm.to_string(),
                row.cluster.to_string(),
                row.cluster_label.clone(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }
}
