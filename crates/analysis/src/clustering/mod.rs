//! Behavioral clustering of trader-days.
//!
//! Selected features are zero-filled, standardized, and partitioned with
//! k-means. The cluster count comes from the knee of the inertia curve over
//! `k = 1..=min(max_k, n_rows - 1)`.
//!
//! Cluster ids follow centroid order and are not stable in meaning: the
//! named labels ("Steady Eddy", "Risk Lover", ...) are positional, so
//! "Risk Lover" is not guaranteed to be the riskiest group.

mod elbow;
mod kmeans;
mod scaler;

pub use elbow::KneeLocator;
pub use kmeans::{KMeans, KMeansFit};
pub use scaler::StandardScaler;

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use trade_mood_core::{
    cluster_label, ClusteredRecord, ClusteringConfig, MergedRecord, SINGLE_CLUSTER_LABEL,
};

use crate::error::ClusteringError;

/// Inertia of the best fit for one candidate cluster count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElbowPoint {
    pub k: usize,
    pub inertia: f64,
}

/// Clustered table plus the model selection trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringResult {
    pub records: Vec<ClusteredRecord>,
    /// Candidate curve the knee was searched on; empty when fitting was skipped.
    pub elbow_curve: Vec<ElbowPoint>,
    pub chosen_k: usize,
    /// Inertia of the final fit.
    pub inertia: f64,
}

/// Row count of one cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSize {
    pub cluster: usize,
    pub label: String,
    pub days: usize,
}

/// Number of rows per cluster id, ordered by id.
#[must_use]
pub fn cluster_sizes(records: &[ClusteredRecord]) -> Vec<ClusterSize> {
    let mut sizes: BTreeMap<usize, ClusterSize> = BTreeMap::new();
    for row in records {
        sizes
            .entry(row.cluster)
            .or_insert_with(|| ClusterSize {
                cluster: row.cluster,
                label: row.cluster_label.clone(),
                days: 0,
            })
            .days += 1;
    }
    sizes.into_values().collect()
}

#[derive(Debug, Clone)]
pub struct ClusterEngine {
    config: ClusteringConfig,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self {
            config: ClusteringConfig::default(),
        }
    }
}

impl ClusterEngine {
    /// # Errors
    /// Returns [`ClusteringError::UnknownFeature`] for a feature name that is
    /// not a merged-table column.
    pub fn new(config: ClusteringConfig) -> Result<Self, ClusteringError> {
        if let Some(name) = config
            .features
            .iter()
            .find(|name| !MergedRecord::FEATURE_NAMES.contains(&name.as_str()))
        {
            tracing::warn!(
                feature = %name,
                known = ?MergedRecord::FEATURE_NAMES,
                "unknown clustering feature"
            );
            return Err(ClusteringError::UnknownFeature(name.clone()));
        }
        Ok(Self { config })
    }

    fn kmeans(&self, k: usize) -> KMeans {
        KMeans::new(k, self.config.seed)
            .with_n_init(self.config.n_init)
            .with_max_iter(self.config.max_iter)
            .with_tolerance(self.config.tolerance)
    }

    /// Configured features per row, with missing or non-finite values as 0.
    #[must_use]
    pub fn feature_matrix(&self, table: &[MergedRecord]) -> Vec<Vec<f64>> {
        table
            .iter()
            .map(|row| {
                self.config
                    .features
                    .iter()
                    .map(|name| row.feature(name).filter(|v| v.is_finite()).unwrap_or(0.0))
                    .collect()
            })
            .collect()
    }

    /// Best-of-`n_init` inertia for every candidate cluster count.
    ///
    /// Each candidate reseeds from the configured seed, so evaluating them in
    /// parallel gives the same curve as evaluating them in order.
    #[must_use]
    pub fn elbow_curve(&self, scaled: &[Vec<f64>]) -> Vec<ElbowPoint> {
        let upper = self.config.max_k.min(scaled.len().saturating_sub(1));
        (1..=upper)
            .into_par_iter()
            .map(|k| ElbowPoint {
                k,
                inertia: self.kmeans(k).fit(scaled).inertia,
            })
            .collect()
    }

    /// Cluster count at the knee of the curve, or the configured fallback.
    #[must_use]
    pub fn optimal_k(&self, curve: &[ElbowPoint]) -> usize {
        let ks: Vec<f64> = curve.iter().map(|p| p.k as f64).collect();
        let inertias: Vec<f64> = curve.iter().map(|p| p.inertia).collect();

        match KneeLocator::default().find(&ks, &inertias) {
            Some(k) => k as usize,
            None => {
                tracing::debug!(
                    fallback = self.config.fallback_k,
                    "no knee in inertia curve"
                );
                self.config.fallback_k
            }
        }
    }

    /// Assigns every row a cluster id and label.
    ///
    /// Fewer than two rows skip fitting: every row is cluster 0, labeled
    /// "Single Cluster".
    #[must_use]
    pub fn cluster(&self, table: &[MergedRecord]) -> ClusteringResult {
        let n_rows = table.len();
        if n_rows < 2 {
            return ClusteringResult {
                records: table
                    .iter()
                    .map(|record| ClusteredRecord {
                        record: record.clone(),
                        cluster: 0,
                        cluster_label: SINGLE_CLUSTER_LABEL.to_string(),
                    })
                    .collect(),
                elbow_curve: Vec::new(),
                chosen_k: n_rows,
                inertia: 0.0,
            };
        }

        let scaled = StandardScaler::fit_transform(&self.feature_matrix(table));
        let elbow_curve = self.elbow_curve(&scaled);
        let chosen_k = self.optimal_k(&elbow_curve).clamp(1, n_rows);
        let fit = self.kmeans(chosen_k).fit(&scaled);

        tracing::debug!(
            rows = n_rows,
            curve = ?elbow_curve,
            chosen_k,
            inertia = fit.inertia,
            "clustered trader-days"
        );

        let records = table
            .iter()
            .zip(fit.labels.iter())
            .map(|(record, &cluster)| ClusteredRecord {
                record: record.clone(),
                cluster,
                cluster_label: cluster_label(cluster),
            })
            .collect();

        ClusteringResult {
            records,
            elbow_curve,
            chosen_k,
            inertia: fit.inertia,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(day: u32, pnl: f64, volume: f64, price_risk: Option<f64>) -> MergedRecord {
        MergedRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            total_pnl: pnl,
            total_volume: volume,
            price_risk,
            sentiment_score: 50.0,
            sentiment_norm: 0.5,
        }
    }

    /// Three tight groups that sit equally far apart once standardized.
    fn three_groups() -> Vec<MergedRecord> {
        vec![
            row(1, -100.0, 2000.0, Some(5.0)),
            row(2, -102.0, 2010.0, Some(5.0)),
            row(3, -98.0, 1990.0, Some(5.0)),
            row(4, 100.0, 2000.0, Some(5.0)),
            row(5, 102.0, 1990.0, Some(5.0)),
            row(6, 98.0, 2010.0, Some(5.0)),
            row(7, 0.0, 5000.0, Some(5.0)),
            row(8, 2.0, 5010.0, Some(5.0)),
            row(9, -2.0, 4990.0, Some(5.0)),
        ]
    }

    #[test]
    fn single_row_skips_fitting() {
        let result = ClusterEngine::default().cluster(&[row(1, 1.0, 1.0, None)]);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].cluster, 0);
        assert_eq!(result.records[0].cluster_label, SINGLE_CLUSTER_LABEL);
        assert!(result.elbow_curve.is_empty());
    }

    #[test]
    fn empty_table_gives_empty_result() {
        let result = ClusterEngine::default().cluster(&[]);
        assert!(result.records.is_empty());
    }

    #[test]
    fn missing_price_risk_is_zero_filled() {
        let engine = ClusterEngine::default();
        let matrix = engine.feature_matrix(&[row(1, 3.0, 4.0, None), row(2, 1.0, 2.0, Some(f64::NAN))]);

        assert_eq!(matrix, vec![vec![3.0, 4.0, 0.0], vec![1.0, 2.0, 0.0]]);
    }

    #[test]
    fn single_trade_days_do_not_crash() {
        let table = vec![
            row(1, 10.0, 100.0, None),
            row(2, 12.0, 90.0, None),
            row(3, -4.0, 300.0, Some(2.0)),
        ];
        let result = ClusterEngine::default().cluster(&table);

        assert_eq!(result.records.len(), 3);
    }

    #[test]
    fn elbow_curve_stays_below_row_count() {
        let engine = ClusterEngine::default();
        let table = &three_groups()[..4];
        let scaled = StandardScaler::fit_transform(&engine.feature_matrix(table));
        let curve = engine.elbow_curve(&scaled);

        let ks: Vec<usize> = curve.iter().map(|p| p.k).collect();
        assert_eq!(ks, vec![1, 2, 3]);
    }

    #[test]
    fn elbow_curve_is_capped_at_max_k() {
        let engine = ClusterEngine::default();
        let table = three_groups();
        let scaled = StandardScaler::fit_transform(&engine.feature_matrix(&table));
        let curve = engine.elbow_curve(&scaled);

        assert_eq!(curve.len(), 6);
        assert!(curve[2].inertia < curve[1].inertia);
        assert!(curve[1].inertia < curve[0].inertia);
    }

    #[test]
    fn two_rows_fall_back_and_clamp_to_row_count() {
        let table = vec![row(1, 1.0, 1.0, Some(1.0)), row(2, 5.0, 9.0, Some(3.0))];
        let result = ClusterEngine::default().cluster(&table);

        assert_eq!(result.elbow_curve.len(), 1);
        assert_eq!(result.chosen_k, 2);
        assert_ne!(result.records[0].cluster, result.records[1].cluster);
    }

    #[test]
    fn three_clear_groups_are_recovered() {
        let result = ClusterEngine::default().cluster(&three_groups());

        assert_eq!(result.chosen_k, 3);
        let ids: Vec<usize> = result.records.iter().map(|r| r.cluster).collect();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[1], ids[2]);
        assert_eq!(ids[3], ids[4]);
        assert_eq!(ids[6], ids[8]);
        assert_ne!(ids[0], ids[3]);
        assert_ne!(ids[3], ids[6]);
        assert_ne!(ids[0], ids[6]);
    }

    #[test]
    fn labels_follow_the_fixed_table() {
        let result = ClusterEngine::default().cluster(&three_groups());

        for row in &result.records {
            assert_eq!(row.cluster_label, cluster_label(row.cluster));
        }
    }

    #[test]
    fn clustering_is_deterministic() {
        let engine = ClusterEngine::default();
        assert_eq!(engine.cluster(&three_groups()), engine.cluster(&three_groups()));
    }

    #[test]
    fn cluster_sizes_count_rows() {
        let result = ClusterEngine::default().cluster(&three_groups());
        let sizes = cluster_sizes(&result.records);

        assert_eq!(sizes.len(), 3);
        assert!(sizes.iter().all(|s| s.days == 3));
        assert!(sizes.windows(2).all(|w| w[0].cluster < w[1].cluster));
        assert!(sizes.iter().all(|s| s.label == cluster_label(s.cluster)));
    }

    #[test]
    fn unknown_feature_is_rejected() {
        let config = ClusteringConfig {
            features: vec!["total_pnl".to_string(), "pnl_total".to_string()],
            ..ClusteringConfig::default()
        };
        let err = ClusterEngine::new(config).unwrap_err();

        assert!(matches!(err, ClusteringError::UnknownFeature(ref name) if name == "pnl_total"));
    }

    #[test]
    fn known_features_are_accepted() {
        let config = ClusteringConfig {
            features: vec!["sentiment_norm".to_string(), "price_risk".to_string()],
            ..ClusteringConfig::default()
        };
        let matrix = ClusterEngine::new(config)
            .unwrap()
            .feature_matrix(&[row(1, 3.0, 4.0, Some(2.0))]);

        assert_eq!(matrix, vec![vec![0.5, 2.0]]);
    }
}
