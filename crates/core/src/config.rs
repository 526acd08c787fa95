use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sources: SourcesConfig,
    pub clustering: ClusteringConfig,
    pub insights: InsightsConfig,
}

/// Locations of the two raw CSV inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub trades_path: String,
    pub sentiment_path: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            trades_path: "csv_files/historical_data.csv".to_string(),
            sentiment_path: "csv_files/fear_greed_index.csv".to_string(),
        }
    }
}

/// Parameters of the k-means search over trader-days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Seed for every k-means fit. Each candidate k reseeds from this value.
    pub seed: u64,
    /// Number of k-means++ restarts per fit; the lowest inertia wins.
    pub n_init: usize,
    /// Upper bound of the elbow search (inclusive), further capped by `n_rows - 1`.
    pub max_k: usize,
    /// Cluster count used when the elbow curve has no knee.
    pub fallback_k: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub features: Vec<String>,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_init: 10,
            max_k: 6,
            fallback_k: 3,
            max_iter: 300,
            tolerance: 1e-4,
            features: vec![
                "total_pnl".to_string(),
                "total_volume".to_string(),
                "price_risk".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Raw sentiment score splitting fear (below) from greed (at or above).
    pub fear_greed_threshold: f64,
    /// Minimum |corr(price_risk, sentiment_norm)| reported as an insight.
    pub risk_correlation_threshold: f64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            fear_greed_threshold: 50.0,
            risk_correlation_threshold: 0.3,
        }
    }
}
