pub mod config;
pub mod config_loader;
pub mod models;

pub use config::{AppConfig, ClusteringConfig, InsightsConfig, SourcesConfig};
pub use config_loader::ConfigLoader;
pub use models::{
    cluster_label, Amount, ClusteredRecord, DailyAggregate, MergedRecord, SentimentRecord,
    SentimentRow, TradeRecord, SINGLE_CLUSTER_LABEL,
};
