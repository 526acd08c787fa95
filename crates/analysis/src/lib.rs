//! Analysis stages for trader sentiment data.
//!
//! - `processor`: daily aggregation and the sentiment join
//! - `clustering`: standardized k-means with elbow selection
//! - `regression`: OLS of daily PnL on sentiment and activity
//! - `insights`: correlation and fear/greed observations
//! - `pipeline`: all of the above in one run

pub mod clustering;
pub mod error;
pub mod insights;
pub mod pipeline;
pub mod processor;
pub mod regression;
pub mod report_formatter;
pub mod stats;
pub mod summary;

pub use clustering::{cluster_sizes, ClusterEngine, ClusterSize, ClusteringResult, ElbowPoint};
pub use error::{ClusteringError, RegressionError};
pub use insights::{InsightEngine, NO_DATA_INSIGHT};
pub use pipeline::{Pipeline, PipelineReport};
pub use processor::DataProcessor;
pub use regression::{Coefficient, RegressionModel, RegressionResult, RegressionRow};
pub use report_formatter::ReportFormatter;
pub use summary::{DashboardSummary, SideDistribution};
