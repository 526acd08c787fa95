//! Column-wise z-score standardization.

use crate::stats::{mean, population_std};

/// Per-column mean and (population) standard deviation learned from a matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Learns column statistics from row-major data.
    ///
    /// Zero-variance columns get a scale of 1 so they transform to all zeros.
    #[must_use]
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let n_features = rows.first().map_or(0, Vec::len);
        let mut means = Vec::with_capacity(n_features);
        let mut scales = Vec::with_capacity(n_features);

        for j in 0..n_features {
            let column: Vec<f64> = rows.iter().map(|row| row[j]).collect();
            let std = population_std(&column);
            means.push(mean(&column));
            scales.push(if std > 0.0 && std.is_finite() { std } else { 1.0 });
        }

        Self { means, scales }
    }

    #[must_use]
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(self.scales.iter()))
                    .map(|(v, (m, s))| (v - m) / s)
                    .collect()
            })
            .collect()
    }

    #[must_use]
    pub fn fit_transform(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        Self::fit(rows).transform(rows)
    }
}
