//! Ordinary least squares of daily PnL on sentiment, lagged sentiment,
//! volume and price risk.
//!
//! The fit is explanatory: MSE and R² are in-sample over the same rows the
//! coefficients were estimated on.

#![allow(clippy::format_push_string)]

use chrono::NaiveDate;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use trade_mood_core::{MergedRecord, SentimentRow};

use crate::error::{RegressionError, Result};
use crate::stats::mean;

/// Model terms in design-matrix column order.
pub const TERM_NAMES: [&str; 5] = [
    "const",
    "sentiment_norm",
    "sentiment_lag1",
    "total_volume",
    "price_risk",
];

/// Estimate and significance of one model term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    /// `NaN` when the model has no residual degrees of freedom.
    pub std_error: f64,
    pub t_value: f64,
    /// Two-sided p value from Student's t.
    pub p_value: f64,
}

/// One retained observation with its fitted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionRow {
    pub date: NaiveDate,
    pub sentiment_norm: f64,
    pub sentiment_lag1: f64,
    pub total_volume: f64,
    pub price_risk: f64,
    pub actual_pnl: f64,
    pub predicted_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// One entry per term of [`TERM_NAMES`], intercept first.
    pub coefficients: Vec<Coefficient>,
    /// Retained rows in date order.
    pub rows: Vec<RegressionRow>,
    pub n_obs: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub mse: f64,
    pub r_squared: f64,
    pub adj_r_squared: f64,
}

impl RegressionResult {
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.coefficients.first().map_or(f64::NAN, |c| c.estimate)
    }

    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Fitted PnL for every retained row, in date order.
    #[must_use]
    pub fn predicted_pnl(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted_pnl).collect()
    }

    /// Fixed-width text table of the fit.
    #[must_use]
    pub fn summary(&self) -> String {
        let rule = "=".repeat(64);
        let thin = "-".repeat(64);
        let mut out = String::new();

        out.push_str("OLS Regression Results\n");
        out.push_str(&format!("{rule}\n"));
        out.push_str(&format!(
            "{:<16}{:>14}    {:<16}{:>14.4}\n",
            "Dep. Variable:", "total_pnl", "R-squared:", self.r_squared
        ));
        out.push_str(&format!(
            "{:<16}{:>14}    {:<16}{:>14.4}\n",
            "No. Obs.:", self.n_obs, "Adj. R-squared:", self.adj_r_squared
        ));
        out.push_str(&format!(
            "{:<16}{:>14}    {:<16}{:>14.4}\n",
            "Df Residuals:", self.df_resid, "MSE:", self.mse
        ));
        out.push_str(&format!("{:<16}{:>14}\n", "Df Model:", self.df_model));
        out.push_str(&format!("{thin}\n"));
        out.push_str(&format!(
            "{:<16}{:>12}{:>12}{:>12}{:>12}\n",
            "", "coef", "std err", "t", "P>|t|"
        ));
        out.push_str(&format!("{thin}\n"));
        for c in &self.coefficients {
            out.push_str(&format!(
                "{:<16}{:>12.4}{:>12.4}{:>12.3}{:>12.3}\n",
                c.name, c.estimate, c.std_error, c.t_value, c.p_value
            ));
        }
        out.push_str(&rule);
        out
    }
}

/// Coefficient of determination, with the constant-target convention:
/// a perfect fit scores 1 and anything else 0.
#[must_use]
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> f64 {
    let m = mean(actual);
    let ss_res: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - m).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean squared error; `NaN` for empty input.
#[must_use]
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let squared: Vec<f64> = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .collect();
    mean(&squared)
}

fn is_present(v: f64) -> bool {
    v.is_finite()
}

pub struct RegressionModel;

impl RegressionModel {
    /// Orders rows by date, attaches the previous row's `sentiment_norm` as
    /// the lag, and keeps rows where every model column is present.
    ///
    /// The lag is taken before filtering, so a dropped row still lends its
    /// sentiment to the day after it. Fitted values are left at 0.
    #[must_use]
    pub fn usable_rows<R: SentimentRow>(table: &[R]) -> Vec<RegressionRow> {
        let mut ordered: Vec<&MergedRecord> = table.iter().map(SentimentRow::merged).collect();
        ordered.sort_by_key(|r| r.date);

        ordered
            .iter()
            .enumerate()
            .filter_map(|(i, row)| {
                let lag = ordered.get(i.checked_sub(1)?)?.sentiment_norm;
                let price_risk = row.price_risk?;
                let values = [
                    row.total_pnl,
                    row.sentiment_norm,
                    lag,
                    row.total_volume,
                    price_risk,
                ];
                if !values.iter().all(|v| is_present(*v)) {
                    return None;
                }
                Some(RegressionRow {
                    date: row.date,
                    sentiment_norm: row.sentiment_norm,
                    sentiment_lag1: lag,
                    total_volume: row.total_volume,
                    price_risk,
                    actual_pnl: row.total_pnl,
                    predicted_pnl: 0.0,
                })
            })
            .collect()
    }

    /// Fits the model, or returns `Ok(None)` when fewer than two usable rows
    /// remain.
    ///
    /// Rank-deficient designs get the minimum-norm solution.
    ///
    /// # Errors
    /// Returns [`RegressionError::Numerical`] if the least-squares solve
    /// breaks down (non-finite singular values).
    pub fn fit<R: SentimentRow>(table: &[R]) -> Result<Option<RegressionResult>> {
        let mut rows = Self::usable_rows(table);
        let n = rows.len();
        if n < 2 {
            tracing::debug!(usable_rows = n, "not enough rows for regression");
            return Ok(None);
        }

        let p = TERM_NAMES.len();
        let x = DMatrix::from_fn(n, p, |i, j| {
            let r = &rows[i];
            match j {
                0 => 1.0,
                1 => r.sentiment_norm,
                2 => r.sentiment_lag1,
                3 => r.total_volume,
                _ => r.price_risk,
            }
        });
        let y = DVector::from_iterator(n, rows.iter().map(|r| r.actual_pnl));

        let svd = x.clone().svd(true, true);
        let max_singular = svd.singular_values.max();
        if !max_singular.is_finite() {
            return Err(RegressionError::Numerical(
                "design matrix has non-finite singular values".to_string(),
            ));
        }
        let eps = max_singular * n.max(p) as f64 * f64::EPSILON;
        let rank = svd.rank(eps);
        if rank < p {
            tracing::warn!(rank, terms = p, "rank-deficient regression design, using minimum-norm fit");
        }
        let pinv = svd
            .pseudo_inverse(eps)
            .map_err(|e| RegressionError::Numerical(e.to_string()))?;

        let beta = &pinv * &y;
        let fitted = &x * &beta;
        for (row, value) in rows.iter_mut().zip(fitted.iter()) {
            row.predicted_pnl = *value;
        }

        let actual: Vec<f64> = y.iter().copied().collect();
        let predicted: Vec<f64> = fitted.iter().copied().collect();
        let ssr: f64 = actual
            .iter()
            .zip(predicted.iter())
            .map(|(a, f)| (a - f).powi(2))
            .sum();

        let df_resid = n.saturating_sub(rank);
        let df_model = rank.saturating_sub(1);
        let sigma2 = if df_resid > 0 {
            ssr / df_resid as f64
        } else {
            f64::NAN
        };
        // (XᵀX)⁺ = X⁺ (X⁺)ᵀ
        let cov_unscaled = &pinv * pinv.transpose();
        let t_dist = if df_resid > 0 {
            StudentsT::new(0.0, 1.0, df_resid as f64).ok()
        } else {
            None
        };

        let coefficients = TERM_NAMES
            .iter()
            .enumerate()
            .map(|(j, name)| {
                let estimate = beta[j];
                let std_error = (sigma2 * cov_unscaled[(j, j)]).sqrt();
                let t_value = estimate / std_error;
                let p_value = match &t_dist {
                    Some(dist) if t_value.is_finite() => 2.0 * (1.0 - dist.cdf(t_value.abs())),
                    Some(_) if t_value.is_infinite() => 0.0,
                    _ => f64::NAN,
                };
                Coefficient {
                    name: (*name).to_string(),
                    estimate,
                    std_error,
                    t_value,
                    p_value,
                }
            })
            .collect();

        let r2 = r_squared(&actual, &predicted);
        let adj_r_squared = if df_resid > 0 {
            1.0 - (1.0 - r2) * (n - 1) as f64 / df_resid as f64
        } else {
            f64::NAN
        };
        let mse = mean_squared_error(&actual, &predicted);

        tracing::debug!(n_obs = n, rank, mse, r_squared = r2, "fitted sentiment regression");

        Ok(Some(RegressionResult {
            coefficients,
            rows,
            n_obs: n,
            df_model,
            df_resid,
            mse,
            r_squared: r2,
            adj_r_squared,
        }))
    }
}
