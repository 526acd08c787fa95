//! Knee detection on a convex, decreasing curve (the Kneedle algorithm).
//!
//! Used to pick the cluster count where extra clusters stop buying much
//! reduction in inertia.

/// Kneedle over `(x, y)` points sorted by ascending `x`, for a convex
/// decreasing curve.
#[derive(Debug, Clone)]
pub struct KneeLocator {
    sensitivity: f64,
}

impl Default for KneeLocator {
    fn default() -> Self {
        Self { sensitivity: 1.0 }
    }
}

/// Rescales to `[0, 1]`; `None` when the values do not span a range.
fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !(range > 0.0 && range.is_finite()) {
        return None;
    }
    Some(values.iter().map(|v| (v - min) / range).collect())
}

/// Indices that compare true against both neighbors; the edges compare
/// against themselves on the missing side.
fn relative_extrema(values: &[f64], cmp: impl Fn(f64, f64) -> bool) -> Vec<usize> {
    let last = values.len().saturating_sub(1);
    (0..values.len())
        .filter(|&i| {
            let prev = values[i.saturating_sub(1)];
            let next = values[(i + 1).min(last)];
            cmp(values[i], prev) && cmp(values[i], next)
        })
        .collect()
}

impl KneeLocator {
    /// Returns the `x` of the knee, or `None` when the curve has none.
    #[must_use]
    pub fn find(&self, x: &[f64], y: &[f64]) -> Option<f64> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }

        let x_norm = normalize(x)?;
        // flip so the decreasing convex curve becomes increasing concave
        let y_norm: Vec<f64> = normalize(y)?.into_iter().map(|v| 1.0 - v).collect();
        let difference: Vec<f64> = y_norm
            .iter()
            .zip(x_norm.iter())
            .map(|(yv, xv)| yv - xv)
            .collect();

        let maxima = relative_extrema(&difference, |a, b| a >= b);
        let minima = relative_extrema(&difference, |a, b| a <= b);
        let first_maximum = *maxima.first()?;

        let step = x_norm.windows(2).map(|w| (w[1] - w[0]).abs()).sum::<f64>()
            / (x_norm.len() - 1) as f64;
        let thresholds: Vec<f64> = maxima
            .iter()
            .map(|&i| difference[i] - self.sensitivity * step)
            .collect();

        let mut threshold = 0.0;
        let mut threshold_index = first_maximum;
        let mut maxima_seen = 0;

        for i in first_maximum..x_norm.len() {
            let next = i + 1;
            if x_norm[i] >= 1.0 || next >= difference.len() {
                break;
            }
            if maxima.contains(&i) {
                threshold = thresholds[maxima_seen];
                threshold_index = i;
                maxima_seen += 1;
            }
            if minima.contains(&i) {
                threshold = 0.0;
            }
            if difference[next] < threshold {
                return Some(x[threshold_index]);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ks(n: usize) -> Vec<f64> {
        (1..=n).map(|k| k as f64).collect()
    }

    #[test]
    fn finds_knee_of_typical_inertia_curve() {
        let inertia = [100.0, 40.0, 15.0, 10.0, 8.0, 7.0];
        assert_eq!(KneeLocator::default().find(&ks(6), &inertia), Some(3.0));
    }

    #[test]
    fn sharp_drop_knee_at_two() {
        let inertia = [90.0, 10.0, 8.0, 7.0, 6.5];
        assert_eq!(KneeLocator::default().find(&ks(5), &inertia), Some(2.0));
    }

    #[test]
    fn straight_line_has_no_knee() {
        let inertia = [6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        assert_eq!(KneeLocator::default().find(&ks(6), &inertia), None);
    }

    #[test]
    fn flat_curve_has_no_knee() {
        assert_eq!(KneeLocator::default().find(&ks(3), &[5.0, 5.0, 5.0]), None);
    }

    #[test]
    fn too_few_points_have_no_knee() {
        assert_eq!(KneeLocator::default().find(&ks(1), &[5.0]), None);
        assert_eq!(KneeLocator::default().find(&ks(2), &[5.0, 1.0]), None);
        assert_eq!(KneeLocator::default().find(&[], &[]), None);
    }

    #[test]
    fn relative_extrema_include_edges() {
        let maxima = relative_extrema(&[1.0, 0.0, 2.0], |a, b| a >= b);
        assert_eq!(maxima, vec![0, 2]);
    }
}
