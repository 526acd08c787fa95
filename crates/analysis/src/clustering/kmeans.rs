//! Seeded k-means with k-means++ initialization and Lloyd iterations.
//!
//! Every fit owns its own `ChaCha8Rng`, so two fits with the same seed and
//! data agree exactly regardless of what else ran before them.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Parameters of a single k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    n_clusters: usize,
    n_init: usize,
    max_iter: usize,
    tolerance: f64,
    seed: u64,
}

/// A fitted partition.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f64>>,
    /// Index of the nearest centroid for each input row.
    pub labels: Vec<usize>,
    /// Sum of squared distances of rows to their centroid.
    pub inertia: f64,
    pub n_iter: usize,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Index and squared distance of the closest centroid; ties go to the lower index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, cur| {
            if cur.1 < best.1 {
                cur
            } else {
                best
            }
        })
}

/// Mean of per-feature variances, used to make the tolerance scale-free.
fn mean_variance(data: &[Vec<f64>]) -> f64 {
    let n_features = data.first().map_or(0, Vec::len);
    if n_features == 0 {
        return 0.0;
    }
    let n = data.len() as f64;
    let total: f64 = (0..n_features)
        .map(|j| {
            let m = data.iter().map(|row| row[j]).sum::<f64>() / n;
            data.iter().map(|row| (row[j] - m).powi(2)).sum::<f64>() / n
        })
        .sum();
    total / n_features as f64
}

impl KMeans {
    #[must_use]
    pub fn new(n_clusters: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed,
        }
    }

    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fits `n_init` restarts and keeps the one with the lowest inertia.
    ///
    /// The cluster count is clamped to `1..=data.len()`. Empty input yields an
    /// empty fit with zero inertia.
    #[must_use]
    pub fn fit(&self, data: &[Vec<f64>]) -> KMeansFit {
        if data.is_empty() {
            return KMeansFit {
                centroids: Vec::new(),
                labels: Vec::new(),
                inertia: 0.0,
                n_iter: 0,
            };
        }

        let k = self.n_clusters.clamp(1, data.len());
        let tol = self.tolerance * mean_variance(data);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.n_init {
            let init = Self::init_plus_plus(data, k, &mut rng);
            let fit = self.lloyd(data, init, tol);
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        best.unwrap_or_else(|| self.lloyd(data, Self::init_plus_plus(data, k, &mut rng), tol))
    }

    /// k-means++ seeding: each new center is drawn with probability
    /// proportional to its squared distance from the centers chosen so far.
    fn init_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
        let mut centroids = Vec::with_capacity(k);
        centroids.push(data[rng.gen_range(0..data.len())].clone());

        while centroids.len() < k {
            let weights: Vec<f64> = data.iter().map(|p| nearest(p, &centroids).1).collect();
            let total: f64 = weights.iter().sum();

            let idx = if total > 0.0 && total.is_finite() {
                let target = rng.gen::<f64>() * total;
                let mut acc = 0.0;
                weights
                    .iter()
                    .position(|w| {
                        acc += w;
                        acc > target
                    })
                    .unwrap_or(data.len() - 1)
            } else {
                // every point already sits on a center
                rng.gen_range(0..data.len())
            };
            centroids.push(data[idx].clone());
        }

        centroids
    }

    fn lloyd(&self, data: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, tol: f64) -> KMeansFit {
        let k = centroids.len();
        let n_features = data[0].len();
        let mut labels = vec![0; data.len()];
        let mut n_iter = 0;

        for iteration in 1..=self.max_iter {
            n_iter = iteration;
            for (label, point) in labels.iter_mut().zip(data.iter()) {
                *label = nearest(point, &centroids).0;
            }

            let mut sums = vec![vec![0.0; n_features]; k];
            let mut counts = vec![0usize; k];
            for (label, point) in labels.iter().zip(data.iter()) {
                counts[*label] += 1;
                for (s, v) in sums[*label].iter_mut().zip(point.iter()) {
                    *s += v;
                }
            }

            let mut shift = 0.0;
            for (c, (sum, count)) in centroids.iter_mut().zip(sums.into_iter().zip(counts)) {
                // an emptied cluster keeps its previous center
                if count == 0 {
                    continue;
                }
                let updated: Vec<f64> = sum.into_iter().map(|s| s / count as f64).collect();
                shift += squared_distance(c, &updated);
                *c = updated;
            }

            if shift <= tol {
                break;
            }
        }

        let mut inertia = 0.0;
        for (label, point) in labels.iter_mut().zip(data.iter()) {
            let (idx, dist) = nearest(point, &centroids);
            *label = idx;
            inertia += dist;
        }

        KMeansFit {
            centroids,
            labels,
            inertia,
            n_iter,
        }
    }
}
