//! Isolation forest outlier scoring
//!
//! Outliers are isolated by fewer random axis-aligned cuts than inliers.
//! Each tree is grown on a subsample drawn without replacement, picking a
//! random non-constant feature and a uniform threshold at every node until
//! the node holds one row, all its rows are identical, or the height limit
//! is reached. The anomaly score of a row is `2^(-E[h] / c(psi))`, where
//! `h` is its path length and `c` the average unsuccessful-search length of
//! a binary search tree over the subsample size `psi`. Scores near 1 are
//! anomalous; scores well below 0.5 are normal.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

/// Euler-Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Upper bound on rows drawn per tree
const MAX_SUBSAMPLE: usize = 256;

#[derive(Debug, Clone)]
enum IsolationNode {
    External {
        size: usize,
    },
    Internal {
        feature: usize,
        threshold: f64,
        left: Box<IsolationNode>,
        right: Box<IsolationNode>,
    },
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: IsolationNode,
}

impl IsolationTree {
    fn grow(x: &[Vec<f64>], rows: Vec<usize>, height_limit: usize, rng: &mut StdRng) -> Self {
        Self {
            root: grow_node(x, rows, 0, height_limit, rng),
        }
    }

    fn path_length(&self, row: &[f64]) -> f64 {
        let mut node = &self.root;
        let mut depth = 0.0;
        loop {
            match node {
                IsolationNode::External { size } => return depth + average_path_length(*size),
                IsolationNode::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

fn grow_node(
    x: &[Vec<f64>],
    rows: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> IsolationNode {
    if rows.len() <= 1 || depth >= height_limit {
        return IsolationNode::External { size: rows.len() };
    }

    // Only features that still vary inside this node can separate rows
    let n_features = x[rows[0]].len();
    let candidates: Vec<(usize, f64, f64)> = (0..n_features)
        .filter_map(|f| {
            let (lo, hi) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                (lo.min(x[r][f]), hi.max(x[r][f]))
            });
            (lo < hi).then_some((f, lo, hi))
        })
        .collect();

    if candidates.is_empty() {
        return IsolationNode::External { size: rows.len() };
    }

    let (feature, lo, hi) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(lo..hi);

    let (left, right): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| x[r][feature] <= threshold);

    IsolationNode::Internal {
        feature,
        threshold,
        left: Box::new(grow_node(x, left, depth + 1, height_limit, rng)),
        right: Box::new(grow_node(x, right, depth + 1, height_limit, rng)),
    }
}

/// Average path length of an unsuccessful BST search over `n` rows
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// A fitted isolation forest
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    subsample_size: usize,
}

impl IsolationForest {
    /// Fit `n_trees` isolation trees on the rows of `x`
    ///
    /// Returns `None` when there are fewer than two rows.
    pub fn fit(x: &[Vec<f64>], n_trees: usize, seed: u64) -> Option<Self> {
        if x.len() < 2 || n_trees == 0 {
            return None;
        }

        let subsample_size = x.len().min(MAX_SUBSAMPLE);
        let height_limit = (subsample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(seed);

        let trees = (0..n_trees)
            .map(|_| {
                let rows = sample(&mut rng, x.len(), subsample_size).into_vec();
                IsolationTree::grow(x, rows, height_limit, &mut rng)
            })
            .collect();

        Some(Self {
            trees,
            subsample_size,
        })
    }

    /// Anomaly score in (0, 1]; higher is more anomalous
    pub fn score(&self, row: &[f64]) -> f64 {
        let mean_path: f64 = self.trees.iter().map(|t| t.path_length(row)).sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.subsample_size))
    }

    pub fn score_all(&self, x: &[Vec<f64>]) -> Vec<f64> {
        x.iter().map(|row| self.score(row)).collect()
    }
}

/// Linear-interpolated quantile (`q` in [0, 1]) of `values`
pub fn quantile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // c(256) is about 10.24
        assert!((average_path_length(256) - 10.24).abs() < 0.01);
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 4.0);
        assert_eq!(quantile(&values, 0.5), 2.5);
    }

    #[test]
    fn test_fit_requires_two_rows() {
        assert!(IsolationForest::fit(&[vec![1.0]], 10, 0).is_none());
        assert!(IsolationForest::fit(&[], 10, 0).is_none());
    }

    #[test]
    fn test_outlier_scores_higher() {
        let mut x: Vec<Vec<f64>> = (0..30).map(|i| vec![10.0 + (i % 5) as f64 * 0.1]).collect();
        x.push(vec![500.0]);
        let forest = IsolationForest::fit(&x, 50, 42).unwrap();
        let scores = forest.score_all(&x);

        let outlier = scores[30];
        assert!(scores[..30].iter().all(|&s| s < outlier));
        assert!(outlier > 0.5);
    }

    #[test]
    fn test_identical_rows_share_a_score() {
        let x = vec![vec![1.0, 2.0]; 8];
        let forest = IsolationForest::fit(&x, 20, 1).unwrap();
        let scores = forest.score_all(&x);
        assert!(scores.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let x: Vec<Vec<f64>> = (0..40).map(|i| vec![(i * 7 % 13) as f64, i as f64]).collect();
        let a = IsolationForest::fit(&x, 30, 9).unwrap().score_all(&x);
        let b = IsolationForest::fit(&x, 30, 9).unwrap().score_all(&x);
        assert_eq!(a, b);
    }
}
