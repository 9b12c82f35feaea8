//! Random forest regression
//!
//! Bagged CART regression trees: each tree is grown to purity on a
//! bootstrap sample, choosing at every node the split (over all features)
//! with the largest reduction in squared error. Thresholds sit halfway
//! between adjacent distinct feature values. The forest predicts the mean
//! of its trees.
//!
//! Trees are stored as flat node vectors so a trained forest serializes
//! compactly and can be validated after deserialization.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A node in a flattened regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        /// Index of the subtree for `x[feature] <= threshold`
        left: usize,
        right: usize,
    },
}

/// A single regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Grow a tree on the rows selected by `indices` (duplicates allowed)
    pub fn fit(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let mut indices = indices.to_vec();
        tree.grow(x, y, &mut indices);
        tree
    }

    fn grow(&mut self, x: &[Vec<f64>], y: &[f64], indices: &mut [usize]) -> usize {
        let node_id = self.nodes.len();
        let n = indices.len() as f64;
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let mean = sum / n;
        self.nodes.push(TreeNode::Leaf { value: mean });

        if indices.len() < 2 {
            return node_id;
        }
        let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();
        if sse <= 1e-12 {
            return node_id;
        }

        let Some((feature, threshold)) = best_split(x, y, indices) else {
            return node_id;
        };

        // Partition in place: rows going left first
        let mut boundary = 0;
        for k in 0..indices.len() {
            if x[indices[k]][feature] <= threshold {
                indices.swap(boundary, k);
                boundary += 1;
            }
        }
        let (left_rows, right_rows) = indices.split_at_mut(boundary);

        let left = self.grow(x, y, left_rows);
        let right = self.grow(x, y, right_rows);
        self.nodes[node_id] = TreeNode::Split {
            feature,
            threshold,
            left,
            right,
        };

        node_id
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match self.nodes[id] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check structural integrity of a deserialized tree
    ///
    /// Children must come after their parent, which rules out cycles and
    /// guarantees `predict` terminates.
    fn validate(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Model("Empty regression tree".into()));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Leaf { value } if !value.is_finite() => {
                    return Err(Error::Model(format!("Non-finite leaf at node {}", id)));
                }
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if feature >= n_features
                        || left <= id
                        || right <= id
                        || left >= self.nodes.len()
                        || right >= self.nodes.len()
                    {
                        return Err(Error::Model(format!("Malformed split at node {}", id)));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Find the squared-error minimizing split, if any feature varies
fn best_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let n = indices.len();
    let n_features = x[indices[0]].len();
    let total: f64 = indices.iter().map(|&i| y[i]).sum();

    // Maximizing sum_l^2/n_l + sum_r^2/n_r is equivalent to minimizing SSE
    let mut best: Option<(usize, f64, f64)> = None;
    let mut sorted = indices.to_vec();

    for feature in 0..n_features {
        sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_sum = 0.0;
        for k in 1..n {
            left_sum += y[sorted[k - 1]];
            let lo = x[sorted[k - 1]][feature];
            let hi = x[sorted[k]][feature];
            if lo >= hi {
                continue;
            }

            let right_sum = total - left_sum;
            let score = left_sum * left_sum / k as f64 + right_sum * right_sum / (n - k) as f64;
            if best.map_or(true, |(_, _, s)| score > s) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some((feature, threshold, score));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// Ensemble of bootstrap regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    /// Fit `n_trees` trees, each on its own bootstrap sample
    ///
    /// Per-tree seeds are drawn from a master RNG seeded with `seed`, so the
    /// same inputs always produce the same forest.
    pub fn fit(x: &[Vec<f64>], y: &[f64], n_trees: usize, seed: u64) -> Result<Self> {
        if x.is_empty() || x.len() != y.len() {
            return Err(Error::Model(format!(
                "Cannot fit forest on {} rows and {} labels",
                x.len(),
                y.len()
            )));
        }
        if n_trees == 0 {
            return Err(Error::Model("Forest needs at least one tree".into()));
        }

        let n = x.len();
        let mut master = StdRng::seed_from_u64(seed);
        let trees = (0..n_trees)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.gen());
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &sample)
            })
            .collect();

        Ok(Self {
            n_features: x[0].len(),
            trees,
        })
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
        total / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|t| t.node_count()).sum()
    }

    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(Error::Model("Forest has no trees".into()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        Ok(())
    }
}
