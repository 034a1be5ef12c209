//! Single regression tree.
//!
//! Trees are grown greedily: at each node the split with the largest
//! variance reduction over all features is taken, until the depth limit or
//! the minimum split size stops expansion. Nodes are stored flat with u32
//! child links; a leaf is marked by a `LEAF` sentinel in its left link.

use serde::{Deserialize, Serialize};

use crate::data::matrix::FeatureMatrix;

/// Sentinel child index marking a leaf.
const LEAF: u32 = u32::MAX;

/// Parameters for individual tree building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum tree depth (root = 0).
    pub max_depth: u32,
    /// Minimum number of samples required to split a node.
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 12,
            min_samples_split: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Node {
    /// Split feature (unused on leaves).
    feature: u32,
    /// Split threshold; rows with `value < threshold` go left.
    threshold: f64,
    /// Left child index, or `LEAF`.
    left: u32,
    /// Right child index, or `LEAF`.
    right: u32,
    /// Mean target of the node's training rows.
    value: f64,
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit a tree on the given rows (typically a bootstrap sample).
    pub fn fit(
        matrix: &FeatureMatrix,
        targets: &[f64],
        rows: &[u32],
        params: &TreeParams,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(matrix, targets, rows, 0, params);
        tree
    }

    fn grow(
        &mut self,
        matrix: &FeatureMatrix,
        targets: &[f64],
        rows: &[u32],
        depth: u32,
        params: &TreeParams,
    ) -> u32 {
        let (mean, sse) = mean_and_sse(targets, rows);

        let id = self.nodes.len() as u32;
        self.nodes.push(Node {
            feature: 0,
            threshold: 0.0,
            left: LEAF,
            right: LEAF,
            value: mean,
        });

        if depth >= params.max_depth || rows.len() < params.min_samples_split || sse <= 1e-12 {
            return id;
        }

        let Some(split) = best_split(matrix, targets, rows, sse) else {
            return id;
        };

        let (left_rows, right_rows) = partition(matrix, rows, split.feature, split.threshold);
        let left = self.grow(matrix, targets, &left_rows, depth + 1, params);
        let right = self.grow(matrix, targets, &right_rows, depth + 1, params);

        let node = &mut self.nodes[id as usize];
        node.feature = split.feature;
        node.threshold = split.threshold;
        node.left = left;
        node.right = right;

        id
    }

    /// Predict for one feature vector.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.left == LEAF {
                return node.value;
            }
            idx = if features[node.feature as usize] < node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    /// Number of nodes (split nodes + leaves).
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.left == LEAF).count()
    }

    /// Features used by split nodes, one entry per split.
    pub fn split_features(&self) -> impl Iterator<Item = u32> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.left != LEAF)
            .map(|n| n.feature)
    }
}

fn mean_and_sse(targets: &[f64], rows: &[u32]) -> (f64, f64) {
    let n = rows.len() as f64;
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    for &r in rows {
        let y = targets[r as usize];
        sum += y;
        sum_sq += y * y;
    }
    let mean = sum / n;
    let sse = (sum_sq - sum * sum / n).max(0.0);
    (mean, sse)
}

struct SplitCandidate {
    feature: u32,
    threshold: f64,
    gain: f64,
}

/// Exhaustive best split over all features.
///
/// For each feature, rows are sorted by value and a prefix scan over target
/// sums evaluates every boundary between distinct adjacent values.
fn best_split(
    matrix: &FeatureMatrix,
    targets: &[f64],
    rows: &[u32],
    parent_sse: f64,
) -> Option<SplitCandidate> {
    let n = rows.len();
    if n < 2 {
        return None;
    }

    let mut total_sum = 0.0;
    let mut total_sq = 0.0;
    for &r in rows {
        let y = targets[r as usize];
        total_sum += y;
        total_sq += y * y;
    }

    let mut best: Option<SplitCandidate> = None;
    let mut order: Vec<u32> = rows.to_vec();

    for feature in 0..matrix.n_cols() as u32 {
        let f = feature as usize;
        order.copy_from_slice(rows);
        order.sort_by(|&a, &b| matrix.get(a as usize, f).total_cmp(&matrix.get(b as usize, f)));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..n - 1 {
            let r = order[i] as usize;
            let y = targets[r];
            left_sum += y;
            left_sq += y * y;

            let value = matrix.get(r, f);
            let next = matrix.get(order[i + 1] as usize, f);
            if value == next {
                continue;
            }

            // Adjacent floats can round the midpoint down to `value`; such a
            // threshold would leave the left partition empty.
            let threshold = (value + next) / 2.0;
            if threshold <= value {
                continue;
            }

            let left_n = (i + 1) as f64;
            let right_n = (n - i - 1) as f64;
            let left_sse = (left_sq - left_sum * left_sum / left_n).max(0.0);
            let right_sum = total_sum - left_sum;
            let right_sse = (total_sq - left_sq - right_sum * right_sum / right_n).max(0.0);
            let gain = parent_sse - left_sse - right_sse;

            if gain > 1e-12 && best.as_ref().map_or(true, |b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

fn partition(matrix: &FeatureMatrix, rows: &[u32], feature: u32, threshold: f64) -> (Vec<u32>, Vec<u32>) {
    let f = feature as usize;
    let mut left = Vec::new();
    let mut right = Vec::new();
    for &r in rows {
        if matrix.get(r as usize, f) < threshold {
            left.push(r);
        } else {
            right.push(r);
        }
    }
    (left, right)
}
