//! Bagged regression-tree ensemble.
//!
//! Each member tree is trained on a bootstrap resample of the encoded
//! dataset; the ensemble prediction is the mean of member predictions.
//! Per-tree RNG streams are derived from the forest seed, so training is
//! deterministic regardless of how trees are scheduled across threads.

pub mod tree;

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::matrix::FeatureMatrix;

pub use tree::{RegressionTree, TreeParams};

/// Parameters for forest training. Fixed configuration, not tunable per
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Parameters for individual tree building.
    pub tree: TreeParams,
    /// Seed for bootstrap sampling.
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            tree: TreeParams::default(),
            seed: 42,
        }
    }
}

/// Errors from forest training.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrainError {
    #[error("training dataset has no rows")]
    EmptyDataset,

    #[error("number of targets ({targets}) does not match number of rows ({rows})")]
    TargetLenMismatch { rows: usize, targets: usize },

    #[error("ensemble must have at least one tree")]
    NoTrees,
}

/// A fitted bagging ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Train a forest on a row-major feature matrix.
    pub fn fit(
        matrix: &FeatureMatrix,
        targets: &[f64],
        params: &ForestParams,
    ) -> Result<Self, TrainError> {
        let n_rows = matrix.n_rows();
        if n_rows == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if targets.len() != n_rows {
            return Err(TrainError::TargetLenMismatch {
                rows: n_rows,
                targets: targets.len(),
            });
        }
        if params.n_trees == 0 {
            return Err(TrainError::NoTrees);
        }

        let trees: Vec<RegressionTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng =
                    Xoshiro256PlusPlus::seed_from_u64(params.seed.wrapping_add(tree_idx as u64));
                let sample: Vec<u32> =
                    (0..n_rows).map(|_| rng.gen_range(0..n_rows) as u32).collect();
                RegressionTree::fit(matrix, targets, &sample, &params.tree)
            })
            .collect();

        Ok(Self {
            trees,
            n_features: matrix.n_cols(),
        })
    }

    /// Predict for one feature vector: mean over member trees.
    ///
    /// The estimate is raw model output; callers decide whether to clamp.
    pub fn predict_row(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.n_features);
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(features)).sum();
        sum / self.trees.len() as f64
    }

    /// Number of member trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of input features the forest was fit on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Feature importance by split count, one entry per feature.
    pub fn feature_importance(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_features];
        for tree in &self.trees {
            for feature in tree.split_features() {
                if let Some(slot) = counts.get_mut(feature as usize) {
                    *slot += 1;
                }
            }
        }
        counts
    }

    /// Feature importance normalized to sum to 1 (all-zero if no tree ever
    /// split).
    pub fn feature_importance_normalized(&self) -> Vec<f64> {
        let counts = self.feature_importance();
        let total: u32 = counts.iter().sum();
        if total == 0 {
            vec![0.0; counts.len()]
        } else {
            counts.iter().map(|&c| c as f64 / total as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Two noisy informative features, one constant feature.
    fn toy_matrix(n_rows: usize) -> (FeatureMatrix, Vec<f64>) {
        let mut data = Vec::with_capacity(n_rows * 3);
        let mut targets = Vec::with_capacity(n_rows);
        for i in 0..n_rows {
            let a = i as f64;
            let b = (i % 7) as f64;
            data.extend_from_slice(&[a, b, 1.0]);
            targets.push(2.0 * a + b);
        }
        (FeatureMatrix::from_vec(data, n_rows, 3), targets)
    }

    fn small_params(seed: u64) -> ForestParams {
        ForestParams {
            n_trees: 25,
            tree: TreeParams {
                max_depth: 6,
                min_samples_split: 2,
            },
            seed,
        }
    }

    #[test]
    fn predictions_stay_within_target_range() {
        let (matrix, targets) = toy_matrix(120);
        let forest = RandomForest::fit(&matrix, &targets, &small_params(42)).unwrap();

        let lo = targets.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = targets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        for i in 0..matrix.n_rows() {
            let pred = forest.predict_row(matrix.row(i));
            assert!(pred.is_finite());
            assert!(pred >= lo && pred <= hi);
        }
    }

    #[test]
    fn training_fits_the_signal() {
        let (matrix, targets) = toy_matrix(200);
        let forest = RandomForest::fit(&matrix, &targets, &small_params(42)).unwrap();

        // In-sample error of a deep-enough forest on noiseless data is small
        // relative to the target spread (~0..400).
        let mut abs_err = 0.0;
        for i in 0..matrix.n_rows() {
            abs_err += (forest.predict_row(matrix.row(i)) - targets[i]).abs();
        }
        assert!(abs_err / (matrix.n_rows() as f64) < 10.0);
    }

    #[test]
    fn same_seed_is_deterministic() {
        let (matrix, targets) = toy_matrix(80);
        let a = RandomForest::fit(&matrix, &targets, &small_params(7)).unwrap();
        let b = RandomForest::fit(&matrix, &targets, &small_params(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn importance_sums_to_one() {
        let (matrix, targets) = toy_matrix(120);
        let forest = RandomForest::fit(&matrix, &targets, &small_params(3)).unwrap();

        let importance = forest.feature_importance_normalized();
        assert_eq!(importance.len(), 3);
        assert_relative_eq!(importance.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        // The constant feature can never be split on.
        assert_eq!(importance[2], 0.0);
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let matrix = FeatureMatrix::from_vec(Vec::new(), 0, 3);
        let result = RandomForest::fit(&matrix, &[], &small_params(1));
        assert!(matches!(result, Err(TrainError::EmptyDataset)));
    }

    #[test]
    fn target_length_mismatch_is_an_error() {
        let (matrix, _) = toy_matrix(10);
        let result = RandomForest::fit(&matrix, &[1.0, 2.0], &small_params(1));
        assert!(matches!(
            result,
            Err(TrainError::TargetLenMismatch { rows: 10, targets: 2 })
        ));
    }

    #[test]
    fn zero_trees_is_an_error() {
        let (matrix, targets) = toy_matrix(10);
        let params = ForestParams {
            n_trees: 0,
            ..small_params(1)
        };
        let result = RandomForest::fit(&matrix, &targets, &params);
        assert!(matches!(result, Err(TrainError::NoTrees)));
    }
}
