//! Деревья регрессии и случайный лес

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ModelError;
use crate::models::estimator::{
    check_fit_input, int_param, normalize_importances, unknown_param, Estimator,
};
use crate::types::Params;

/// Максимум порогов, проверяемых по одному признаку
const MAX_THRESHOLDS: usize = 32;

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Дерево регрессии (критерий - сумма квадратов отклонений)
#[derive(Debug, Clone)]
pub struct RegressionTree {
    max_depth: usize,
    min_samples_split: usize,
    root: Option<TreeNode>,
    importances: Option<Array1<f64>>,
}

impl RegressionTree {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split,
            root: None,
            importances: None,
        }
    }

    fn build_tree(
        &self,
        X: &Array2<f64>,
        y: &Array1<f64>,
        depth: usize,
        indices: Vec<usize>,
        gains: &mut Array1<f64>,
    ) -> TreeNode {
        let parent_sse = sse(y, &indices);

        if depth >= self.max_depth || indices.len() < self.min_samples_split || parent_sse < 1e-12 {
            return TreeNode::Leaf {
                value: mean(y, &indices),
            };
        }

        // Поиск лучшего разделения
        let mut best: Option<(usize, f64, f64)> = None;
        for feature in 0..X.ncols() {
            for threshold in candidate_thresholds(X.column(feature), &indices) {
                let (left, right): (Vec<usize>, Vec<usize>) =
                    indices.iter().partition(|&&i| X[[i, feature]] < threshold);

                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let score = sse(y, &left) + sse(y, &right);
                if best.map_or(true, |(_, _, s)| score < s) {
                    best = Some((feature, threshold, score));
                }
            }
        }

        let (feature, threshold, score) = match best {
            Some(split) if split.2 < parent_sse => split,
            _ => {
                return TreeNode::Leaf {
                    value: mean(y, &indices),
                }
            }
        };

        gains[feature] += parent_sse - score;

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| X[[i, feature]] < threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build_tree(X, y, depth + 1, left, gains)),
            right: Box::new(self.build_tree(X, y, depth + 1, right, gains)),
        }
    }

    fn predict_single(node: &TreeNode, sample: ArrayView1<'_, f64>) -> f64 {
        match node {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] < *threshold {
                    Self::predict_single(left, sample)
                } else {
                    Self::predict_single(right, sample)
                }
            }
        }
    }

    /// Сырые (ненормированные) приросты качества по признакам
    fn raw_gains(&self) -> Option<&Array1<f64>> {
        self.importances.as_ref()
    }
}

impl Estimator for RegressionTree {
    fn name(&self) -> &'static str {
        "regression_tree"
    }

    fn params(&self) -> Params {
        Params::from([
            ("max_depth".to_string(), self.max_depth as f64),
            ("min_samples_split".to_string(), self.min_samples_split as f64),
        ])
    }

    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        for (name, &value) in params {
            match name.as_str() {
                "max_depth" => self.max_depth = int_param(name, value, 1)?,
                "min_samples_split" => self.min_samples_split = int_param(name, value, 2)?,
                _ => return Err(unknown_param(name, self.name())),
            }
        }
        Ok(())
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_fit_input(X, y)?;

        let mut gains = Array1::zeros(X.ncols());
        let root = self.build_tree(X, y, 0, (0..X.nrows()).collect(), &mut gains);
        self.root = Some(root);
        self.importances = Some(gains);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        let n_features = self.importances.as_ref().map_or(0, |g| g.len());
        if X.ncols() != n_features {
            return Err(ModelError::ShapeMismatch {
                expected: n_features,
                actual: X.ncols(),
            });
        }

        Ok(X.rows()
            .into_iter()
            .map(|row| Self::predict_single(root, row))
            .collect())
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.raw_gains().cloned().map(normalize_importances)
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

/// Бэггинг деревьев регрессии на бутстреп-выборках
#[derive(Debug, Clone)]
pub struct RandomForest {
    n_estimators: usize,
    max_depth: usize,
    min_samples_split: usize,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize, max_depth: usize, min_samples_split: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            max_depth,
            min_samples_split,
            seed,
            trees: Vec::new(),
        }
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(50, 10, 5, 42)
    }
}

impl Estimator for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn params(&self) -> Params {
        Params::from([
            ("n_estimators".to_string(), self.n_estimators as f64),
            ("max_depth".to_string(), self.max_depth as f64),
            ("min_samples_split".to_string(), self.min_samples_split as f64),
            ("seed".to_string(), self.seed as f64),
        ])
    }

    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        for (name, &value) in params {
            match name.as_str() {
                "n_estimators" => self.n_estimators = int_param(name, value, 1)?,
                "max_depth" => self.max_depth = int_param(name, value, 1)?,
                "min_samples_split" => self.min_samples_split = int_param(name, value, 2)?,
                "seed" => self.seed = int_param(name, value, 0)? as u64,
                _ => return Err(unknown_param(name, self.name())),
            }
        }
        Ok(())
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_fit_input(X, y)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n_samples = X.nrows();

        self.trees = (0..self.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                let X_boot = X.select(Axis(0), &sample);
                let y_boot = y.select(Axis(0), &sample);

                let mut tree = RegressionTree::new(self.max_depth, self.min_samples_split);
                tree.fit(&X_boot, &y_boot).map(|_| tree)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Random forest fitted: {} trees", self.trees.len());
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }

        let mut total: Array1<f64> = Array1::zeros(X.nrows());
        for tree in &self.trees {
            total += &tree.predict(X)?;
        }
        Ok(total / self.trees.len() as f64)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        let mut trees = self.trees.iter().filter_map(RegressionTree::feature_importances);
        let first = trees.next()?;
        let sum = trees.fold(first, |acc, imp| acc + imp);
        Some(normalize_importances(sum))
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

fn mean(y: &Array1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn sse(y: &Array1<f64>, indices: &[usize]) -> f64 {
    let m = mean(y, indices);
    indices.iter().map(|&i| (y[i] - m).powi(2)).sum()
}

/// Середины между соседними различными значениями признака
fn candidate_thresholds(column: ArrayView1<'_, f64>, indices: &[usize]) -> Vec<f64> {
    let mut values: Vec<f64> = indices.iter().map(|&i| column[i]).collect();
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();

    let midpoints: Vec<f64> = values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    if midpoints.len() <= MAX_THRESHOLDS {
        return midpoints;
    }

    let step = midpoints.len() as f64 / MAX_THRESHOLDS as f64;
    (0..MAX_THRESHOLDS)
        .map(|k| midpoints[(k as f64 * step) as usize])
        .collect()
}
