//! Общий интерфейс регрессионных моделей

use std::fmt;

use ndarray::{Array1, Array2};

use crate::error::ModelError;
use crate::models::linear::{LinearRegression, RidgeRegression};
use crate::models::tree::{RandomForest, RegressionTree};
use crate::types::{EstimatorSpec, Params};

/// Регрессор с именованными гиперпараметрами.
///
/// Гиперпараметры передаются как `f64`; целочисленные параметры
/// (глубина дерева, число деревьев) проверяются в `set_params`.
pub trait Estimator: Send + Sync {
    fn name(&self) -> &'static str;

    fn params(&self) -> Params;

    /// Меняет только перечисленные параметры; неизвестное имя - ошибка
    fn set_params(&mut self, params: &Params) -> Result<(), ModelError>;

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    /// Нормированная важность признаков (сумма 1), если модель ее дает
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }

    fn clone_box(&self) -> Box<dyn Estimator>;
}

impl Clone for Box<dyn Estimator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl fmt::Debug for dyn Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.name())
            .field("params", &self.params())
            .finish()
    }
}

pub fn build_estimator(spec: &EstimatorSpec) -> Box<dyn Estimator> {
    match *spec {
        EstimatorSpec::Ridge { alpha } => Box::new(RidgeRegression::new(alpha)),
        EstimatorSpec::Linear { fit_intercept } => Box::new(LinearRegression::new(fit_intercept)),
        EstimatorSpec::Tree {
            max_depth,
            min_samples_split,
        } => Box::new(RegressionTree::new(max_depth, min_samples_split)),
        EstimatorSpec::Forest {
            n_estimators,
            max_depth,
            min_samples_split,
            seed,
        } => Box::new(RandomForest::new(
            n_estimators,
            max_depth,
            min_samples_split,
            seed,
        )),
    }
}

/// Проверка целочисленного параметра >= `min`
pub(crate) fn int_param(name: &str, value: f64, min: usize) -> Result<usize, ModelError> {
    if value.is_finite() && value.fract() == 0.0 && value >= min as f64 {
        Ok(value as usize)
    } else {
        Err(ModelError::InvalidParameter {
            name: name.to_string(),
            value,
        })
    }
}

pub(crate) fn unknown_param(name: &str, estimator: &'static str) -> ModelError {
    ModelError::UnknownParameter {
        name: name.to_string(),
        estimator,
    }
}

/// Нормировка важностей к сумме 1 (нулевой вектор остается нулевым)
pub(crate) fn normalize_importances(mut importances: Array1<f64>) -> Array1<f64> {
    let total = importances.sum();
    if total > 0.0 {
        importances.mapv_inplace(|v| v / total);
    }
    importances
}

pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ModelError::EmptyDataset);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::ShapeMismatch {
            expected: x.nrows(),
            actual: y.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_boxed_estimators() {
        let forest = build_estimator(&EstimatorSpec::Forest {
            n_estimators: 7,
            max_depth: 3,
            min_samples_split: 2,
            seed: 1,
        });
        assert_eq!(forest.name(), "random_forest");
        assert_eq!(forest.params()["n_estimators"], 7.0);

        let ridge = build_estimator(&EstimatorSpec::Ridge { alpha: 0.5 });
        assert_eq!(ridge.params()["alpha"], 0.5);
    }

    #[test]
    fn int_param_rejects_fractions_and_small_values() {
        assert_eq!(int_param("max_depth", 4.0, 1).unwrap(), 4);
        assert!(int_param("max_depth", 2.5, 1).is_err());
        assert!(int_param("max_depth", 0.0, 1).is_err());
        assert!(int_param("max_depth", f64::NAN, 1).is_err());
    }

    #[test]
    fn boxed_estimator_clones_params() {
        let mut tree = build_estimator(&EstimatorSpec::Tree {
            max_depth: 4,
            min_samples_split: 2,
        });
        let copy = tree.clone();

        let mut params = Params::new();
        params.insert("max_depth".to_string(), 8.0);
        tree.set_params(&params).unwrap();

        assert_eq!(tree.params()["max_depth"], 8.0);
        assert_eq!(copy.params()["max_depth"], 4.0);
    }
}
