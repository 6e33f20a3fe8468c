//! Линейные модели

#![allow(non_snake_case)]

use linfa::prelude::*;
use linfa::Dataset;
use linfa_linear::LinearRegression as LinfaLinearRegression;
use ndarray::{Array1, Array2};

use crate::error::ModelError;
use crate::models::estimator::{check_fit_input, normalize_importances, unknown_param, Estimator};
use crate::preprocessing::DataNormalizer;
use crate::types::Params;

/// Ridge Regression на стандартизованных признаках
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    normalizer: DataNormalizer,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            normalizer: DataNormalizer::new(),
            weights: None,
            bias: 0.0,
        }
    }

    /// Веса в пространстве стандартизованных признаков
    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    fn solve_linear_system(A: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, ModelError> {
        // Метод Гаусса с выбором главного элемента
        let n = A.nrows();
        let mut augmented = Array2::zeros((n, n + 1));

        for i in 0..n {
            for j in 0..n {
                augmented[[i, j]] = A[[i, j]];
            }
            augmented[[i, n]] = b[i];
        }

        for i in 0..n {
            let mut max_row = i;
            let mut max_val = augmented[[i, i]].abs();
            for k in (i + 1)..n {
                if augmented[[k, i]].abs() > max_val {
                    max_val = augmented[[k, i]].abs();
                    max_row = k;
                }
            }

            if max_row != i {
                for j in 0..=n {
                    augmented.swap([i, j], [max_row, j]);
                }
            }

            let pivot = augmented[[i, i]];
            if pivot.abs() < 1e-10 {
                return Err(ModelError::SingularMatrix);
            }

            for k in (i + 1)..n {
                let factor = augmented[[k, i]] / pivot;
                for j in i..=n {
                    augmented[[k, j]] -= factor * augmented[[i, j]];
                }
            }
        }

        // Обратный ход
        let mut x = Array1::zeros(n);
        for i in (0..n).rev() {
            let mut sum = augmented[[i, n]];
            for j in (i + 1)..n {
                sum -= augmented[[i, j]] * x[j];
            }
            x[i] = sum / augmented[[i, i]];
        }

        Ok(x)
    }
}

impl Estimator for RidgeRegression {
    fn name(&self) -> &'static str {
        "ridge"
    }

    fn params(&self) -> Params {
        Params::from([("alpha".to_string(), self.alpha)])
    }

    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        for (name, &value) in params {
            match name.as_str() {
                "alpha" if value.is_finite() && value >= 0.0 => self.alpha = value,
                "alpha" => {
                    return Err(ModelError::InvalidParameter {
                        name: name.clone(),
                        value,
                    })
                }
                _ => return Err(unknown_param(name, self.name())),
            }
        }
        Ok(())
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_fit_input(X, y)?;
        let X = self.normalizer.fit_transform(X)?;

        // (X^T X + αI) w = X^T y
        let mut xtx = X.t().dot(&X);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = X.t().dot(y);

        let weights = Self::solve_linear_system(&xtx, &xty)?;

        // Признаки центрированы, поэтому свободный член - среднее y
        self.bias = y.mean().unwrap_or(0.0);
        self.weights = Some(weights);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let weights = self.weights.as_ref().ok_or(ModelError::NotFitted)?;
        let X = self.normalizer.transform(X)?;
        Ok(X.dot(weights) + self.bias)
    }

    fn feature_importances(&self) -> Option<Array1<f64>> {
        self.weights
            .as_ref()
            .map(|w| normalize_importances(w.mapv(f64::abs)))
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}

/// Обычная линейная регрессия (МНК) через linfa
#[derive(Debug, Clone)]
pub struct LinearRegression {
    fit_intercept: bool,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new(fit_intercept: bool) -> Self {
        Self {
            fit_intercept,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Estimator for LinearRegression {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn params(&self) -> Params {
        let flag = if self.fit_intercept { 1.0 } else { 0.0 };
        Params::from([("fit_intercept".to_string(), flag)])
    }

    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        for (name, &value) in params {
            match (name.as_str(), value) {
                ("fit_intercept", v) if v == 0.0 || v == 1.0 => self.fit_intercept = v == 1.0,
                ("fit_intercept", _) => {
                    return Err(ModelError::InvalidParameter {
                        name: name.clone(),
                        value,
                    })
                }
                _ => return Err(unknown_param(name, self.name())),
            }
        }
        Ok(())
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        check_fit_input(X, y)?;

        let dataset = Dataset::new(X.clone(), y.clone());
        let model = LinfaLinearRegression::new()
            .with_intercept(self.fit_intercept)
            .fit(&dataset)
            .map_err(|e| ModelError::Fit(format!("linear regression: {e}")))?;

        self.coefficients = Some(model.params().clone());
        self.intercept = model.intercept();
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let coefficients = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        if X.ncols() != coefficients.len() {
            return Err(ModelError::ShapeMismatch {
                expected: coefficients.len(),
                actual: X.ncols(),
            });
        }
        Ok(X.dot(coefficients) + self.intercept)
    }

    fn clone_box(&self) -> Box<dyn Estimator> {
        Box::new(self.clone())
    }
}
