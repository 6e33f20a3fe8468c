//! Нормализация данных

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::error::ModelError;

/// Стандартизация признаков: (X - mean) / std
#[derive(Debug, Clone)]
pub struct DataNormalizer {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl DataNormalizer {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<(), ModelError> {
        if X.nrows() == 0 {
            return Err(ModelError::EmptyDataset);
        }

        let mean = X.mean_axis(Axis(0)).ok_or(ModelError::EmptyDataset)?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Постоянные признаки (например, индикаторы без вариации) не масштабируем
        std.mapv_inplace(|s| if s < 1e-10 { 1.0 } else { s });

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let (mean, std) = match (&self.mean, &self.std) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(ModelError::NotFitted),
        };

        if X.ncols() != mean.len() {
            return Err(ModelError::ShapeMismatch {
                expected: mean.len(),
                actual: X.ncols(),
            });
        }

        let mut normalized = X.clone();
        for mut row in normalized.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = (*val - mean[i]) / std[i];
            }
        }

        Ok(normalized)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.fit(X)?;
        self.transform(X)
    }
}

impl Default for DataNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardizes_columns() {
        let X = array![[1.0, 10.0], [3.0, 10.0]];
        let mut normalizer = DataNormalizer::new();
        let scaled = normalizer.fit_transform(&X).unwrap();

        assert_eq!(scaled, array![[-1.0, 0.0], [1.0, 0.0]]);
    }

    #[test]
    fn transform_requires_fit() {
        let normalizer = DataNormalizer::default();
        assert!(matches!(
            normalizer.transform(&array![[1.0]]),
            Err(ModelError::NotFitted)
        ));
    }

    #[test]
    fn transform_checks_width() {
        let mut normalizer = DataNormalizer::new();
        normalizer.fit(&array![[1.0, 2.0]]).unwrap();
        assert!(matches!(
            normalizer.transform(&array![[1.0]]),
            Err(ModelError::ShapeMismatch { expected: 2, actual: 1 })
        ));
    }
}
