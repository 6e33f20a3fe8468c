//! K-fold кросс-валидация

use ndarray::{Array1, Array2, Axis};

use crate::error::ModelError;
use crate::models::estimator::Estimator;

/// Индексы обучающей и проверочной частей одного фолда
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Последовательные фолды без перемешивания; первые `n % k` фолдов
/// на один элемент больше.
pub fn k_fold(n_samples: usize, k: usize) -> Result<Vec<Fold>, ModelError> {
    if k < 2 || k > n_samples {
        return Err(ModelError::InvalidFolds {
            samples: n_samples,
            folds: k,
        });
    }

    let base = n_samples / k;
    let extra = n_samples % k;

    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let end = start + size;

        folds.push(Fold {
            train: (0..start).chain(end..n_samples).collect(),
            test: (start..end).collect(),
        });
        start = end;
    }

    Ok(folds)
}

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64, ModelError> {
    if y_true.len() != y_pred.len() {
        return Err(ModelError::ShapeMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    (y_true - y_pred)
        .mapv(|e| e * e)
        .mean()
        .ok_or(ModelError::EmptyDataset)
}

/// Отрицательная MSE на каждом фолде (больше - лучше).
/// Исходная модель не меняется: на каждом фолде обучается ее копия.
pub fn cross_val_score(
    estimator: &dyn Estimator,
    x: &Array2<f64>,
    y: &Array1<f64>,
    k: usize,
) -> Result<Vec<f64>, ModelError> {
    k_fold(x.nrows(), k)?
        .into_iter()
        .map(|fold| {
            let mut model = estimator.clone_box();
            model.fit(&x.select(Axis(0), &fold.train), &y.select(Axis(0), &fold.train))?;

            let predicted = model.predict(&x.select(Axis(0), &fold.test))?;
            let mse = mean_squared_error(&y.select(Axis(0), &fold.test), &predicted)?;
            Ok(-mse)
        })
        .collect()
}

/// Среднее по фолдам
pub fn mean_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return f64::NAN;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::linear::RidgeRegression;
    use ndarray::array;

    #[test]
    fn folds_cover_all_samples_once() {
        let folds = k_fold(10, 3).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(folds[1].test, vec![4, 5, 6]);
        assert_eq!(folds[1].train, vec![0, 1, 2, 3, 7, 8, 9]);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn invalid_fold_count() {
        assert!(matches!(k_fold(5, 1), Err(ModelError::InvalidFolds { .. })));
        assert!(matches!(k_fold(2, 3), Err(ModelError::InvalidFolds { .. })));
    }

    #[test]
    fn mse_of_known_vectors() {
        let mse = mean_squared_error(&array![1.0, 2.0, 3.0], &array![1.0, 4.0, 0.0]).unwrap();
        assert!((mse - 13.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn perfect_linear_fit_scores_near_zero() {
        let x = Array2::from_shape_fn((9, 1), |(i, _)| i as f64);
        let y = x.column(0).mapv(|v| 2.0 * v + 1.0);

        let scores = cross_val_score(&RidgeRegression::new(0.0), &x, &y, 3).unwrap();
        assert_eq!(scores.len(), 3);
        for score in scores {
            assert!(score <= 0.0 && score > -1e-9);
        }
    }
}
