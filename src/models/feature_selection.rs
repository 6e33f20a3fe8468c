//! Отбор признаков случайным лесом

use ndarray::Axis;

use crate::error::ModelError;
use crate::models::estimator::Estimator;
use crate::models::tree::RandomForest;
use crate::preprocessing::FeatureEngineer;
use crate::types::{SelectionMethod, Table};

/// Выбирает `n_features` признаков для предсказания `target_column`.
///
/// * `Rfe` - рекурсивное исключение: лес переобучается, и на каждом шаге
///   удаляется наименее важный признак. Порядок результата - порядок колонок.
///   По умолчанию остается половина признаков.
/// * `FeatureImportance` - один лес, признаки по убыванию важности.
///   По умолчанию возвращаются все.
pub fn select_features(
    table: &Table,
    target_column: &str,
    method: SelectionMethod,
    n_features: Option<usize>,
) -> Result<Vec<String>, ModelError> {
    let columns = FeatureEngineer::feature_columns(table, target_column);
    let (x, y) = FeatureEngineer::extract(table, target_column, &columns)?;

    let n = match (method, n_features) {
        (_, Some(n)) => n,
        (SelectionMethod::Rfe, None) => (columns.len() / 2).max(1),
        (SelectionMethod::FeatureImportance, None) => columns.len(),
    };
    if n == 0 || n > columns.len() {
        return Err(ModelError::InvalidParameter {
            name: "n_features".to_string(),
            value: n as f64,
        });
    }

    match method {
        SelectionMethod::FeatureImportance => {
            let mut forest = RandomForest::default();
            forest.fit(&x, &y)?;
            let importances = forest.feature_importances().ok_or(ModelError::NotFitted)?;

            let mut ranked: Vec<usize> = (0..columns.len()).collect();
            ranked.sort_by(|&a, &b| importances[b].total_cmp(&importances[a]));

            Ok(ranked.into_iter().take(n).map(|i| columns[i].clone()).collect())
        }
        SelectionMethod::Rfe => {
            let mut remaining: Vec<usize> = (0..columns.len()).collect();

            while remaining.len() > n {
                let mut forest = RandomForest::default();
                forest.fit(&x.select(Axis(1), &remaining), &y)?;
                let importances = forest.feature_importances().ok_or(ModelError::NotFitted)?;

                let weakest = (0..remaining.len())
                    .min_by(|&a, &b| importances[a].total_cmp(&importances[b]))
                    .ok_or(ModelError::EmptyDataset)?;
                tracing::debug!(
                    "RFE: dropping '{}' (importance {:.4})",
                    columns[remaining[weakest]],
                    importances[weakest]
                );
                remaining.remove(weakest);
            }

            Ok(remaining.into_iter().map(|i| columns[i].clone()).collect())
        }
    }
}
