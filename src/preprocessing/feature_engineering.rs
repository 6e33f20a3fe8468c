//! Матрица признаков из очищенной таблицы

use ndarray::{Array1, Array2};

use crate::error::ModelError;
use crate::types::{Table, Value};

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Все колонки, кроме целевой
    pub fn feature_columns(table: &Table, target_column: &str) -> Vec<String> {
        table
            .columns
            .iter()
            .filter(|c| c.as_str() != target_column)
            .cloned()
            .collect()
    }

    /// Признаки в порядке `feature_columns`; все ячейки должны быть числами
    pub fn extract_features(
        table: &Table,
        feature_columns: &[String],
    ) -> Result<Array2<f64>, ModelError> {
        let indices = feature_columns
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .ok_or_else(|| ModelError::UnknownColumn(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut features = Array2::zeros((table.len(), indices.len()));
        for (i, row) in table.rows.iter().enumerate() {
            for (j, &idx) in indices.iter().enumerate() {
                features[[i, j]] = numeric(&row[idx], &feature_columns[j], i)?;
            }
        }

        Ok(features)
    }

    pub fn extract_target(table: &Table, target_column: &str) -> Result<Array1<f64>, ModelError> {
        let idx = table
            .column_index(target_column)
            .ok_or_else(|| ModelError::UnknownColumn(target_column.to_string()))?;

        table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| numeric(&row[idx], target_column, i))
            .collect()
    }

    /// Признаки и целевая переменная одной операцией
    pub fn extract(
        table: &Table,
        target_column: &str,
        feature_columns: &[String],
    ) -> Result<(Array2<f64>, Array1<f64>), ModelError> {
        if table.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        table.validate()?;

        let features = Self::extract_features(table, feature_columns)?;
        let targets = Self::extract_target(table, target_column)?;
        Ok((features, targets))
    }
}

fn numeric(value: &Value, column: &str, row: usize) -> Result<f64, ModelError> {
    value.as_f64().ok_or_else(|| ModelError::NonNumeric {
        column: column.to_string(),
        row,
        value: value.clone(),
    })
}
