//! Типы данных для пайплайна очистки и ML модуля

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Значение одной ячейки таблицы.
///
/// В JSON представляется без тега: число, строка или `null` (пропуск).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Ячейка из сырого текста выгрузки: пустая строка считается пропуском
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Value::Missing
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Числовое значение для матрицы признаков
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
            Value::Missing => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Таблица объявлений: упорядоченные колонки и строки одинаковой длины
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Каждая строка должна содержать по ячейке на колонку
    pub fn validate(&self) -> Result<(), PipelineError> {
        match self
            .rows
            .iter()
            .position(|row| row.len() != self.columns.len())
        {
            Some(row) => Err(PipelineError::RaggedRow {
                row,
                expected: self.columns.len(),
                actual: self.rows[row].len(),
            }),
            None => Ok(()),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Индекс обязательной колонки или SchemaError
    pub fn require_column(&self, name: &str) -> Result<usize, PipelineError> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::Schema {
                column: name.to_string(),
            })
    }

    /// Значения одной колонки по порядку строк
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>, PipelineError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Различные текстовые значения колонки, отсортированные
    pub fn distinct_text(&self, name: &str) -> Result<BTreeSet<String>, PipelineError> {
        let idx = self.require_column(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row[idx].to_string())
            .collect())
    }

    /// Проекция на заданные колонки в заданном порядке
    pub fn select(&self, names: &[&str]) -> Result<Table, PipelineError> {
        let indices = names
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            columns: names.iter().map(|n| n.to_string()).collect(),
            rows,
        })
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<(), PipelineError> {
        let idx = self.require_column(from)?;
        self.columns[idx] = to.to_string();
        Ok(())
    }

    pub fn drop_columns(&mut self, names: &[&str]) -> Result<(), PipelineError> {
        let mut indices = names
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>, _>>()?;
        indices.sort_unstable();
        indices.dedup();

        for &idx in indices.iter().rev() {
            self.columns.remove(idx);
            for row in &mut self.rows {
                row.remove(idx);
            }
        }
        Ok(())
    }

    /// Добавление колонки в конец таблицы
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[Value]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }

    /// Оставляет строки, в которых значение колонки удовлетворяет предикату
    pub fn retain_by<F>(&mut self, column: &str, mut keep: F) -> Result<(), PipelineError>
    where
        F: FnMut(&Value) -> bool,
    {
        let idx = self.require_column(column)?;
        self.rows.retain(|row| keep(&row[idx]));
        Ok(())
    }

    /// Преобразование значений колонки; ошибка на любой строке прерывает операцию.
    /// Замыкание получает номер строки для диагностики.
    pub fn try_map_column<F>(&mut self, column: &str, mut f: F) -> Result<(), PipelineError>
    where
        F: FnMut(usize, &Value) -> Result<Value, PipelineError>,
    {
        let idx = self.require_column(column)?;
        let mapped = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| f(i, &row[idx]))
            .collect::<Result<Vec<_>, _>>()?;

        for (row, value) in self.rows.iter_mut().zip(mapped) {
            row[idx] = value;
        }
        Ok(())
    }

    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> Result<(), PipelineError>
    where
        F: FnMut(&Value) -> Value,
    {
        self.try_map_column(column, |_, v| Ok(f(v)))
    }
}

/// Опции очистки
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanOptions {
    #[serde(default)]
    pub one_hot_encode: bool,
    #[serde(default)]
    pub binarize_doors: bool,
}

/// Статистика одного этапа очистки
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: String,
    pub rows_in: usize,
    pub rows_out: usize,
}

impl StageReport {
    pub fn dropped(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub stages: Vec<StageReport>,
}

impl CleaningReport {
    pub fn total_dropped(&self) -> usize {
        self.stages.iter().map(StageReport::dropped).sum()
    }
}

/// Гиперпараметры модели: имя -> значение
pub type Params = BTreeMap<String, f64>;

/// Сетка поиска: имя -> кандидаты
pub type ParamGrid = BTreeMap<String, Vec<f64>>;

/// Описание модели в запросе на обучение
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EstimatorSpec {
    Ridge {
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
    Linear {
        #[serde(default = "default_fit_intercept")]
        fit_intercept: bool,
    },
    Tree {
        #[serde(default = "default_max_depth")]
        max_depth: usize,
        #[serde(default = "default_min_samples_split")]
        min_samples_split: usize,
    },
    Forest {
        #[serde(default = "default_n_estimators")]
        n_estimators: usize,
        #[serde(default = "default_max_depth")]
        max_depth: usize,
        #[serde(default = "default_min_samples_split")]
        min_samples_split: usize,
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

fn default_alpha() -> f64 { 1.0 }
fn default_fit_intercept() -> bool { true }
fn default_max_depth() -> usize { 10 }
fn default_min_samples_split() -> usize { 5 }
fn default_n_estimators() -> usize { 50 }
fn default_seed() -> u64 { 42 }
fn default_n_iter() -> usize { 10 }

/// Стратегия поиска гиперпараметров
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SearchStrategy {
    Grid,
    Random {
        #[serde(default = "default_n_iter")]
        n_iter: usize,
        #[serde(default = "default_seed")]
        seed: u64,
    },
    None,
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::Grid
    }
}

/// Метод отбора признаков
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMethod {
    #[serde(rename = "RFE", alias = "rfe")]
    Rfe,
    #[serde(rename = "feature_importance")]
    FeatureImportance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanRequest {
    pub table: Table,
    #[serde(default)]
    pub options: Option<CleanOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanResponse {
    pub table: Table,
    pub report: CleaningReport,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainRequest {
    pub table: Table,
    pub target_column: String,
    /// Если не задано, используются все колонки кроме целевой
    #[serde(default)]
    pub feature_columns: Option<Vec<String>>,
    pub estimator: EstimatorSpec,
    /// Число фолдов; по умолчанию из настроек сервиса
    #[serde(default)]
    pub folds: Option<usize>,
    #[serde(default)]
    pub search: SearchStrategy,
    #[serde(default)]
    pub param_grid: ParamGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainResponse {
    pub estimator: String,
    pub feature_columns: Vec<String>,
    pub best_params: Params,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub table: Table,
    pub target_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub mse: f64,
    pub predictions: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSelectionRequest {
    pub table: Table,
    pub target_column: String,
    pub method: SelectionMethod,
    #[serde(default)]
    pub n_features: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSelectionResponse {
    pub selected_features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec![Value::Int(1), Value::text("x"), Value::Missing],
                vec![Value::Int(2), Value::text("y"), Value::Float(0.5)],
            ],
        )
    }

    #[test]
    fn select_reorders_and_fails_on_unknown_column() {
        let table = sample();
        let selected = table.select(&["c", "a"]).unwrap();
        assert_eq!(selected.columns, vec!["c", "a"]);
        assert_eq!(selected.rows[1], vec![Value::Float(0.5), Value::Int(2)]);

        let err = table.select(&["a", "zzz"]).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column } if column == "zzz"));
    }

    #[test]
    fn validate_reports_first_short_row() {
        assert!(sample().validate().is_ok());

        let table: Table =
            serde_json::from_str(r#"{"columns": ["a", "b"], "rows": [[1, 2], ["Skoda"]]}"#).unwrap();
        assert!(matches!(
            table.validate(),
            Err(PipelineError::RaggedRow { row: 1, expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn drop_columns_keeps_rows_aligned() {
        let mut table = sample();
        table.drop_columns(&["c", "a"]).unwrap();
        assert_eq!(table.columns, vec!["b"]);
        assert_eq!(table.rows, vec![vec![Value::text("x")], vec![Value::text("y")]]);
    }

    #[test]
    fn value_json_is_untagged() {
        let row: Vec<Value> = serde_json::from_str(r#"[1, 2.5, "Tak", null]"#).unwrap();
        assert_eq!(
            row,
            vec![Value::Int(1), Value::Float(2.5), Value::text("Tak"), Value::Missing]
        );
    }

    #[test]
    fn from_raw_treats_empty_cell_as_missing() {
        assert_eq!(Value::from_raw(""), Value::Missing);
        assert_eq!(Value::from_raw("Tak"), Value::text("Tak"));
    }

    #[test]
    fn estimator_spec_uses_defaults() {
        let spec: EstimatorSpec = serde_json::from_str(r#"{"kind": "tree"}"#).unwrap();
        assert_eq!(
            spec,
            EstimatorSpec::Tree {
                max_depth: 10,
                min_samples_split: 5
            }
        );
    }

    #[test]
    fn unknown_selection_method_is_rejected() {
        assert!(serde_json::from_str::<SelectionMethod>(r#""RFE""#).is_ok());
        assert!(serde_json::from_str::<SelectionMethod>(r#""lasso""#).is_err());
    }
}
