//! One-hot кодирование категориальных полей (без первой категории)

use std::collections::BTreeSet;

use crate::error::PipelineError;
use crate::types::{Table, Value};

/// Имена индикаторных колонок поля: по одной на категорию, кроме
/// первой по сортировке (она остается неявной базовой категорией).
pub fn indicator_columns(field: &str, categories: &BTreeSet<String>) -> Vec<(String, String)> {
    categories
        .iter()
        .skip(1)
        .map(|category| {
            let name = format!("{}_{}", field, category).replace(' ', "_");
            (category.clone(), name)
        })
        .collect()
}

/// Раскладывает поля в индикаторы 0/1. Исходные колонки удаляются,
/// индикаторы добавляются в конец таблицы в порядке `fields`.
pub fn one_hot_encode(table: &Table, fields: &[&str]) -> Result<Table, PipelineError> {
    let mut indicators: Vec<(String, Vec<Value>)> = Vec::new();

    for field in fields {
        let idx = table.require_column(field)?;
        let categories = table.distinct_text(field)?;

        for (category, name) in indicator_columns(field, &categories) {
            let values = table
                .rows
                .iter()
                .map(|row| Value::Int(i64::from(row[idx].to_string() == category)))
                .collect();
            indicators.push((name, values));
        }

        tracing::debug!(
            "Encoded '{}': {} categories -> {} indicator columns",
            field,
            categories.len(),
            categories.len().saturating_sub(1)
        );
    }

    let mut encoded = table.clone();
    encoded.drop_columns(fields)?;
    for (name, values) in indicators {
        encoded.push_column(name, values);
    }

    Ok(encoded)
}
