//! Проекция сырой выгрузки на рабочую схему

use crate::error::PipelineError;
use crate::preprocessing::schema::{COLUMN_MAPPING, RIGHT_HAND_DRIVE, YES};
use crate::types::{Table, Value};

/// Отбор и переименование колонок выгрузки
pub struct ColumnProjector;

impl ColumnProjector {
    /// Убирает объявления с правым рулем, оставляет 19 колонок схемы
    /// в фиксированном порядке и переводит их имена на канонические.
    pub fn project(raw: &Table) -> Result<Table, PipelineError> {
        raw.validate()?;
        let rhd_idx = raw.require_column(RIGHT_HAND_DRIVE)?;
        let source: Vec<&str> = COLUMN_MAPPING.iter().map(|(src, _)| *src).collect();

        let mut left_hand = Table::new(raw.columns.clone());
        left_hand.rows = raw
            .rows
            .iter()
            .filter(|row| !matches!(&row[rhd_idx], Value::Text(v) if v == YES))
            .cloned()
            .collect();

        let mut projected = left_hand.select(&source)?;
        for (from, to) in COLUMN_MAPPING {
            projected.rename_column(from, to)?;
        }

        tracing::info!(
            "Projected {} of {} rows ({} right-hand drive)",
            projected.len(),
            raw.len(),
            raw.len() - projected.len()
        );

        Ok(projected)
    }
}

/// Сокращение для оркестратора
pub fn prepare_data(raw: &Table) -> Result<Table, PipelineError> {
    ColumnProjector::project(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::schema::projected_columns;

    fn raw_table(rows: Vec<Vec<Value>>) -> Table {
        let mut columns: Vec<String> = vec!["Oferta od".to_string()];
        columns.extend(COLUMN_MAPPING.iter().rev().map(|(src, _)| src.to_string()));
        columns.push(RIGHT_HAND_DRIVE.to_string());
        Table::from_rows(columns, rows)
    }

    fn row(rhd: Value) -> Vec<Value> {
        let mut cells = vec![Value::text("Osoby prywatnej")];
        cells.extend((0..19).map(|i| Value::Int(i)));
        cells.push(rhd);
        cells
    }

    #[test]
    fn drops_right_hand_drive_and_renames() {
        let raw = raw_table(vec![
            row(Value::text("Tak")),
            row(Value::Missing),
            row(Value::text("Nie")),
        ]);

        let projected = ColumnProjector::project(&raw).unwrap();

        assert_eq!(projected.len(), 2);
        assert_eq!(
            projected.columns,
            projected_columns().map(String::from).collect::<Vec<_>>()
        );
        // исходные колонки шли в обратном порядке
        assert_eq!(projected.rows[0][0], Value::Int(18));
        assert_eq!(projected.rows[0][18], Value::Int(0));
    }

    #[test]
    fn missing_source_column_is_schema_error() {
        let mut raw = raw_table(vec![row(Value::Missing)]);
        raw.drop_columns(&["Kolor"]).unwrap();

        let err = ColumnProjector::project(&raw).unwrap_err();
        assert!(matches!(err, PipelineError::Schema { ref column } if column == "Kolor"));
    }

    #[test]
    fn missing_rhd_column_is_schema_error() {
        let mut raw = raw_table(vec![]);
        raw.drop_columns(&[RIGHT_HAND_DRIVE]).unwrap();

        assert!(matches!(
            ColumnProjector::project(&raw),
            Err(PipelineError::Schema { .. })
        ));
    }

    #[test]
    fn short_row_is_rejected_before_projection() {
        let raw = raw_table(vec![row(Value::Missing), vec![Value::text("Skoda")]]);

        assert!(matches!(
            ColumnProjector::project(&raw),
            Err(PipelineError::RaggedRow { row: 1, expected: 21, actual: 1 })
        ));
    }
}
