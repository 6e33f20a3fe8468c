//! Очистка и нормализация полей объявлений.
//!
//! Очистка - это фиксированная последовательность этапов. Каждый этап
//! отбрасывает строки, не прошедшие проверку, и/или преобразует значения
//! своего поля. Отброшенная строка в последующие этапы не попадает.
//!
//! Ошибка разбора числа в полях, где формат гарантирован предыдущими
//! этапами, считается фатальной (`PipelineError::FatalData`). Исключение -
//! цена: нечисловая цена просто отбрасывает строку.
//!
//! Очистка однопроходная: справочники построены по польским значениям,
//! поэтому повторный запуск на уже очищенной таблице не поддерживается.

use crate::error::PipelineError;
use crate::preprocessing::encoding::one_hot_encode;
use crate::preprocessing::schema::*;
use crate::types::{CleanOptions, CleaningReport, StageReport, Table, Value};

type StageFn = fn(&mut Table, &CleanOptions) -> Result<(), PipelineError>;

/// Этапы в порядке выполнения
const STAGES: [(&str, StageFn); 18] = [
    ("housekeeping", drop_unused_columns),
    ("missing_values", drop_missing_values),
    ("brand", clean_brand),
    ("year_production", clean_year_production),
    ("mileage", clean_mileage),
    ("engine_capacity", clean_engine_capacity),
    ("fuel_type", clean_fuel_type),
    ("power", clean_power),
    ("gearbox", clean_gearbox),
    ("drive_type", clean_drive_type),
    ("body_type", clean_body_type),
    ("doors", clean_doors),
    ("color", clean_color),
    ("accident_free", clean_accident_free),
    ("condition", clean_condition),
    ("price", clean_price),
    ("currency", clean_currency),
    ("encoding", encode_categories),
];

/// Очистка таблицы после проекции
pub struct FieldCleaner {
    options: CleanOptions,
}

impl FieldCleaner {
    pub fn new(options: CleanOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    pub fn run(&self, projected: &Table) -> Result<(Table, CleaningReport), PipelineError> {
        projected.validate()?;
        for column in projected_columns() {
            projected.require_column(column)?;
        }

        let mut table = projected.clone();
        let mut report = CleaningReport::default();

        for (stage, apply) in STAGES {
            let rows_in = table.len();
            if let Err(e) = apply(&mut table, &self.options) {
                tracing::warn!("Cleaning aborted at stage '{}': {}", stage, e);
                return Err(e);
            }
            let rows_out = table.len();

            tracing::debug!("Stage '{}': {} -> {} rows", stage, rows_in, rows_out);
            report.stages.push(StageReport {
                stage: stage.to_string(),
                rows_in,
                rows_out,
            });
        }

        tracing::info!(
            "Cleaning finished: {} of {} rows kept, {} columns",
            table.len(),
            projected.len(),
            table.columns.len()
        );

        Ok((table, report))
    }
}

/// Очистка с отчетом отбрасывается, возвращается только таблица
pub fn clean_data(projected: &Table, options: &CleanOptions) -> Result<Table, PipelineError> {
    FieldCleaner::new(*options).run(projected).map(|(table, _)| table)
}

/// Удаляет единицу измерения и все пробелы: "120 000 km" -> "120000"
pub fn strip_unit(raw: &str, unit: &str) -> String {
    raw.replace(unit, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Целое из ячейки, при необходимости без единицы измерения
fn parse_int(column: &str, row: usize, value: &Value, unit: Option<&str>) -> Result<i64, PipelineError> {
    match value {
        Value::Int(v) => Ok(*v),
        Value::Float(v) if v.fract() == 0.0 && v.is_finite() => Ok(*v as i64),
        Value::Text(raw) => {
            let digits = match unit {
                Some(unit) => strip_unit(raw, unit),
                None => raw.trim().to_string(),
            };
            digits
                .parse::<i64>()
                .map_err(|_| PipelineError::fatal(column, row, value, "expected an integer"))
        }
        Value::Float(_) => Err(PipelineError::fatal(column, row, value, "expected an integer")),
        Value::Missing => Err(PipelineError::fatal(column, row, value, "unexpected missing value")),
    }
}

/// Цена: любое конечное число, иначе None
fn parse_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Int(v) => *v as f64,
        Value::Float(v) => *v,
        Value::Text(raw) => raw.trim().parse::<f64>().ok()?,
        Value::Missing => return None,
    };
    price.is_finite().then_some(price)
}

fn parse_int_column(table: &mut Table, column: &str, unit: Option<&str>) -> Result<(), PipelineError> {
    table.try_map_column(column, |row, value| {
        parse_int(column, row, value, unit).map(Value::Int)
    })
}

fn int_in(value: &Value, low_exclusive: i64, high_exclusive: i64) -> bool {
    value
        .as_i64()
        .map_or(false, |v| v > low_exclusive && v < high_exclusive)
}

/// Перевод по справочнику; значения вне справочника не меняются
fn remap(value: &Value, mapping: &[(&str, &'static str)]) -> Value {
    match value.as_str().and_then(|v| lookup(mapping, v)) {
        Some(target) => Value::text(target),
        None => value.clone(),
    }
}

fn is_mapping_key(value: &Value, mapping: &[(&str, &str)]) -> bool {
    value
        .as_str()
        .map_or(false, |v| mapping.iter().any(|(key, _)| *key == v))
}

fn is_mapping_target(value: &Value, mapping: &[(&str, &str)]) -> bool {
    value
        .as_str()
        .map_or(false, |v| mapping.iter().any(|(_, target)| *target == v))
}

fn drop_unused_columns(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.drop_columns(&UNUSED_COLUMNS)
}

fn drop_missing_values(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    let required: Vec<bool> = table.columns.iter().map(|c| c != ACCIDENT_FREE).collect();
    table.retain_rows(|row| {
        row.iter()
            .zip(&required)
            .all(|(value, &required)| !required || !value.is_missing())
    });
    Ok(())
}

fn clean_brand(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.retain_by(BRAND, |v| v.as_str().map_or(false, |b| BRANDS.contains(&b)))
}

fn clean_year_production(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    parse_int_column(table, YEAR_PRODUCTION, None)?;
    table.retain_by(YEAR_PRODUCTION, |v| int_in(v, MIN_YEAR_EXCLUSIVE, i64::MAX))
}

fn clean_mileage(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    parse_int_column(table, MILEAGE, Some(MILEAGE_UNIT))?;
    table.retain_by(MILEAGE, |v| int_in(v, -1, MAX_MILEAGE_EXCLUSIVE))
}

fn clean_engine_capacity(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    parse_int_column(table, ENGINE_CAPACITY, Some(ENGINE_CAPACITY_UNIT))
}

fn clean_fuel_type(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.retain_by(FUEL_TYPE, |v| {
        !matches!(v.as_str(), Some(fuel) if EXCLUDED_FUEL_TYPES.contains(&fuel))
    })
}

fn clean_power(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    parse_int_column(table, POWER, Some(POWER_UNIT))?;
    table.retain_by(POWER, |v| int_in(v, MIN_POWER_EXCLUSIVE, MAX_POWER_EXCLUSIVE))
}

fn clean_gearbox(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.map_column(GEARBOX, |v| {
        match v.as_str().and_then(|g| lookup(&GEARBOX_MAPPING, g)) {
            Some(flag) => Value::Int(flag),
            None => Value::Missing,
        }
    })?;
    // неизвестный тип коробки не может стать 0/1
    table.retain_by(GEARBOX, |v| !v.is_missing())?;
    table.rename_column(GEARBOX, AUTOMATIC_GEARBOX)
}

fn clean_drive_type(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.map_column(DRIVE_TYPE, |v| remap(v, &DRIVE_TYPE_MAPPING))
}

fn clean_body_type(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.map_column(BODY_TYPE, |v| remap(v, &BODY_TYPE_MAPPING))?;
    table.retain_by(BODY_TYPE, |v| is_mapping_target(v, &BODY_TYPE_MAPPING))
}

/// Число дверей всегда приводится к целому. При бинаризации остаются
/// машины не более чем с пятью дверьми: 2/3 -> 0, 4/5 -> 1, а 0 и 1
/// уже бинарны и проходят без изменений.
fn clean_doors(table: &mut Table, options: &CleanOptions) -> Result<(), PipelineError> {
    parse_int_column(table, DOORS, None)?;
    if !options.binarize_doors {
        return Ok(());
    }

    table.retain_by(DOORS, |v| v.as_i64().map_or(false, |d| d <= MAX_DOORS))?;
    table.try_map_column(DOORS, |row, v| match v.as_i64() {
        Some(2 | 3) => Ok(Value::Int(0)),
        Some(4 | 5) => Ok(Value::Int(1)),
        Some(0 | 1) => Ok(v.clone()),
        _ => Err(PipelineError::fatal(DOORS, row, v, "negative door count")),
    })?;
    table.rename_column(DOORS, DOORS_5)
}

fn clean_color(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.retain_by(COLOR, |v| is_mapping_key(v, &COLOR_MAPPING))?;
    table.map_column(COLOR, |v| remap(v, &COLOR_MAPPING))
}

fn clean_accident_free(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.try_map_column(ACCIDENT_FREE, |row, v| match v {
        Value::Text(flag) if flag == YES => Ok(Value::Int(1)),
        Value::Missing => Ok(Value::Int(0)),
        Value::Int(flag @ (0 | 1)) => Ok(Value::Int(*flag)),
        other => Err(PipelineError::fatal(ACCIDENT_FREE, row, other, "expected 'Tak' or empty")),
    })
}

fn clean_condition(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.retain_by(CONDITION, |v| is_mapping_key(v, &CONDITION_MAPPING))?;
    table.map_column(CONDITION, |v| remap(v, &CONDITION_MAPPING))
}

fn clean_price(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.map_column(PRICE, |v| parse_price(v).map_or(Value::Missing, Value::Float))?;
    table.retain_by(PRICE, |v| !v.is_missing())
}

fn clean_currency(table: &mut Table, _: &CleanOptions) -> Result<(), PipelineError> {
    table.retain_by(CURRENCY, |v| {
        v.as_str().map_or(false, |c| ACCEPTED_CURRENCIES.contains(&c))
    })?;

    let price_idx = table.require_column(PRICE)?;
    let currency_idx = table.require_column(CURRENCY)?;

    for row in &mut table.rows {
        let price = row[price_idx].as_f64().unwrap_or_default();
        let price = match row[currency_idx].as_str() {
            Some(EUR) => price * EUR_TO_PLN,
            _ => price,
        };
        row[price_idx] = Value::Int(price.trunc() as i64);
        row[currency_idx] = Value::text(PLN);
    }

    // цена после перевода в злотые должна быть положительной
    table.retain_by(PRICE, |v| v.as_i64().map_or(false, |p| p > 0))
}

fn encode_categories(table: &mut Table, options: &CleanOptions) -> Result<(), PipelineError> {
    if !options.one_hot_encode {
        return Ok(());
    }

    let mut encoded = one_hot_encode(table, &ENCODED_COLUMNS)?;
    // после нормализации валюта постоянна
    encoded.drop_columns(&[CURRENCY])?;
    *table = encoded;
    Ok(())
}
