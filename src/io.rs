//! Чтение и запись таблиц в CSV

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use crate::error::StorageError;
use crate::types::{Table, Value};

/// Первая строка - заголовок; пустые ячейки становятся пропусками
pub fn read_csv<R: Read>(reader: R) -> Result<Table, StorageError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != table.columns.len() {
            return Err(StorageError::RaggedRow {
                row: i + 1,
                expected: table.columns.len(),
                actual: record.len(),
            });
        }
        table.rows.push(record.iter().map(Value::from_raw).collect());
    }

    Ok(table)
}

pub fn load_csv(path: &Path) -> Result<Table, StorageError> {
    let table = read_csv(File::open(path)?)?;
    tracing::info!("Loaded {} rows, {} columns from {}", table.len(), table.columns.len(), path.display());
    Ok(table)
}

pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), StorageError> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_csv(table: &Table, path: &Path) -> Result<(), StorageError> {
    write_csv(table, File::create(path)?)?;
    tracing::info!("Saved {} rows to {}", table.len(), path.display());
    Ok(())
}
