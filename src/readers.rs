/// Record readers for query test data.
///
/// A reader turns a data file into an ordered list of records, capped at a
/// maximum count (`0` means no cap).
use std::fs;
use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::errors::LyticsError;
use crate::models::Record;

/// Reads records from a file.
pub trait RecordReader {
    fn read_records(&self, path: &Path, max_records: usize) -> Result<Vec<Record>, LyticsError>;
}

/// CSV with a header row; every value is read as a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRecordReader;

impl RecordReader for CsvRecordReader {
    fn read_records(&self, path: &Path, max_records: usize) -> Result<Vec<Record>, LyticsError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_path(path)?;
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            if max_records > 0 && records.len() >= max_records {
                break;
            }
            let row = row?;
            let record: Record = headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            records.push(record);
        }
        debug!(
            "readers.csv path={} records={}",
            path.display(),
            records.len()
        );
        Ok(records)
    }
}

/// JSON holding either one object or an array of objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordReader;

impl RecordReader for JsonRecordReader {
    fn read_records(&self, path: &Path, max_records: usize) -> Result<Vec<Record>, LyticsError> {
        let text = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&text)?;
        let items = match value {
            Value::Object(record) => vec![Value::Object(record)],
            Value::Array(items) => items,
            other => {
                return Err(LyticsError::JsonError(format!(
                    "expected an object or an array of objects, found {}",
                    json_type(&other)
                )))
            }
        };

        let limit = if max_records == 0 { items.len() } else { max_records };
        let mut records = Vec::new();
        for (i, item) in items.into_iter().take(limit).enumerate() {
            match item {
                Value::Object(record) => records.push(record),
                other => {
                    return Err(LyticsError::JsonError(format!(
                        "item {i} is {}, expected an object",
                        json_type(&other)
                    )))
                }
            }
        }
        debug!(
            "readers.json path={} records={}",
            path.display(),
            records.len()
        );
        Ok(records)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Pick a reader from the file extension (`csv` or `json`, case-insensitive).
pub fn reader_for_path(path: &Path) -> Option<Box<dyn RecordReader>> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(Box::new(CsvRecordReader)),
        "json" => Some(Box::new(JsonRecordReader)),
        _ => None,
    }
}

/// Read records from a CSV or JSON file.
pub fn read_records(path: &Path, max_records: usize) -> Result<Vec<Record>, LyticsError> {
    let reader = reader_for_path(path).ok_or_else(|| {
        LyticsError::invalid_argument(format!(
            "File type is not supported: {}",
            path.display()
        ))
    })?;
    reader.read_records(path, max_records)
}
