//! CSV result writer.
//!
//! Columns always follow the [`OutputSchema`]; record fields outside the schema
//! are dropped and absent fields are written empty.

use crate::client::Record;
use crate::error::{Result, WosError};
use crate::schema::OutputSchema;
use std::io::Write;

/// Schema-driven CSV writer over any output stream
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
    schema: OutputSchema,
    rows: usize,
}

impl<W: Write> ResultWriter<W> {
    /// Create a writer and emit the header row.
    pub fn new(output: W, schema: OutputSchema) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(output);
        writer.write_record(schema.fields())?;

        Ok(Self {
            writer,
            schema,
            rows: 0,
        })
    }

    /// Data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Write one row for a record.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        let row = self
            .schema
            .fields()
            .iter()
            .map(|field| record.get(field).map(value_to_string).unwrap_or_default());
        self.writer.write_record(row)?;
        self.rows += 1;
        Ok(())
    }

    /// Write a batch of records and flush, so completed batches survive a later abort.
    pub fn write_batch(&mut self, records: &[Record]) -> Result<()> {
        for record in records {
            self.write_record(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and return the underlying stream.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| WosError::Io(e.into_error()))
    }
}

/// Render a JSON scalar as a CSV cell.
pub fn value_to_string(val: &serde_json::Value) -> String {
    match val {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        _ => val.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn output(writer: ResultWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_only() {
        let writer = ResultWriter::new(Vec::new(), OutputSchema::default()).unwrap();
        let text = output(writer);
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("ISI_LOC,ARTICLE_TYPE,TOT_CITES,"));
        assert!(text.trim_end().ends_with(",OA_FLAG,RNUM"));
    }

    #[test]
    fn test_sparse_and_full_records_align() {
        let schema = OutputSchema::default();
        let full: serde_json::Map<_, _> = schema
            .fields()
            .iter()
            .map(|f| (f.clone(), json!(format!("v_{}", f))))
            .collect();
        let sparse = record(json!({"ISI_LOC": "A1", "TOT_CITES": 12}));

        let mut writer = ResultWriter::new(Vec::new(), schema).unwrap();
        writer.write_batch(&[sparse, full]).unwrap();
        assert_eq!(writer.rows(), 2);

        let text = output(writer);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(first.len(), 16);
        assert_eq!(first[0], "A1");
        assert_eq!(first[2], "12");
        assert_eq!(first.iter().filter(|v| v.is_empty()).count(), 14);

        let second: Vec<&str> = lines[2].split(',').collect();
        assert_eq!(second.len(), 16);
        assert!(second.iter().all(|v| v.starts_with("v_")));
    }

    #[test]
    fn test_unknown_fields_ignored_and_order_fixed() {
        let schema = OutputSchema::new(["TOT_CITES", "ISI_LOC"]).unwrap();
        let mut writer = ResultWriter::new(Vec::new(), schema).unwrap();
        writer
            .write_record(&record(json!({"ISI_LOC": "A9", "EXTRA": "x", "TOT_CITES": 3})))
            .unwrap();
        assert_eq!(output(writer), "TOT_CITES,ISI_LOC\n3,A9\n");
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&json!("Q1")), "Q1");
        assert_eq!(value_to_string(&json!(1.5)), "1.5");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(null)), "");
        assert_eq!(value_to_string(&json!([1, 2])), "[1,2]");
    }
}
