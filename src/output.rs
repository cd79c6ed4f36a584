//! Output sinks for converted rows
//!
//! Two formats are supported: delimited text (CSV) and a JSON array. Both
//! take the header row first, when there is one, then one call per
//! converted row, and must be finished once all rows are written.

use crate::error::{ConversionError, Result};
use serde_json::{Map, Value};
use std::io::Write;

/// Destination of converted rows
pub trait RowSink {
    /// Column headers, called at most once and before any row
    fn write_header(&mut self, headers: &[String]) -> Result<()>;

    /// Emit one converted row
    fn write_row(&mut self, row: &[String]) -> Result<()>;

    /// Complete the output after the last row
    fn finish(&mut self) -> Result<()>;
}

/// CSV output
pub struct DelimitedSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DelimitedSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().flexible(true).from_writer(inner),
        }
    }

    /// Finish writing and return the inner writer
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| ConversionError::Io(e.into_error()))
    }
}

impl<W: Write> RowSink for DelimitedSink<W> {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        self.write_row(headers)
    }

    fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.writer.write_record(row)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON array output.
///
/// Rows become objects keyed by header when headers were given, arrays
/// otherwise. With headers, every row must have exactly one cell per header.
///
/// Nothing is written until the first row or [`RowSink::finish`], so a run
/// that fails before any row leaves the writer untouched.
pub struct JsonArraySink<W: Write> {
    inner: W,
    headers: Option<Vec<String>>,
    opened: bool,
    rows: usize,
}

impl<W: Write> JsonArraySink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            headers: None,
            opened: false,
            rows: 0,
        }
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn open(&mut self) -> Result<()> {
        if !self.opened {
            self.inner.write_all(b"[")?;
            self.opened = true;
        }
        Ok(())
    }

    fn element(&self, row: &[String]) -> Result<Value> {
        match &self.headers {
            Some(headers) if headers.len() != row.len() => Err(ConversionError::RowWidth {
                labels: headers.len(),
                cells: row.len(),
            }),
            Some(headers) => {
                let object: Map<String, Value> = headers
                    .iter()
                    .zip(row)
                    .map(|(h, cell)| (h.clone(), Value::String(cell.clone())))
                    .collect();
                Ok(Value::Object(object))
            }
            None => Ok(Value::Array(row.iter().cloned().map(Value::String).collect())),
        }
    }
}

impl<W: Write> RowSink for JsonArraySink<W> {
    fn write_header(&mut self, headers: &[String]) -> Result<()> {
        if !headers.is_empty() {
            self.headers = Some(headers.to_vec());
        }
        Ok(())
    }

    fn write_row(&mut self, row: &[String]) -> Result<()> {
        let element = self.element(row)?;
        self.open()?;
        if self.rows > 0 {
            self.inner.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.inner, &element)?;
        self.inner.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.open()?;
        self.inner.write_all(b"]")?;
        self.inner.flush()?;
        Ok(())
    }
}
