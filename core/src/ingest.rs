//! Ingestion — pipe-delimited transaction extract to typed records.
//!
//! RULE: Records are produced lazily, one source row at a time.
//! The raw text is never held in memory as a whole.
//!
//! The first malformed row ends the stream with an error and nothing
//! after it is read. Callers propagate that error and write nothing.

use crate::{
    config::{ColumnMap, SourceConfig},
    error::{EtlError, EtlResult},
    types::{CustomerId, PartitionKey, ProductId, Quantity, SourceLine},
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub line: SourceLine,
    pub customer_id: CustomerId,
    pub product_id: ProductId,
    pub quantity_sold: Quantity,
    pub transaction_date: NaiveDate,
}

impl TransactionRecord {
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey {
            customer_id: self.customer_id,
            product_id: self.product_id.clone(),
        }
    }
}

/// Header positions of the mapped columns.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    customer_id: usize,
    product_id: usize,
    quantity_sold: usize,
    transaction_date: usize,
}

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord, names: &ColumnMap) -> EtlResult<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| EtlError::MissingColumn {
                    name: name.to_string(),
                })
        };
        Ok(Self {
            customer_id: find(&names.customer_id)?,
            product_id: find(&names.product_id)?,
            quantity_sold: find(&names.quantity_sold)?,
            transaction_date: find(&names.transaction_date)?,
        })
    }
}

pub struct TransactionReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    // None when the source has no header at all: the stream is empty.
    columns: Option<ColumnIndex>,
    names: ColumnMap,
    date_formats: Vec<String>,
    datetime_formats: Vec<String>,
    rows_read: u64,
    finished: bool,
}

impl TransactionReader<File> {
    /// Open a source file on disk.
    pub fn open(path: &str, config: &SourceConfig) -> EtlResult<Self> {
        let file = File::open(path)?;
        log::info!("ingest: reading {path}");
        Self::from_reader(file, config)
    }
}

impl<R: Read> TransactionReader<R> {
    pub fn from_reader(reader: R, config: &SourceConfig) -> EtlResult<Self> {
        let delimiter = u8::try_from(config.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(EtlError::InvalidDelimiter {
                delimiter: config.delimiter,
            })?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = if headers.is_empty() {
            log::warn!("ingest: source has no header row; treating it as empty");
            None
        } else {
            Some(ColumnIndex::resolve(&headers, &config.columns)?)
        };

        Ok(Self {
            records: csv_reader.into_records(),
            columns,
            names: config.columns.clone(),
            date_formats: config.date_formats.clone(),
            datetime_formats: config.datetime_formats.clone(),
            rows_read: 0,
            finished: false,
        })
    }

    /// Data rows consumed so far (header excluded).
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    fn parse_row(
        &self,
        columns: ColumnIndex,
        row: &csv::StringRecord,
        line: SourceLine,
    ) -> EtlResult<TransactionRecord> {
        let customer_raw = field(row, columns.customer_id, line, &self.names.customer_id)?;
        let customer_id = parse_integer(customer_raw, line, &self.names.customer_id)?;

        let product_id = field(row, columns.product_id, line, &self.names.product_id)?;
        if product_id.is_empty() {
            return Err(EtlError::MalformedField {
                line,
                column: self.names.product_id.clone(),
                value: String::new(),
                reason: "empty product code".into(),
            });
        }

        let quantity_raw = field(row, columns.quantity_sold, line, &self.names.quantity_sold)?;
        let quantity_sold = parse_integer(quantity_raw, line, &self.names.quantity_sold)?;

        let date_raw = field(row, columns.transaction_date, line, &self.names.transaction_date)?;
        let transaction_date = self.parse_date(date_raw, line)?;

        Ok(TransactionRecord {
            line,
            customer_id,
            product_id: product_id.to_string(),
            quantity_sold,
            transaction_date,
        })
    }

    fn parse_date(&self, raw: &str, line: SourceLine) -> EtlResult<NaiveDate> {
        let as_date = self
            .date_formats
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok());
        let date = as_date.or_else(|| {
            self.datetime_formats
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        });
        date.ok_or_else(|| EtlError::MalformedField {
            line,
            column: self.names.transaction_date.clone(),
            value: raw.to_string(),
            reason: "unrecognised date".into(),
        })
    }
}

fn field<'r>(
    row: &'r csv::StringRecord,
    idx: usize,
    line: SourceLine,
    column: &str,
) -> EtlResult<&'r str> {
    row.get(idx).ok_or_else(|| EtlError::MalformedField {
        line,
        column: column.to_string(),
        value: String::new(),
        reason: "field missing".into(),
    })
}

fn parse_integer(raw: &str, line: SourceLine, column: &str) -> EtlResult<i64> {
    raw.parse::<i64>().map_err(|e| EtlError::MalformedField {
        line,
        column: column.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

impl<R: Read> Iterator for TransactionReader<R> {
    type Item = EtlResult<TransactionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let Some(columns) = self.columns else {
            self.finished = true;
            return None;
        };

        let row = match self.records.next() {
            None => {
                self.finished = true;
                log::info!("ingest: read {} rows", self.rows_read());
                return None;
            }
            Some(Err(e)) => {
                self.finished = true;
                return Some(Err(e.into()));
            }
            Some(Ok(row)) => row,
        };

        self.rows_read += 1;
        // Header is line 1; fall back to a row count if the reader lost track.
        let line = row
            .position()
            .map(|p| p.line())
            .unwrap_or(self.rows_read + 1);

        let parsed = self.parse_row(columns, &row, line);
        if parsed.is_err() {
            self.finished = true;
        }
        Some(parsed)
    }
}
