//! Tabular input: turning delimited rows into typed jobs and machines.
//!
//! Rows are looked up by column name, so the same parsing path serves CSV
//! files and string maps handed over from Python. Errors carry the table
//! name and the 1-based data row that failed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::fs::File;
use std::hash::BuildHasher;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::CsvConfig;
use crate::models::{Job, Machine};

pub const JOBS_TABLE: &str = "jobs";
pub const MACHINES_TABLE: &str = "machines";

/// Columns every jobs table must carry.
pub const JOB_COLUMNS: [&str; 7] = [
    "job_id",
    "job_type",
    "required_machine_type",
    "priority",
    "due_date",
    "setup_time",
    "processing_time",
];

/// Columns every machines table must carry.
pub const MACHINE_COLUMNS: [&str; 3] = ["machine_id", "machine_type", "available_at"];

/// Datetime layouts accepted for timestamp cells, tried in order.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts; these resolve to midnight.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Errors raised while reading input tables.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("{table} table is missing required column `{field}`")]
    MissingColumn { table: &'static str, field: String },
    #[error("{table} row {row} is missing required field `{field}`")]
    MissingField {
        table: &'static str,
        row: usize,
        field: String,
    },
    #[error("{table} row {row}: cannot parse `{field}` value {value:?}: {reason}")]
    Parse {
        table: &'static str,
        row: usize,
        field: String,
        value: String,
        reason: String,
    },
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed delimited input: {0}")]
    Csv(#[from] csv::Error),
}

impl InputError {
    /// True for a missing column or field, as opposed to a bad value.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::MissingColumn { .. } | Self::MissingField { .. })
    }
}

/// A single input row whose cells can be looked up by column name.
pub trait Record {
    fn field(&self, name: &str) -> Option<&str>;
}

impl<S: BuildHasher> Record for HashMap<String, String, S> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(|v| v.as_str())
    }
}

/// A CSV row paired with its header positions.
struct CsvRow<'a> {
    columns: &'a FxHashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl Record for CsvRow<'_> {
    fn field(&self, name: &str) -> Option<&str> {
        self.columns
            .get(name)
            .and_then(|&idx| self.record.get(idx))
    }
}

/// Parse a timestamp cell.
///
/// Accepts ISO-like datetimes with a space or `T` separator (seconds and
/// fractions optional), slash-separated dates, bare dates (midnight) and
/// RFC 3339 with an offset (converted to UTC).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("empty value".to_string());
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.naive_utc());
    }

    Err("unrecognized timestamp format".to_string())
}

/// Parse a numeric priority (integers and fractions alike).
fn parse_priority(raw: &str) -> Result<f64, String> {
    let priority = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if priority.is_nan() {
        return Err("priority must be a number".to_string());
    }
    Ok(priority)
}

/// Parse a duration in hours. Sign is checked by the scheduler, not here.
fn parse_hours(raw: &str) -> Result<f64, String> {
    let hours = raw.trim().parse::<f64>().map_err(|e| e.to_string())?;
    if !hours.is_finite() {
        return Err("hours must be a finite number".to_string());
    }
    Ok(hours)
}

/// Field accessor bound to one row, so each lookup reports the same location.
struct RowReader<'a, R: Record + ?Sized> {
    record: &'a R,
    table: &'static str,
    row: usize,
}

impl<'a, R: Record + ?Sized> RowReader<'a, R> {
    fn text(&self, field: &str) -> Result<&'a str, InputError> {
        self.record
            .field(field)
            .ok_or_else(|| InputError::MissingField {
                table: self.table,
                row: self.row,
                field: field.to_string(),
            })
    }

    fn parsed<T>(
        &self,
        field: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T, InputError> {
        let raw = self.text(field)?;
        parse(raw).map_err(|reason| InputError::Parse {
            table: self.table,
            row: self.row,
            field: field.to_string(),
            value: raw.to_string(),
            reason,
        })
    }
}

impl Job {
    /// Build a job from one input row (`row` is 1-based, used in errors).
    pub fn from_record<R: Record + ?Sized>(record: &R, row: usize) -> Result<Self, InputError> {
        let reader = RowReader {
            record,
            table: JOBS_TABLE,
            row,
        };
        Ok(Self {
            job_id: reader.text("job_id")?.trim().to_string(),
            job_type: reader.text("job_type")?.trim().to_string(),
            required_machine_type: reader.text("required_machine_type")?.trim().to_string(),
            priority: reader.parsed("priority", parse_priority)?,
            due_date: reader.parsed("due_date", parse_timestamp)?,
            setup_time: reader.parsed("setup_time", parse_hours)?,
            processing_time: reader.parsed("processing_time", parse_hours)?,
        })
    }
}

impl Machine {
    /// Build a machine from one input row (`row` is 1-based, used in errors).
    pub fn from_record<R: Record + ?Sized>(record: &R, row: usize) -> Result<Self, InputError> {
        let reader = RowReader {
            record,
            table: MACHINES_TABLE,
            row,
        };
        Ok(Self {
            machine_id: reader.text("machine_id")?.trim().to_string(),
            machine_type: reader.text("machine_type")?.trim().to_string(),
            available_at: reader.parsed("available_at", parse_timestamp)?,
        })
    }
}

/// Parse a slice of string-keyed rows into jobs.
pub fn parse_jobs<R: Record>(records: &[R]) -> Result<Vec<Job>, InputError> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| Job::from_record(r, i + 1))
        .collect()
}

/// Parse a slice of string-keyed rows into machines.
pub fn parse_machines<R: Record>(records: &[R]) -> Result<Vec<Machine>, InputError> {
    records
        .iter()
        .enumerate()
        .map(|(i, r)| Machine::from_record(r, i + 1))
        .collect()
}

/// Read a delimited table, checking the header before any row is parsed.
fn read_table<T, F>(
    reader: impl Read,
    config: &CsvConfig,
    table: &'static str,
    required: &[&str],
    parse_row: F,
) -> Result<Vec<T>, InputError>
where
    F: Fn(&CsvRow<'_>, usize) -> Result<T, InputError>,
{
    // Short rows are read as-is; absent cells surface as MissingField.
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns: FxHashMap<String, usize> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.to_string(), idx))
        .collect();

    if let Some(missing) = required.iter().find(|c| !columns.contains_key(**c)) {
        return Err(InputError::MissingColumn {
            table,
            field: missing.to_string(),
        });
    }

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = CsvRow {
            columns: &columns,
            record: &record,
        };
        rows.push(parse_row(&row, idx + 1)?);
    }
    Ok(rows)
}

/// Read jobs from delimited text with a header row.
pub fn read_jobs_csv(reader: impl Read, config: &CsvConfig) -> Result<Vec<Job>, InputError> {
    read_table(reader, config, JOBS_TABLE, &JOB_COLUMNS, |row, n| {
        Job::from_record(row, n)
    })
}

/// Read machines from delimited text with a header row.
pub fn read_machines_csv(
    reader: impl Read,
    config: &CsvConfig,
) -> Result<Vec<Machine>, InputError> {
    read_table(reader, config, MACHINES_TABLE, &MACHINE_COLUMNS, |row, n| {
        Machine::from_record(row, n)
    })
}

fn open(path: &Path) -> Result<File, InputError> {
    File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Read jobs from a CSV file.
pub fn read_jobs_file(path: impl AsRef<Path>, config: &CsvConfig) -> Result<Vec<Job>, InputError> {
    read_jobs_csv(open(path.as_ref())?, config)
}

/// Read machines from a CSV file.
pub fn read_machines_file(
    path: impl AsRef<Path>,
    config: &CsvConfig,
) -> Result<Vec<Machine>, InputError> {
    read_machines_csv(open(path.as_ref())?, config)
}
