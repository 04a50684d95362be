//! Writing schedules back out as delimited text.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::config::CsvConfig;
use crate::models::ScheduleEntry;

/// File name the schedule is saved under when the caller gives none.
pub const DEFAULT_OUTPUT_FILE: &str = "final_schedule_ai.csv";

/// Errors raised while writing a schedule.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("invalid timestamp format {0:?}")]
    TimestampFormat(String),
    #[error("failed to write schedule: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write schedule: {0}")]
    Io(#[from] std::io::Error),
}

/// One output row; column order follows field order.
#[derive(Serialize)]
struct ScheduleRow<'a> {
    job_id: &'a str,
    job_type: &'a str,
    machine_id: &'a str,
    machine_type: &'a str,
    start_time: String,
    end_time: String,
    due_date: String,
    delay_hours: f64,
}

/// Format a timestamp, reporting a bad format string instead of panicking.
pub fn format_timestamp(ts: NaiveDateTime, format: &str) -> Result<String, ExportError> {
    let mut out = String::new();
    write!(out, "{}", ts.format(format))
        .map_err(|_| ExportError::TimestampFormat(format.to_string()))?;
    Ok(out)
}

/// Write entries (header first) to any writer.
pub fn write_schedule_csv<W: Write>(
    writer: W,
    entries: &[ScheduleEntry],
    config: &CsvConfig,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(config.delimiter_byte())
        .has_headers(true)
        .from_writer(writer);

    if entries.is_empty() {
        // serde only emits the header together with the first row
        csv_writer.write_record([
            "job_id",
            "job_type",
            "machine_id",
            "machine_type",
            "start_time",
            "end_time",
            "due_date",
            "delay_hours",
        ])?;
    }

    let format = config.timestamp_format.as_str();
    for entry in entries {
        csv_writer.serialize(ScheduleRow {
            job_id: &entry.job_id,
            job_type: &entry.job_type,
            machine_id: &entry.machine_id,
            machine_type: &entry.machine_type,
            start_time: format_timestamp(entry.start_time, format)?,
            end_time: format_timestamp(entry.end_time, format)?,
            due_date: format_timestamp(entry.due_date, format)?,
            delay_hours: entry.delay_hours,
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write entries to a file, replacing it if present.
pub fn write_schedule_file(
    path: impl AsRef<Path>,
    entries: &[ScheduleEntry],
    config: &CsvConfig,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    write_schedule_csv(file, entries, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn sample() -> Vec<ScheduleEntry> {
        vec![ScheduleEntry {
            job_id: "J1".to_string(),
            job_type: "Milling".to_string(),
            machine_id: "M1".to_string(),
            machine_type: "CNC".to_string(),
            start_time: at(8, 30),
            end_time: at(10, 0),
            due_date: at(9, 0),
            delay_hours: 1.0,
        }]
    }

    fn render(entries: &[ScheduleEntry], config: &CsvConfig) -> String {
        let mut buf = Vec::new();
        write_schedule_csv(&mut buf, entries, config).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_and_row() {
        let text = render(&sample(), &CsvConfig::default());
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("job_id,job_type,machine_id,machine_type,start_time,end_time,due_date,delay_hours")
        );
        assert_eq!(
            lines.next(),
            Some("J1,Milling,M1,CNC,2025-01-06 08:30:00,2025-01-06 10:00:00,2025-01-06 09:00:00,1.0")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_schedule_still_has_header() {
        let text = render(&[], &CsvConfig::default());
        assert_eq!(
            text.trim_end(),
            "job_id,job_type,machine_id,machine_type,start_time,end_time,due_date,delay_hours"
        );
    }

    #[test]
    fn test_custom_delimiter_and_format() {
        let config = CsvConfig {
            delimiter: ';',
            timestamp_format: "%d.%m.%Y %H:%M".to_string(),
        };
        let text = render(&sample(), &config);
        assert!(text.contains("J1;Milling;M1;CNC;06.01.2025 08:30;06.01.2025 10:00;"));
    }

    #[test]
    fn test_bad_timestamp_format() {
        let err = format_timestamp(at(8, 0), "%Y %!").unwrap_err();
        assert!(matches!(err, ExportError::TimestampFormat(_)));
    }

    #[test]
    fn test_written_timestamps_read_back() {
        // 0.001 h of setup puts the start 3.6 s past the hour
        let start = at(8, 0) + chrono::Duration::milliseconds(3_600);
        let mut entries = sample();
        entries[0].start_time = start;
        entries[0].end_time = start + chrono::Duration::microseconds(250);

        let text = render(&entries, &CsvConfig::default());
        let fields: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        assert_eq!(fields[4], "2025-01-06 08:00:03.600");
        assert_eq!(fields[5], "2025-01-06 08:00:03.600250");
        assert_eq!(fields[6], "2025-01-06 09:00:00");

        let parse = crate::records::parse_timestamp;
        assert_eq!(parse(fields[4]).unwrap(), start);
        assert_eq!(parse(fields[5]).unwrap(), entries[0].end_time);
        assert_eq!(parse(fields[6]).unwrap(), at(9, 0));
    }
}
