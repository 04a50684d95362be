//! Configuration types for scheduling, CSV I/O and chart rendering.

use pyo3::prelude::*;

/// Default timestamp format used when writing schedules.
///
/// `%.f` adds sub-second digits only when present, so whole-second times
/// stay `2025-01-06 08:30:00`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Matplotlib "tab10" palette, in order.
pub const TAB10_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Configuration for a scheduling run.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct SchedulingConfig {
    /// Logging verbosity (0 = silent, 1 = changes, 2 = checks, 3 = debug)
    #[pyo3(get, set)]
    pub verbosity: u8,
}

#[pymethods]
impl SchedulingConfig {
    #[new]
    #[pyo3(signature = (verbosity=None))]
    fn new(verbosity: Option<u8>) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!("SchedulingConfig(verbosity={})", self.verbosity)
    }
}

/// Delimited-text settings shared by the readers and the writer.
#[pyclass]
#[derive(Clone, Debug)]
pub struct CsvConfig {
    /// Field delimiter (single ASCII character)
    #[pyo3(get, set)]
    pub delimiter: char,
    /// chrono format string for timestamps in written schedules
    #[pyo3(get, set)]
    pub timestamp_format: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl CsvConfig {
    /// Delimiter as the byte the csv crate expects.
    ///
    /// Non-ASCII delimiters fall back to a comma.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }
}

#[pymethods]
impl CsvConfig {
    #[new]
    #[pyo3(signature = (delimiter=None, timestamp_format=None))]
    fn new(delimiter: Option<char>, timestamp_format: Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            delimiter: delimiter.unwrap_or(defaults.delimiter),
            timestamp_format: timestamp_format.unwrap_or(defaults.timestamp_format),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "CsvConfig(delimiter={:?}, timestamp_format={:?})",
            self.delimiter, self.timestamp_format
        )
    }
}

/// Layout settings for the Gantt chart.
#[pyclass]
#[derive(Clone, Debug)]
pub struct ChartConfig {
    /// Total SVG width in pixels
    #[pyo3(get, set)]
    pub width: f64,
    /// Height of one machine row in pixels
    #[pyo3(get, set)]
    pub row_height: f64,
    /// Fraction of the row height covered by a bar
    #[pyo3(get, set)]
    pub bar_height_ratio: f64,
    /// Chart title
    #[pyo3(get, set)]
    pub title: String,
    /// Colors assigned to job types in first-seen order (cycled)
    #[pyo3(get, set)]
    pub palette: Vec<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1400.0,
            row_height: 60.0,
            bar_height_ratio: 0.4,
            title: "Detailed Machine Scheduling Gantt Chart".to_string(),
            palette: TAB10_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[pymethods]
impl ChartConfig {
    #[new]
    #[pyo3(signature = (
        width=None,
        row_height=None,
        bar_height_ratio=None,
        title=None,
        palette=None
    ))]
    fn new(
        width: Option<f64>,
        row_height: Option<f64>,
        bar_height_ratio: Option<f64>,
        title: Option<String>,
        palette: Option<Vec<String>>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            width: width.unwrap_or(defaults.width),
            row_height: row_height.unwrap_or(defaults.row_height),
            bar_height_ratio: bar_height_ratio.unwrap_or(defaults.bar_height_ratio),
            title: title.unwrap_or(defaults.title),
            palette: palette
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.palette),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ChartConfig(width={}, row_height={}, title={:?})",
            self.width, self.row_height, self.title
        )
    }
}
