//! Greedy job-to-machine scheduler for small machine shops.
//!
//! Jobs are ordered by priority then due date and each one is placed on the
//! earliest-available machine of its required type. The crate also reads and
//! writes the tabular job/machine/schedule formats and renders the result as
//! an SVG Gantt chart. Everything is exposed to Python through PyO3.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use std::collections::HashMap;
use std::path::PathBuf;

pub mod chart;
mod config;
pub mod export;
pub mod logging;
mod models;
pub mod records;
pub mod scheduler;
pub mod sorting;

pub use chart::{render_gantt_svg, ColorMap, GanttChart};
pub use config::{ChartConfig, CsvConfig, SchedulingConfig, DEFAULT_TIMESTAMP_FORMAT};
pub use export::{write_schedule_csv, write_schedule_file, ExportError, DEFAULT_OUTPUT_FILE};
pub use models::{Job, Machine, ScheduleEntry, ScheduleResult};
pub use records::{
    read_jobs_csv, read_jobs_file, read_machines_csv, read_machines_file, InputError, Record,
};
pub use scheduler::{schedule, GreedyScheduler, ScheduleSummary, SchedulerError};
pub use sorting::{sort_jobs, JobSortKey};

fn scheduler_error_to_py(err: SchedulerError) -> PyErr {
    match err {
        SchedulerError::Input(InputError::Open { .. }) => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn export_error_to_py(err: ExportError) -> PyErr {
    match err {
        ExportError::Io(_) => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Schedule jobs onto machines.
///
/// # Arguments
/// * `jobs` - Jobs to place; processed by (priority, due_date)
/// * `machines` - Candidate machines; their `available_at` is not modified
/// * `config` - Optional scheduling configuration (verbosity)
///
/// # Returns
/// * ScheduleResult with entries in processing order and the ids of jobs
///   that had no machine of the required type
///
/// # Raises
/// * ValueError if a duration is negative, a priority is NaN, or a computed
///   time overflows
#[pyfunction]
#[pyo3(signature = (jobs, machines, config=None))]
fn run_scheduler(
    jobs: Vec<Job>,
    machines: Vec<Machine>,
    config: Option<SchedulingConfig>,
) -> PyResult<ScheduleResult> {
    GreedyScheduler::new(config.unwrap_or_default())
        .schedule(&jobs, &machines)
        .map_err(scheduler_error_to_py)
}

/// Render each cell with `str()`; `None` cells are left out so they read as
/// missing fields.
fn cells_to_text(
    rows: Vec<HashMap<String, Bound<'_, PyAny>>>,
) -> PyResult<Vec<HashMap<String, String>>> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .filter(|(_, cell)| !cell.is_none())
                .map(|(key, cell)| Ok((key, cell.str()?.to_cow()?.into_owned())))
                .collect()
        })
        .collect()
}

/// Parse row mappings (e.g. `DataFrame.to_dict("records")`) and schedule them.
///
/// Cells may be any Python object; numbers and `Timestamp`s are read through
/// their `str()` form.
///
/// # Raises
/// * ValueError if a required field is missing or cannot be parsed
#[pyfunction]
#[pyo3(signature = (job_rows, machine_rows, config=None))]
fn schedule_records<'py>(
    job_rows: Vec<HashMap<String, Bound<'py, PyAny>>>,
    machine_rows: Vec<HashMap<String, Bound<'py, PyAny>>>,
    config: Option<SchedulingConfig>,
) -> PyResult<ScheduleResult> {
    let job_rows = cells_to_text(job_rows)?;
    let machine_rows = cells_to_text(machine_rows)?;
    GreedyScheduler::new(config.unwrap_or_default())
        .schedule_records(&job_rows, &machine_rows)
        .map_err(scheduler_error_to_py)
}

/// Read jobs and machines from CSV files and schedule them.
///
/// # Raises
/// * OSError if a file cannot be opened
/// * ValueError if a column is missing or a value cannot be parsed
#[pyfunction]
#[pyo3(signature = (jobs_path, machines_path, config=None, csv_config=None))]
fn schedule_csv(
    jobs_path: PathBuf,
    machines_path: PathBuf,
    config: Option<SchedulingConfig>,
    csv_config: Option<CsvConfig>,
) -> PyResult<ScheduleResult> {
    GreedyScheduler::new(config.unwrap_or_default())
        .schedule_files(jobs_path, machines_path, &csv_config.unwrap_or_default())
        .map_err(scheduler_error_to_py)
}

/// Save schedule entries as CSV (defaults to `final_schedule_ai.csv`).
#[pyfunction]
#[pyo3(name = "write_schedule_csv", signature = (entries, path=None, csv_config=None))]
fn py_write_schedule_csv(
    entries: Vec<ScheduleEntry>,
    path: Option<PathBuf>,
    csv_config: Option<CsvConfig>,
) -> PyResult<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
    write_schedule_file(&path, &entries, &csv_config.unwrap_or_default())
        .map_err(export_error_to_py)
}

/// Render schedule entries as an SVG Gantt chart string.
#[pyfunction]
#[pyo3(name = "render_gantt_svg", signature = (entries, config=None))]
fn py_render_gantt_svg(entries: Vec<ScheduleEntry>, config: Option<ChartConfig>) -> String {
    render_gantt_svg(&entries, &config.unwrap_or_default())
}

/// The smart_scheduler.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Job>()?;
    m.add_class::<Machine>()?;
    m.add_class::<ScheduleEntry>()?;
    m.add_class::<ScheduleResult>()?;
    m.add_class::<ScheduleSummary>()?;

    // Config types
    m.add_class::<SchedulingConfig>()?;
    m.add_class::<CsvConfig>()?;
    m.add_class::<ChartConfig>()?;

    // Algorithms and I/O
    m.add_function(wrap_pyfunction!(run_scheduler, m)?)?;
    m.add_function(wrap_pyfunction!(schedule_records, m)?)?;
    m.add_function(wrap_pyfunction!(schedule_csv, m)?)?;
    m.add_function(wrap_pyfunction!(py_write_schedule_csv, m)?)?;
    m.add_function(wrap_pyfunction!(py_render_gantt_svg, m)?)?;

    Ok(())
}
