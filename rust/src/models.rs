//! Core data types for the scheduling system.

use chrono::NaiveDateTime;
use pyo3::prelude::*;

use crate::scheduler::ScheduleSummary;

/// A production job waiting for a machine.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Job {
    #[pyo3(get, set)]
    pub job_id: String,
    /// Category label, used for chart colors only
    #[pyo3(get, set)]
    pub job_type: String,
    #[pyo3(get, set)]
    pub required_machine_type: String,
    /// Lower values are scheduled first; any non-NaN number
    #[pyo3(get, set)]
    pub priority: f64,
    #[pyo3(get, set)]
    pub due_date: NaiveDateTime,
    /// Hours charged before processing starts
    #[pyo3(get, set)]
    pub setup_time: f64,
    /// Hours the job occupies the machine
    #[pyo3(get, set)]
    pub processing_time: f64,
}

#[pymethods]
impl Job {
    #[new]
    #[pyo3(signature = (
        job_id,
        job_type,
        required_machine_type,
        priority,
        due_date,
        setup_time=0.0,
        processing_time=0.0
    ))]
    pub fn new(
        job_id: String,
        job_type: String,
        required_machine_type: String,
        priority: f64,
        due_date: NaiveDateTime,
        setup_time: f64,
        processing_time: f64,
    ) -> Self {
        Self {
            job_id,
            job_type,
            required_machine_type,
            priority,
            due_date,
            setup_time,
            processing_time,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Job(job_id={:?}, required_machine_type={:?}, priority={}, due_date={})",
            self.job_id, self.required_machine_type, self.priority, self.due_date
        )
    }
}

/// A machine and the earliest moment it can begin its next setup.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct Machine {
    #[pyo3(get, set)]
    pub machine_id: String,
    #[pyo3(get, set)]
    pub machine_type: String,
    #[pyo3(get, set)]
    pub available_at: NaiveDateTime,
}

#[pymethods]
impl Machine {
    #[new]
    pub fn new(machine_id: String, machine_type: String, available_at: NaiveDateTime) -> Self {
        Self {
            machine_id,
            machine_type,
            available_at,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Machine(machine_id={:?}, machine_type={:?}, available_at={})",
            self.machine_id, self.machine_type, self.available_at
        )
    }
}

/// One job committed to one machine.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleEntry {
    #[pyo3(get)]
    pub job_id: String,
    #[pyo3(get)]
    pub job_type: String,
    #[pyo3(get)]
    pub machine_id: String,
    #[pyo3(get)]
    pub machine_type: String,
    #[pyo3(get)]
    pub start_time: NaiveDateTime,
    #[pyo3(get)]
    pub end_time: NaiveDateTime,
    #[pyo3(get)]
    pub due_date: NaiveDateTime,
    /// Hours by which end_time exceeds due_date, floored at zero
    #[pyo3(get)]
    pub delay_hours: f64,
}

#[pymethods]
impl ScheduleEntry {
    /// True when the job finishes after its due date.
    pub fn is_late(&self) -> bool {
        self.delay_hours > 0.0
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleEntry(job_id={:?}, machine_id={:?}, start={}, end={}, delay_hours={})",
            self.job_id, self.machine_id, self.start_time, self.end_time, self.delay_hours
        )
    }
}

/// Result of one scheduling run.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleResult {
    /// Entries in processing order (sorted job order)
    #[pyo3(get)]
    pub entries: Vec<ScheduleEntry>,
    /// Jobs with no machine of the required type, in processing order
    #[pyo3(get)]
    pub unscheduled_job_ids: Vec<String>,
}

#[pymethods]
impl ScheduleResult {
    /// Delay and utilization figures for this run.
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary::calculate(self)
    }

    fn __len__(&self) -> usize {
        self.entries.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(entries={}, unscheduled={})",
            self.entries.len(),
            self.unscheduled_job_ids.len()
        )
    }
}
