//! Schedule quality figures computed from a finished run.

use chrono::NaiveDateTime;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::models::ScheduleResult;

use super::core::hours_between;

/// Delay and load figures for one schedule.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScheduleSummary {
    #[pyo3(get)]
    pub scheduled_count: usize,
    #[pyo3(get)]
    pub unscheduled_count: usize,
    /// Entries finishing after their due date
    #[pyo3(get)]
    pub late_count: usize,
    #[pyo3(get)]
    pub total_delay_hours: f64,
    #[pyo3(get)]
    pub max_delay_hours: f64,
    /// Earliest start across all entries
    #[pyo3(get)]
    pub makespan_start: Option<NaiveDateTime>,
    /// Latest end across all entries
    #[pyo3(get)]
    pub makespan_end: Option<NaiveDateTime>,
    /// Processing hours per machine id (setup is not included)
    #[pyo3(get)]
    pub busy_hours_by_machine: HashMap<String, f64>,
}

impl ScheduleSummary {
    pub fn calculate(result: &ScheduleResult) -> Self {
        let mut summary = Self {
            scheduled_count: result.entries.len(),
            unscheduled_count: result.unscheduled_job_ids.len(),
            ..Self::default()
        };

        for entry in &result.entries {
            if entry.delay_hours > 0.0 {
                summary.late_count += 1;
            }
            summary.total_delay_hours += entry.delay_hours;
            summary.max_delay_hours = summary.max_delay_hours.max(entry.delay_hours);

            summary.makespan_start = Some(match summary.makespan_start {
                Some(s) => s.min(entry.start_time),
                None => entry.start_time,
            });
            summary.makespan_end = Some(match summary.makespan_end {
                Some(e) => e.max(entry.end_time),
                None => entry.end_time,
            });

            *summary
                .busy_hours_by_machine
                .entry(entry.machine_id.clone())
                .or_insert(0.0) += hours_between(entry.start_time, entry.end_time);
        }

        summary
    }
}

#[pymethods]
impl ScheduleSummary {
    /// Hours between the earliest start and the latest end (0 when empty).
    pub fn makespan_hours(&self) -> f64 {
        match (self.makespan_start, self.makespan_end) {
            (Some(start), Some(end)) => hours_between(start, end),
            _ => 0.0,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScheduleSummary(scheduled={}, unscheduled={}, late={}, total_delay_hours={:.2})",
            self.scheduled_count, self.unscheduled_count, self.late_count, self.total_delay_hours
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScheduleEntry;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn entry(job: &str, machine: &str, start: u32, end: u32, delay: f64) -> ScheduleEntry {
        ScheduleEntry {
            job_id: job.to_string(),
            job_type: "T".to_string(),
            machine_id: machine.to_string(),
            machine_type: "A".to_string(),
            start_time: at(start),
            end_time: at(end),
            due_date: at(end),
            delay_hours: delay,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = ScheduleSummary::calculate(&ScheduleResult::default());
        assert_eq!(summary.scheduled_count, 0);
        assert_eq!(summary.makespan_start, None);
        assert_eq!(summary.makespan_hours(), 0.0);
    }

    #[test]
    fn test_summary_figures() {
        let result = ScheduleResult {
            entries: vec![
                entry("J1", "M1", 8, 10, 0.0),
                entry("J2", "M2", 9, 12, 1.5),
                entry("J3", "M1", 11, 14, 3.0),
            ],
            unscheduled_job_ids: vec!["J4".to_string()],
        };
        let summary = result.summary();

        assert_eq!(summary.scheduled_count, 3);
        assert_eq!(summary.unscheduled_count, 1);
        assert_eq!(summary.late_count, 2);
        assert!((summary.total_delay_hours - 4.5).abs() < 1e-9);
        assert!((summary.max_delay_hours - 3.0).abs() < 1e-9);
        assert_eq!(summary.makespan_start, Some(at(8)));
        assert_eq!(summary.makespan_end, Some(at(14)));
        assert!((summary.makespan_hours() - 6.0).abs() < 1e-9);
        assert!((summary.busy_hours_by_machine["M1"] - 5.0).abs() < 1e-9);
        assert!((summary.busy_hours_by_machine["M2"] - 3.0).abs() < 1e-9);
    }
}
