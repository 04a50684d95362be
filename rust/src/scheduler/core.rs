//! Greedy sequential scheduler: earliest-available compatible machine first.

use chrono::{Duration, NaiveDateTime};
use std::path::Path;
use thiserror::Error;

use crate::config::{CsvConfig, SchedulingConfig};
use crate::models::{Job, Machine, ScheduleEntry, ScheduleResult};
use crate::records::{self, InputError, Record};
use crate::sorting::sort_jobs;
use crate::{log_changes, log_checks, log_debug};

use super::machine_pool::MachinePool;

const MICROS_PER_HOUR: f64 = 3_600_000_000.0;

/// Errors that can occur during scheduling.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("job {job_id}: {field} must be a non-negative number of hours, got {hours}")]
    InvalidDuration {
        job_id: String,
        field: &'static str,
        hours: f64,
    },
    #[error("job {job_id}: priority must be a number, got NaN")]
    InvalidPriority { job_id: String },
    #[error("job {job_id}: computed time is outside the representable timestamp range")]
    TimestampOverflow { job_id: String },
}

impl SchedulerError {
    /// True for missing columns or fields.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Input(e) if e.is_schema_error())
    }
}

/// Convert fractional hours to a duration (microsecond precision).
pub fn hours_to_duration(hours: f64) -> Option<Duration> {
    let micros = (hours * MICROS_PER_HOUR).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(Duration::microseconds(micros as i64))
}

/// Signed hours from `from` to `to`.
pub fn hours_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    let delta = to - from;
    (delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9) / 3600.0
}

fn validate_jobs(jobs: &[Job]) -> Result<(), SchedulerError> {
    for job in jobs {
        if job.priority.is_nan() {
            return Err(SchedulerError::InvalidPriority {
                job_id: job.job_id.clone(),
            });
        }
        for (field, hours) in [
            ("setup_time", job.setup_time),
            ("processing_time", job.processing_time),
        ] {
            if !hours.is_finite() || hours < 0.0 {
                return Err(SchedulerError::InvalidDuration {
                    job_id: job.job_id.clone(),
                    field,
                    hours,
                });
            }
        }
    }
    Ok(())
}

/// Compute `(start, end)` for a job whose machine frees up at `available_at`.
fn job_window(
    job: &Job,
    available_at: NaiveDateTime,
) -> Result<(NaiveDateTime, NaiveDateTime), SchedulerError> {
    let overflow = || SchedulerError::TimestampOverflow {
        job_id: job.job_id.clone(),
    };
    let setup = hours_to_duration(job.setup_time).ok_or_else(overflow)?;
    let processing = hours_to_duration(job.processing_time).ok_or_else(overflow)?;
    let start = available_at
        .checked_add_signed(setup)
        .ok_or_else(overflow)?;
    let end = start.checked_add_signed(processing).ok_or_else(overflow)?;
    Ok((start, end))
}

/// Greedy list scheduler.
///
/// Jobs are taken in `(priority, due_date)` order. Each one goes to the
/// compatible machine that frees up first (ties: first listed), starting
/// after its setup time. Jobs with no machine of the required type are
/// reported in `unscheduled_job_ids` instead of failing the run.
#[derive(Clone, Debug, Default)]
pub struct GreedyScheduler {
    config: SchedulingConfig,
}

impl GreedyScheduler {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    /// Run the scheduling algorithm.
    ///
    /// Either every schedulable job gets an entry or an error is returned;
    /// there are no partial results.
    pub fn schedule(
        &self,
        jobs: &[Job],
        machines: &[Machine],
    ) -> Result<ScheduleResult, SchedulerError> {
        let verbosity = self.config.verbosity;
        validate_jobs(jobs)?;

        let order = sort_jobs(jobs);
        log_debug!(
            verbosity,
            "Job order: {:?}",
            order.iter().map(|&i| &jobs[i].job_id).collect::<Vec<_>>()
        );

        let mut pool = MachinePool::new(machines);
        let mut result = ScheduleResult::default();

        for &job_idx in &order {
            let job = &jobs[job_idx];

            let Some((machine_idx, available_at)) = pool.earliest(&job.required_machine_type)
            else {
                log_changes!(
                    verbosity,
                    "Skipping job {}: no machine of type {:?}",
                    job.job_id,
                    job.required_machine_type
                );
                result.unscheduled_job_ids.push(job.job_id.clone());
                continue;
            };

            let machine = pool.machine(machine_idx);
            log_checks!(
                verbosity,
                "  Job {}: {} candidate(s) of type {:?}, earliest {} at {}",
                job.job_id,
                pool.compatible_count(&job.required_machine_type),
                job.required_machine_type,
                machine.machine_id,
                available_at
            );

            let (start_time, end_time) = job_window(job, available_at)?;
            let delay_hours = hours_between(job.due_date, end_time).max(0.0);

            log_changes!(
                verbosity,
                "Assigned job {} to {}: {} -> {} (delay {:.2}h)",
                job.job_id,
                machine.machine_id,
                start_time,
                end_time,
                delay_hours
            );

            result.entries.push(ScheduleEntry {
                job_id: job.job_id.clone(),
                job_type: job.job_type.clone(),
                machine_id: machine.machine_id.clone(),
                machine_type: machine.machine_type.clone(),
                start_time,
                end_time,
                due_date: job.due_date,
                delay_hours,
            });
            pool.advance_earliest(&job.required_machine_type, end_time);
        }

        log_changes!(
            verbosity,
            "Scheduled {} job(s), {} unschedulable",
            result.entries.len(),
            result.unscheduled_job_ids.len()
        );
        for (machine, clock) in pool.clocks() {
            log_debug!(verbosity, "  {} free at {}", machine.machine_id, clock);
        }

        Ok(result)
    }

    /// Parse string-keyed rows, then schedule them.
    pub fn schedule_records<J: Record, M: Record>(
        &self,
        job_rows: &[J],
        machine_rows: &[M],
    ) -> Result<ScheduleResult, SchedulerError> {
        let jobs = records::parse_jobs(job_rows)?;
        let machines = records::parse_machines(machine_rows)?;
        self.schedule(&jobs, &machines)
    }

    /// Read both CSV files, then schedule them.
    pub fn schedule_files(
        &self,
        jobs_path: impl AsRef<Path>,
        machines_path: impl AsRef<Path>,
        csv_config: &CsvConfig,
    ) -> Result<ScheduleResult, SchedulerError> {
        let jobs = records::read_jobs_file(jobs_path, csv_config)?;
        let machines = records::read_machines_file(machines_path, csv_config)?;
        self.schedule(&jobs, &machines)
    }
}

/// Schedule with default configuration.
pub fn schedule(jobs: &[Job], machines: &[Machine]) -> Result<ScheduleResult, SchedulerError> {
    GreedyScheduler::default().schedule(jobs, machines)
}
