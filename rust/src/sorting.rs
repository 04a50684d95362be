//! Job ordering for the greedy assignment pass.
//!
//! Jobs are processed ascending by `(priority, due_date)`. Equal keys keep
//! their input order, so the sort is stable and the whole run is
//! deterministic.

use chrono::NaiveDateTime;
use std::cmp::Ordering;

use crate::models::Job;

/// Sort key for one job (lower = processed earlier).
///
/// Priorities compare with `f64::total_cmp`; NaN is rejected before sorting.
#[derive(Debug, Clone, Copy)]
pub struct JobSortKey {
    pub priority: f64,
    pub due_date: NaiveDateTime,
    /// Position in the caller's job list, the final tie-breaker
    pub input_index: usize,
}

impl JobSortKey {
    pub fn new(job: &Job, input_index: usize) -> Self {
        Self {
            // Fold -0.0 into 0.0 so total_cmp treats them as one priority
            priority: if job.priority == 0.0 { 0.0 } else { job.priority },
            due_date: job.due_date,
            input_index,
        }
    }
}

impl Ord for JobSortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.due_date.cmp(&other.due_date))
            .then(self.input_index.cmp(&other.input_index))
    }
}

impl PartialEq for JobSortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for JobSortKey {}

impl PartialOrd for JobSortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Return indices into `jobs` in processing order.
pub fn sort_jobs(jobs: &[Job]) -> Vec<usize> {
    let mut keys: Vec<JobSortKey> = jobs
        .iter()
        .enumerate()
        .map(|(idx, job)| JobSortKey::new(job, idx))
        .collect();

    // Keys are unique through input_index, so an unstable sort stays stable.
    keys.sort_unstable();

    keys.into_iter().map(|k| k.input_index).collect()
}
