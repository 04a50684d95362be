//! Greedy machine-assignment scheduler.
//!
//! Jobs are ordered by `(priority, due_date)` and each is committed to the
//! earliest-available machine of its required type.

mod core;
mod machine_pool;
mod summary;

pub use core::{hours_between, hours_to_duration, schedule, GreedyScheduler, SchedulerError};
pub use machine_pool::MachinePool;
pub use summary::ScheduleSummary;
