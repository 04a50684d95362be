//! Verbosity-gated diagnostics for scheduling runs, written to stderr.
//!
//! A run reports at most four levels of detail. Arguments are not evaluated
//! when the configured verbosity is below the macro's level.
//!
//! | Level | Constant            | What a run prints                                   |
//! |-------|---------------------|-----------------------------------------------------|
//! | 0     | `VERBOSITY_SILENT`  | nothing; failures come back as `SchedulerError`     |
//! | 1     | `VERBOSITY_CHANGES` | each assignment with its window and delay, each     |
//! |       |                     | job skipped for lack of a machine, the run totals   |
//! | 2     | `VERBOSITY_CHECKS`  | per job: how many machines of its type exist and    |
//! |       |                     | which one frees up first                            |
//! | 3     | `VERBOSITY_DEBUG`   | the sorted job order and every machine's final      |
//! |       |                     | clock                                               |

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_CHANGES: u8 = 1;
pub const VERBOSITY_CHECKS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Print to stderr when `verbosity` reaches `level`.
#[doc(hidden)]
#[macro_export]
macro_rules! log_at {
    ($level:expr, $verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $level {
            eprintln!($($arg)*);
        }
    };
}

/// Report a decision that shapes the schedule.
///
/// `Assigned job J101 to CNC-2: 2025-06-02 09:30:00 -> 2025-06-02 12:30:00 (delay 0.00h)`
#[macro_export]
macro_rules! log_changes {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_CHANGES, $verbosity, $($arg)*)
    };
}

/// Report the candidates weighed for one job before it is placed.
#[macro_export]
macro_rules! log_checks {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_CHECKS, $verbosity, $($arg)*)
    };
}

/// Dump run state: processing order up front, machine clocks at the end.
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        $crate::log_at!($crate::logging::VERBOSITY_DEBUG, $verbosity, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        assert!(VERBOSITY_SILENT < VERBOSITY_CHANGES);
        assert!(VERBOSITY_CHANGES < VERBOSITY_CHECKS);
        assert!(VERBOSITY_CHECKS < VERBOSITY_DEBUG);
    }

    #[test]
    fn test_silent_verbosity_skips_formatting() {
        fn side_effect(counter: &mut u32) -> u32 {
            *counter += 1;
            *counter
        }

        let mut counter = 0;
        let verbosity = VERBOSITY_SILENT;
        log_changes!(verbosity, "job {}", side_effect(&mut counter));
        log_checks!(verbosity, "job {}", side_effect(&mut counter));
        log_debug!(verbosity, "job {}", side_effect(&mut counter));
        assert_eq!(counter, 0);
    }

    #[test]
    fn test_each_level_includes_the_ones_below() {
        fn count(counter: &mut u32) -> u32 {
            *counter += 1;
            *counter
        }

        let mut counter = 0;
        let verbosity = VERBOSITY_CHECKS;
        log_changes!(verbosity, "{}", count(&mut counter));
        log_checks!(verbosity, "{}", count(&mut counter));
        log_debug!(verbosity, "{}", count(&mut counter));
        assert_eq!(counter, 2);
    }
}
