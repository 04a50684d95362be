//! Per-run machine availability clocks, grouped by machine type.

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::models::Machine;

/// Owned working copy of machine availability for one scheduling run.
///
/// Each machine type keeps a min-heap keyed by `(available_at, input_index)`,
/// so the heap top is the earliest-available machine of that type and ties
/// go to the machine listed first. Caller-held `Machine` values are never
/// touched.
#[derive(Clone, Debug)]
pub struct MachinePool<'m> {
    machines: &'m [Machine],
    /// Current clock per machine, indexed like `machines`
    clocks: Vec<NaiveDateTime>,
    queues: FxHashMap<&'m str, BinaryHeap<Reverse<(NaiveDateTime, usize)>>>,
}

impl<'m> MachinePool<'m> {
    pub fn new(machines: &'m [Machine]) -> Self {
        let mut queues: FxHashMap<&'m str, BinaryHeap<Reverse<(NaiveDateTime, usize)>>> =
            FxHashMap::default();
        for (idx, machine) in machines.iter().enumerate() {
            queues
                .entry(machine.machine_type.as_str())
                .or_default()
                .push(Reverse((machine.available_at, idx)));
        }
        Self {
            machines,
            clocks: machines.iter().map(|m| m.available_at).collect(),
            queues,
        }
    }

    pub fn machine(&self, idx: usize) -> &'m Machine {
        &self.machines[idx]
    }

    /// Number of machines of the given type.
    pub fn compatible_count(&self, machine_type: &str) -> usize {
        self.queues.get(machine_type).map_or(0, |q| q.len())
    }

    /// Earliest-available machine of a type as `(index, available_at)`.
    pub fn earliest(&self, machine_type: &str) -> Option<(usize, NaiveDateTime)> {
        self.queues
            .get(machine_type)
            .and_then(|q| q.peek())
            .map(|Reverse((at, idx))| (*idx, *at))
    }

    /// Move the earliest machine of `machine_type` forward to `until`.
    ///
    /// Returns the index of the advanced machine, or `None` when the type has
    /// no machines. Clocks never move backwards.
    pub fn advance_earliest(&mut self, machine_type: &str, until: NaiveDateTime) -> Option<usize> {
        let queue = self.queues.get_mut(machine_type)?;
        let Reverse((at, idx)) = queue.pop()?;
        let next = until.max(at);
        queue.push(Reverse((next, idx)));
        self.clocks[idx] = next;
        Some(idx)
    }

    /// Current clock of every machine, in input order.
    pub fn clocks(&self) -> impl Iterator<Item = (&'m Machine, NaiveDateTime)> + '_ {
        self.machines.iter().zip(self.clocks.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn machine(id: &str, kind: &str, hour: u32) -> Machine {
        Machine {
            machine_id: id.to_string(),
            machine_type: kind.to_string(),
            available_at: at(hour),
        }
    }

    #[test]
    fn test_earliest_picks_minimum_clock() {
        let machines = vec![
            machine("M1", "A", 10),
            machine("M2", "A", 8),
            machine("M3", "B", 6),
        ];
        let pool = MachinePool::new(&machines);
        assert_eq!(pool.earliest("A"), Some((1, at(8))));
        assert_eq!(pool.earliest("B"), Some((2, at(6))));
        assert_eq!(pool.earliest("C"), None);
        assert_eq!(pool.compatible_count("A"), 2);
        assert_eq!(pool.compatible_count("C"), 0);
    }

    #[test]
    fn test_ties_go_to_first_listed_machine() {
        let machines = vec![
            machine("M9", "A", 8),
            machine("M1", "A", 8),
            machine("M5", "A", 8),
        ];
        let pool = MachinePool::new(&machines);
        assert_eq!(pool.earliest("A"), Some((0, at(8))));
    }

    #[test]
    fn test_advance_rotates_machines() {
        let machines = vec![machine("M1", "A", 8), machine("M2", "A", 8)];
        let mut pool = MachinePool::new(&machines);

        assert_eq!(pool.advance_earliest("A", at(10)), Some(0));
        assert_eq!(pool.earliest("A"), Some((1, at(8))));

        assert_eq!(pool.advance_earliest("A", at(9)), Some(1));
        assert_eq!(pool.earliest("A"), Some((1, at(9))));

        let clocks: Vec<_> = pool.clocks().map(|(m, t)| (m.machine_id.as_str(), t)).collect();
        assert_eq!(clocks, vec![("M1", at(10)), ("M2", at(9))]);
    }

    #[test]
    fn test_clock_never_moves_backwards() {
        let machines = vec![machine("M1", "A", 12)];
        let mut pool = MachinePool::new(&machines);
        pool.advance_earliest("A", at(9));
        assert_eq!(pool.earliest("A"), Some((0, at(12))));
    }

    #[test]
    fn test_caller_machines_untouched() {
        let machines = vec![machine("M1", "A", 8)];
        let mut pool = MachinePool::new(&machines);
        pool.advance_earliest("A", at(20));
        assert_eq!(machines[0].available_at, at(8));
    }

    #[test]
    fn test_advance_unknown_type() {
        let machines: Vec<Machine> = vec![];
        let mut pool = MachinePool::new(&machines);
        assert_eq!(pool.advance_earliest("A", at(9)), None);
    }
}
