use crate::inference::TacticKind;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counters collected while running a proof script.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    tactics: BTreeMap<TacticKind, u64>,
    pub goals_opened: u64,
    pub goals_discharged: u64,
    pub goals_deferred: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one application of `kind`; returns the new count.
    pub fn record(&mut self, kind: TacticKind) -> u64 {
        let entry = self.tactics.entry(kind).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Account for one step that turned the current goal into `subgoals` goals.
    pub fn record_goals(&mut self, subgoals: usize) {
        if subgoals == 0 {
            self.goals_discharged += 1;
        } else {
            self.goals_opened += subgoals as u64;
        }
    }

    pub fn get(&self, kind: TacticKind) -> u64 {
        self.tactics.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of tactics applied.
    pub fn steps(&self) -> u64 {
        self.tactics.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TacticKind, u64)> + '_ {
        self.tactics.iter().map(|(kind, count)| (*kind, *count))
    }

    pub fn merge(&mut self, other: &Statistics) {
        for (kind, count) in other.iter() {
            *self.tactics.entry(kind).or_insert(0) += count;
        }
        self.goals_opened += other.goals_opened;
        self.goals_discharged += other.goals_discharged;
        self.goals_deferred += other.goals_deferred;
    }
}

#[cfg(test)]
mod tests {
    use super::Statistics;
    use crate::inference::TacticKind;

    #[test]
    fn counters_increment_and_merge() {
        let mut stats = Statistics::new();
        assert_eq!(stats.record(TacticKind::Intro), 1);
        assert_eq!(stats.record(TacticKind::Intro), 2);
        stats.record(TacticKind::Exact);
        stats.record_goals(2);
        stats.record_goals(0);

        let mut total = Statistics::new();
        total.merge(&stats);
        total.merge(&stats);
        assert_eq!(total.get(TacticKind::Intro), 4);
        assert_eq!(total.get(TacticKind::Split), 0);
        assert_eq!(total.steps(), 6);
        assert_eq!(total.goals_opened, 4);
        assert_eq!(total.goals_discharged, 2);
    }
}
