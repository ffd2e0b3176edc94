use super::TheoremCase;
use crate::config::Statistics;
use crate::inference::{ProofOutcome, Runner, Verdict};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Outcome of one theorem of a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: ProofOutcome,
}

impl CaseResult {
    pub fn verdict(&self) -> &Verdict {
        &self.outcome.verdict
    }
}

/// Aggregated summary describing the outcome of a batch run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub results: Vec<CaseResult>,
    pub proved: usize,
    pub admitted: usize,
    pub stuck: usize,
}

impl BatchSummary {
    pub fn from_results(results: Vec<CaseResult>) -> Self {
        let mut proved = 0usize;
        let mut admitted = 0usize;
        let mut stuck = 0usize;
        for result in &results {
            match result.verdict() {
                Verdict::Proved => proved += 1,
                Verdict::Admitted { .. } => admitted += 1,
                Verdict::Stuck { .. } => stuck += 1,
            }
        }
        Self { results, proved, admitted, stuck }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Stuck cases, in input order.
    pub fn iter_failures(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|result| result.verdict().is_stuck())
    }

    pub fn iter_admitted(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().filter(|result| result.verdict().is_admitted())
    }

    /// Counters summed over every case.
    pub fn statistics(&self) -> Statistics {
        let mut total = Statistics::new();
        for result in &self.results {
            total.merge(&result.outcome.statistics);
        }
        total
    }

    pub fn render_table(&self) -> String {
        if self.results.is_empty() {
            return String::from("(no theorems)");
        }
        let mut lines = Vec::new();
        lines.push(format!("{:<28} {:<9} {:>5} {:>8}", "Theorem", "Verdict", "Steps", "Deferred"));
        for result in &self.results {
            lines.push(format!(
                "{:<28} {:<9} {:>5} {:>8}",
                result.name,
                result.verdict().label(),
                result.outcome.steps,
                result.verdict().deferred().len()
            ));
        }
        lines.join("\n")
    }
}

/// Runs every case of a batch with one shared runner.
#[derive(Clone, Debug, Default)]
pub struct BatchExecutor {
    runner: Runner,
}

impl BatchExecutor {
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    fn run_case(&self, case: &TheoremCase) -> CaseResult {
        debug!(theorem = %case.name, statement = %case.statement, "running theorem");
        CaseResult {
            name: case.name.clone(),
            outcome: self.runner.execute(case.goal(), &case.script),
        }
    }

    /// Evaluate cases one after another. A stuck case never stops the others.
    pub fn run(&self, cases: &[TheoremCase]) -> BatchSummary {
        BatchSummary::from_results(cases.iter().map(|case| self.run_case(case)).collect())
    }

    /// Evaluate cases on the rayon pool; results keep input order.
    pub fn run_parallel(&self, cases: &[TheoremCase]) -> BatchSummary {
        BatchSummary::from_results(cases.par_iter().map(|case| self.run_case(case)).collect())
    }
}

/// Per-theorem results in input order, using default runner settings.
pub fn run_batch(cases: &[TheoremCase]) -> Vec<CaseResult> {
    BatchExecutor::default().run(cases).results
}

/// Same as [`run_batch`], evaluated in parallel.
pub fn run_batch_parallel(cases: &[TheoremCase]) -> Vec<CaseResult> {
    BatchExecutor::default().run_parallel(cases).results
}

#[cfg(test)]
mod tests {
    use super::{run_batch, run_batch_parallel, BatchSummary};
    use crate::data::Proposition;
    use crate::inference::{Tactic, TacticKind};
    use crate::suite::{TheoremCase, TheoremSuite};

    fn broken() -> TheoremCase {
        TheoremCase::new("broken", Proposition::prop("A"), vec![Tactic::intro("h")])
    }

    #[test]
    fn stuck_case_does_not_abort_the_batch() {
        let mut cases = vec![broken()];
        cases.extend(TheoremSuite::builtin().cases().iter().cloned());
        let summary = BatchSummary::from_results(run_batch(&cases));
        assert_eq!((summary.proved, summary.admitted, summary.stuck), (1, 1, 1));
        let failures: Vec<_> = summary.iter_failures().map(|result| result.name.as_str()).collect();
        assert_eq!(failures, vec!["broken"]);
    }

    #[test]
    fn parallel_results_match_sequential_order() {
        let mut cases: Vec<TheoremCase> = TheoremSuite::builtin().cases().to_vec();
        cases.push(broken());
        cases.extend(TheoremSuite::builtin().cases().iter().cloned());
        assert_eq!(run_batch_parallel(&cases), run_batch(&cases));
    }

    #[test]
    fn table_lists_each_theorem() {
        let summary = BatchSummary::from_results(run_batch(TheoremSuite::builtin().cases()));
        let table = summary.render_table();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("subset_equivalence"));
        assert!(lines[1].contains("Proved"));
        assert!(lines[2].contains("Admitted"));
        assert!(lines[2].trim_end().ends_with('2'));
        assert_eq!(summary.statistics().get(TacticKind::Defer), 2);
        assert_eq!(BatchSummary::from_results(Vec::new()).render_table(), "(no theorems)");
    }
}
