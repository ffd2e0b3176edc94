//! Runs a tactic script against a goal and classifies the result.

use super::axioms::LemmaSource;
use super::engine::{check_goal, Engine};
use super::tactic::{Tactic, TacticError};
use crate::config::{RunnerConfig, Statistics};
use crate::data::{DeferredGoal, Goal, ProofState};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, trace, warn};

/// Terminal classification of a proof attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Every goal was discharged and nothing was deferred.
    Proved,
    /// All active goals closed but some were deliberately set aside.
    Admitted { deferred: Vec<DeferredGoal> },
    /// The tactic at `step` failed, or the script ended with active goals
    /// (then `step` is the script length).
    Stuck { step: usize, reason: TacticError },
}

impl Verdict {
    pub fn is_proved(&self) -> bool {
        matches!(self, Verdict::Proved)
    }

    pub fn is_admitted(&self) -> bool {
        matches!(self, Verdict::Admitted { .. })
    }

    pub fn is_stuck(&self) -> bool {
        matches!(self, Verdict::Stuck { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Proved => "Proved",
            Verdict::Admitted { .. } => "Admitted",
            Verdict::Stuck { .. } => "Stuck",
        }
    }

    /// Deferred goals of an admitted proof, empty otherwise.
    pub fn deferred(&self) -> &[DeferredGoal] {
        match self {
            Verdict::Admitted { deferred } => deferred,
            _ => &[],
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Proved => write!(f, "Proved"),
            Verdict::Admitted { deferred } => {
                let steps: Vec<String> = deferred.iter().map(|d| d.step.to_string()).collect();
                write!(
                    f,
                    "Admitted ({} deferred goal(s), at step(s) {})",
                    deferred.len(),
                    steps.join(", ")
                )
            }
            Verdict::Stuck { step, reason } => {
                write!(f, "Stuck at step {step}: {}: {reason}", reason.kind())
            }
        }
    }
}

/// A verdict together with the counters of the attempt that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProofOutcome {
    pub verdict: Verdict,
    pub statistics: Statistics,
    /// Number of tactics successfully applied.
    pub steps: usize,
}

/// Executes scripts one tactic at a time. Holds no state between runs.
#[derive(Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
    library: Option<Arc<dyn LemmaSource + Send + Sync>>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("library", &self.library.as_ref().map(|library| library.names()))
            .finish()
    }
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        config: RunnerConfig,
        library: Option<Arc<dyn LemmaSource + Send + Sync>>,
    ) -> Self {
        Self { config, library }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn engine(&self) -> Engine<'_> {
        match &self.library {
            Some(library) => Engine::with_library(library.as_ref()),
            None => Engine::new(),
        }
    }

    pub fn run(&self, initial: Goal, script: &[Tactic]) -> Verdict {
        self.execute(initial, script).verdict
    }

    /// Apply `script` to `initial` in order, stopping at the first failure.
    pub fn execute(&self, initial: Goal, script: &[Tactic]) -> ProofOutcome {
        let engine = self.engine();
        let mut statistics = Statistics::new();
        if let Err(reason) = check_goal(&initial) {
            warn!(goal = %initial, %reason, "statement rejected");
            return self.stuck(0, reason, statistics);
        }
        let mut state = ProofState::new(initial);

        for (step, tactic) in script.iter().enumerate() {
            if let Some(limit) = self.config.max_steps {
                if step >= limit {
                    let reason = TacticError::StepLimitExceeded { limit };
                    return self.stuck(step, reason, statistics);
                }
            }
            let active = state.active().len();
            let deferred = state.deferred().len();
            match engine.apply(&state, step, tactic) {
                Ok(next) => {
                    statistics.record(tactic.kind());
                    if next.deferred().len() > deferred {
                        statistics.goals_deferred += 1;
                    } else {
                        statistics.record_goals(next.active().len() + 1 - active);
                    }
                    state = next;
                    if self.config.trace_goals {
                        trace!(step, goals = %state, "goal stack");
                    }
                }
                Err(reason) => {
                    warn!(step, tactic = %tactic, %reason, "tactic failed");
                    return self.stuck(step, reason, statistics);
                }
            }
        }

        let verdict = if !state.active().is_empty() {
            let reason = TacticError::UnclosedGoals { remaining: state.active().len() };
            warn!(remaining = state.active().len(), "script ended with open goals");
            Verdict::Stuck { step: script.len(), reason }
        } else if !state.deferred().is_empty() {
            Verdict::Admitted { deferred: state.deferred().to_vec() }
        } else {
            Verdict::Proved
        };
        info!(%verdict, steps = script.len(), "proof attempt finished");
        ProofOutcome { verdict, statistics, steps: script.len() }
    }

    fn stuck(&self, step: usize, reason: TacticError, statistics: Statistics) -> ProofOutcome {
        let verdict = Verdict::Stuck { step, reason };
        info!(%verdict, "proof attempt finished");
        ProofOutcome { verdict, statistics, steps: step }
    }
}

/// Run `script` against `initial` with default settings.
pub fn run(initial: Goal, script: &[Tactic]) -> Verdict {
    Runner::new().run(initial, script)
}
