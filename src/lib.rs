//! A miniature interactive proof kernel for classical logic.
//!
//! Propositions over one abstract carrier are proved by feeding an
//! already-parsed tactic script to a goal-state engine. The engine reads a
//! small, fixed set of classical axioms (excluded middle, double negation,
//! contraposition, not-exists-to-forall) and reports `Proved`, `Admitted`
//! when goals were deliberately deferred, or `Stuck` when a tactic fails.

pub mod config;
pub mod data;
pub mod error;
pub mod inference;
pub mod semantics;
pub mod suite;

pub use config::{RunnerConfig, Statistics};
pub use data::{
    Context, ContextError, DeferredGoal, Goal, ProofState, Proposition, Term, TermKind,
};
pub use error::{Error, Result};
pub use inference::{
    run, ClassicalAxioms, Engine, Lemma, LemmaError, LemmaLibrary, LemmaSource, MatchError,
    ProofOutcome, Runner, RunnerBuilder, Source, Tactic, TacticError, TacticKind, Verdict,
    VALIDATION_DOMAIN,
};
pub use semantics::{find_countermodel, EvalError, Model};
pub use suite::{
    run_batch, run_batch_parallel, BatchExecutor, BatchSummary, CaseResult, TheoremCase,
    TheoremSuite,
};

#[cfg(test)]
mod tests {
    use super::{ClassicalAxioms, TheoremSuite};

    #[test]
    fn builtin_pieces_are_available() {
        assert_eq!(TheoremSuite::builtin().len(), 2);
        assert!(ClassicalAxioms::standard().validate().is_ok());
    }
}
