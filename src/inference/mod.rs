//! The proof kernel proper: lemma matching, the classical axiom set, the
//! tactic vocabulary, the goal-state engine and the script runner.

mod axioms;
mod builder;
mod engine;
mod matching;
mod runner;
mod tactic;

pub use axioms::{
    ClassicalAxioms, Lemma, LemmaError, LemmaLibrary, LemmaSource, CONTRAPOSITION,
    DOUBLE_NEGATION, EXCLUDED_MIDDLE, IMPLICATION_AS_DISJUNCTION, NOT_EXISTS_TO_FORALL,
    VALIDATION_DOMAIN,
};
pub use builder::RunnerBuilder;
pub use engine::{check_goal, Engine};
pub use matching::{Abstraction, Instantiation, MatchError, Matcher};
pub use runner::{run, ProofOutcome, Runner, Verdict};
pub use tactic::{Source, Tactic, TacticError, TacticKind};
