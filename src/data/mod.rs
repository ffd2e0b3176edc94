//! Core data structures of the kernel: carrier terms, propositions, contexts
//! and goals.

pub mod context;
pub mod goal;
pub mod proposition;
pub mod term;

pub use context::{Context, ContextError};
pub use goal::{DeferredGoal, Goal, ProofState};
pub use proposition::{fresh_name, Proposition};
pub use term::{Term, TermKind};
