//! Finite-model semantics, used to check classical axioms once and to explain
//! admitted proofs with a falsifying assignment.

pub mod countermodel;
pub mod model;

pub use countermodel::{find_countermodel, goal_countermodel, is_valid, MAX_SEARCH_BITS};
pub use model::{EvalError, Model};
