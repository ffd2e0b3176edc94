//! Theorem/script pairs and the built-in suite.
//!
//! Batch files are JSON arrays of [`TheoremCase`].

mod executor;

use crate::data::{Goal, Proposition, Term};
use crate::error::{Error, Result};
use crate::inference::{Tactic, DOUBLE_NEGATION, NOT_EXISTS_TO_FORALL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use executor::{run_batch, run_batch_parallel, BatchExecutor, BatchSummary, CaseResult};

/// A named theorem statement with the script meant to prove it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoremCase {
    pub name: String,
    pub statement: Proposition,
    pub script: Vec<Tactic>,
}

impl TheoremCase {
    pub fn new(name: impl Into<String>, statement: Proposition, script: Vec<Tactic>) -> Self {
        Self { name: name.into(), statement, script }
    }

    /// The single goal seeded by the statement.
    pub fn goal(&self) -> Goal {
        Goal::from_statement(self.statement.clone())
    }
}

/// An ordered collection of theorem cases.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheoremSuite {
    cases: Vec<TheoremCase>,
}

impl TheoremSuite {
    pub fn new(cases: Vec<TheoremCase>) -> Self {
        Self { cases }
    }

    /// The subset equivalence (proved) and the atomized clause theorem (admitted).
    pub fn builtin() -> Self {
        Self::new(vec![subset_equivalence(), atomized_clause()])
    }

    pub fn cases(&self) -> &[TheoremCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        Self::from_json_str(&text)
    }
}

fn x(var: &str) -> Proposition {
    Proposition::pred("X", var)
}

fn y(var: &str) -> Proposition {
    Proposition::pred("Y", var)
}

/// `(∀a. X(a) → Y(a)) ↔ ¬∃a. ¬(¬X(a) ∨ Y(a))`: subset read as an implication
/// versus subset read as "no element escapes the clause".
pub fn subset_equivalence() -> TheoremCase {
    let statement = Proposition::iff(
        Proposition::forall("a", Proposition::implies(x("a"), y("a"))),
        Proposition::not(Proposition::exists(
            "a",
            Proposition::not(Proposition::or(Proposition::not(x("a")), y("a"))),
        )),
    );
    let script = vec![
        Tactic::Split,
        // ⇒
        Tactic::intro("h"),
        Tactic::apply_lemma(NOT_EXISTS_TO_FORALL),
        Tactic::intro("b"),
        Tactic::excluded_middle(x("b"), "hx"),
        Tactic::Right,
        Tactic::apply_hypothesis("h"),
        Tactic::exact("hx"),
        Tactic::Left,
        Tactic::exact("hx"),
        // ⇐
        Tactic::intro("h"),
        Tactic::rewrite_in(NOT_EXISTS_TO_FORALL, "h"),
        Tactic::intro("a"),
        Tactic::intro("hx"),
        Tactic::specialize("h", Term::variable("a")),
        Tactic::destruct("h"),
        Tactic::Contradiction,
        Tactic::exact("h"),
    ];
    TheoremCase::new("subset_equivalence", statement, script)
}

/// `(A ↔ ¬¬(¬B ∨ C)) ↔ ((A ∨ B) ∧ (C → A))`, the clause form of subset with
/// its atoms made propositional. Not a tautology: both directions leave a
/// goal that is set aside.
pub fn atomized_clause() -> TheoremCase {
    let (a, b, c) = (Proposition::prop("A"), Proposition::prop("B"), Proposition::prop("C"));
    let clause = Proposition::or(Proposition::not(b.clone()), c.clone());
    let statement = Proposition::iff(
        Proposition::iff(a.clone(), Proposition::not(Proposition::not(clause))),
        Proposition::and(Proposition::or(a.clone(), b), Proposition::implies(c, a)),
    );
    let script = vec![
        Tactic::Split,
        Tactic::intro("h"),
        Tactic::rewrite_in(DOUBLE_NEGATION, "h"),
        Tactic::Split,
        Tactic::Defer,
        Tactic::intro("hc"),
        Tactic::destruct_as("h", &["h1", "h2"]),
        Tactic::apply_hypothesis("h2"),
        Tactic::Right,
        Tactic::exact("hc"),
        Tactic::intro("h"),
        Tactic::destruct_as("h", &["hab", "hca"]),
        Tactic::rewrite(DOUBLE_NEGATION),
        Tactic::Split,
        Tactic::Defer,
        Tactic::intro("hbc"),
        Tactic::destruct("hab"),
        Tactic::exact("hab"),
        Tactic::destruct("hbc"),
        Tactic::Contradiction,
        Tactic::apply_hypothesis("hca"),
        Tactic::exact("hbc"),
    ];
    TheoremCase::new("atomized_clause", statement, script)
}

#[cfg(test)]
mod tests {
    use super::{atomized_clause, subset_equivalence, TheoremSuite};

    #[test]
    fn builtin_suite_holds_both_theorems() {
        let suite = TheoremSuite::builtin();
        let names: Vec<_> = suite.cases().iter().map(|case| case.name.as_str()).collect();
        assert_eq!(names, vec!["subset_equivalence", "atomized_clause"]);
        assert!(suite.cases().iter().all(|case| case.statement.is_closed()));
    }

    #[test]
    fn statements_print_in_logic_notation() {
        assert_eq!(
            subset_equivalence().statement.to_string(),
            "(∀a. X(a) → Y(a)) ↔ ¬(∃a. ¬(¬X(a) ∨ Y(a)))"
        );
        assert_eq!(
            atomized_clause().statement.to_string(),
            "(A ↔ ¬¬(¬B ∨ C)) ↔ ((A ∨ B) ∧ (C → A))"
        );
    }

    #[test]
    fn suite_round_trips_through_json() {
        let suite = TheoremSuite::builtin();
        let text = suite.to_json().expect("serialize");
        assert!(text.trim_start().starts_with('['));
        assert_eq!(TheoremSuite::from_json_str(&text).expect("parse"), suite);
        assert!(TheoremSuite::from_json_str("{\"cases\": 1}").is_err());
    }
}
