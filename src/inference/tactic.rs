//! The tactic vocabulary and the failures a tactic can report.

use crate::data::{ContextError, Proposition, Term};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where `apply` and `rewrite` take their statement from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Hypothesis(String),
    Lemma(String),
}

impl Source {
    pub fn name(&self) -> &str {
        match self {
            Source::Hypothesis(name) | Source::Lemma(name) => name,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Hypothesis(name) => write!(f, "hypothesis {name}"),
            Source::Lemma(name) => write!(f, "lemma {name}"),
        }
    }
}

/// One already-parsed tactic invocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tactic", rename_all = "snake_case")]
pub enum Tactic {
    /// Introduce the antecedent of `A → B` or fix the variable of `∀x. P`.
    Intro {
        #[serde(default)]
        name: Option<String>,
    },
    /// Close `A ∧ B` by proving both sides, or `A ↔ B` by proving both directions.
    Split,
    Left,
    Right,
    /// Case analysis on a disjunction, or elimination of `∧`, `↔`, `∃` hypotheses.
    Destruct {
        hypothesis: String,
        #[serde(default)]
        names: Vec<String>,
    },
    /// Classical case split on an arbitrary proposition.
    ExcludedMiddle { proposition: Proposition, name: String },
    Exact { hypothesis: String },
    Assumption,
    Contradiction,
    /// Instantiate a universally quantified hypothesis.
    Specialize { hypothesis: String, term: Term },
    Apply { from: Source },
    Rewrite {
        from: Source,
        #[serde(default)]
        reverse: bool,
        #[serde(default)]
        at: Option<String>,
    },
    /// Set the current goal aside without proof.
    Defer,
}

impl Tactic {
    pub fn intro(name: impl Into<String>) -> Self {
        Tactic::Intro { name: Some(name.into()) }
    }

    pub fn destruct(hypothesis: impl Into<String>) -> Self {
        Tactic::Destruct { hypothesis: hypothesis.into(), names: Vec::new() }
    }

    pub fn destruct_as(hypothesis: impl Into<String>, names: &[&str]) -> Self {
        Tactic::Destruct {
            hypothesis: hypothesis.into(),
            names: names.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn excluded_middle(proposition: Proposition, name: impl Into<String>) -> Self {
        Tactic::ExcludedMiddle { proposition, name: name.into() }
    }

    pub fn exact(hypothesis: impl Into<String>) -> Self {
        Tactic::Exact { hypothesis: hypothesis.into() }
    }

    pub fn specialize(hypothesis: impl Into<String>, term: Term) -> Self {
        Tactic::Specialize { hypothesis: hypothesis.into(), term }
    }

    pub fn apply_hypothesis(name: impl Into<String>) -> Self {
        Tactic::Apply { from: Source::Hypothesis(name.into()) }
    }

    pub fn apply_lemma(name: impl Into<String>) -> Self {
        Tactic::Apply { from: Source::Lemma(name.into()) }
    }

    /// Rewrite the target left-to-right with a lemma.
    pub fn rewrite(lemma: impl Into<String>) -> Self {
        Tactic::Rewrite { from: Source::Lemma(lemma.into()), reverse: false, at: None }
    }

    pub fn rewrite_reversed(lemma: impl Into<String>) -> Self {
        Tactic::Rewrite { from: Source::Lemma(lemma.into()), reverse: true, at: None }
    }

    /// Rewrite hypothesis `hypothesis` left-to-right with a lemma.
    pub fn rewrite_in(lemma: impl Into<String>, hypothesis: impl Into<String>) -> Self {
        Tactic::Rewrite {
            from: Source::Lemma(lemma.into()),
            reverse: false,
            at: Some(hypothesis.into()),
        }
    }

    pub fn kind(&self) -> TacticKind {
        match self {
            Tactic::Intro { .. } => TacticKind::Intro,
            Tactic::Split => TacticKind::Split,
            Tactic::Left => TacticKind::Left,
            Tactic::Right => TacticKind::Right,
            Tactic::Destruct { .. } => TacticKind::Destruct,
            Tactic::ExcludedMiddle { .. } => TacticKind::ExcludedMiddle,
            Tactic::Exact { .. } => TacticKind::Exact,
            Tactic::Assumption => TacticKind::Assumption,
            Tactic::Contradiction => TacticKind::Contradiction,
            Tactic::Specialize { .. } => TacticKind::Specialize,
            Tactic::Apply { .. } => TacticKind::Apply,
            Tactic::Rewrite { .. } => TacticKind::Rewrite,
            Tactic::Defer => TacticKind::Defer,
        }
    }
}

impl fmt::Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tactic::Intro { name: Some(name) } => write!(f, "intro {name}"),
            Tactic::Intro { name: None } => write!(f, "intro"),
            Tactic::Destruct { hypothesis, names } if names.is_empty() => {
                write!(f, "destruct {hypothesis}")
            }
            Tactic::Destruct { hypothesis, names } => {
                write!(f, "destruct {hypothesis} as [{}]", names.join(", "))
            }
            Tactic::ExcludedMiddle { proposition, name } => {
                write!(f, "em ({proposition}) as {name}")
            }
            Tactic::Exact { hypothesis } => write!(f, "exact {hypothesis}"),
            Tactic::Specialize { hypothesis, term } => write!(f, "specialize {hypothesis} {term}"),
            Tactic::Apply { from } => write!(f, "apply {}", from.name()),
            Tactic::Rewrite { from, reverse, at } => {
                write!(f, "rewrite {}{}", if *reverse { "<- " } else { "" }, from.name())?;
                match at {
                    Some(hypothesis) => write!(f, " in {hypothesis}"),
                    None => Ok(()),
                }
            }
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Tactic names without their arguments, used for statistics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TacticKind {
    Intro,
    Split,
    Left,
    Right,
    Destruct,
    ExcludedMiddle,
    Exact,
    Assumption,
    Contradiction,
    Specialize,
    Apply,
    Rewrite,
    Defer,
}

impl TacticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TacticKind::Intro => "intro",
            TacticKind::Split => "split",
            TacticKind::Left => "left",
            TacticKind::Right => "right",
            TacticKind::Destruct => "destruct",
            TacticKind::ExcludedMiddle => "em",
            TacticKind::Exact => "exact",
            TacticKind::Assumption => "assumption",
            TacticKind::Contradiction => "contradiction",
            TacticKind::Specialize => "specialize",
            TacticKind::Apply => "apply",
            TacticKind::Rewrite => "rewrite",
            TacticKind::Defer => "defer",
        }
    }
}

impl fmt::Display for TacticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a tactic could not be applied. Any of these makes a script stuck.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TacticError {
    #[error("{tactic} does not apply to {found}")]
    WrongShape { tactic: TacticKind, found: String },
    #[error("no hypothesis or lemma named `{name}`")]
    NotFound { name: String },
    #[error("name `{name}` is already in use")]
    DuplicateName { name: String },
    #[error("{} does not match the target {target}", describe_hypothesis(.hypothesis))]
    Mismatch { hypothesis: Option<String>, target: String },
    #[error("{rule} cannot prove {target}")]
    Unmatched { rule: String, target: String },
    #[error("no instance of the rewritten side of {rule} occurs in {target}")]
    NoOccurrence { rule: String, target: String },
    #[error("no hypothesis is contradicted by another")]
    NoContradiction,
    #[error("{remaining} active goal(s) left when the script ended")]
    UnclosedGoals { remaining: usize },
    #[error("step limit of {limit} tactics exceeded")]
    StepLimitExceeded { limit: usize },
    #[error("{proposition} mentions {variables:?}, which the context does not fix")]
    Unfixed { proposition: String, variables: Vec<String> },
    #[error("{proposition} contains a schematic proposition; only lemmas may")]
    Schematic { proposition: String },
}

fn describe_hypothesis(hypothesis: &Option<String>) -> String {
    match hypothesis {
        Some(name) => format!("hypothesis `{name}`"),
        None => "no hypothesis".to_string(),
    }
}

impl TacticError {
    /// Short identifier of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            TacticError::WrongShape { .. } => "WrongShape",
            TacticError::NotFound { .. } => "NotFound",
            TacticError::DuplicateName { .. } => "DuplicateName",
            TacticError::Mismatch { .. } => "Mismatch",
            TacticError::Unmatched { .. } => "Unmatched",
            TacticError::NoOccurrence { .. } => "NoOccurrence",
            TacticError::NoContradiction => "NoContradiction",
            TacticError::UnclosedGoals { .. } => "UnclosedGoals",
            TacticError::StepLimitExceeded { .. } => "StepLimitExceeded",
            TacticError::Unfixed { .. } => "Unfixed",
            TacticError::Schematic { .. } => "Schematic",
        }
    }

    pub(crate) fn wrong_shape(tactic: TacticKind, found: &Proposition) -> Self {
        TacticError::WrongShape { tactic, found: format!("{} `{found}`", found.shape()) }
    }

    pub(crate) fn not_found(name: &str) -> Self {
        TacticError::NotFound { name: name.to_string() }
    }
}

impl From<ContextError> for TacticError {
    fn from(err: ContextError) -> Self {
        match err {
            ContextError::DuplicateName(name) => TacticError::DuplicateName { name },
            ContextError::NotFound(name) => TacticError::NotFound { name },
        }
    }
}
