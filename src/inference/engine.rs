//! The goal-state machine.
//!
//! [`Engine::apply`] takes a proof state and one tactic and returns the next
//! proof state, or the reason the tactic does not apply. Every tactic acts on
//! the first active goal; sub-goals it produces are pursued before the goals
//! that were already waiting.

use super::axioms::{ClassicalAxioms, Lemma, LemmaSource};
use super::matching::Matcher;
use super::tactic::{Source, Tactic, TacticError, TacticKind};
use crate::data::{fresh_name, Context, Goal, ProofState, Proposition, Term};
use std::collections::BTreeSet;
use tracing::debug;

/// A way `apply` can use a statement: prove `conclusion` from `premises`.
#[derive(Clone, Debug)]
struct Candidate {
    metas: BTreeSet<String>,
    conclusion: Proposition,
    premises: Vec<Proposition>,
}

/// Applies tactics, reading lemmas from the classical set and an optional library.
#[derive(Clone, Copy)]
pub struct Engine<'a> {
    axioms: &'a ClassicalAxioms,
    library: Option<&'a dyn LemmaSource>,
}

impl Default for Engine<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine<'static> {
    pub fn new() -> Self {
        Self { axioms: ClassicalAxioms::standard(), library: None }
    }
}

impl<'a> Engine<'a> {
    /// Engine that falls back to `library` for names the classical set lacks.
    pub fn with_library(library: &'a dyn LemmaSource) -> Self {
        Self { axioms: ClassicalAxioms::standard(), library: Some(library) }
    }

    pub fn axioms(&self) -> &'a ClassicalAxioms {
        self.axioms
    }

    /// Look a lemma up, classical axioms first.
    pub fn lemma(&self, name: &str) -> Option<&'a Lemma> {
        self.axioms
            .lookup(name)
            .or_else(|| self.library.and_then(|library| library.lookup(name)))
    }

    /// Apply `tactic`, the `step`-th of its script, to the first active goal.
    pub fn apply(
        &self,
        state: &ProofState,
        step: usize,
        tactic: &Tactic,
    ) -> Result<ProofState, TacticError> {
        let Some(goal) = state.current() else {
            return Err(TacticError::WrongShape {
                tactic: tactic.kind(),
                found: "no open goal".to_string(),
            });
        };
        let next = match tactic {
            Tactic::Defer => state.defer_current(step),
            _ => state.replace_current(self.subgoals(goal, tactic)?),
        };
        debug!(
            step,
            tactic = %tactic,
            active = next.active().len(),
            deferred = next.deferred().len(),
            "applied tactic"
        );
        Ok(next)
    }

    /// Goals that replace `goal`; empty when the tactic discharges it.
    fn subgoals(&self, goal: &Goal, tactic: &Tactic) -> Result<Vec<Goal>, TacticError> {
        let ctx = goal.context();
        let target = goal.target();
        match tactic {
            Tactic::Intro { name } => self.intro(goal, name.as_deref()).map(|goal| vec![goal]),
            Tactic::Split => match target {
                Proposition::And(a, b) => Ok(vec![
                    Goal::new(ctx.clone(), (**a).clone()),
                    Goal::new(ctx.clone(), (**b).clone()),
                ]),
                Proposition::Iff(a, b) => Ok(vec![
                    Goal::new(ctx.clone(), Proposition::implies((**a).clone(), (**b).clone())),
                    Goal::new(ctx.clone(), Proposition::implies((**b).clone(), (**a).clone())),
                ]),
                other => Err(TacticError::wrong_shape(TacticKind::Split, other)),
            },
            Tactic::Left | Tactic::Right => match target {
                Proposition::Or(a, b) => {
                    let side = if matches!(tactic, Tactic::Left) { a } else { b };
                    Ok(vec![Goal::new(ctx.clone(), (**side).clone())])
                }
                other => Err(TacticError::wrong_shape(tactic.kind(), other)),
            },
            Tactic::Destruct { hypothesis, names } => self.destruct(goal, hypothesis, names),
            Tactic::ExcludedMiddle { proposition, name } => {
                check_proposition(ctx, proposition)?;
                let (holds, fails) = self.axioms.case_split(proposition);
                Ok(vec![
                    Goal::new(ctx.add_hypothesis(name.clone(), holds)?, target.clone()),
                    Goal::new(ctx.add_hypothesis(name.clone(), fails)?, target.clone()),
                ])
            }
            Tactic::Exact { hypothesis } => {
                if ctx.lookup(hypothesis)?.alpha_eq(target) {
                    Ok(Vec::new())
                } else {
                    Err(TacticError::Mismatch {
                        hypothesis: Some(hypothesis.clone()),
                        target: target.to_string(),
                    })
                }
            }
            Tactic::Assumption => {
                if ctx.hypotheses().any(|(_, prop)| prop.alpha_eq(target)) {
                    Ok(Vec::new())
                } else {
                    Err(TacticError::Mismatch { hypothesis: None, target: target.to_string() })
                }
            }
            Tactic::Contradiction => {
                if has_contradiction(ctx) {
                    Ok(Vec::new())
                } else {
                    Err(TacticError::NoContradiction)
                }
            }
            Tactic::Specialize { hypothesis, term } => {
                let (var, body) = match ctx.lookup(hypothesis)? {
                    Proposition::Forall { var, body } => (var, body),
                    other => return Err(TacticError::wrong_shape(TacticKind::Specialize, other)),
                };
                if let Some(name) = term.as_variable() {
                    if !ctx.is_fixed(name) {
                        return Err(TacticError::not_found(name));
                    }
                }
                let instance = body.substitute(var, term);
                Ok(vec![Goal::new(ctx.replace_hypothesis(hypothesis, instance)?, target.clone())])
            }
            Tactic::Apply { from } => self.apply_statement(goal, from),
            Tactic::Rewrite { from, reverse, at } => {
                self.rewrite(goal, from, *reverse, at.as_deref()).map(|goal| vec![goal])
            }
            Tactic::Defer => Ok(vec![goal.clone()]),
        }
    }

    fn intro(&self, goal: &Goal, name: Option<&str>) -> Result<Goal, TacticError> {
        let ctx = goal.context();
        let mut avoid = ctx.names_in_use();
        avoid.extend(goal.target().free_variables());
        let chosen = |base: &str| match name {
            Some(name) if avoid.contains(name) => {
                Err(TacticError::DuplicateName { name: name.to_string() })
            }
            Some(name) => Ok(name.to_string()),
            None => Ok(fresh_name(base, &avoid)),
        };
        match goal.target() {
            Proposition::Implies(a, b) => {
                let name = chosen("h")?;
                Ok(Goal::new(ctx.add_hypothesis(name, (**a).clone())?, (**b).clone()))
            }
            Proposition::Forall { var, body } => {
                let name = chosen(var.as_str())?;
                let body = body.substitute(var, &Term::variable(name.clone()));
                Ok(Goal::new(ctx.add_variable(name)?, body))
            }
            other => Err(TacticError::wrong_shape(TacticKind::Intro, other)),
        }
    }

    fn destruct(
        &self,
        goal: &Goal,
        hypothesis: &str,
        names: &[String],
    ) -> Result<Vec<Goal>, TacticError> {
        let ctx = goal.context();
        let target = goal.target();
        let name_at = |i: usize, default: String| names.get(i).cloned().unwrap_or(default);
        match ctx.lookup(hypothesis)? {
            Proposition::Or(a, b) => {
                let left = name_at(0, hypothesis.to_string());
                let right = names.get(1).cloned().unwrap_or_else(|| left.clone());
                Ok(vec![
                    Goal::new(ctx.split_hypothesis(hypothesis, vec![(left, (**a).clone())])?, target.clone()),
                    Goal::new(ctx.split_hypothesis(hypothesis, vec![(right, (**b).clone())])?, target.clone()),
                ])
            }
            Proposition::And(a, b) => {
                let parts = vec![
                    (name_at(0, format!("{hypothesis}_l")), (**a).clone()),
                    (name_at(1, format!("{hypothesis}_r")), (**b).clone()),
                ];
                Ok(vec![Goal::new(ctx.split_hypothesis(hypothesis, parts)?, target.clone())])
            }
            Proposition::Iff(a, b) => {
                let parts = vec![
                    (
                        name_at(0, format!("{hypothesis}_l")),
                        Proposition::implies((**a).clone(), (**b).clone()),
                    ),
                    (
                        name_at(1, format!("{hypothesis}_r")),
                        Proposition::implies((**b).clone(), (**a).clone()),
                    ),
                ];
                Ok(vec![Goal::new(ctx.split_hypothesis(hypothesis, parts)?, target.clone())])
            }
            Proposition::Exists { var, body } => {
                let mut avoid = ctx.names_in_use();
                avoid.extend(target.free_variables());
                let witness = match names.first() {
                    Some(name) if avoid.contains(name) => {
                        return Err(TacticError::DuplicateName { name: name.clone() })
                    }
                    Some(name) => name.clone(),
                    None => fresh_name(var, &avoid),
                };
                let instance = body.substitute(var, &Term::variable(witness.clone()));
                let renamed = name_at(1, hypothesis.to_string());
                let ctx = ctx
                    .add_variable(witness)?
                    .split_hypothesis(hypothesis, vec![(renamed, instance)])?;
                Ok(vec![Goal::new(ctx, target.clone())])
            }
            other => Err(TacticError::wrong_shape(TacticKind::Destruct, other)),
        }
    }

    fn statement(&self, ctx: &Context, from: &Source) -> Result<Proposition, TacticError> {
        match from {
            Source::Hypothesis(name) => Ok(ctx.lookup(name)?.clone()),
            Source::Lemma(name) => self
                .lemma(name)
                .map(|lemma| lemma.statement.clone())
                .ok_or_else(|| TacticError::not_found(name)),
        }
    }

    fn apply_statement(&self, goal: &Goal, from: &Source) -> Result<Vec<Goal>, TacticError> {
        let statement = self.statement(goal.context(), from)?;
        let target = goal.target();
        for candidate in candidates(&statement, &avoid_for(goal)) {
            let mut matcher = Matcher::new(candidate.metas.clone());
            if matcher.match_pattern(&candidate.conclusion, target).is_err() {
                continue;
            }
            let premises = candidate
                .premises
                .iter()
                .map(|premise| matcher.instantiation().instantiate(premise, &candidate.metas))
                .collect::<Result<Vec<_>, _>>();
            if let Ok(premises) = premises {
                return Ok(premises
                    .into_iter()
                    .map(|premise| Goal::new(goal.context().clone(), premise))
                    .collect());
            }
        }
        Err(TacticError::Unmatched { rule: from.to_string(), target: target.to_string() })
    }

    fn rewrite(
        &self,
        goal: &Goal,
        from: &Source,
        reverse: bool,
        at: Option<&str>,
    ) -> Result<Goal, TacticError> {
        let ctx = goal.context();
        let statement = self.statement(ctx, from)?;
        let (metas, body) = open_statement(&statement, &avoid_for(goal));
        let (left, right) = match &body {
            Proposition::Iff(left, right) => (left.as_ref(), right.as_ref()),
            other => return Err(TacticError::wrong_shape(TacticKind::Rewrite, other)),
        };
        let (pattern, replacement) = if reverse { (right, left) } else { (left, right) };
        let subject = match at {
            Some(name) => ctx.lookup(name)?,
            None => goal.target(),
        };
        // Free variables of the rule itself denote fixed values; a binder of
        // the same name hides them.
        let fixed = statement.free_variables();
        let rule = Rule { pattern, replacement, metas: &metas, fixed: &fixed };
        let Some((instance, replaced)) = rule.first_instance(subject) else {
            return Err(TacticError::NoOccurrence {
                rule: from.to_string(),
                target: subject.to_string(),
            });
        };
        let (rewritten, count) = subject.replace_outside(&instance, &replaced, &fixed);
        debug!(%instance, %replaced, count, "rewrote occurrences");
        match at {
            Some(name) => Ok(Goal::new(ctx.replace_hypothesis(name, rewritten)?, goal.target().clone())),
            None => Ok(Goal::new(ctx.clone(), rewritten)),
        }
    }
}

/// A goal fit to start a proof: every hypothesis and the target mention only
/// fixed variables, and none contains a schematic proposition.
pub fn check_goal(goal: &Goal) -> Result<(), TacticError> {
    let ctx = goal.context();
    for (_, hypothesis) in ctx.hypotheses() {
        check_proposition(ctx, hypothesis)?;
    }
    check_proposition(ctx, goal.target())
}

fn check_proposition(ctx: &Context, prop: &Proposition) -> Result<(), TacticError> {
    if prop.has_schematic() {
        return Err(TacticError::Schematic { proposition: prop.to_string() });
    }
    let variables: Vec<String> =
        prop.free_variables().into_iter().filter(|var| !ctx.is_fixed(var)).collect();
    if !variables.is_empty() {
        return Err(TacticError::Unfixed { proposition: prop.to_string(), variables });
    }
    Ok(())
}

/// Names a meta-variable must not take when working on `goal`.
fn avoid_for(goal: &Goal) -> BTreeSet<String> {
    let mut avoid = goal.context().names_in_use();
    avoid.extend(goal.target().variable_names());
    for (_, prop) in goal.context().hypotheses() {
        avoid.extend(prop.variable_names());
    }
    avoid
}

/// Strip the leading `∀` binders of `statement`, renamed away from `avoid`.
fn open_statement(
    statement: &Proposition,
    avoid: &BTreeSet<String>,
) -> (BTreeSet<String>, Proposition) {
    let mut avoid = avoid.clone();
    avoid.extend(statement.variable_names());
    let mut metas = BTreeSet::new();
    let mut body = statement.clone();
    loop {
        match body {
            Proposition::Forall { var, body: inner } => {
                let meta = fresh_name(&var, &avoid);
                avoid.insert(meta.clone());
                body = inner.substitute(&var, &Term::variable(meta.clone()));
                metas.insert(meta);
            }
            other => return (metas, other),
        }
    }
}

/// Ways to read `statement` as a rule, most literal first.
fn candidates(statement: &Proposition, avoid: &BTreeSet<String>) -> Vec<Candidate> {
    let mut out = vec![Candidate {
        metas: BTreeSet::new(),
        conclusion: statement.clone(),
        premises: Vec::new(),
    }];
    let (metas, body) = open_statement(statement, avoid);
    if !metas.is_empty() {
        out.push(Candidate { metas: metas.clone(), conclusion: body.clone(), premises: Vec::new() });
    }
    let mut premises = Vec::new();
    let mut rest = &body;
    while let Proposition::Implies(premise, conclusion) = rest {
        premises.push((**premise).clone());
        out.push(Candidate {
            metas: metas.clone(),
            conclusion: (**conclusion).clone(),
            premises: premises.clone(),
        });
        rest = conclusion.as_ref();
    }
    if let Proposition::Iff(left, right) = &body {
        out.push(Candidate {
            metas: metas.clone(),
            conclusion: (**left).clone(),
            premises: vec![(**right).clone()],
        });
        out.push(Candidate {
            metas,
            conclusion: (**right).clone(),
            premises: vec![(**left).clone()],
        });
    }
    out
}

/// One direction of a biconditional used for rewriting.
struct Rule<'r> {
    pattern: &'r Proposition,
    replacement: &'r Proposition,
    metas: &'r BTreeSet<String>,
    fixed: &'r BTreeSet<String>,
}

impl Rule<'_> {
    /// First subformula of `subject`, in pre-order, that is an instance of
    /// the pattern, paired with the matching instance of the replacement.
    ///
    /// Quantifiers binding a fixed variable of the rule are not entered.
    fn first_instance(&self, subject: &Proposition) -> Option<(Proposition, Proposition)> {
        let mut matcher = Matcher::new(self.metas.clone());
        if matcher.match_pattern(self.pattern, subject).is_ok() {
            if let Ok(replaced) = matcher.instantiation().instantiate(self.replacement, self.metas) {
                return Some((subject.clone(), replaced));
            }
        }
        if subject.binder().is_some_and(|var| self.fixed.contains(var)) {
            return None;
        }
        subject.children().into_iter().find_map(|child| self.first_instance(child))
    }
}

/// Some hypothesis is the negation of another.
fn has_contradiction(ctx: &Context) -> bool {
    ctx.hypotheses().any(|(_, prop)| match prop {
        Proposition::Not(inner) => ctx.hypotheses().any(|(_, other)| other.alpha_eq(inner)),
        _ => false,
    })
}
