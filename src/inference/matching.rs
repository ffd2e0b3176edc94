//! One-way matching of lemma patterns against goal propositions.
//!
//! Patterns carry two kinds of meta-variables: carrier variables bound by
//! the leading `∀` prefix of a lemma, and schematic propositions such as the
//! `P` of excluded middle. A schematic applied to bound variables (`P(a)`
//! under `∃a`) is matched as a higher-order pattern: the target subformula is
//! abstracted over the corresponding bound variables of the target.

use crate::data::{fresh_name, Proposition, Term};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::trace;

/// A schematic binding `λparams. body`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Abstraction {
    pub params: Vec<String>,
    pub body: Proposition,
}

impl Abstraction {
    pub fn new(params: Vec<String>, body: Proposition) -> Self {
        Self { params, body }
    }

    /// Abstraction with no parameters, for nullary schematics.
    pub fn constant(body: Proposition) -> Self {
        Self::new(Vec::new(), body)
    }

    /// Free variables of the body that are not parameters.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut free = self.body.free_variables();
        for param in &self.params {
            free.remove(param);
        }
        free
    }

    /// Simultaneous capture-avoiding substitution of `args` for the parameters.
    pub fn apply(&self, args: &[Term]) -> Proposition {
        if let ([param], [arg]) = (self.params.as_slice(), args) {
            return self.body.substitute(param, arg);
        }
        let mut avoid = self.body.variable_names();
        avoid.extend(args.iter().filter_map(Term::as_variable).map(str::to_string));
        let mut body = self.body.clone();
        let mut staged = Vec::with_capacity(self.params.len());
        for param in &self.params {
            let temp = fresh_name(param, &avoid);
            avoid.insert(temp.clone());
            body = body.substitute(param, &Term::variable(temp.clone()));
            staged.push(temp);
        }
        for (temp, arg) in staged.iter().zip(args) {
            body = body.substitute(temp, arg);
        }
        body
    }
}

/// Errors that can occur while matching or instantiating a pattern.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("pattern {pattern} does not match {target}")]
    Clash { pattern: String, target: String },
    #[error("bound variable `{0}` would escape its quantifier")]
    Escape(String),
    #[error("schematic `{0}` is applied to something other than distinct variables")]
    NotAPattern(String),
    #[error("schematic `{0}` is not determined by the match")]
    UnboundSchematic(String),
    #[error("variable `{0}` is not determined by the match")]
    UnboundVariable(String),
}

/// Bindings produced by a successful match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Instantiation {
    terms: BTreeMap<String, Term>,
    schemata: BTreeMap<String, Abstraction>,
}

impl Instantiation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_term(&mut self, var: impl Into<String>, term: Term) {
        self.terms.insert(var.into(), term);
    }

    pub fn bind_schematic(&mut self, name: impl Into<String>, abstraction: Abstraction) {
        self.schemata.insert(name.into(), abstraction);
    }

    pub fn term(&self, var: &str) -> Option<&Term> {
        self.terms.get(var)
    }

    pub fn schematic(&self, name: &str) -> Option<&Abstraction> {
        self.schemata.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.schemata.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len() + self.schemata.len()
    }

    /// Variables occurring free in any bound value.
    fn value_names(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .terms
            .values()
            .filter_map(Term::as_variable)
            .map(str::to_string)
            .collect();
        for abstraction in self.schemata.values() {
            names.extend(abstraction.free_variables());
        }
        names
    }

    /// Build the instance of `pattern`, where `metas` are its carrier meta-variables.
    ///
    /// Binders of the pattern are renamed away from the free variables of the
    /// bound values, so inserted values are never captured.
    pub fn instantiate(
        &self,
        pattern: &Proposition,
        metas: &BTreeSet<String>,
    ) -> Result<Proposition, MatchError> {
        let mut avoid = self.value_names();
        avoid.extend(pattern.variable_names());
        self.instantiate_in(pattern, metas, &self.value_names(), &mut avoid, &mut Vec::new())
    }

    fn instantiate_in(
        &self,
        pattern: &Proposition,
        metas: &BTreeSet<String>,
        values: &BTreeSet<String>,
        avoid: &mut BTreeSet<String>,
        scope: &mut Vec<(String, String)>,
    ) -> Result<Proposition, MatchError> {
        Ok(match pattern {
            Proposition::Atom { predicate, args } => {
                Proposition::atom(predicate.clone(), self.instantiate_args(args, metas, scope)?)
            }
            Proposition::Schematic { name, args } => {
                let abstraction = self
                    .schematic(name)
                    .ok_or_else(|| MatchError::UnboundSchematic(name.clone()))?;
                abstraction.apply(&self.instantiate_args(args, metas, scope)?)
            }
            Proposition::Not(inner) => {
                Proposition::not(self.instantiate_in(inner, metas, values, avoid, scope)?)
            }
            Proposition::And(a, b) => Proposition::and(
                self.instantiate_in(a, metas, values, avoid, scope)?,
                self.instantiate_in(b, metas, values, avoid, scope)?,
            ),
            Proposition::Or(a, b) => Proposition::or(
                self.instantiate_in(a, metas, values, avoid, scope)?,
                self.instantiate_in(b, metas, values, avoid, scope)?,
            ),
            Proposition::Implies(a, b) => Proposition::implies(
                self.instantiate_in(a, metas, values, avoid, scope)?,
                self.instantiate_in(b, metas, values, avoid, scope)?,
            ),
            Proposition::Iff(a, b) => Proposition::iff(
                self.instantiate_in(a, metas, values, avoid, scope)?,
                self.instantiate_in(b, metas, values, avoid, scope)?,
            ),
            Proposition::Forall { var, body } => {
                let (var, body) = self.instantiate_binder(var, body, metas, values, avoid, scope)?;
                Proposition::forall(var, body)
            }
            Proposition::Exists { var, body } => {
                let (var, body) = self.instantiate_binder(var, body, metas, values, avoid, scope)?;
                Proposition::exists(var, body)
            }
        })
    }

    fn instantiate_binder(
        &self,
        var: &str,
        body: &Proposition,
        metas: &BTreeSet<String>,
        values: &BTreeSet<String>,
        avoid: &mut BTreeSet<String>,
        scope: &mut Vec<(String, String)>,
    ) -> Result<(String, Proposition), MatchError> {
        let renamed = if values.contains(var) {
            let fresh = fresh_name(var, avoid);
            avoid.insert(fresh.clone());
            fresh
        } else {
            var.to_string()
        };
        scope.push((var.to_string(), renamed.clone()));
        let body = self.instantiate_in(body, metas, values, avoid, scope);
        scope.pop();
        Ok((renamed, body?))
    }

    fn instantiate_args(
        &self,
        args: &[Term],
        metas: &BTreeSet<String>,
        scope: &[(String, String)],
    ) -> Result<Vec<Term>, MatchError> {
        args.iter().map(|arg| self.instantiate_term(arg, metas, scope)).collect()
    }

    fn instantiate_term(
        &self,
        term: &Term,
        metas: &BTreeSet<String>,
        scope: &[(String, String)],
    ) -> Result<Term, MatchError> {
        let Some(var) = term.as_variable() else {
            return Ok(term.clone());
        };
        if let Some((_, renamed)) = scope.iter().rev().find(|(bound, _)| bound == var) {
            return Ok(Term::variable(renamed.clone()));
        }
        match self.term(var) {
            Some(value) => Ok(value.clone()),
            None if metas.contains(var) => Err(MatchError::UnboundVariable(var.to_string())),
            None => Ok(term.clone()),
        }
    }
}

/// Matcher for lemma patterns; bindings accumulate across calls.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    metas: BTreeSet<String>,
    instantiation: Instantiation,
}

impl Matcher {
    /// Create a matcher whose carrier meta-variables are `metas`.
    pub fn new(metas: BTreeSet<String>) -> Self {
        Self { metas, instantiation: Instantiation::new() }
    }

    pub fn metas(&self) -> &BTreeSet<String> {
        &self.metas
    }

    pub fn instantiation(&self) -> &Instantiation {
        &self.instantiation
    }

    pub fn into_instantiation(self) -> Instantiation {
        self.instantiation
    }

    /// Match `pattern` against `target`, extending the current bindings.
    pub fn match_pattern(
        &mut self,
        pattern: &Proposition,
        target: &Proposition,
    ) -> Result<(), MatchError> {
        let result = self.match_in(pattern, target, &mut Vec::new());
        trace!(%pattern, %target, ok = result.is_ok(), "match attempt");
        result
    }

    fn clash(pattern: &Proposition, target: &Proposition) -> MatchError {
        MatchError::Clash { pattern: pattern.to_string(), target: target.to_string() }
    }

    fn match_in(
        &mut self,
        pattern: &Proposition,
        target: &Proposition,
        scope: &mut Vec<(String, String)>,
    ) -> Result<(), MatchError> {
        match (pattern, target) {
            (Proposition::Schematic { name, args }, _) => {
                self.match_schematic(name, args, target, scope)
            }
            (
                Proposition::Atom { predicate: p, args: xs },
                Proposition::Atom { predicate: q, args: ys },
            ) => {
                if p != q || xs.len() != ys.len() {
                    return Err(Self::clash(pattern, target));
                }
                for (x, y) in xs.iter().zip(ys) {
                    if !self.match_term(x, y, scope) {
                        return Err(Self::clash(pattern, target));
                    }
                }
                Ok(())
            }
            (Proposition::Not(a), Proposition::Not(b)) => self.match_in(a, b, scope),
            (Proposition::And(a1, b1), Proposition::And(a2, b2))
            | (Proposition::Or(a1, b1), Proposition::Or(a2, b2))
            | (Proposition::Implies(a1, b1), Proposition::Implies(a2, b2))
            | (Proposition::Iff(a1, b1), Proposition::Iff(a2, b2)) => {
                self.match_in(a1, a2, scope)?;
                self.match_in(b1, b2, scope)
            }
            (
                Proposition::Forall { var: v1, body: b1 },
                Proposition::Forall { var: v2, body: b2 },
            )
            | (
                Proposition::Exists { var: v1, body: b1 },
                Proposition::Exists { var: v2, body: b2 },
            ) => {
                scope.push((v1.clone(), v2.clone()));
                let result = self.match_in(b1, b2, scope);
                scope.pop();
                result
            }
            _ => Err(Self::clash(pattern, target)),
        }
    }

    fn match_term(&mut self, pattern: &Term, target: &Term, scope: &[(String, String)]) -> bool {
        let (var, target_var) = match (pattern, target) {
            (Term::Constant(a), Term::Constant(b)) => return a == b,
            (Term::Constant(_), Term::Variable(_)) => return false,
            (Term::Variable(var), other) => (var, other.as_variable()),
        };
        let pattern_side = scope.iter().rposition(|(p, _)| p == var);
        let target_side =
            target_var.and_then(|name| scope.iter().rposition(|(_, t)| t == name));
        if pattern_side.is_some() || target_side.is_some() {
            return pattern_side == target_side;
        }
        if !self.metas.contains(var) {
            return pattern == target;
        }
        match self.instantiation.term(var) {
            Some(bound) => bound == target,
            None => {
                self.instantiation.bind_term(var.clone(), target.clone());
                true
            }
        }
    }

    /// Resolve a schematic argument to the target term it stands for.
    fn resolve_argument(
        &self,
        name: &str,
        arg: &Term,
        scope: &[(String, String)],
    ) -> Result<Term, MatchError> {
        let Some(var) = arg.as_variable() else {
            return Ok(arg.clone());
        };
        if let Some((_, target)) = scope.iter().rev().find(|(p, _)| p == var) {
            return Ok(Term::variable(target.clone()));
        }
        if self.metas.contains(var) {
            return self
                .instantiation
                .term(var)
                .cloned()
                .ok_or_else(|| MatchError::NotAPattern(name.to_string()));
        }
        Ok(arg.clone())
    }

    fn match_schematic(
        &mut self,
        name: &str,
        args: &[Term],
        target: &Proposition,
        scope: &[(String, String)],
    ) -> Result<(), MatchError> {
        let resolved = args
            .iter()
            .map(|arg| self.resolve_argument(name, arg, scope))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(existing) = self.instantiation.schematic(name) {
            return if existing.apply(&resolved).alpha_eq(target) {
                Ok(())
            } else {
                Err(MatchError::Clash {
                    pattern: existing.apply(&resolved).to_string(),
                    target: target.to_string(),
                })
            };
        }

        let mut params = Vec::with_capacity(resolved.len());
        for term in &resolved {
            match term.as_variable() {
                Some(var) if !params.iter().any(|p: &String| p == var) => {
                    params.push(var.to_string())
                }
                _ => return Err(MatchError::NotAPattern(name.to_string())),
            }
        }
        for free in target.free_variables() {
            let bound_in_target = scope.iter().any(|(_, t)| *t == free);
            if bound_in_target && !params.contains(&free) {
                return Err(MatchError::Escape(free));
            }
        }
        self.instantiation
            .bind_schematic(name.to_string(), Abstraction::new(params, target.clone()));
        Ok(())
    }
}
