use crate::data::{Proposition, Term};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Failures while evaluating a proposition in a [`Model`].
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
pub enum EvalError {
    #[error("variable `{0}` has no value in the model")]
    UnboundVariable(String),
    #[error("constant `{0}` has no interpretation in the model")]
    UnknownConstant(String),
    #[error("constant `{name}` is interpreted as {element}, outside a carrier of size {domain}")]
    OutOfDomain { name: String, element: usize, domain: usize },
    #[error("the carrier must not be empty")]
    EmptyDomain,
    #[error("search space of {bits} interpretation bits exceeds the limit of {limit}")]
    SearchTooLarge { bits: usize, limit: usize },
}

/// A finite interpretation: carrier `0..domain`, predicate extensions and constants.
///
/// Nullary predicates are true exactly when their extension holds the empty tuple.
/// Schematic propositions are interpreted like predicates of the same name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Model {
    domain: usize,
    extensions: BTreeMap<String, BTreeSet<Vec<usize>>>,
    arities: BTreeMap<String, usize>,
    constants: BTreeMap<String, usize>,
}

impl Model {
    pub fn new(domain: usize) -> Self {
        Self { domain, ..Self::default() }
    }

    pub fn domain(&self) -> usize {
        self.domain
    }

    /// Set the truth value of a nullary atom.
    pub fn with_atom(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set_atom(name, value);
        self
    }

    pub fn set_atom(&mut self, name: impl Into<String>, value: bool) {
        let name = name.into();
        self.arities.insert(name.clone(), 0);
        let extension = self.extensions.entry(name).or_default();
        if value {
            extension.insert(Vec::new());
        } else {
            extension.remove(&Vec::new());
        }
    }

    /// Declare the full extension of a unary or n-ary predicate.
    pub fn with_extension<I>(mut self, name: impl Into<String>, tuples: I) -> Self
    where
        I: IntoIterator<Item = Vec<usize>>,
    {
        let name = name.into();
        let extension: BTreeSet<Vec<usize>> = tuples.into_iter().collect();
        let arity = extension.iter().next().map_or(1, Vec::len);
        self.arities.insert(name.clone(), arity);
        self.extensions.insert(name, extension);
        self
    }

    pub fn with_constant(mut self, name: impl Into<String>, element: usize) -> Self {
        self.constants.insert(name.into(), element);
        self
    }

    pub(crate) fn insert_tuple(&mut self, name: &str, tuple: Vec<usize>) {
        self.extensions.entry(name.to_string()).or_default().insert(tuple);
    }

    pub(crate) fn declare(&mut self, name: &str, arity: usize) {
        self.arities.insert(name.to_string(), arity);
        self.extensions.entry(name.to_string()).or_default();
    }

    pub fn constant(&self, name: &str) -> Option<usize> {
        self.constants.get(name).copied()
    }

    pub(crate) fn set_constant(&mut self, name: &str, element: usize) {
        self.constants.insert(name.to_string(), element);
    }

    fn holds(&self, name: &str, tuple: &[usize]) -> bool {
        self.extensions.get(name).is_some_and(|ext| ext.contains(tuple))
    }

    /// Evaluate a closed proposition.
    pub fn evaluate(&self, prop: &Proposition) -> Result<bool, EvalError> {
        self.evaluate_with(prop, &BTreeMap::new())
    }

    /// Evaluate with values for free variables.
    pub fn evaluate_with(
        &self,
        prop: &Proposition,
        env: &BTreeMap<String, usize>,
    ) -> Result<bool, EvalError> {
        if self.domain == 0 {
            return Err(EvalError::EmptyDomain);
        }
        let mut env = env.clone();
        self.eval(prop, &mut env)
    }

    fn element(&self, term: &Term, env: &BTreeMap<String, usize>) -> Result<usize, EvalError> {
        let element = match term {
            Term::Variable(name) => *env
                .get(name)
                .ok_or_else(|| EvalError::UnboundVariable(name.clone()))?,
            Term::Constant(name) => *self
                .constants
                .get(name)
                .ok_or_else(|| EvalError::UnknownConstant(name.clone()))?,
        };
        if element >= self.domain {
            return Err(EvalError::OutOfDomain {
                name: term.name().to_string(),
                element,
                domain: self.domain,
            });
        }
        Ok(element)
    }

    fn eval(&self, prop: &Proposition, env: &mut BTreeMap<String, usize>) -> Result<bool, EvalError> {
        Ok(match prop {
            Proposition::Atom { predicate: name, args }
            | Proposition::Schematic { name, args } => {
                let tuple = args
                    .iter()
                    .map(|arg| self.element(arg, env))
                    .collect::<Result<Vec<_>, _>>()?;
                self.holds(name, &tuple)
            }
            Proposition::Not(inner) => !self.eval(inner, env)?,
            Proposition::And(a, b) => self.eval(a, env)? && self.eval(b, env)?,
            Proposition::Or(a, b) => self.eval(a, env)? || self.eval(b, env)?,
            Proposition::Implies(a, b) => !self.eval(a, env)? || self.eval(b, env)?,
            Proposition::Iff(a, b) => self.eval(a, env)? == self.eval(b, env)?,
            Proposition::Forall { var, body } => {
                let mut result = true;
                for element in 0..self.domain {
                    if !self.eval_bound(var, element, body, env)? {
                        result = false;
                        break;
                    }
                }
                result
            }
            Proposition::Exists { var, body } => {
                let mut result = false;
                for element in 0..self.domain {
                    if self.eval_bound(var, element, body, env)? {
                        result = true;
                        break;
                    }
                }
                result
            }
        })
    }

    fn eval_bound(
        &self,
        var: &str,
        element: usize,
        body: &Proposition,
        env: &mut BTreeMap<String, usize>,
    ) -> Result<bool, EvalError> {
        let shadowed = env.insert(var.to_string(), element);
        let result = self.eval(body, env);
        match shadowed {
            Some(previous) => env.insert(var.to_string(), previous),
            None => env.remove(var),
        };
        result
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        let relational = !self.constants.is_empty() || self.arities.values().any(|&n| n > 0);
        if relational {
            parts.push(format!("|carrier| = {}", self.domain));
        }
        for (name, extension) in &self.extensions {
            if self.arities.get(name).copied().unwrap_or(0) == 0 {
                parts.push(format!("{name} = {}", !extension.is_empty()));
                continue;
            }
            let tuples: Vec<String> = extension
                .iter()
                .map(|tuple| {
                    let items: Vec<String> = tuple.iter().map(usize::to_string).collect();
                    format!("({})", items.join(", "))
                })
                .collect();
            parts.push(format!("{name} = {{{}}}", tuples.join(", ")));
        }
        for (name, element) in &self.constants {
            parts.push(format!("{name} = #{element}"));
        }
        f.write_str(&parts.join(", "))
    }
}
