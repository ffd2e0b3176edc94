use super::proposition::{fresh_name, Proposition};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

/// Failures when reading or extending a [`Context`].
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
pub enum ContextError {
    #[error("name `{0}` is already bound in the context")]
    DuplicateName(String),
    #[error("no hypothesis named `{0}`")]
    NotFound(String),
}

/// Named hypotheses and fixed carrier variables, in insertion order.
///
/// Hypotheses and fixed variables share one namespace. Every operation
/// returns a new context; an existing context is never modified.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Context {
    variables: IndexSet<String>,
    hypotheses: IndexMap<String, Proposition>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_hypothesis(
        &self,
        name: impl Into<String>,
        prop: Proposition,
    ) -> Result<Context, ContextError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(ContextError::DuplicateName(name));
        }
        let mut next = self.clone();
        next.hypotheses.insert(name, prop);
        Ok(next)
    }

    /// Fix a carrier variable, as `intro` does for `∀x. P`.
    pub fn add_variable(&self, name: impl Into<String>) -> Result<Context, ContextError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(ContextError::DuplicateName(name));
        }
        let mut next = self.clone();
        next.variables.insert(name);
        Ok(next)
    }

    pub fn lookup(&self, name: &str) -> Result<&Proposition, ContextError> {
        self.hypotheses
            .get(name)
            .ok_or_else(|| ContextError::NotFound(name.to_string()))
    }

    /// Replace hypothesis `name` by `replacements`, keeping its position.
    ///
    /// A replacement may reuse `name` itself; any other clash is rejected.
    pub fn split_hypothesis(
        &self,
        name: &str,
        replacements: Vec<(String, Proposition)>,
    ) -> Result<Context, ContextError> {
        self.lookup(name)?;
        let mut seen = BTreeSet::new();
        for (new_name, _) in &replacements {
            if (new_name != name && self.contains(new_name)) || !seen.insert(new_name.clone()) {
                return Err(ContextError::DuplicateName(new_name.clone()));
            }
        }
        let mut replacements = Some(replacements);
        let mut hypotheses = IndexMap::with_capacity(self.hypotheses.len() + 1);
        for (existing, prop) in &self.hypotheses {
            if existing == name {
                hypotheses.extend(replacements.take().into_iter().flatten());
            } else {
                hypotheses.insert(existing.clone(), prop.clone());
            }
        }
        Ok(Context { variables: self.variables.clone(), hypotheses })
    }

    pub fn replace_hypothesis(
        &self,
        name: &str,
        prop: Proposition,
    ) -> Result<Context, ContextError> {
        self.split_hypothesis(name, vec![(name.to_string(), prop)])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hypotheses.contains_key(name) || self.variables.contains(name)
    }

    pub fn is_fixed(&self, var: &str) -> bool {
        self.variables.contains(var)
    }

    pub fn hypotheses(&self) -> impl Iterator<Item = (&str, &Proposition)> {
        self.hypotheses.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    pub fn hypothesis_count(&self) -> usize {
        self.hypotheses.len()
    }

    /// No hypotheses and no fixed variables.
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty() && self.variables.is_empty()
    }

    /// Names a new binding must avoid: hypothesis names, fixed variables
    /// and variables occurring free in any hypothesis.
    pub fn names_in_use(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self.variables.iter().cloned().collect();
        for (name, prop) in &self.hypotheses {
            names.insert(name.clone());
            names.extend(prop.free_variables());
        }
        names
    }

    pub fn fresh_name(&self, base: &str) -> String {
        fresh_name(base, &self.names_in_use())
    }
}
