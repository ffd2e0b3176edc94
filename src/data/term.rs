use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic classification of carrier terms.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TermKind {
    Variable,
    Constant,
}

/// An element of the single abstract carrier type.
///
/// Variables are either bound by a quantifier or fixed in a goal's context;
/// constants are opaque names that are never bound.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    Variable(String),
    Constant(String),
}

impl Term {
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Self::Constant(name.into())
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Variable(_) => TermKind::Variable,
            Term::Constant(_) => TermKind::Constant,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Term::Variable(name) | Term::Constant(name) => name,
        }
    }

    /// Name of the variable, or `None` for constants.
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Term::Variable(name) => Some(name),
            Term::Constant(_) => None,
        }
    }

    pub fn is_variable_named(&self, var: &str) -> bool {
        self.as_variable() == Some(var)
    }

    /// Replace the variable `var` by `replacement`.
    pub fn substitute(&self, var: &str, replacement: &Term) -> Term {
        if self.is_variable_named(var) {
            replacement.clone()
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{Term, TermKind};

    #[test]
    fn classify_terms() {
        let x = Term::variable("x");
        let c = Term::constant("c");
        assert_eq!(x.kind(), TermKind::Variable);
        assert_eq!(c.kind(), TermKind::Constant);
        assert_eq!(x.as_variable(), Some("x"));
        assert!(c.as_variable().is_none());
    }

    #[test]
    fn substitution_only_touches_the_named_variable() {
        let replacement = Term::variable("y");
        assert_eq!(Term::variable("x").substitute("x", &replacement), replacement);
        assert_eq!(
            Term::variable("z").substitute("x", &replacement),
            Term::variable("z")
        );
        assert_eq!(
            Term::constant("x").substitute("x", &replacement),
            Term::constant("x")
        );
    }
}
