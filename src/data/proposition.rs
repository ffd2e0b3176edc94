//! Propositions over a single abstract carrier type.
//!
//! Propositions are immutable values. Quantifier instantiation goes through
//! [`Proposition::substitute`], which renames bound variables whenever they
//! would capture a free variable of the replacement.

use super::term::Term;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A formula of the logic under study.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proposition {
    /// Predicate application `P(a, ...)`; nullary atoms are plain propositional variables.
    Atom { predicate: String, args: Vec<Term> },
    /// Proposition meta-variable `P(a, ...)`, only meaningful inside lemma statements.
    Schematic { name: String, args: Vec<Term> },
    /// Negation
    Not(Box<Proposition>),
    /// Conjunction
    And(Box<Proposition>, Box<Proposition>),
    /// Disjunction
    Or(Box<Proposition>, Box<Proposition>),
    /// Implication
    Implies(Box<Proposition>, Box<Proposition>),
    /// Biconditional
    Iff(Box<Proposition>, Box<Proposition>),
    /// Universal quantification
    Forall { var: String, body: Box<Proposition> },
    /// Existential quantification
    Exists { var: String, body: Box<Proposition> },
}

impl Proposition {
    /// Nullary atom, i.e. an atomized propositional variable.
    pub fn prop(name: impl Into<String>) -> Self {
        Self::Atom { predicate: name.into(), args: Vec::new() }
    }

    pub fn atom(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self::Atom { predicate: predicate.into(), args }
    }

    /// Unary predicate applied to a variable, the common case `X(a)`.
    pub fn pred(predicate: impl Into<String>, var: impl Into<String>) -> Self {
        Self::atom(predicate, vec![Term::variable(var)])
    }

    pub fn schematic(name: impl Into<String>, args: Vec<Term>) -> Self {
        Self::Schematic { name: name.into(), args }
    }

    pub fn not(inner: Proposition) -> Self {
        Self::Not(Box::new(inner))
    }

    pub fn and(left: Proposition, right: Proposition) -> Self {
        Self::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Proposition, right: Proposition) -> Self {
        Self::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(left: Proposition, right: Proposition) -> Self {
        Self::Implies(Box::new(left), Box::new(right))
    }

    pub fn iff(left: Proposition, right: Proposition) -> Self {
        Self::Iff(Box::new(left), Box::new(right))
    }

    pub fn forall(var: impl Into<String>, body: Proposition) -> Self {
        Self::Forall { var: var.into(), body: Box::new(body) }
    }

    pub fn exists(var: impl Into<String>, body: Proposition) -> Self {
        Self::Exists { var: var.into(), body: Box::new(body) }
    }

    pub fn negate(self) -> Self {
        Self::not(self)
    }

    /// Human-readable name of the outermost connective.
    pub fn shape(&self) -> &'static str {
        match self {
            Proposition::Atom { .. } => "an atom",
            Proposition::Schematic { .. } => "a schematic proposition",
            Proposition::Not(_) => "a negation",
            Proposition::And(..) => "a conjunction",
            Proposition::Or(..) => "a disjunction",
            Proposition::Implies(..) => "an implication",
            Proposition::Iff(..) => "a biconditional",
            Proposition::Forall { .. } => "a universal quantification",
            Proposition::Exists { .. } => "an existential quantification",
        }
    }

    pub fn is_closed(&self) -> bool {
        self.free_variables().is_empty()
    }

    pub fn has_schematic(&self) -> bool {
        match self {
            Proposition::Schematic { .. } => true,
            Proposition::Atom { .. } => false,
            Proposition::Not(inner) => inner.has_schematic(),
            Proposition::And(a, b)
            | Proposition::Or(a, b)
            | Proposition::Implies(a, b)
            | Proposition::Iff(a, b) => a.has_schematic() || b.has_schematic(),
            Proposition::Forall { body, .. } | Proposition::Exists { body, .. } => {
                body.has_schematic()
            }
        }
    }

    /// Variables occurring free.
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_free(&mut Vec::new(), &mut out);
        out
    }

    fn collect_free(&self, bound: &mut Vec<String>, out: &mut BTreeSet<String>) {
        match self {
            Proposition::Atom { args, .. } | Proposition::Schematic { args, .. } => {
                for arg in args {
                    if let Some(name) = arg.as_variable() {
                        if !bound.iter().any(|b| b == name) {
                            out.insert(name.to_string());
                        }
                    }
                }
            }
            Proposition::Not(inner) => inner.collect_free(bound, out),
            Proposition::And(a, b)
            | Proposition::Or(a, b)
            | Proposition::Implies(a, b)
            | Proposition::Iff(a, b) => {
                a.collect_free(bound, out);
                b.collect_free(bound, out);
            }
            Proposition::Forall { var, body } | Proposition::Exists { var, body } => {
                bound.push(var.clone());
                body.collect_free(bound, out);
                bound.pop();
            }
        }
    }

    /// Every variable name occurring anywhere, bound or free.
    pub fn variable_names(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut BTreeSet<String>) {
        match self {
            Proposition::Atom { args, .. } | Proposition::Schematic { args, .. } => {
                out.extend(args.iter().filter_map(Term::as_variable).map(str::to_string));
            }
            Proposition::Not(inner) => inner.collect_names(out),
            Proposition::And(a, b)
            | Proposition::Or(a, b)
            | Proposition::Implies(a, b)
            | Proposition::Iff(a, b) => {
                a.collect_names(out);
                b.collect_names(out);
            }
            Proposition::Forall { var, body } | Proposition::Exists { var, body } => {
                out.insert(var.clone());
                body.collect_names(out);
            }
        }
    }

    /// Constant names, sorted.
    pub fn constants(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.visit_args(&mut |arg| {
            if let Term::Constant(name) = arg {
                out.insert(name.clone());
            }
        });
        out
    }

    /// Predicate and schematic names with their arities.
    pub fn predicates(&self) -> BTreeMap<String, usize> {
        let mut out = BTreeMap::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates(&self, out: &mut BTreeMap<String, usize>) {
        match self {
            Proposition::Atom { predicate: name, args }
            | Proposition::Schematic { name, args } => {
                out.entry(name.clone()).or_insert(args.len());
            }
            Proposition::Not(inner) => inner.collect_predicates(out),
            Proposition::And(a, b)
            | Proposition::Or(a, b)
            | Proposition::Implies(a, b)
            | Proposition::Iff(a, b) => {
                a.collect_predicates(out);
                b.collect_predicates(out);
            }
            Proposition::Forall { body, .. } | Proposition::Exists { body, .. } => {
                body.collect_predicates(out)
            }
        }
    }

    fn visit_args(&self, visit: &mut impl FnMut(&Term)) {
        match self {
            Proposition::Atom { args, .. } | Proposition::Schematic { args, .. } => {
                args.iter().for_each(|arg| visit(arg))
            }
            Proposition::Not(inner) => inner.visit_args(visit),
            Proposition::And(a, b)
            | Proposition::Or(a, b)
            | Proposition::Implies(a, b)
            | Proposition::Iff(a, b) => {
                a.visit_args(visit);
                b.visit_args(visit);
            }
            Proposition::Forall { body, .. } | Proposition::Exists { body, .. } => {
                body.visit_args(visit)
            }
        }
    }

    /// Capture-avoiding substitution of `replacement` for the free variable `var`.
    pub fn substitute(&self, var: &str, replacement: &Term) -> Proposition {
        match self {
            Proposition::Atom { predicate, args } => Proposition::Atom {
                predicate: predicate.clone(),
                args: args.iter().map(|arg| arg.substitute(var, replacement)).collect(),
            },
            Proposition::Schematic { name, args } => Proposition::Schematic {
                name: name.clone(),
                args: args.iter().map(|arg| arg.substitute(var, replacement)).collect(),
            },
            Proposition::Not(inner) => Proposition::not(inner.substitute(var, replacement)),
            Proposition::And(a, b) => Proposition::and(
                a.substitute(var, replacement),
                b.substitute(var, replacement),
            ),
            Proposition::Or(a, b) => Proposition::or(
                a.substitute(var, replacement),
                b.substitute(var, replacement),
            ),
            Proposition::Implies(a, b) => Proposition::implies(
                a.substitute(var, replacement),
                b.substitute(var, replacement),
            ),
            Proposition::Iff(a, b) => Proposition::iff(
                a.substitute(var, replacement),
                b.substitute(var, replacement),
            ),
            Proposition::Forall { var: bound, body } => {
                let (bound, body) = substitute_under_binder(bound, body, var, replacement);
                Proposition::forall(bound, body)
            }
            Proposition::Exists { var: bound, body } => {
                let (bound, body) = substitute_under_binder(bound, body, var, replacement);
                Proposition::exists(bound, body)
            }
        }
    }

    /// Equality up to consistent renaming of bound variables.
    pub fn alpha_eq(&self, other: &Proposition) -> bool {
        self.alpha_eq_in(other, &mut Vec::new())
    }

    fn alpha_eq_in(&self, other: &Proposition, scope: &mut Vec<(String, String)>) -> bool {
        match (self, other) {
            (
                Proposition::Atom { predicate: p, args: xs },
                Proposition::Atom { predicate: q, args: ys },
            )
            | (
                Proposition::Schematic { name: p, args: xs },
                Proposition::Schematic { name: q, args: ys },
            ) => {
                p == q
                    && xs.len() == ys.len()
                    && xs.iter().zip(ys).all(|(x, y)| terms_alpha_eq(x, y, scope))
            }
            (Proposition::Not(a), Proposition::Not(b)) => a.alpha_eq_in(b, scope),
            (Proposition::And(a1, b1), Proposition::And(a2, b2))
            | (Proposition::Or(a1, b1), Proposition::Or(a2, b2))
            | (Proposition::Implies(a1, b1), Proposition::Implies(a2, b2))
            | (Proposition::Iff(a1, b1), Proposition::Iff(a2, b2)) => {
                a1.alpha_eq_in(a2, scope) && b1.alpha_eq_in(b2, scope)
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
                let equal = b1.alpha_eq_in(b2, scope);
                scope.pop();
                equal
            }
            _ => false,
        }
    }

    /// Replace every subformula that is alpha-equivalent to `from` by `to`.
    ///
    /// Binders of a variable free in `from` or `to` are not entered: an
    /// occurrence there refers to the bound variable, not the free one.
    /// Returns the rewritten proposition and the number of replacements.
    pub fn replace_all(&self, from: &Proposition, to: &Proposition) -> (Proposition, usize) {
        let mut fixed = from.free_variables();
        fixed.extend(to.free_variables());
        self.replace_outside(from, to, &fixed)
    }

    /// Like [`Proposition::replace_all`], but only binders of names in
    /// `fixed` are skipped.
    ///
    /// Sound for an equivalence `from ↔ to` that holds for every value of
    /// its free variables outside `fixed`.
    pub fn replace_outside(
        &self,
        from: &Proposition,
        to: &Proposition,
        fixed: &BTreeSet<String>,
    ) -> (Proposition, usize) {
        if self.alpha_eq(from) {
            return (to.clone(), 1);
        }
        type Build = fn(Proposition, Proposition) -> Proposition;
        let pair = |a: &Proposition, b: &Proposition, build: Build| {
            let (a, left) = a.replace_outside(from, to, fixed);
            let (b, right) = b.replace_outside(from, to, fixed);
            (build(a, b), left + right)
        };
        match self {
            Proposition::Atom { .. } | Proposition::Schematic { .. } => (self.clone(), 0),
            Proposition::Not(inner) => {
                let (inner, count) = inner.replace_outside(from, to, fixed);
                (Proposition::not(inner), count)
            }
            Proposition::And(a, b) => pair(a, b, Proposition::and),
            Proposition::Or(a, b) => pair(a, b, Proposition::or),
            Proposition::Implies(a, b) => pair(a, b, Proposition::implies),
            Proposition::Iff(a, b) => pair(a, b, Proposition::iff),
            Proposition::Forall { var, .. } | Proposition::Exists { var, .. }
                if fixed.contains(var) =>
            {
                (self.clone(), 0)
            }
            Proposition::Forall { var, body } => {
                let (body, count) = body.replace_outside(from, to, fixed);
                (Proposition::forall(var.clone(), body), count)
            }
            Proposition::Exists { var, body } => {
                let (body, count) = body.replace_outside(from, to, fixed);
                (Proposition::exists(var.clone(), body), count)
            }
        }
    }

    /// The variable bound at the top of a quantifier, if any.
    pub fn binder(&self) -> Option<&str> {
        match self {
            Proposition::Forall { var, .. } | Proposition::Exists { var, .. } => Some(var),
            _ => None,
        }
    }

    /// Immediate subformulas, left to right.
    pub fn children(&self) -> Vec<&Proposition> {
        match self {
            Proposition::Atom { .. } | Proposition::Schematic { .. } => Vec::new(),
            Proposition::Not(inner) => vec![inner.as_ref()],
            Proposition::And(a, b)
            | Proposition::Or(a, b)
            | Proposition::Implies(a, b)
            | Proposition::Iff(a, b) => vec![a.as_ref(), b.as_ref()],
            Proposition::Forall { body, .. } | Proposition::Exists { body, .. } => {
                vec![body.as_ref()]
            }
        }
    }

    fn is_compound(&self) -> bool {
        !matches!(
            self,
            Proposition::Atom { .. } | Proposition::Schematic { .. } | Proposition::Not(_)
        )
    }
}

fn substitute_under_binder(
    bound: &str,
    body: &Proposition,
    var: &str,
    replacement: &Term,
) -> (String, Proposition) {
    if bound == var || !body.free_variables().contains(var) {
        return (bound.to_string(), body.clone());
    }
    if replacement.is_variable_named(bound) {
        let mut avoid = body.variable_names();
        avoid.insert(var.to_string());
        avoid.insert(bound.to_string());
        let renamed = fresh_name(bound, &avoid);
        let body = body.substitute(bound, &Term::variable(renamed.clone()));
        return (renamed, body.substitute(var, replacement));
    }
    (bound.to_string(), body.substitute(var, replacement))
}

fn terms_alpha_eq(x: &Term, y: &Term, scope: &[(String, String)]) -> bool {
    match (x, y) {
        (Term::Constant(a), Term::Constant(b)) => a == b,
        (Term::Variable(a), Term::Variable(b)) => {
            let left = scope.iter().rposition(|(l, _)| l == a);
            let right = scope.iter().rposition(|(_, r)| r == b);
            match (left, right) {
                (None, None) => a == b,
                (l, r) => l == r,
            }
        }
        _ => false,
    }
}

/// First name derived from `base` that does not occur in `avoid`.
pub fn fresh_name(base: &str, avoid: &BTreeSet<String>) -> String {
    if !avoid.contains(base) {
        return base.to_string();
    }
    let stem = base.trim_end_matches(|c: char| c.is_ascii_digit());
    let stem = if stem.is_empty() { "x" } else { stem };
    (0u32..)
        .map(|n| format!("{stem}{n}"))
        .find(|candidate| !avoid.contains(candidate))
        .unwrap_or_else(|| format!("{stem}_"))
}

fn fmt_application(f: &mut fmt::Formatter<'_>, name: &str, args: &[Term]) -> fmt::Result {
    f.write_str(name)?;
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, operand: &Proposition) -> fmt::Result {
    if operand.is_compound() {
        write!(f, "({operand})")
    } else {
        write!(f, "{operand}")
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, op, b) = match self {
            Proposition::Atom { predicate, args } => return fmt_application(f, predicate, args),
            Proposition::Schematic { name, args } => {
                f.write_str("?")?;
                return fmt_application(f, name, args);
            }
            Proposition::Not(inner) => {
                f.write_str("¬")?;
                return fmt_operand(f, inner);
            }
            Proposition::Forall { var, body } => return write!(f, "∀{var}. {body}"),
            Proposition::Exists { var, body } => return write!(f, "∃{var}. {body}"),
            Proposition::And(a, b) => (a, "∧", b),
            Proposition::Or(a, b) => (a, "∨", b),
            Proposition::Implies(a, b) => (a, "→", b),
            Proposition::Iff(a, b) => (a, "↔", b),
        };
        fmt_operand(f, a)?;
        write!(f, " {op} ")?;
        fmt_operand(f, b)
    }
}
