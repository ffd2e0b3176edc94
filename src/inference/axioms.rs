//! The fixed classical axiom set and the lookup seam for further lemmas.
//!
//! Axioms are ordinary lemma statements over schematic propositions. The
//! engine treats them exactly like any other lemma; the only special entry
//! point is [`ClassicalAxioms::case_split`], which instantiates excluded
//! middle for the `em` tactic.

use super::matching::{Abstraction, Instantiation};
use crate::data::{Proposition, Term};
use crate::semantics::{find_countermodel, EvalError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

pub const EXCLUDED_MIDDLE: &str = "excluded_middle";
pub const DOUBLE_NEGATION: &str = "double_negation";
pub const CONTRAPOSITION: &str = "contraposition";
pub const NOT_EXISTS_TO_FORALL: &str = "not_exists_to_forall";
pub const IMPLICATION_AS_DISJUNCTION: &str = "implication_as_disjunction";

/// Largest carrier used when checking a lemma by finite models.
pub const VALIDATION_DOMAIN: usize = 3;

/// A named statement usable by `apply` and `rewrite`.
///
/// Leading universal quantifiers of the statement are instantiated freely;
/// schematic propositions stand for arbitrary formulas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lemma {
    pub name: String,
    pub statement: Proposition,
}

impl Lemma {
    pub fn new(name: impl Into<String>, statement: Proposition) -> Self {
        Self { name: name.into(), statement }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LemmaError {
    #[error("lemma `{0}` is already defined")]
    Duplicate(String),
    #[error("lemma `{name}` has free variables {free:?}")]
    NotClosed { name: String, free: Vec<String> },
    #[error("lemma `{name}` is false in the model {countermodel}")]
    Unsound { name: String, countermodel: String },
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Lookup of lemmas by name.
pub trait LemmaSource {
    fn lookup(&self, name: &str) -> Option<&Lemma>;

    /// All lemma names, in a stable order.
    fn names(&self) -> Vec<&str>;
}

fn check_sound(lemma: &Lemma) -> Result<(), LemmaError> {
    match find_countermodel(&lemma.statement, VALIDATION_DOMAIN)? {
        Some(model) => Err(LemmaError::Unsound {
            name: lemma.name.clone(),
            countermodel: model.to_string(),
        }),
        None => {
            debug!(lemma = %lemma.name, statement = %lemma.statement, "lemma checked");
            Ok(())
        }
    }
}

/// Excluded middle, double negation, contraposition, not-exists-to-forall
/// and implication-as-disjunction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassicalAxioms {
    lemmas: Vec<Lemma>,
}

static STANDARD: OnceLock<ClassicalAxioms> = OnceLock::new();

impl ClassicalAxioms {
    /// The shared, never-mutated axiom set.
    pub fn standard() -> &'static ClassicalAxioms {
        STANDARD.get_or_init(ClassicalAxioms::build)
    }

    fn build() -> Self {
        let p = || Proposition::schematic("P", Vec::new());
        let q = || Proposition::schematic("Q", Vec::new());
        let p_of = |var: &str| Proposition::schematic("P", vec![Term::variable(var)]);
        let lemmas = vec![
            Lemma::new(EXCLUDED_MIDDLE, Proposition::or(p(), Proposition::not(p()))),
            Lemma::new(
                DOUBLE_NEGATION,
                Proposition::iff(Proposition::not(Proposition::not(p())), p()),
            ),
            Lemma::new(
                CONTRAPOSITION,
                Proposition::iff(
                    Proposition::implies(p(), q()),
                    Proposition::implies(Proposition::not(q()), Proposition::not(p())),
                ),
            ),
            Lemma::new(
                NOT_EXISTS_TO_FORALL,
                Proposition::iff(
                    Proposition::not(Proposition::exists("a", Proposition::not(p_of("a")))),
                    Proposition::forall("b", p_of("b")),
                ),
            ),
            Lemma::new(
                IMPLICATION_AS_DISJUNCTION,
                Proposition::iff(
                    Proposition::implies(p(), q()),
                    Proposition::or(Proposition::not(p()), q()),
                ),
            ),
        ];
        Self { lemmas }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lemma> {
        self.lemmas.iter()
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }

    /// Check every axiom against all finite models up to [`VALIDATION_DOMAIN`].
    pub fn validate(&self) -> Result<(), LemmaError> {
        self.lemmas.iter().try_for_each(check_sound)
    }

    /// The two branches `P` and `¬P` of excluded middle for `prop`.
    pub fn case_split(&self, prop: &Proposition) -> (Proposition, Proposition) {
        let mut instantiation = Instantiation::new();
        instantiation.bind_schematic("P", Abstraction::constant(prop.clone()));
        let instance = self
            .lookup(EXCLUDED_MIDDLE)
            .map(|lemma| instantiation.instantiate(&lemma.statement, &BTreeSet::new()));
        match instance {
            Some(Ok(Proposition::Or(holds, fails))) => (*holds, *fails),
            _ => (prop.clone(), Proposition::not(prop.clone())),
        }
    }
}

impl LemmaSource for ClassicalAxioms {
    fn lookup(&self, name: &str) -> Option<&Lemma> {
        self.lemmas.iter().find(|lemma| lemma.name == name)
    }

    fn names(&self) -> Vec<&str> {
        self.lemmas.iter().map(|lemma| lemma.name.as_str()).collect()
    }
}

/// Caller-supplied trusted lemmas, in insertion order.
///
/// Serialized as a list of lemmas; deserializing goes through
/// [`LemmaLibrary::insert`], so a library read from JSON obeys the same rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Lemma>", into = "Vec<Lemma>")]
pub struct LemmaLibrary {
    lemmas: IndexMap<String, Lemma>,
}

impl LemmaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lemmas<I>(lemmas: I) -> Result<Self, LemmaError>
    where
        I: IntoIterator<Item = Lemma>,
    {
        let mut library = Self::new();
        for lemma in lemmas {
            library.insert(lemma)?;
        }
        Ok(library)
    }

    /// Add a lemma. Names already used here or by the classical set are rejected.
    pub fn insert(&mut self, lemma: Lemma) -> Result<(), LemmaError> {
        if self.lemmas.contains_key(&lemma.name)
            || ClassicalAxioms::standard().lookup(&lemma.name).is_some()
        {
            return Err(LemmaError::Duplicate(lemma.name));
        }
        let free = lemma.statement.free_variables();
        if !free.is_empty() {
            return Err(LemmaError::NotClosed { name: lemma.name, free: free.into_iter().collect() });
        }
        self.lemmas.insert(lemma.name.clone(), lemma);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }

    /// Optional finite-model check of every lemma in the library.
    pub fn validate(&self) -> Result<(), LemmaError> {
        self.lemmas.values().try_for_each(check_sound)
    }
}

impl TryFrom<Vec<Lemma>> for LemmaLibrary {
    type Error = LemmaError;

    fn try_from(lemmas: Vec<Lemma>) -> Result<Self, Self::Error> {
        Self::from_lemmas(lemmas)
    }
}

impl From<LemmaLibrary> for Vec<Lemma> {
    fn from(library: LemmaLibrary) -> Self {
        library.lemmas.into_values().collect()
    }
}

impl LemmaSource for LemmaLibrary {
    fn lookup(&self, name: &str) -> Option<&Lemma> {
        self.lemmas.get(name)
    }

    fn names(&self) -> Vec<&str> {
        self.lemmas.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_set_is_sound() {
        let axioms = ClassicalAxioms::standard();
        assert_eq!(axioms.len(), 5);
        assert_eq!(axioms.validate(), Ok(()));
        assert!(std::ptr::eq(axioms, ClassicalAxioms::standard()));
    }

    #[test]
    fn axioms_render_in_logic_notation() {
        let axioms = ClassicalAxioms::standard();
        let shown = |name: &str| axioms.lookup(name).map(|lemma| lemma.statement.to_string());
        assert_eq!(shown(EXCLUDED_MIDDLE).as_deref(), Some("?P ∨ ¬?P"));
        assert_eq!(shown(DOUBLE_NEGATION).as_deref(), Some("¬¬?P ↔ ?P"));
        assert_eq!(
            shown(NOT_EXISTS_TO_FORALL).as_deref(),
            Some("¬(∃a. ¬?P(a)) ↔ (∀b. ?P(b))")
        );
        assert!(axioms.lookup("modus_tollens").is_none());
    }

    #[test]
    fn case_split_instantiates_excluded_middle() {
        let a = Proposition::pred("X", "b");
        let (holds, fails) = ClassicalAxioms::standard().case_split(&a);
        assert_eq!(holds, a);
        assert_eq!(fails, Proposition::not(a));
    }

    #[test]
    fn library_rejects_duplicates_and_open_statements() {
        let mut library = LemmaLibrary::new();
        let peirce = Proposition::implies(
            Proposition::implies(
                Proposition::implies(Proposition::prop("A"), Proposition::prop("B")),
                Proposition::prop("A"),
            ),
            Proposition::prop("A"),
        );
        assert_eq!(library.insert(Lemma::new("peirce", peirce.clone())), Ok(()));
        assert_eq!(
            library.insert(Lemma::new("peirce", peirce)),
            Err(LemmaError::Duplicate("peirce".into()))
        );
        assert_eq!(
            library.insert(Lemma::new(DOUBLE_NEGATION, Proposition::prop("A"))),
            Err(LemmaError::Duplicate(DOUBLE_NEGATION.into()))
        );
        assert!(matches!(
            library.insert(Lemma::new("open", Proposition::pred("X", "a"))),
            Err(LemmaError::NotClosed { .. })
        ));
        assert_eq!(library.names(), vec!["peirce"]);
        assert_eq!(library.validate(), Ok(()));
    }

    #[test]
    fn unsound_library_lemma_is_reported() {
        let library =
            LemmaLibrary::from_lemmas([Lemma::new("bogus", Proposition::prop("A"))]).expect("insert");
        assert_eq!(
            library.validate(),
            Err(LemmaError::Unsound { name: "bogus".into(), countermodel: "A = false".into() })
        );
    }

    #[test]
    fn library_json_goes_through_insert() {
        let a = Proposition::prop("A");
        let lemma = Lemma::new("identity", Proposition::implies(a.clone(), a));
        let library = LemmaLibrary::from_lemmas([lemma.clone()]).expect("insert");
        let text = serde_json::to_string(&library).expect("serialize");
        assert_eq!(text, serde_json::to_string(&vec![lemma.clone()]).expect("serialize"));
        let back: LemmaLibrary = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, library);

        let twice = serde_json::to_string(&vec![lemma.clone(), lemma]).expect("serialize");
        let err = serde_json::from_str::<LemmaLibrary>(&twice).unwrap_err();
        assert!(err.to_string().contains("already defined"), "{err}");

        let open = serde_json::to_string(&vec![Lemma::new("open", Proposition::pred("X", "a"))])
            .expect("serialize");
        assert!(serde_json::from_str::<LemmaLibrary>(&open).is_err());
    }
}
