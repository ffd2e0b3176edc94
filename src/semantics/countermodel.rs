use super::model::{EvalError, Model};
use crate::data::{Goal, Proposition};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Interpretation bits above which the search refuses to enumerate.
pub const MAX_SEARCH_BITS: usize = 20;

/// Enumerate finite models of size `1..=max_domain` and return the first one
/// in which `prop` is false.
///
/// Free variables are treated like constants: a countermodel for an open
/// proposition falsifies its universal closure. Models are tried in a fixed
/// order (carrier size, then constants, then extensions with the first
/// predicate varying fastest), so the result is deterministic.
pub fn find_countermodel(prop: &Proposition, max_domain: usize) -> Result<Option<Model>, EvalError> {
    let predicates = prop.predicates();
    let mut names: Vec<String> = prop.constants().into_iter().collect();
    names.extend(prop.free_variables());
    let propositional = names.is_empty() && predicates.values().all(|&arity| arity == 0);
    let max_domain = if propositional { max_domain.min(1) } else { max_domain };

    for domain in 1..=max_domain {
        let slots = interpretation_slots(&predicates, domain);
        // Each constant or free variable costs the bits needed to name an element.
        let bits = names.len().saturating_mul(element_bits(domain)).saturating_add(slots.len());
        if bits > MAX_SEARCH_BITS {
            return Err(EvalError::SearchTooLarge { bits, limit: MAX_SEARCH_BITS });
        }
        let assignments = domain.pow(names.len() as u32);
        debug!(domain, bits, assignments, "searching for a countermodel");
        for assignment in 0..assignments {
            for mask in 0u64..(1u64 << slots.len()) {
                let model = build_model(domain, &predicates, &slots, mask, &names, assignment);
                let env = variable_env(prop, &model, &names);
                if !model.evaluate_with(prop, &env)? {
                    trace!(%prop, %model, "countermodel found");
                    return Ok(Some(model));
                }
            }
        }
    }
    Ok(None)
}

/// Countermodel for a goal read as "the hypotheses imply the target".
///
/// Fixed variables of the goal are interpreted like constants.
pub fn goal_countermodel(goal: &Goal, max_domain: usize) -> Result<Option<Model>, EvalError> {
    let hypotheses: Vec<&Proposition> = goal.context().hypotheses().map(|(_, prop)| prop).collect();
    let formula = hypotheses
        .into_iter()
        .rev()
        .fold(goal.target().clone(), |acc, hyp| Proposition::implies(hyp.clone(), acc));
    find_countermodel(&formula, max_domain)
}

/// True when no model up to `max_domain` falsifies `prop`.
pub fn is_valid(prop: &Proposition, max_domain: usize) -> Result<bool, EvalError> {
    Ok(find_countermodel(prop, max_domain)?.is_none())
}

/// Bits needed to pick one element of a carrier of size `domain`.
fn element_bits(domain: usize) -> usize {
    (usize::BITS - domain.saturating_sub(1).leading_zeros()) as usize
}

fn interpretation_slots(
    predicates: &BTreeMap<String, usize>,
    domain: usize,
) -> Vec<(String, Vec<usize>)> {
    let mut slots = Vec::new();
    for (name, &arity) in predicates {
        for tuple in tuples(domain, arity) {
            slots.push((name.clone(), tuple));
        }
    }
    slots
}

/// All tuples over `0..domain` of the given length, in lexicographic order.
fn tuples(domain: usize, arity: usize) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new()];
    for _ in 0..arity {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                (0..domain).map(move |element| {
                    let mut tuple = prefix.clone();
                    tuple.push(element);
                    tuple
                })
            })
            .collect();
    }
    out
}

fn build_model(
    domain: usize,
    predicates: &BTreeMap<String, usize>,
    slots: &[(String, Vec<usize>)],
    mask: u64,
    names: &[String],
    mut assignment: usize,
) -> Model {
    let mut model = Model::new(domain);
    for (name, &arity) in predicates {
        model.declare(name, arity);
    }
    for (bit, (name, tuple)) in slots.iter().enumerate() {
        if mask & (1 << bit) != 0 {
            model.insert_tuple(name, tuple.clone());
        }
    }
    for name in names {
        model.set_constant(name, assignment % domain);
        assignment /= domain;
    }
    model
}

/// Free variables read their value from the constant slot of the same name.
fn variable_env(prop: &Proposition, model: &Model, names: &[String]) -> BTreeMap<String, usize> {
    let free = prop.free_variables();
    names
        .iter()
        .filter(|name| free.contains(*name))
        .filter_map(|name| model.constant(name).map(|element| (name.clone(), element)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{element_bits, find_countermodel, goal_countermodel, is_valid, MAX_SEARCH_BITS};
    use crate::data::{Context, Goal, Proposition, Term};
    use crate::semantics::{EvalError, Model};

    fn a() -> Proposition {
        Proposition::prop("A")
    }

    fn b() -> Proposition {
        Proposition::prop("B")
    }

    fn c() -> Proposition {
        Proposition::prop("C")
    }

    #[test]
    fn tautologies_have_no_countermodel() {
        let em = Proposition::or(a(), Proposition::not(a()));
        assert_eq!(find_countermodel(&em, 3), Ok(None));
        let dn = Proposition::iff(Proposition::not(Proposition::not(a())), a());
        assert_eq!(is_valid(&dn, 1), Ok(true));
    }

    #[test]
    fn atomized_clause_theorem_is_falsifiable() {
        let left = Proposition::iff(
            a(),
            Proposition::not(Proposition::not(Proposition::or(Proposition::not(b()), c()))),
        );
        let right = Proposition::and(Proposition::or(a(), b()), Proposition::implies(c(), a()));
        let theorem = Proposition::iff(left, right);
        let model = find_countermodel(&theorem, 3).expect("small search").expect("countermodel");
        let expected = Model::new(1).with_atom("A", true).with_atom("B", true).with_atom("C", false);
        assert_eq!(model, expected);
        assert_eq!(model.to_string(), "A = true, B = true, C = false");
    }

    #[test]
    fn quantified_formulas_search_larger_carriers() {
        // ∃a. X(a) → ∀a. X(a) fails once the carrier has two elements.
        let prop = Proposition::implies(
            Proposition::exists("a", Proposition::pred("X", "a")),
            Proposition::forall("a", Proposition::pred("X", "a")),
        );
        let model = find_countermodel(&prop, 3).expect("search").expect("countermodel");
        assert_eq!(model.domain(), 2);
    }

    #[test]
    fn open_propositions_are_read_universally() {
        let prop = Proposition::atom("X", vec![Term::variable("x")]);
        assert!(find_countermodel(&prop, 1).expect("search").is_some());
    }

    #[test]
    fn goals_are_read_as_implications() {
        let ctx = Context::new()
            .add_hypothesis("hab", Proposition::or(a(), b()))
            .and_then(|ctx| ctx.add_hypothesis("hca", Proposition::implies(c(), a())))
            .expect("fresh names");
        let target = Proposition::implies(a(), Proposition::or(Proposition::not(b()), c()));
        let model = goal_countermodel(&Goal::new(ctx, target), 3)
            .expect("search")
            .expect("countermodel");
        assert_eq!(model.to_string(), "A = true, B = true, C = false");

        let ctx = Context::new().add_hypothesis("h", a()).expect("fresh");
        assert_eq!(goal_countermodel(&Goal::new(ctx, a()), 3), Ok(None));
    }

    #[test]
    fn constant_assignments_count_toward_the_search_limit() {
        assert_eq!((element_bits(1), element_bits(2), element_bits(3), element_bits(4)), (0, 1, 2, 2));

        // X(v0) → X(v1) ∧ ... ∧ X(v20) → X(v21): one slot per element, but 22 names.
        let chain = (0..21)
            .map(|i| {
                Proposition::implies(
                    Proposition::pred("X", format!("v{i}")),
                    Proposition::pred("X", format!("v{}", i + 1)),
                )
            })
            .reduce(Proposition::and)
            .expect("non-empty");
        assert_eq!(find_countermodel(&chain, 1), Ok(None));
        assert_eq!(
            find_countermodel(&chain, 2),
            Err(EvalError::SearchTooLarge { bits: 24, limit: MAX_SEARCH_BITS })
        );
    }
}
