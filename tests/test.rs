use hornet::{
    find_countermodel, ClassicalAxioms, Context, ContextError, Goal, Lemma, LemmaLibrary,
    LemmaSource, Model, ProofState, Proposition, RunnerBuilder, RunnerConfig, Tactic, TacticError,
    Term, TheoremCase, TheoremSuite, Verdict,
};

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
fn context_rejects_shadowing_and_reports_missing_names() {
    let ctx = Context::new().add_hypothesis("h", a()).expect("fresh name");
    assert_eq!(ctx.add_hypothesis("h", b()), Err(ContextError::DuplicateName("h".into())));
    assert_eq!(ctx.lookup("k"), Err(ContextError::NotFound("k".into())));
    assert!(Context::new().is_empty());
}

#[test]
fn goals_are_values() {
    let goal = Goal::from_statement(Proposition::implies(a(), a()));
    let state = ProofState::new(goal.clone());
    let engine = hornet::Engine::new();
    let next = engine.apply(&state, 0, &Tactic::intro("h")).expect("intro");
    assert_eq!(state.current(), Some(&goal), "applying a tactic leaves the old state intact");
    assert_eq!(next.current().map(Goal::target), Some(&a()));
}

#[test]
fn substitution_avoids_capture() {
    // ∃y. R(x, y) with x := y
    let prop = Proposition::exists(
        "y",
        Proposition::atom("R", vec![Term::variable("x"), Term::variable("y")]),
    );
    let result = prop.substitute("x", &Term::variable("y"));
    assert!(result.free_variables().contains("y"));
    assert!(!result.alpha_eq(&Proposition::exists(
        "y",
        Proposition::atom("R", vec![Term::variable("y"), Term::variable("y")]),
    )));
}

#[test]
fn classical_axioms_are_fixed_and_sound() {
    let axioms = ClassicalAxioms::standard();
    assert_eq!(
        axioms.names(),
        vec![
            "excluded_middle",
            "double_negation",
            "contraposition",
            "not_exists_to_forall",
            "implication_as_disjunction"
        ]
    );
    assert!(axioms.validate().is_ok());
}

#[test]
fn library_lemmas_extend_the_runner() {
    // ?P ∧ ?Q → ?Q ∧ ?P
    let p = || Proposition::schematic("P", Vec::new());
    let q = || Proposition::schematic("Q", Vec::new());
    let and_comm = Proposition::implies(Proposition::and(p(), q()), Proposition::and(q(), p()));
    let library = LemmaLibrary::from_lemmas([Lemma::new("and_comm", and_comm)]).expect("library");
    assert!(library.validate().is_ok());
    assert_eq!(library.names(), vec!["and_comm"]);

    let runner = RunnerBuilder::new().with_library(library).build();
    let ctx = Context::new().add_hypothesis("h", Proposition::and(a(), b())).expect("fresh name");
    let goal = Goal::new(ctx, Proposition::and(b(), a()));
    let verdict = runner.run(goal.clone(), &[Tactic::apply_lemma("and_comm"), Tactic::exact("h")]);
    assert_eq!(verdict, Verdict::Proved);

    let without = hornet::run(goal, &[Tactic::apply_lemma("and_comm")]);
    assert!(without.is_stuck(), "library lemmas are not visible to the default runner");
}

#[test]
fn unknown_lemma_is_not_found() {
    let verdict = hornet::run(Goal::from_statement(a()), &[Tactic::apply_lemma("peirce")]);
    assert_eq!(
        verdict,
        Verdict::Stuck { step: 0, reason: TacticError::NotFound { name: "peirce".into() } }
    );
}

#[test]
fn config_limits_steps() {
    let config = RunnerConfig::from_json_str(r#"{"max_steps": 0}"#).expect("config");
    let runner = RunnerBuilder::new().with_config(config).build();
    let verdict = runner.run(Goal::from_statement(a()), &[Tactic::Defer]);
    assert_eq!(
        verdict,
        Verdict::Stuck { step: 0, reason: TacticError::StepLimitExceeded { limit: 0 } }
    );
}

#[test]
fn batch_file_round_trips() {
    let json = r#"[
      {
        "name": "identity",
        "statement": {"implies": [{"atom": {"predicate": "A", "args": []}},
                                  {"atom": {"predicate": "A", "args": []}}]},
        "script": [{"tactic": "intro", "name": "h"}, {"tactic": "exact", "hypothesis": "h"}]
      }
    ]"#;
    let suite = TheoremSuite::from_json_str(json).expect("batch file");
    assert_eq!(
        suite.cases(),
        &[TheoremCase::new(
            "identity",
            Proposition::implies(a(), a()),
            vec![Tactic::intro("h"), Tactic::exact("h")]
        )]
    );
    let text = suite.to_json().expect("serialize");
    assert_eq!(TheoremSuite::from_json_str(&text).expect("reparse"), suite);
}

#[test]
fn the_named_assignment_separates_the_clause_sides() {
    let model = Model::new(1).with_atom("A", false).with_atom("B", false).with_atom("C", true);
    let clause = Proposition::or(Proposition::not(b()), c());
    assert_eq!(model.evaluate(&clause), Ok(true));
    assert_eq!(model.evaluate(&Proposition::not(Proposition::not(clause))), Ok(true));
    assert_eq!(model.evaluate(&Proposition::or(a(), b())), Ok(false));

    let theorem = hornet::suite::atomized_clause().statement;
    let countermodel = find_countermodel(&theorem, 3).expect("search").expect("not valid");
    assert_eq!(countermodel.to_string(), "A = true, B = true, C = false");
}
