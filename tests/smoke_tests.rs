//! Smoke tests for the proof kernel.
//!
//! These tests run the built-in theorems end to end and check the verdicts.

use hornet::semantics::goal_countermodel;
use hornet::suite::{atomized_clause, subset_equivalence};
use hornet::{
    BatchExecutor, Proposition, RunnerBuilder, Tactic, TacticError, TacticKind, TheoremSuite,
    Verdict, VALIDATION_DOMAIN,
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
fn test_subset_equivalence_is_proved() {
    let case = subset_equivalence();
    let verdict = hornet::run(case.goal(), &case.script);
    assert_eq!(verdict, Verdict::Proved, "subset equivalence should close every goal");
}

#[test]
fn test_atomized_clause_is_admitted() {
    let case = atomized_clause();
    let verdict = hornet::run(case.goal(), &case.script);
    assert!(verdict.is_admitted(), "expected admitted, got {verdict}");

    let deferred = verdict.deferred();
    assert_eq!(deferred.len(), 2);
    assert_eq!(deferred[0].step, 4);
    assert_eq!(deferred[1].step, 14);

    assert_eq!(deferred[0].goal.target(), &Proposition::or(a(), b()));
    let clause = Proposition::or(Proposition::not(b()), c());
    assert_eq!(
        deferred[0].goal.context().lookup("h").expect("rewritten hypothesis"),
        &Proposition::iff(a(), clause.clone())
    );
    assert_eq!(deferred[1].goal.target(), &Proposition::implies(a(), clause));
}

#[test]
fn test_second_deferred_goal_has_a_countermodel() {
    let case = atomized_clause();
    let verdict = hornet::run(case.goal(), &case.script);
    let second = &verdict.deferred()[1].goal;
    let model = goal_countermodel(second, VALIDATION_DOMAIN)
        .expect("small search")
        .expect("goal is not provable");
    assert_eq!(model.to_string(), "A = true, B = true, C = false");
}

#[test]
fn test_tactic_after_last_goal_is_stuck() {
    let case = subset_equivalence();
    let mut script = case.script.clone();
    script.push(Tactic::Split);
    let verdict = hornet::run(case.goal(), &script);
    assert_eq!(
        verdict,
        Verdict::Stuck {
            step: case.script.len(),
            reason: TacticError::WrongShape {
                tactic: TacticKind::Split,
                found: "no open goal".into()
            },
        }
    );
}

#[test]
fn test_truncated_script_leaves_goals_open() {
    let case = subset_equivalence();
    let truncated = &case.script[..case.script.len() - 1];
    let verdict = hornet::run(case.goal(), truncated);
    assert_eq!(
        verdict,
        Verdict::Stuck {
            step: truncated.len(),
            reason: TacticError::UnclosedGoals { remaining: 1 }
        }
    );
}

#[test]
fn test_wrong_first_tactic_is_stuck_at_zero() {
    let case = subset_equivalence();
    let mut script = case.script.clone();
    script[0] = Tactic::Left;
    match hornet::run(case.goal(), &script) {
        Verdict::Stuck { step, reason } => {
            assert_eq!(step, 0);
            assert_eq!(reason.kind(), "WrongShape");
        }
        other => panic!("expected stuck, got {other}"),
    }
}

#[test]
fn test_builtin_batch_summary() {
    let summary = BatchExecutor::default().run(TheoremSuite::builtin().cases());
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.proved, 1);
    assert_eq!(summary.admitted, 1);
    assert_eq!(summary.stuck, 0);
    assert_eq!(summary.iter_failures().count(), 0);
    let admitted: Vec<&str> = summary.iter_admitted().map(|r| r.name.as_str()).collect();
    assert_eq!(admitted, ["atomized_clause"]);
}

#[test]
fn test_step_limit_cuts_builtin_scripts() {
    let runner = RunnerBuilder::new().with_max_steps(10).build();
    let summary = BatchExecutor::new(runner).run(TheoremSuite::builtin().cases());
    assert_eq!(summary.stuck, 2, "both scripts are longer than ten tactics");
    for result in summary.iter_failures() {
        assert_eq!(
            result.verdict(),
            &Verdict::Stuck { step: 10, reason: TacticError::StepLimitExceeded { limit: 10 } }
        );
    }
}
