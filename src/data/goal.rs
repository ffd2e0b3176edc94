use super::context::Context;
use super::proposition::Proposition;
use serde::Serialize;
use std::fmt;

/// "Prove `target` assuming the hypotheses of `context`."
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Goal {
    context: Context,
    target: Proposition,
}

impl Goal {
    pub fn new(context: Context, target: Proposition) -> Self {
        Self { context, target }
    }

    /// Goal with an empty context, as seeded by a theorem statement.
    pub fn from_statement(statement: Proposition) -> Self {
        Self::new(Context::new(), statement)
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn target(&self) -> &Proposition {
        &self.target
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in self.context.variables() {
            writeln!(f, "  {var} : carrier")?;
        }
        for (name, prop) in self.context.hypotheses() {
            writeln!(f, "  {name} : {prop}")?;
        }
        write!(f, "  ⊢ {}", self.target)
    }
}

/// A goal set aside by `defer`, with the index of the tactic that deferred it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeferredGoal {
    pub step: usize,
    pub goal: Goal,
}

/// Open goals of a proof attempt. Tactics always act on the first active goal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProofState {
    active: Vec<Goal>,
    deferred: Vec<DeferredGoal>,
}

impl ProofState {
    pub fn new(goal: Goal) -> Self {
        Self { active: vec![goal], deferred: Vec::new() }
    }

    pub fn current(&self) -> Option<&Goal> {
        self.active.first()
    }

    pub fn active(&self) -> &[Goal] {
        &self.active
    }

    pub fn deferred(&self) -> &[DeferredGoal] {
        &self.deferred
    }

    /// No active and no deferred goals remain.
    pub fn is_closed(&self) -> bool {
        self.active.is_empty() && self.deferred.is_empty()
    }

    /// Replace the current goal by `subgoals`, which are pursued first.
    pub fn replace_current(&self, subgoals: Vec<Goal>) -> ProofState {
        let mut active = subgoals;
        active.extend(self.active.iter().skip(1).cloned());
        ProofState { active, deferred: self.deferred.clone() }
    }

    /// Move the current goal to the deferred set.
    pub fn defer_current(&self, step: usize) -> ProofState {
        let mut deferred = self.deferred.clone();
        if let Some(goal) = self.current() {
            deferred.push(DeferredGoal { step, goal: goal.clone() });
        }
        ProofState { active: self.active.iter().skip(1).cloned().collect(), deferred }
    }
}

impl fmt::Display for ProofState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.active.is_empty() {
            write!(f, "no active goals")?;
        }
        for (i, goal) in self.active.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "goal {}:", i + 1)?;
            write!(f, "{goal}")?;
        }
        if !self.deferred.is_empty() {
            write!(f, "\n({} deferred)", self.deferred.len())?;
        }
        Ok(())
    }
}
