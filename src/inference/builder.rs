//! Builder to assemble a [`Runner`] from settings and an optional lemma library.

use super::axioms::LemmaSource;
use super::runner::Runner;
use crate::config::RunnerConfig;
use std::sync::Arc;

/// Build a runner step by step.
#[derive(Clone, Default)]
pub struct RunnerBuilder {
    config: RunnerConfig,
    library: Option<Arc<dyn LemmaSource + Send + Sync>>,
}

impl RunnerBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the runner configuration.
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_steps(mut self, limit: usize) -> Self {
        self.config.max_steps = Some(limit);
        self
    }

    pub fn with_trace_goals(mut self, enabled: bool) -> Self {
        self.config.trace_goals = enabled;
        self
    }

    /// Lemmas consulted after the classical axioms.
    pub fn with_library<L>(self, library: L) -> Self
    where
        L: LemmaSource + Send + Sync + 'static,
    {
        self.with_shared_library(Arc::new(library))
    }

    pub fn with_shared_library(mut self, library: Arc<dyn LemmaSource + Send + Sync>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn build(self) -> Runner {
        Runner::from_parts(self.config, self.library)
    }
}

#[cfg(test)]
mod tests {
    use super::RunnerBuilder;
    use crate::config::RunnerConfig;
    use crate::data::{Goal, Proposition};
    use crate::inference::{Lemma, LemmaLibrary, Tactic, Verdict};

    #[test]
    fn builder_applies_config_and_library() {
        let library = LemmaLibrary::from_lemmas([Lemma::new(
            "a_holds",
            Proposition::prop("A"),
        )])
        .expect("library");
        let runner = RunnerBuilder::new()
            .with_config(RunnerConfig::new().with_trace_goals(true))
            .with_max_steps(8)
            .with_library(library)
            .build();
        assert_eq!(runner.config().max_steps, Some(8));
        assert!(runner.config().trace_goals);

        let verdict = runner.run(
            Goal::from_statement(Proposition::prop("A")),
            &[Tactic::apply_lemma("a_holds")],
        );
        assert_eq!(verdict, Verdict::Proved);
    }
}
