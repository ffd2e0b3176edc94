//! Runner settings and the counters reported alongside each verdict.

mod limits;
mod stats;

pub use limits::RunnerConfig;
pub use stats::Statistics;
