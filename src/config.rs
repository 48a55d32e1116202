//! Ranking parameters.

use serde::{Deserialize, Serialize};

use crate::error::InvalidParameterError;

/// Default damping factor.
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;
/// Default number of iterations.
pub const DEFAULT_ITERATIONS: usize = 100;

/// What happens to the rank held by nodes without outlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkPolicy {
    /// Sink rank is never passed on; total mass may drop below 1.
    #[default]
    Leak,
    /// Sink rank of the previous snapshot is spread uniformly over every node.
    Redistribute,
}

/// PageRank configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRankConfig {
    /// Probability of following a link rather than jumping, in (0, 1).
    pub damping_factor: f64,
    /// Exact number of passes; there is no early exit.
    pub iterations: usize,
    pub sink_policy: SinkPolicy,
    /// Fan each pass out over the rayon thread pool.
    pub parallel: bool,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping_factor: DEFAULT_DAMPING_FACTOR,
            iterations: DEFAULT_ITERATIONS,
            sink_policy: SinkPolicy::Leak,
            parallel: true,
        }
    }
}

impl PageRankConfig {
    pub fn with_damping_factor(mut self, damping_factor: f64) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_sink_policy(mut self, sink_policy: SinkPolicy) -> Self {
        self.sink_policy = sink_policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check that the damping factor lies in (0, 1) and the iteration count is positive.
    pub fn validate(&self) -> Result<(), InvalidParameterError> {
        // NaN fails both comparisons
        if !(self.damping_factor > 0.0 && self.damping_factor < 1.0) {
            return Err(InvalidParameterError::DampingFactor(self.damping_factor));
        }
        if self.iterations == 0 {
            return Err(InvalidParameterError::IterationCount(self.iterations));
        }
        Ok(())
    }
}
