//! Random policy for testing and baselines.

use rand::rngs::StdRng;
use rand::Rng;

use super::trait_::Policy;
use crate::error::AgentError;

/// Uniformly random station selection.
///
/// Each EV independently picks a station from `[0, n_stations)`. Used for
/// sanity checks and as a lower-bound baseline.
pub struct RandomPolicy {
    n_stations: usize,
    rng: StdRng,
}

impl RandomPolicy {
    /// Creates a new random policy drawing from `rng`.
    pub fn new(n_stations: usize, rng: StdRng) -> Self {
        Self { n_stations, rng }
    }
}

impl Policy for RandomPolicy {
    fn select_actions(&mut self, observations: &[Vec<f64>]) -> Result<Vec<usize>, AgentError> {
        Ok((0..observations.len())
            .map(|_| self.rng.gen_range(0..self.n_stations))
            .collect())
    }

    fn name(&self) -> &str {
        "random"
    }
}
