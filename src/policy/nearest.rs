//! Nearest-reachable-station heuristic.
//!
//! Sends every EV to the closest station it can reach without running dry.

use super::trait_::Policy;
use crate::config::EnvConfig;
use crate::error::AgentError;
use crate::network::check_observation;

/// Greedy distance heuristic.
///
/// For each EV, reads `SoC` and the station distances from its observation
/// and picks the nearest station with `SoC - distance × energy_per_edge > 0`
/// (ties to the lowest index). If no station is reachable, picks the nearest
/// one anyway. Ignores queue contention entirely, which makes it a useful
/// baseline for what learning the congestion term buys.
pub struct NearestStationPolicy {
    config: EnvConfig,
}

impl NearestStationPolicy {
    /// Creates the heuristic for the given environment configuration.
    pub fn new(config: EnvConfig) -> Self {
        Self { config }
    }

    fn choose(&self, observation: &[f64]) -> Result<usize, AgentError> {
        check_observation(observation, self.config.observation_dim())?;
        let soc = observation[2];
        let distances = &observation[EnvConfig::EV_FEATURE_DIM..];

        let nearest = |reachable_only: bool| {
            distances
                .iter()
                .enumerate()
                .filter(|&(_, &d)| !reachable_only || soc - d * self.config.energy_per_edge > 0.0)
                .fold(None, |best: Option<(usize, f64)>, (i, &d)| match best {
                    Some((_, best_d)) if best_d <= d => best,
                    _ => Some((i, d)),
                })
                .map(|(i, _)| i)
        };

        Ok(nearest(true).or_else(|| nearest(false)).unwrap_or(0))
    }
}

impl Policy for NearestStationPolicy {
    fn select_actions(&mut self, observations: &[Vec<f64>]) -> Result<Vec<usize>, AgentError> {
        observations.iter().map(|o| self.choose(o)).collect()
    }

    fn name(&self) -> &str {
        "nearest"
    }
}
