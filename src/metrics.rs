//! Evaluation metrics for the charging environment.
//!
//! Runs a policy for a number of fixed-length episodes without learning and
//! aggregates per-episode statistics.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::environment::ChargingEnv;
use crate::error::Error;
use crate::ev::EvOutcome;
use crate::policy::Policy;

/// Aggregated evaluation metrics over multiple episodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EvaluationMetrics {
    /// Name of the evaluated policy.
    pub policy: String,
    /// Mean summed reward (all EVs) per episode.
    pub mean_episode_reward: f64,
    /// Mean fleet SoC at the end of an episode.
    pub mean_final_soc: f64,
    /// Mean number of trips that ran out of charge per episode.
    pub mean_depletions: f64,
    /// Mean number of successful station arrivals per episode.
    pub mean_arrivals: f64,
    /// Mean number of EVs sharing a station with at least one other EV, per step.
    pub mean_contention: f64,
    /// Number of episodes evaluated.
    pub n_episodes: usize,
}

/// Tracks per-episode statistics during evaluation.
#[derive(Debug, Default)]
struct EpisodeStats {
    reward: f64,
    final_soc: f64,
    depletions: u32,
    arrivals: u32,
    contended: u32,
    steps: u32,
}

impl EvaluationMetrics {
    /// Evaluates a policy over multiple episodes and returns aggregated metrics.
    ///
    /// # Arguments
    ///
    /// * `env` - The environment to evaluate in (reset before every episode)
    /// * `policy` - The policy to evaluate
    /// * `n_episodes` - Number of episodes to run
    /// * `steps_per_episode` - Episode length
    pub fn evaluate(
        env: &mut ChargingEnv,
        policy: &mut dyn Policy,
        n_episodes: usize,
        steps_per_episode: u32,
    ) -> Result<Self, Error> {
        let mut all_stats = Vec::with_capacity(n_episodes);

        for _ in 0..n_episodes {
            let mut obs = env.reset()?;
            let mut stats = EpisodeStats::default();

            for _ in 0..steps_per_episode {
                let actions = policy.select_actions(&obs)?;
                let result = env.step(&actions)?;

                stats.reward += result.rewards.iter().sum::<f64>();
                for outcome in &result.outcomes {
                    match outcome {
                        EvOutcome::Arrived { .. } => stats.arrivals += 1,
                        EvOutcome::Depleted { .. } => stats.depletions += 1,
                        EvOutcome::Charging { .. } => {}
                    }
                }
                stats.contended += result.queue_counts.iter().filter(|&&q| q > 1).sum::<u32>();
                stats.steps += 1;

                obs = result.observations;
            }

            stats.final_soc = env.mean_soc();
            all_stats.push(stats);
        }

        let n = (all_stats.len() as f64).max(1.0);
        let mean = |f: fn(&EpisodeStats) -> f64| all_stats.iter().map(f).sum::<f64>() / n;

        Ok(Self {
            policy: policy.name().to_string(),
            mean_episode_reward: mean(|s| s.reward),
            mean_final_soc: mean(|s| s.final_soc),
            mean_depletions: mean(|s| s.depletions as f64),
            mean_arrivals: mean(|s| s.arrivals as f64),
            mean_contention: mean(|s| {
                if s.steps > 0 {
                    s.contended as f64 / s.steps as f64
                } else {
                    0.0
                }
            }),
            n_episodes,
        })
    }
}

impl fmt::Display for EvaluationMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Evaluation: {} ({} episodes) ===",
            self.policy, self.n_episodes
        )?;
        writeln!(f, "  Mean episode reward:  {:.2}", self.mean_episode_reward)?;
        writeln!(f, "  Mean final SoC:       {:.3}", self.mean_final_soc)?;
        writeln!(f, "  Mean arrivals:        {:.1}", self.mean_arrivals)?;
        writeln!(f, "  Mean depletions:      {:.1}", self.mean_depletions)?;
        write!(f, "  Mean contention/step: {:.2}", self.mean_contention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvConfig;
    use crate::policy::{NearestStationPolicy, RandomPolicy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn evaluate_completes() {
        let config = EnvConfig::default();
        let mut env = ChargingEnv::with_seed(config.clone(), 42).unwrap();
        let mut policy = RandomPolicy::new(config.action_dim(), StdRng::seed_from_u64(0));
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 3, 10).unwrap();
        assert_eq!(metrics.n_episodes, 3);
        assert_eq!(metrics.policy, "random");
        assert!(metrics.mean_final_soc > 0.0 && metrics.mean_final_soc <= 1.0);
        // Every EV moves on the first step, so at least one trip per EV.
        assert!(metrics.mean_arrivals + metrics.mean_depletions >= 2.0);
    }

    #[test]
    fn nearest_policy_never_depletes_from_fresh_reset() {
        // Initial SoC ≥ 0.4 covers up to 7 edges; on a 5×5 grid with corner
        // stations the nearest one is at most 4 edges away.
        let config = EnvConfig::default();
        let mut env = ChargingEnv::with_seed(config.clone(), 5).unwrap();
        let mut policy = NearestStationPolicy::new(config);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 5, 20).unwrap();
        assert_eq!(metrics.mean_depletions, 0.0);
    }

    #[test]
    fn display_lists_policy() {
        let config = EnvConfig::default();
        let mut env = ChargingEnv::with_seed(config.clone(), 1).unwrap();
        let mut policy = NearestStationPolicy::new(config);
        let metrics = EvaluationMetrics::evaluate(&mut env, &mut policy, 1, 4).unwrap();
        assert!(metrics.to_string().contains("nearest"));
    }
}
