//! Episodic training loop for independent DQN learners.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, info_span};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::agent::DqnAgent;
use super::replay::Transition;
use crate::config::{DqnConfig, EnvConfig, SessionConfig};
use crate::environment::ChargingEnv;
use crate::error::{ConfigError, Error};
use crate::ev::EvOutcome;
use crate::metrics::EvaluationMetrics;
use crate::network::{MlpQNetwork, QFunction};
use crate::policy::LearnedPolicy;
use crate::{generate_id, Id};

/// Statistics of one completed training episode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EpisodeSummary {
    /// Zero-based episode index.
    pub episode: u32,
    /// Sum of all EVs' rewards over the episode.
    pub total_reward: f64,
    /// Fleet mean SoC after the last step.
    pub mean_soc: f64,
    /// First agent's exploration rate after this episode's decay.
    pub epsilon: f64,
    /// Mean replay loss over the episode (`None` if no update ran).
    pub mean_loss: Option<f64>,
    /// Trips that ran out of charge.
    pub depletions: u32,
    /// Successful station arrivals.
    pub arrivals: u32,
}

/// Owns the environment, one agent per EV, and the loop counters.
///
/// All randomness is derived from a single root generator seeded with
/// [`SessionConfig::seed`]: the environment and every agent receive their own
/// child generator, so a seed fully determines a run.
#[derive(Debug)]
pub struct TrainingSession<Q: QFunction = MlpQNetwork> {
    run_id: Id,
    config: SessionConfig,
    env: ChargingEnv,
    agents: Vec<DqnAgent<Q>>,
    observations: Vec<Vec<f64>>,
    episode: u32,
    history: Vec<EpisodeSummary>,
}

impl TrainingSession<MlpQNetwork> {
    /// Builds a session with MLP-backed agents.
    pub fn new(
        config: SessionConfig,
        env_config: EnvConfig,
        dqn_config: DqnConfig,
    ) -> Result<Self, Error> {
        let obs_dim = env_config.observation_dim();
        let n_actions = env_config.action_dim();
        Self::with_agents(config, env_config, |rng| {
            DqnAgent::new(obs_dim, n_actions, dqn_config.clone(), rng)
        })
    }
}

impl<Q: QFunction> TrainingSession<Q> {
    /// Builds a session, creating one agent per EV with `make_agent`.
    ///
    /// `make_agent` receives the agent's child random source.
    ///
    /// # Errors
    ///
    /// Fails if any configuration is invalid or an agent's dimensions do not
    /// match the environment's observation and action spaces.
    pub fn with_agents<F, E>(
        config: SessionConfig,
        env_config: EnvConfig,
        mut make_agent: F,
    ) -> Result<Self, Error>
    where
        F: FnMut(StdRng) -> Result<DqnAgent<Q>, E>,
        Error: From<E>,
    {
        config.validate()?;
        let mut root = StdRng::seed_from_u64(config.seed);
        let env = ChargingEnv::new(env_config, StdRng::seed_from_u64(root.gen()))?;

        let mut agents = Vec::with_capacity(env.n_evs());
        for _ in 0..env.n_evs() {
            let agent = make_agent(StdRng::seed_from_u64(root.gen()))?;
            let env_obs = env.config().observation_dim();
            if agent.obs_dim() != env_obs {
                return Err(ConfigError::ObservationDimMismatch {
                    env: env_obs,
                    agent: agent.obs_dim(),
                }
                .into());
            }
            if agent.n_actions() != env.n_stations() {
                return Err(ConfigError::ActionDimMismatch {
                    env: env.n_stations(),
                    agent: agent.n_actions(),
                }
                .into());
            }
            agents.push(agent);
        }

        let observations = env.observations()?;
        Ok(Self {
            run_id: generate_id(),
            config,
            env,
            agents,
            observations,
            episode: 0,
            history: Vec::new(),
        })
    }

    /// Runs one training episode.
    ///
    /// Each step: every agent acts on its own observation, the environment
    /// steps, every agent stores its transition (flagged `done` on the last
    /// step) and runs one replay update. Afterwards exploration decays and,
    /// every `target_sync_interval` episodes, target networks are synced.
    pub fn run_episode(&mut self) -> Result<EpisodeSummary, Error> {
        let span = info_span!("episode", run = %self.run_id, episode = self.episode);
        let _guard = span.enter();

        self.observations = self.env.reset()?;
        let steps = self.config.steps_per_episode;
        let mut total_reward = 0.0;
        let mut loss_sum = 0.0;
        let mut loss_count = 0u32;
        let mut depletions = 0;
        let mut arrivals = 0;

        for step in 0..steps {
            let done = step + 1 == steps;

            let actions = self
                .agents
                .iter_mut()
                .zip(&self.observations)
                .map(|(agent, obs)| agent.act(obs))
                .collect::<Result<Vec<_>, _>>()?;

            let result = self.env.step(&actions)?;

            for (i, agent) in self.agents.iter_mut().enumerate() {
                agent.remember(Transition::new(
                    self.observations[i].clone(),
                    actions[i],
                    result.rewards[i],
                    result.observations[i].clone(),
                    done,
                ))?;
                if let Some(loss) = agent.replay()? {
                    loss_sum += loss;
                    loss_count += 1;
                }
            }

            for outcome in &result.outcomes {
                match outcome {
                    EvOutcome::Arrived { .. } => arrivals += 1,
                    EvOutcome::Depleted { .. } => depletions += 1,
                    EvOutcome::Charging { .. } => {}
                }
            }
            total_reward += result.rewards.iter().sum::<f64>();
            self.observations = result.observations;
        }

        for agent in &mut self.agents {
            agent.decay_epsilon();
        }

        let summary = EpisodeSummary {
            episode: self.episode,
            total_reward,
            mean_soc: self.env.mean_soc(),
            epsilon: self.agents.first().map_or(0.0, |a| a.epsilon()),
            mean_loss: (loss_count > 0).then(|| loss_sum / loss_count as f64),
            depletions,
            arrivals,
        };

        self.episode += 1;
        if self.episode % self.config.target_sync_interval == 0 {
            for agent in &mut self.agents {
                agent.update_target()?;
            }
            tracing::debug!(episode = self.episode, "target networks synced");
        }

        if self.episode % self.config.log_interval == 0 {
            info!(
                "Episode {} | reward {:.2} | mean SoC {:.3} | epsilon {:.3}",
                self.episode, summary.total_reward, summary.mean_soc, summary.epsilon
            );
        }

        self.history.push(summary.clone());
        Ok(summary)
    }

    /// Runs all configured episodes and returns the full history.
    pub fn train(&mut self) -> Result<&[EpisodeSummary], Error> {
        info!(
            run = %self.run_id,
            episodes = self.config.episodes,
            evs = self.agents.len(),
            "starting training"
        );
        for _ in 0..self.config.episodes {
            self.run_episode()?;
        }
        Ok(&self.history)
    }

    /// Evaluates the current greedy policies without learning.
    ///
    /// Uses the session's environment, so it advances the environment's
    /// random source.
    pub fn evaluate(&mut self, n_episodes: usize) -> Result<EvaluationMetrics, Error> {
        let mut policy = LearnedPolicy::new(&self.agents);
        EvaluationMetrics::evaluate(
            &mut self.env,
            &mut policy,
            n_episodes,
            self.config.steps_per_episode,
        )
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn env(&self) -> &ChargingEnv {
        &self.env
    }

    /// Mutable environment access, for scripted scenarios.
    pub fn env_mut(&mut self) -> &mut ChargingEnv {
        &mut self.env
    }

    pub fn agents(&self) -> &[DqnAgent<Q>] {
        &self.agents
    }

    /// Completed episodes.
    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn history(&self) -> &[EpisodeSummary] {
        &self.history
    }
}
