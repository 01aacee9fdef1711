//! Independent DQN learner.
//!
//! Each agent owns a policy network, a frozen target network, a replay
//! memory and its own random source. Nothing is shared between agents.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use super::exploration::EpsilonGreedy;
use super::replay::{ReplayMemory, Transition};
use crate::config::DqnConfig;
use crate::error::AgentError;
use crate::network::{
    argmax, check_action, check_observation, max_value, MlpQNetwork, QFunction, QTarget,
};

/// Deep Q-Network agent with experience replay and a target network.
///
/// # Lifecycle
///
/// 1. [`DqnAgent::new`] (default MLP backend) or [`DqnAgent::with_network`].
/// 2. Every step: [`act`](DqnAgent::act), then
///    [`remember`](DqnAgent::remember) and [`replay`](DqnAgent::replay).
/// 3. Every episode: [`decay_epsilon`](DqnAgent::decay_epsilon).
/// 4. On the caller's cadence: [`update_target`](DqnAgent::update_target).
#[derive(Debug)]
pub struct DqnAgent<Q: QFunction = MlpQNetwork> {
    config: DqnConfig,
    policy_net: Q,
    target_net: Q,
    memory: ReplayMemory,
    exploration: EpsilonGreedy,
    rng: StdRng,
    updates: u64,
}

impl DqnAgent<MlpQNetwork> {
    /// Creates an agent with a freshly initialized MLP Q-network.
    ///
    /// # Arguments
    ///
    /// * `obs_dim` - Observation length
    /// * `n_actions` - Number of stations to choose from
    /// * `config` - Learning hyperparameters
    /// * `rng` - The agent's random source (initialization, exploration, sampling)
    pub fn new(
        obs_dim: usize,
        n_actions: usize,
        config: DqnConfig,
        mut rng: StdRng,
    ) -> Result<Self, AgentError> {
        config.validate()?;
        let policy_net = MlpQNetwork::new(
            obs_dim,
            n_actions,
            &config.hidden_layers,
            config.learning_rate,
            &mut rng,
        )?;
        Self::with_network(policy_net, config, rng)
    }
}

impl<Q: QFunction> DqnAgent<Q> {
    /// Creates an agent around an existing policy network. The target
    /// network starts as an exact copy.
    pub fn with_network(policy_net: Q, config: DqnConfig, rng: StdRng) -> Result<Self, AgentError> {
        config.validate()?;
        let target_net = policy_net.duplicate()?;
        Ok(Self {
            memory: ReplayMemory::new(config.memory_capacity),
            exploration: EpsilonGreedy::new(
                config.epsilon_start,
                config.epsilon_decay,
                config.epsilon_min,
            ),
            config,
            policy_net,
            target_net,
            rng,
            updates: 0,
        })
    }

    /// Epsilon-greedy action selection.
    ///
    /// # Errors
    ///
    /// [`AgentError::ObservationDim`] if the observation has the wrong length.
    pub fn act(&mut self, observation: &[f64]) -> Result<usize, AgentError> {
        check_observation(observation, self.obs_dim())?;
        if self.exploration.explore(&mut self.rng) {
            return Ok(self.rng.gen_range(0..self.n_actions()));
        }
        self.greedy_action(observation)
    }

    /// Action with the highest predicted value; ties go to the lowest index.
    pub fn greedy_action(&self, observation: &[f64]) -> Result<usize, AgentError> {
        let q = self.policy_net.q_values(observation)?;
        Ok(argmax(&q))
    }

    /// Stores a transition in replay memory, evicting the oldest if full.
    ///
    /// # Errors
    ///
    /// Rejects transitions whose observations or action do not match the
    /// network's dimensions.
    pub fn remember(&mut self, transition: Transition) -> Result<(), AgentError> {
        check_observation(&transition.observation, self.obs_dim())?;
        check_observation(&transition.next_observation, self.obs_dim())?;
        check_action(transition.action, self.n_actions())?;
        self.memory.push(transition);
        Ok(())
    }

    /// One Q-learning update from a random minibatch.
    ///
    /// Does nothing and returns `Ok(None)` while the memory holds fewer than
    /// `batch_size` transitions. Otherwise samples a batch without
    /// replacement, regresses `Q_policy(s, a)` toward
    /// `r + γ · max_a' Q_target(s', a')` (just `r` for terminal transitions)
    /// with one gradient step, and returns the loss.
    pub fn replay(&mut self) -> Result<Option<f64>, AgentError> {
        let Some(batch) = self.memory.sample(&mut self.rng, self.config.batch_size) else {
            return Ok(None);
        };

        let mut targets = Vec::with_capacity(batch.len());
        for t in &batch {
            let bootstrap = if t.done {
                0.0
            } else {
                self.config.gamma * max_value(&self.target_net.q_values(&t.next_observation)?)
            };
            targets.push(QTarget {
                observation: &t.observation,
                action: t.action,
                target: t.reward + bootstrap,
            });
        }

        let loss = self.policy_net.fit(&targets)?;
        self.updates += 1;
        debug!(loss, updates = self.updates, "replay update");
        Ok(Some(loss))
    }

    /// Copies the policy parameters into the target network.
    pub fn update_target(&mut self) -> Result<(), AgentError> {
        self.target_net.copy_from(&self.policy_net)
    }

    /// Applies one episode's worth of exploration decay.
    pub fn decay_epsilon(&mut self) {
        self.exploration.decay();
    }

    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    pub fn config(&self) -> &DqnConfig {
        &self.config
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn policy_network(&self) -> &Q {
        &self.policy_net
    }

    pub fn target_network(&self) -> &Q {
        &self.target_net
    }

    /// Number of gradient steps taken so far.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn obs_dim(&self) -> usize {
        self.policy_net.input_dim()
    }

    pub fn n_actions(&self) -> usize {
        self.policy_net.n_actions()
    }
}
