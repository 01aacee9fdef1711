//! Value-function approximators for the DQN agents.
//!
//! [`QFunction`] is the seam between the learning rule and the numeric
//! backend. The default backend is [`MlpQNetwork`], a small dense network
//! trained with Adam. With the `rl-nn` feature, [`TchQNetwork`] provides the
//! same architecture on libtorch.

pub mod mlp;
#[cfg(feature = "rl-nn")]
pub mod tch_net;

pub use mlp::MlpQNetwork;
#[cfg(feature = "rl-nn")]
pub use tch_net::TchQNetwork;

use crate::error::AgentError;

/// One regression target for a Q-learning update.
#[derive(Debug, Clone, Copy)]
pub struct QTarget<'a> {
    /// Observation the action was taken in.
    pub observation: &'a [f64],
    /// Action whose value is regressed.
    pub action: usize,
    /// Bootstrapped target value.
    pub target: f64,
}

/// An action-value function `Q(s, ·)` over a discrete action set.
pub trait QFunction {
    /// Length of the observation vectors this network accepts.
    fn input_dim(&self) -> usize;

    /// Number of discrete actions (output width).
    fn n_actions(&self) -> usize;

    /// Predicted value of every action for one observation.
    fn q_values(&self, observation: &[f64]) -> Result<Vec<f64>, AgentError>;

    /// Takes one gradient step minimizing the mean squared error between
    /// `Q(observation, action)` and `target` over the batch.
    ///
    /// Returns the loss before the step.
    fn fit(&mut self, batch: &[QTarget<'_>]) -> Result<f64, AgentError>;

    /// Creates an independent network with identical parameters.
    fn duplicate(&self) -> Result<Self, AgentError>
    where
        Self: Sized;

    /// Overwrites this network's parameters with `source`'s.
    fn copy_from(&mut self, source: &Self) -> Result<(), AgentError>
    where
        Self: Sized;

    /// All parameters flattened in a stable order.
    fn parameters(&self) -> Vec<f64>;
}

/// Index of the largest value; ties go to the first maximum.
///
/// NaN entries never win. Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, &v) in values.iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Largest value of a slice (negative infinity when empty).
pub fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub(crate) fn check_observation(observation: &[f64], expected: usize) -> Result<(), AgentError> {
    if observation.len() != expected {
        return Err(AgentError::ObservationDim {
            expected,
            got: observation.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_action(action: usize, n_actions: usize) -> Result<(), AgentError> {
    if action >= n_actions {
        return Err(AgentError::ActionOutOfRange { action, n_actions });
    }
    Ok(())
}
