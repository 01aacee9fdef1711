//! Bounded experience replay memory.

use std::collections::VecDeque;

use rand::seq::index;
use rand::Rng;

/// A single transition stored in the replay memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation the action was chosen in.
    pub observation: Vec<f64>,
    /// Chosen station index.
    pub action: usize,
    /// Reward received for the action.
    pub reward: f64,
    /// Observation after the environment step.
    pub next_observation: Vec<f64>,
    /// Whether this was the last step of the episode.
    pub done: bool,
}

impl Transition {
    pub fn new(
        observation: Vec<f64>,
        action: usize,
        reward: f64,
        next_observation: Vec<f64>,
        done: bool,
    ) -> Self {
        Self {
            observation,
            action,
            reward,
            next_observation,
            done,
        }
    }
}

/// FIFO ring buffer of transitions with a fixed capacity.
///
/// Once full, every insertion evicts the oldest transition, so the length
/// never exceeds the capacity.
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Creates an empty memory. `capacity` must be positive; the agent
    /// validates it before construction.
    pub fn new(capacity: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a transition, evicting the oldest one when full.
    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draws `batch_size` distinct transitions uniformly at random.
    ///
    /// Returns `None` if fewer than `batch_size` transitions are stored.
    pub fn sample<R: Rng>(&self, rng: &mut R, batch_size: usize) -> Option<Vec<&Transition>> {
        if self.transitions.len() < batch_size {
            return None;
        }
        let batch = index::sample(rng, self.transitions.len(), batch_size)
            .into_iter()
            .map(|i| &self.transitions[i])
            .collect();
        Some(batch)
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }
}
