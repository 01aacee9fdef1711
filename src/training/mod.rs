//! DQN training: replay memory, exploration, agents and the episode loop.

pub mod agent;
pub mod exploration;
pub mod replay;
pub mod session;

#[cfg(test)]
mod tests;

pub use agent::DqnAgent;
pub use exploration::EpsilonGreedy;
pub use replay::{ReplayMemory, Transition};
pub use session::{EpisodeSummary, TrainingSession};
