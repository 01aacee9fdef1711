//! evq - multi-agent DQN testbed for electric-vehicle charging routing
//!
//! A fleet of EVs drives on a square grid graph. Each step every EV picks a
//! charging station, travels the shortest route there, pays for distance
//! and for sharing the station with other EVs, then charges. One
//! independent Deep Q-Network agent per EV learns which station to choose.
//!
//! The crate is split into the simulated world ([`grid`], [`ev`],
//! [`environment`], [`reward`], [`observation`]), the learners
//! ([`network`], [`training`]) and evaluation helpers ([`policy`],
//! [`metrics`]).

pub mod config;
pub mod environment;
pub mod error;
pub mod ev;
pub mod grid;
pub mod metrics;
pub mod network;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod training;
pub mod types;

pub use config::{DqnConfig, EnvConfig, SessionConfig};
pub use environment::{ChargingEnv, StepResult};
pub use error::{AgentError, ConfigError, EnvError, Error};
pub use metrics::EvaluationMetrics;
pub use training::{DqnAgent, EpisodeSummary, TrainingSession};
pub use types::{Cell, EvMode};

/// Identifier type used for EVs and training runs.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}
