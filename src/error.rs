use thiserror::Error;

use crate::types::Cell;

/// Invalid configuration, rejected at construction time.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Grid size must be positive")]
    ZeroGridSize,

    #[error("At least one charging station is required")]
    NoStations,

    #[error("Station {station} lies outside the {size}x{size} grid")]
    StationOutOfBounds { station: Cell, size: usize },

    #[error("Duplicate charging station at {0}")]
    DuplicateStation(Cell),

    #[error("At least one EV is required")]
    NoEvs,

    #[error("Invalid initial SoC range [{min}, {max}): bounds must satisfy 0 < min < max <= 1")]
    InvalidSocRange { min: f64, max: f64 },

    #[error("Charging duration must be at least one step")]
    ZeroChargingDuration,

    #[error("Energy per edge must be non-negative, got {0}")]
    NegativeEnergyPerEdge(f64),

    #[error("Depleted SoC {0} is outside (0, 1]")]
    DepletedSocOutOfRange(f64),

    #[error("Replay memory capacity must be positive")]
    ZeroCapacity,

    #[error("Batch size must be positive")]
    ZeroBatchSize,

    #[error("Discount factor {0} is outside [0, 1]")]
    DiscountOutOfRange(f64),

    #[error("Invalid epsilon schedule: start={start}, min={min}, decay={decay}")]
    InvalidEpsilonSchedule { start: f64, min: f64, decay: f64 },

    #[error("Learning rate must be positive and finite, got {0}")]
    NonPositiveLearningRate(f64),

    #[error("Network must have a positive {0} dimension")]
    ZeroDimension(&'static str),

    #[error("Observation dimension mismatch: environment produces {env}, agent expects {agent}")]
    ObservationDimMismatch { env: usize, agent: usize },

    #[error("Action dimension mismatch: environment accepts {env}, agent produces {agent}")]
    ActionDimMismatch { env: usize, agent: usize },

    #[error("Session {0} must be positive")]
    ZeroSessionParameter(&'static str),
}

/// Errors raised by [`crate::environment::ChargingEnv`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Expected {expected} actions (one per EV), got {got}")]
    ActionCountMismatch { expected: usize, got: usize },

    #[error("EV {ev} selected station {action}, but only {n_stations} stations exist")]
    ActionOutOfRange {
        ev: usize,
        action: usize,
        n_stations: usize,
    },

    #[error("No route from {from} to {to}")]
    Unreachable { from: Cell, to: Cell },

    #[error("Cell {0} is outside the grid")]
    CellOutOfGrid(Cell),

    #[error("EV index {index} is out of range for {n_evs} EVs")]
    UnknownEv { index: usize, n_evs: usize },

    #[error("SoC {0} is outside (0, 1]")]
    SocOutOfRange(f64),
}

/// Errors raised by learning agents and their value-function backends.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Observation has {got} features, expected {expected}")]
    ObservationDim { expected: usize, got: usize },

    #[error("Action {action} is out of range for {n_actions} actions")]
    ActionOutOfRange { action: usize, n_actions: usize },

    #[error("Got {got} observations for {expected} agents")]
    AgentCountMismatch { expected: usize, got: usize },

    #[error("Network backend failure: {0}")]
    Network(String),
}

/// Crate-level error combining every failure category.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}
