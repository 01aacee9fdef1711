//! Configuration for the charging environment, the DQN agents and the
//! training session.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Cell;

/// Configuration for the EV charging environment.
///
/// Controls grid geometry, station placement, fleet size, battery dynamics
/// and reward shaping.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvConfig {
    // --- Geometry ---
    /// Side length of the square grid.
    pub grid_size: usize,
    /// Charging station cells; the action index selects into this list.
    pub stations: Vec<Cell>,

    // --- Fleet ---
    /// Number of EVs (one learning agent each).
    pub num_evs: usize,
    /// Initial SoC is drawn uniformly from `[min, max)` at every reset.
    pub initial_soc_range: (f64, f64),

    // --- Battery dynamics ---
    /// SoC consumed per traversed edge.
    pub energy_per_edge: f64,
    /// Steps an EV waits at a station before its battery is refilled.
    pub charging_duration: u32,
    /// SoC assigned after running out of charge.
    pub depleted_soc: f64,

    // --- Reward shaping ---
    /// Cost per traversed edge.
    pub distance_cost: f64,
    /// Cost per EV registered at the chosen station this step.
    pub queue_cost: f64,
    /// Reward for each step spent waiting at a charger.
    pub charging_wait_reward: f64,
    /// Bonus for reaching a station with charge to spare.
    pub arrival_bonus: f64,
    /// Penalty for running out of charge on the way.
    pub depletion_penalty: f64,
}

impl EnvConfig {
    /// Number of features encoding an EV's own state: `x, y, SoC`.
    pub const EV_FEATURE_DIM: usize = 3;

    /// Observation dimension per EV: own features + one distance per station.
    pub fn observation_dim(&self) -> usize {
        Self::EV_FEATURE_DIM + self.stations.len()
    }

    /// Number of possible actions: one per station.
    pub fn action_dim(&self) -> usize {
        self.stations.len()
    }

    /// Checks the configuration for values the environment cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::ZeroGridSize);
        }
        if self.stations.is_empty() {
            return Err(ConfigError::NoStations);
        }
        for (i, station) in self.stations.iter().enumerate() {
            if !station.is_within(self.grid_size) {
                return Err(ConfigError::StationOutOfBounds {
                    station: *station,
                    size: self.grid_size,
                });
            }
            if self.stations[..i].contains(station) {
                return Err(ConfigError::DuplicateStation(*station));
            }
        }
        if self.num_evs == 0 {
            return Err(ConfigError::NoEvs);
        }
        let (min, max) = self.initial_soc_range;
        if !(min > 0.0 && min < max && max <= 1.0) {
            return Err(ConfigError::InvalidSocRange { min, max });
        }
        if self.charging_duration == 0 {
            return Err(ConfigError::ZeroChargingDuration);
        }
        if self.energy_per_edge.is_nan() || self.energy_per_edge < 0.0 {
            return Err(ConfigError::NegativeEnergyPerEdge(self.energy_per_edge));
        }
        if self.depleted_soc.is_nan() || self.depleted_soc <= 0.0 || self.depleted_soc > 1.0 {
            return Err(ConfigError::DepletedSocOutOfRange(self.depleted_soc));
        }
        Ok(())
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            stations: vec![Cell::new(0, 0), Cell::new(4, 4)],
            num_evs: 2,
            initial_soc_range: (0.4, 0.7),
            energy_per_edge: 0.05,
            charging_duration: 3,
            depleted_soc: 0.1,
            distance_cost: 1.5,
            queue_cost: 2.0,
            charging_wait_reward: -0.5,
            arrival_bonus: 20.0,
            depletion_penalty: 100.0,
        }
    }
}

/// Hyperparameters for a single DQN agent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DqnConfig {
    /// Hidden layer widths of the Q-network.
    pub hidden_layers: Vec<usize>,
    /// Optimizer learning rate.
    pub learning_rate: f64,
    /// Replay memory capacity.
    pub memory_capacity: usize,
    /// Transitions sampled per learning update.
    pub batch_size: usize,
    /// Discount factor γ.
    pub gamma: f64,
    /// Initial exploration rate.
    pub epsilon_start: f64,
    /// Multiplicative decay applied once per completed episode.
    pub epsilon_decay: f64,
    /// Exploration floor.
    pub epsilon_min: f64,
}

impl DqnConfig {
    /// Checks hyperparameters for values the agent cannot train with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::DiscountOutOfRange(self.gamma));
        }
        let schedule_ok = (0.0..=1.0).contains(&self.epsilon_start)
            && (0.0..=1.0).contains(&self.epsilon_min)
            && self.epsilon_min <= self.epsilon_start
            && self.epsilon_decay > 0.0
            && self.epsilon_decay <= 1.0;
        if !schedule_ok {
            return Err(ConfigError::InvalidEpsilonSchedule {
                start: self.epsilon_start,
                min: self.epsilon_min,
                decay: self.epsilon_decay,
            });
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(ConfigError::NonPositiveLearningRate(self.learning_rate));
        }
        if self.hidden_layers.contains(&0) {
            return Err(ConfigError::ZeroDimension("hidden"));
        }
        Ok(())
    }
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![128, 64],
            learning_rate: 1e-3,
            memory_capacity: 10_000,
            batch_size: 32,
            gamma: 0.95,
            epsilon_start: 1.0,
            epsilon_decay: 0.995,
            epsilon_min: 0.05,
        }
    }
}

/// Parameters of the episodic training loop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionConfig {
    /// Number of training episodes.
    pub episodes: u32,
    /// Fixed episode length.
    pub steps_per_episode: u32,
    /// Target networks are synced every this many completed episodes.
    pub target_sync_interval: u32,
    /// Episodes between progress log lines.
    pub log_interval: u32,
    /// Seed of the process-wide random source.
    pub seed: u64,
}

impl SessionConfig {
    /// Checks the loop parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes == 0 {
            return Err(ConfigError::ZeroSessionParameter("episode count"));
        }
        if self.steps_per_episode == 0 {
            return Err(ConfigError::ZeroSessionParameter("episode length"));
        }
        if self.target_sync_interval == 0 {
            return Err(ConfigError::ZeroSessionParameter("target sync interval"));
        }
        if self.log_interval == 0 {
            return Err(ConfigError::ZeroSessionParameter("log interval"));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            steps_per_episode: 20,
            target_sync_interval: 10,
            log_interval: 10,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configs_are_valid() {
        assert!(EnvConfig::default().validate().is_ok());
        assert!(DqnConfig::default().validate().is_ok());
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn observation_dim_matches() {
        let cfg = EnvConfig::default();
        assert_eq!(cfg.observation_dim(), 5);
        assert_eq!(cfg.action_dim(), 2);
    }

    #[test]
    fn empty_station_list_rejected() {
        let cfg = EnvConfig {
            stations: vec![],
            ..EnvConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NoStations));
    }

    #[test]
    fn zero_grid_rejected() {
        let cfg = EnvConfig {
            grid_size: 0,
            ..EnvConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroGridSize));
    }

    #[test]
    fn station_outside_grid_rejected() {
        let cfg = EnvConfig {
            stations: vec![Cell::new(0, 0), Cell::new(5, 1)],
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::StationOutOfBounds { .. })
        ));
    }

    #[test]
    fn duplicate_station_rejected() {
        let cfg = EnvConfig {
            stations: vec![Cell::new(1, 1), Cell::new(1, 1)],
            ..EnvConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::DuplicateStation(Cell::new(1, 1)))
        );
    }

    #[test]
    fn soc_range_must_be_ordered() {
        let cfg = EnvConfig {
            initial_soc_range: (0.7, 0.4),
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidSocRange { .. })
        ));
    }

    #[test]
    fn negative_energy_per_edge_rejected() {
        let cfg = EnvConfig {
            energy_per_edge: -0.2,
            ..EnvConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NegativeEnergyPerEdge(-0.2)));
        let cfg = EnvConfig {
            energy_per_edge: 0.0,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn depleted_soc_outside_unit_interval_rejected() {
        for bad in [0.0, -0.1, 3.0, f64::NAN] {
            let cfg = EnvConfig {
                depleted_soc: bad,
                ..EnvConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::DepletedSocOutOfRange(_))
            ));
        }
        let cfg = EnvConfig {
            depleted_soc: 1.0,
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn non_finite_learning_rate_rejected() {
        for bad in [0.0, -1e-3, f64::NAN, f64::INFINITY] {
            let cfg = DqnConfig {
                learning_rate: bad,
                ..DqnConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::NonPositiveLearningRate(_))
            ));
        }
    }

    #[test]
    fn discount_outside_unit_interval_rejected() {
        let cfg = DqnConfig {
            gamma: 1.2,
            ..DqnConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::DiscountOutOfRange(1.2)));
        let cfg = DqnConfig {
            gamma: -0.1,
            ..DqnConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = DqnConfig {
            memory_capacity: 0,
            ..DqnConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn epsilon_floor_above_start_rejected() {
        let cfg = DqnConfig {
            epsilon_start: 0.01,
            ..DqnConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidEpsilonSchedule { .. })
        ));
    }

    #[test]
    fn zero_sync_interval_rejected() {
        let cfg = SessionConfig {
            target_sync_interval: 0,
            ..SessionConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn env_config_json_round_trip() {
        let cfg = EnvConfig {
            num_evs: 3,
            stations: vec![Cell::new(0, 4), Cell::new(2, 2)],
            ..EnvConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"num_evs\":3"));
        let back: EnvConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }
}
