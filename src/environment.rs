//! EV charging environment.
//!
//! Each step runs: validate actions → plan routes → (per EV, in index order)
//! charge or travel → register queue contention → reward → observe.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::EnvConfig;
use crate::error::EnvError;
use crate::ev::{EvOutcome, EvState};
use crate::grid::GridGraph;
use crate::observation::ObservationBuilder;
use crate::reward::RewardComputer;
use crate::types::Cell;

/// Result of a single environment step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Per-EV observations after the step.
    pub observations: Vec<Vec<f64>>,
    /// Per-EV rewards, in EV order.
    pub rewards: Vec<f64>,
    /// Number of EVs that selected each station during this step.
    pub queue_counts: Vec<u32>,
    /// What each EV did.
    pub outcomes: Vec<EvOutcome>,
    /// Step counter after this step.
    pub time_step: u32,
}

/// The multi-EV charging environment.
///
/// EVs live on a square grid and repeatedly choose a charging station.
/// A trip is resolved in a single step along the shortest route; arriving
/// with charge left starts a fixed charging wait after which the battery is
/// full again.
///
/// # Lifecycle
///
/// 1. Call [`ChargingEnv::new`] with configuration and a random source.
/// 2. Call [`ChargingEnv::reset`] to start an episode.
/// 3. Repeatedly call [`ChargingEnv::step`] with one station index per EV.
///    Episodes have no terminal state; the caller decides their length.
#[derive(Debug)]
pub struct ChargingEnv {
    config: EnvConfig,
    grid: GridGraph,
    evs: Vec<EvState>,
    queue_counts: Vec<u32>,
    t: u32,
    rng: StdRng,
}

impl ChargingEnv {
    /// Creates a new environment and places the fleet for a first episode.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Config`] if the configuration is invalid.
    pub fn new(config: EnvConfig, rng: StdRng) -> Result<Self, EnvError> {
        config.validate()?;
        let grid = GridGraph::new(config.grid_size)?;
        let evs = (0..config.num_evs)
            .map(|i| EvState::new(format!("ev_{}", i), Cell::origin(), 1.0))
            .collect();
        let queue_counts = vec![0; config.stations.len()];

        let mut env = Self {
            config,
            grid,
            evs,
            queue_counts,
            t: 0,
            rng,
        };
        env.reset()?;
        Ok(env)
    }

    /// Creates a new environment with its own seeded random source.
    pub fn with_seed(config: EnvConfig, seed: u64) -> Result<Self, EnvError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    /// Resets the environment for a new episode.
    ///
    /// Every EV gets a uniformly random cell and a uniformly random SoC from
    /// the configured range. Timers, paths and queue counts are cleared.
    pub fn reset(&mut self) -> Result<Vec<Vec<f64>>, EnvError> {
        self.t = 0;
        self.queue_counts.iter_mut().for_each(|q| *q = 0);

        let size = self.config.grid_size;
        let (soc_min, soc_max) = self.config.initial_soc_range;
        for ev in &mut self.evs {
            let position = Cell::new(self.rng.gen_range(0..size), self.rng.gen_range(0..size));
            let soc = self.rng.gen_range(soc_min..soc_max);
            ev.respawn(position, soc);
        }

        self.observations()
    }

    /// Executes one environment step.
    ///
    /// EVs are processed in index order, so when several EVs pick the same
    /// station the earlier ones register first and see a shorter queue.
    ///
    /// - A charging EV ignores its action, counts its timer down, and is
    ///   refilled to SoC 1.0 when the timer reaches 0.
    /// - Any other EV registers at the chosen station, drives the shortest
    ///   route there and either starts charging or, if the battery ran dry,
    ///   is penalized and left at the depleted SoC level.
    ///
    /// # Errors
    ///
    /// Fails without touching any state if the number of actions differs
    /// from the number of EVs or an action does not name a station.
    pub fn step(&mut self, actions: &[usize]) -> Result<StepResult, EnvError> {
        let routes = self.plan_routes(actions)?;

        let mut queue_counts = vec![0u32; self.config.stations.len()];
        let mut rewards = Vec::with_capacity(self.evs.len());
        let mut outcomes = Vec::with_capacity(self.evs.len());

        for ((ev, &station), route) in self.evs.iter_mut().zip(actions).zip(routes) {
            let Some(path) = route else {
                let remaining = ev.tick_charging();
                trace!(ev = %ev.id, remaining, "charging");
                rewards.push(RewardComputer::charging_wait(&self.config));
                outcomes.push(EvOutcome::Charging { remaining });
                continue;
            };

            queue_counts[station] += 1;
            let distance = path.len() - 1;
            let depleted = ev.travel(path, &self.config);
            let reward =
                RewardComputer::trip(distance, queue_counts[station], depleted, &self.config);

            if depleted {
                debug!(ev = %ev.id, station, distance, "battery depleted en route");
                outcomes.push(EvOutcome::Depleted { station, distance });
            } else {
                trace!(ev = %ev.id, station, distance, soc = ev.soc, "arrived");
                outcomes.push(EvOutcome::Arrived { station, distance });
            }
            rewards.push(reward);
        }

        self.queue_counts = queue_counts;
        self.t += 1;

        Ok(StepResult {
            observations: self.observations()?,
            rewards,
            queue_counts: self.queue_counts.clone(),
            outcomes,
            time_step: self.t,
        })
    }

    /// Validates actions and computes every moving EV's route up front, so
    /// that a failing step leaves the environment untouched.
    ///
    /// Charging EVs get `None`.
    fn plan_routes(&self, actions: &[usize]) -> Result<Vec<Option<Vec<Cell>>>, EnvError> {
        if actions.len() != self.evs.len() {
            return Err(EnvError::ActionCountMismatch {
                expected: self.evs.len(),
                got: actions.len(),
            });
        }
        let n_stations = self.config.stations.len();
        if let Some((ev, &action)) = actions.iter().enumerate().find(|&(_, &a)| a >= n_stations) {
            return Err(EnvError::ActionOutOfRange {
                ev,
                action,
                n_stations,
            });
        }

        self.evs
            .iter()
            .zip(actions)
            .map(|(ev, &action)| {
                if ev.is_charging() {
                    return Ok(None);
                }
                let target = self.config.stations[action];
                self.grid
                    .shortest_path(ev.position, target)
                    .map(Some)
                    .ok_or(EnvError::Unreachable {
                        from: ev.position,
                        to: target,
                    })
            })
            .collect()
    }

    /// Builds fresh observations for all EVs.
    pub fn observations(&self) -> Result<Vec<Vec<f64>>, EnvError> {
        ObservationBuilder::build_all(&self.evs, &self.config.stations, &self.grid)
    }

    /// Environment configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// The road grid.
    pub fn grid(&self) -> &GridGraph {
        &self.grid
    }

    /// All EV states.
    pub fn evs(&self) -> &[EvState] {
        &self.evs
    }

    /// Overwrites one EV's state. Intended for scripted scenarios.
    ///
    /// # Errors
    ///
    /// Rejects cells outside the grid, unknown EV indices and SoC values
    /// outside `(0, 1]`. Nothing changes on error.
    pub fn place_ev(&mut self, index: usize, position: Cell, soc: f64) -> Result<(), EnvError> {
        if !self.grid.contains(position) {
            return Err(EnvError::CellOutOfGrid(position));
        }
        if !(soc > 0.0 && soc <= 1.0) {
            return Err(EnvError::SocOutOfRange(soc));
        }
        let n_evs = self.evs.len();
        let ev = self
            .evs
            .get_mut(index)
            .ok_or(EnvError::UnknownEv { index, n_evs })?;
        ev.respawn(position, soc);
        Ok(())
    }

    /// Station cells, indexed by action.
    pub fn stations(&self) -> &[Cell] {
        &self.config.stations
    }

    /// Station contention counts from the most recent step.
    pub fn queue_counts(&self) -> &[u32] {
        &self.queue_counts
    }

    pub fn positions(&self) -> Vec<Cell> {
        self.evs.iter().map(|ev| ev.position).collect()
    }

    pub fn socs(&self) -> Vec<f64> {
        self.evs.iter().map(|ev| ev.soc).collect()
    }

    pub fn charging_timers(&self) -> Vec<u32> {
        self.evs.iter().map(|ev| ev.charging_timer).collect()
    }

    pub fn paths(&self) -> Vec<&[Cell]> {
        self.evs.iter().map(|ev| ev.path.as_slice()).collect()
    }

    /// Mean SoC across the fleet.
    pub fn mean_soc(&self) -> f64 {
        self.evs.iter().map(|ev| ev.soc).sum::<f64>() / self.evs.len() as f64
    }

    /// Number of EVs.
    pub fn n_evs(&self) -> usize {
        self.evs.len()
    }

    /// Number of stations (= number of actions).
    pub fn n_stations(&self) -> usize {
        self.config.stations.len()
    }

    /// Steps taken since the last reset.
    pub fn time_step(&self) -> u32 {
        self.t
    }
}
