//! EV state and per-step dynamics.

use crate::config::EnvConfig;
use crate::types::{Cell, EvMode};
use crate::Id;

/// What happened to an EV during one environment step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvOutcome {
    /// Waited at a charger; `remaining` steps left on the timer.
    Charging { remaining: u32 },
    /// Reached `station` after `distance` edges and started charging.
    Arrived { station: usize, distance: usize },
    /// Ran out of charge on the way to `station`.
    Depleted { station: usize, distance: usize },
}

/// State of a single EV in the environment.
#[derive(Debug, Clone)]
pub struct EvState {
    /// Unique identifier for this EV.
    pub id: Id,
    /// Current cell.
    pub position: Cell,
    /// State of charge.
    pub soc: f64,
    /// Steps left before the battery is refilled (0 = not charging).
    pub charging_timer: u32,
    /// Route of the last movement decision, kept for rendering.
    pub path: Vec<Cell>,
}

impl EvState {
    /// Creates a new EV parked at `position`.
    pub fn new(id: Id, position: Cell, soc: f64) -> Self {
        Self {
            id,
            position,
            soc,
            charging_timer: 0,
            path: Vec::new(),
        }
    }

    /// Current movement mode.
    pub fn mode(&self) -> EvMode {
        if self.charging_timer > 0 {
            EvMode::Charging
        } else {
            EvMode::Moving
        }
    }

    pub fn is_charging(&self) -> bool {
        self.charging_timer > 0
    }

    /// Places the EV for a new episode.
    pub fn respawn(&mut self, position: Cell, soc: f64) {
        self.position = position;
        self.soc = soc;
        self.charging_timer = 0;
        self.path.clear();
    }

    /// Advances the charging countdown by one step.
    ///
    /// The battery is refilled in one lump on the step the timer reaches 0.
    /// Returns the remaining timer value.
    pub fn tick_charging(&mut self) -> u32 {
        self.charging_timer = self.charging_timer.saturating_sub(1);
        self.path = vec![self.position];
        if self.charging_timer == 0 {
            self.soc = 1.0;
        }
        self.charging_timer
    }

    /// Drives along `path` to its last cell, draining the battery.
    ///
    /// Returns `true` if the battery ran dry (SoC ≤ 0), in which case SoC is
    /// reset to the configured depleted level. Otherwise the charging timer
    /// starts.
    pub fn travel(&mut self, path: Vec<Cell>, config: &EnvConfig) -> bool {
        let distance = path.len().saturating_sub(1);
        if let Some(&destination) = path.last() {
            self.position = destination;
        }
        self.path = path;
        self.soc -= distance as f64 * config.energy_per_edge;

        if self.soc <= 0.0 {
            self.soc = config.depleted_soc;
            true
        } else {
            self.charging_timer = config.charging_duration;
            false
        }
    }

    /// Encodes the EV's own state as `[x, y, SoC]`.
    pub fn features(&self) -> Vec<f64> {
        let [x, y] = self.position.features();
        vec![x, y, self.soc]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev_at(x: usize, y: usize, soc: f64) -> EvState {
        EvState::new("ev_0".into(), Cell::new(x, y), soc)
    }

    #[test]
    fn features_layout() {
        let ev = ev_at(2, 3, 0.5);
        assert_eq!(ev.features(), vec![2.0, 3.0, 0.5]);
        assert_eq!(ev.features().len(), EnvConfig::EV_FEATURE_DIM);
    }

    #[test]
    fn travel_moves_and_starts_charging() {
        let config = EnvConfig::default();
        let mut ev = ev_at(0, 0, 0.6);
        let path = vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)];
        let depleted = ev.travel(path.clone(), &config);
        assert!(!depleted);
        assert_eq!(ev.position, Cell::new(0, 2));
        assert_eq!(ev.path, path);
        assert!((ev.soc - 0.5).abs() < 1e-12);
        assert_eq!(ev.charging_timer, 3);
        assert_eq!(ev.mode(), EvMode::Charging);
    }

    #[test]
    fn travel_depletion_resets_soc() {
        let config = EnvConfig::default();
        let mut ev = ev_at(0, 0, 0.1);
        let path = vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)];
        assert!(ev.travel(path, &config));
        assert_eq!(ev.soc, 0.1);
        assert_eq!(ev.charging_timer, 0);
        assert_eq!(ev.mode(), EvMode::Moving);
    }

    #[test]
    fn charging_refills_only_at_zero() {
        let mut ev = ev_at(4, 4, 0.3);
        ev.charging_timer = 2;
        assert_eq!(ev.tick_charging(), 1);
        assert_eq!(ev.soc, 0.3);
        assert_eq!(ev.path, vec![Cell::new(4, 4)]);
        assert_eq!(ev.tick_charging(), 0);
        assert_eq!(ev.soc, 1.0);
    }

    #[test]
    fn respawn_clears_state() {
        let mut ev = ev_at(1, 1, 0.2);
        ev.charging_timer = 2;
        ev.path = vec![Cell::new(1, 1)];
        ev.respawn(Cell::new(3, 3), 0.5);
        assert_eq!(ev.position, Cell::new(3, 3));
        assert_eq!(ev.charging_timer, 0);
        assert!(ev.path.is_empty());
    }
}
