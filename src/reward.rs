//! Per-EV reward function.
//!
//! Each EV is rewarded individually: a flat cost while it waits at a
//! charger, otherwise a trip cost made of distance and station contention
//! plus either an arrival bonus or a depletion penalty.

use crate::config::EnvConfig;

/// Computes rewards for the charging environment.
pub struct RewardComputer;

impl RewardComputer {
    /// Reward for one step spent waiting at a charger.
    pub fn charging_wait(config: &EnvConfig) -> f64 {
        config.charging_wait_reward
    }

    /// Reward for one trip to a station.
    ///
    /// # Components
    ///
    /// 1. **Distance cost**: `-distance_cost × edges`.
    /// 2. **Queue cost**: `-queue_cost × queue_count`, where `queue_count`
    ///    already includes this EV.
    /// 3. **Outcome**: `-depletion_penalty` if the battery ran dry, otherwise
    ///    `+arrival_bonus`.
    pub fn trip(distance: usize, queue_count: u32, depleted: bool, config: &EnvConfig) -> f64 {
        let mut reward = -(distance as f64 * config.distance_cost)
            - (queue_count as f64 * config.queue_cost);

        if depleted {
            reward -= config.depletion_penalty;
        } else {
            reward += config.arrival_bonus;
        }

        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_costs_half_a_point() {
        assert_eq!(RewardComputer::charging_wait(&EnvConfig::default()), -0.5);
    }

    #[test]
    fn zero_distance_arrivals_depend_on_queue_position() {
        let config = EnvConfig::default();
        assert_eq!(RewardComputer::trip(0, 1, false, &config), 18.0);
        assert_eq!(RewardComputer::trip(0, 2, false, &config), 16.0);
    }

    #[test]
    fn distance_and_depletion() {
        let config = EnvConfig::default();
        // -(4 × 1.5) - (1 × 2.0) + 20
        assert!((RewardComputer::trip(4, 1, false, &config) - 12.0).abs() < 1e-12);
        // -(8 × 1.5) - (1 × 2.0) - 100
        assert!((RewardComputer::trip(8, 1, true, &config) + 114.0).abs() < 1e-12);
    }
}
