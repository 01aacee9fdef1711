//! Epsilon-greedy exploration schedule.

use rand::Rng;

/// Exploration rate decayed once per completed episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpsilonGreedy {
    epsilon: f64,
    decay: f64,
    min: f64,
}

impl EpsilonGreedy {
    /// Creates a schedule starting at `start`. Bounds are validated by
    /// [`crate::config::DqnConfig::validate`].
    pub fn new(start: f64, decay: f64, min: f64) -> Self {
        Self {
            epsilon: start,
            decay,
            min,
        }
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Exploration floor.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Returns true if the next action should be random.
    ///
    /// Draws `u ∈ [0, 1)` and explores when `u <= ε`, so `ε = 1` always
    /// explores.
    pub fn explore<R: Rng>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() <= self.epsilon
    }

    /// `ε ← max(ε · decay, ε_min)`.
    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.decay).max(self.min);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn decay_is_monotone_and_floored() {
        let mut schedule = EpsilonGreedy::new(1.0, 0.995, 0.05);
        let mut prev = schedule.epsilon();
        for _ in 0..2000 {
            schedule.decay();
            assert!(schedule.epsilon() <= prev);
            assert!(schedule.epsilon() >= 0.05);
            prev = schedule.epsilon();
        }
        assert_eq!(schedule.epsilon(), 0.05);
    }

    #[test]
    fn single_decay_step() {
        let mut schedule = EpsilonGreedy::new(1.0, 0.995, 0.05);
        schedule.decay();
        assert!((schedule.epsilon() - 0.995).abs() < 1e-12);
    }

    #[test]
    fn full_epsilon_always_explores() {
        let schedule = EpsilonGreedy::new(1.0, 0.995, 0.05);
        let mut rng = StdRng::seed_from_u64(0);
        assert!((0..1000).all(|_| schedule.explore(&mut rng)));
    }

    #[test]
    fn zero_epsilon_never_explores() {
        let schedule = EpsilonGreedy::new(0.0, 1.0, 0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let explored = (0..1000).filter(|_| schedule.explore(&mut rng)).count();
        assert_eq!(explored, 0);
    }
}
