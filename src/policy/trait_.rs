//! Policy trait for the charging environment.

use crate::error::AgentError;

/// A policy that selects one station per EV from the EVs' observations.
///
/// Actions are station indices in `[0, n_stations)`.
pub trait Policy {
    /// Selects one action per EV given their observations.
    ///
    /// # Arguments
    ///
    /// * `observations` - Per-EV observation vectors, as built by
    ///   [`crate::observation::ObservationBuilder`]
    ///
    /// # Returns
    ///
    /// A vector of actions, one per EV.
    fn select_actions(&mut self, observations: &[Vec<f64>]) -> Result<Vec<usize>, AgentError>;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}
