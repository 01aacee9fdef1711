//! Observation encoding for the charging environment.
//!
//! Builds per-EV observation vectors containing the EV's own state plus its
//! shortest-path distance to every station.

use crate::error::EnvError;
use crate::ev::EvState;
use crate::grid::GridGraph;
use crate::types::Cell;

/// Builds observation vectors for EVs.
pub struct ObservationBuilder;

impl ObservationBuilder {
    /// Builds the observation vector for one EV.
    ///
    /// ```text
    /// [x, y, SoC, dist_to_station_0, ..., dist_to_station_{N-1}]
    /// ```
    ///
    /// Coordinates and distances are raw grid units.
    pub fn build(ev: &EvState, stations: &[Cell], grid: &GridGraph) -> Result<Vec<f64>, EnvError> {
        let mut obs = ev.features();
        obs.reserve(stations.len());
        for &station in stations {
            let distance = grid
                .distance(ev.position, station)
                .ok_or(EnvError::Unreachable {
                    from: ev.position,
                    to: station,
                })?;
            obs.push(distance as f64);
        }
        Ok(obs)
    }

    /// Builds observations for all EVs, in EV order.
    pub fn build_all(
        evs: &[EvState],
        stations: &[Cell],
        grid: &GridGraph,
    ) -> Result<Vec<Vec<f64>>, EnvError> {
        evs.iter()
            .map(|ev| Self::build(ev, stations, grid))
            .collect()
    }
}
