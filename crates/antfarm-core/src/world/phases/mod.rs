//! Per-agent tick, split into the phases an ant runs through in order:
//! seek, move, wall reflection, collision (with drop/pickup), drag, rebate, re-index.

use crate::agent::Agent;
use crate::config::{SeekStrategy, SimConfig};
use crate::constants::MIN_SPEED;
use crate::entity::{EntityHandle, Located, Marker, Sand};
use crate::field::ScalarField;
use crate::geometry;
use crate::spatial::{RemoveOutcome, SpatialError, SpatialIndex};
use rand_chacha::ChaCha12Rng;

mod carry;
mod collision;
mod movement;
mod seek;

/// One agent borrowed mutably alongside the parts of the world it may touch.
pub(in crate::world) struct AgentStep<'w> {
    pub(in crate::world) agent: &'w mut Agent,
    pub(in crate::world) handle: EntityHandle,
    /// Storage slot of `agent`; peers are split around it.
    pub(in crate::world) slot: usize,
    pub(in crate::world) peers_before: &'w [Agent],
    pub(in crate::world) peers_after: &'w [Agent],
    pub(in crate::world) sands: &'w mut [Sand],
    pub(in crate::world) markers: &'w [Marker],
    pub(in crate::world) index: &'w mut SpatialIndex,
    pub(in crate::world) field: &'w ScalarField,
    pub(in crate::world) rng: &'w mut ChaCha12Rng,
    pub(in crate::world) config: &'w SimConfig,
    pub(in crate::world) stale_removals: &'w mut usize,
}

impl AgentStep<'_> {
    pub(in crate::world) fn run(&mut self) -> Result<(), SpatialError> {
        match self.config.seek_strategy {
            SeekStrategy::Threshold => self.seek_threshold(),
            SeekStrategy::Accumulated => self.seek_accumulated(),
        }

        let moved = self.move_phase()?;
        let before_walls = self.agent.position;
        self.wall_phase();
        self.collision_phase()?;
        self.drag_phase();

        let rebate = self.agent.profile.energy_rebate;
        self.agent.tax_energy(rebate);

        if moved || self.agent.position != before_walls {
            self.reindex()?;
        }
        Ok(())
    }

    fn reindex(&mut self) -> Result<(), SpatialError> {
        if let RemoveOutcome::NotFound { .. } = self.index.remove(self.handle, &*self.agent) {
            *self.stale_removals += 1;
        }
        self.index.insert(self.handle, &mut *self.agent)?;
        Ok(())
    }

    fn rand(&mut self, min: f64, max: f64) -> f64 {
        geometry::rand_range(&mut *self.rng, min, max)
    }

    fn tax(&mut self, delta: f64) {
        self.agent.tax_energy(delta);
    }

    fn set_heading(&mut self, heading: f64) {
        self.agent.heading = heading;
        self.tax(self.config.energy_cost_turn);
    }

    /// Turn by a uniform angle in `[-half_range, half_range)` degrees.
    fn turn_random(&mut self, half_range: f64) {
        let degrees = self.rand(-half_range, half_range);
        self.set_heading(self.agent.heading + degrees.to_radians());
    }

    fn set_speed(&mut self, speed: f64) {
        self.agent.speed = geometry::clamp(speed, MIN_SPEED, self.agent.max_speed);
        self.tax(self.config.energy_cost_speed_change);
    }

    /// Distance from `point` to the entity behind `handle`; NaN for dangling handles
    /// and for the stepping agent itself.
    fn peer_distance(&self, handle: EntityHandle, point: [f64; 2]) -> f64 {
        let i = handle.index();
        let located: Option<&dyn Located> = match handle {
            EntityHandle::Sand(_) => self.sands.get(i).map(|s| s as &dyn Located),
            EntityHandle::Marker(_) => self.markers.get(i).map(|m| m as &dyn Located),
            EntityHandle::Agent(_) if i < self.slot => {
                self.peers_before.get(i).map(|a| a as &dyn Located)
            }
            EntityHandle::Agent(_) if i > self.slot => self
                .peers_after
                .get(i - self.slot - 1)
                .map(|a| a as &dyn Located),
            EntityHandle::Agent(_) => None,
        };
        located.map_or(f64::NAN, |l| l.distance_to_point(point))
    }
}
