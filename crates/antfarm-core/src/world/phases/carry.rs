use super::AgentStep;
use crate::entity::{EntityHandle, Located};
use crate::geometry;
use crate::spatial::{RemoveOutcome, SpatialError};

impl AgentStep<'_> {
    /// Put every carried grain back into the index once energy falls below the
    /// carry floor. Returns whether anything was dropped.
    pub(in crate::world) fn drop_load(&mut self) -> Result<bool, SpatialError> {
        if !self.agent.is_carrying() || self.agent.energy >= self.config.carry_low_energy_threshold
        {
            return Ok(false);
        }

        let count = self.agent.carried.len();
        for &i in &self.agent.carried {
            if let Some(sand) = self.sands.get_mut(i as usize) {
                self.index.insert(EntityHandle::Sand(i), sand)?;
            }
        }
        self.agent.carried.clear();
        self.agent
            .adjust_max_speed(self.config.carry_speed_penalty * count as f64);
        Ok(true)
    }

    /// [`Self::drop_load`] followed by a wide turn when something was dropped.
    pub(in crate::world) fn drop_sand(&mut self) -> Result<bool, SpatialError> {
        let dropped = self.drop_load()?;
        if dropped {
            self.turn_random(self.config.drop_turn_degrees);
        }
        Ok(dropped)
    }

    /// Try to lift `sand`. On success steer relative to the best pheromone location,
    /// otherwise nudge the heading.
    pub(in crate::world) fn pickup_sand(&mut self, sand: u32) {
        if self.try_pickup(sand) {
            let head = self.agent.head_position();
            let bearing = geometry::heading_towards(head, self.agent.best_location);
            self.set_heading(bearing + self.agent.profile.carry_direction);
        } else {
            self.turn_random(self.config.sand_collision_turn_degrees);
        }
    }

    fn try_pickup(&mut self, sand: u32) -> bool {
        let p = self.rand(0.0, 1.0);
        let carried = self.agent.carried.len();
        let propensity = 1.0 / (1.0 + carried as f64);
        if carried >= self.config.max_carry_capacity
            || p >= propensity
            || self.agent.energy <= self.config.carry_low_energy_threshold
        {
            return false;
        }

        let Some(grain) = self.sands.get(sand as usize) else {
            return false;
        };
        // A grain that is not where its cache says cannot change owner.
        if let RemoveOutcome::NotFound { .. } = self.index.remove(EntityHandle::Sand(sand), grain) {
            *self.stale_removals += 1;
            return false;
        }
        self.agent.carried.push(sand);
        self.agent.adjust_max_speed(-self.config.carry_speed_penalty);
        true
    }

    /// Pull every carried grain to a jittered spot around the head.
    pub(in crate::world) fn drag_phase(&mut self) {
        let [hx, hy] = self.agent.head_position();
        let jitter = self.config.drag_jitter;
        for k in 0..self.agent.carried.len() {
            let dx = self.rand(-jitter, jitter);
            let dy = self.rand(-jitter, jitter);
            let i = self.agent.carried[k] as usize;
            if let Some(grain) = self.sands.get_mut(i) {
                grain.position = [hx + dx, hy + dy];
            }
            self.tax(self.config.energy_cost_drag);
        }
    }
}
