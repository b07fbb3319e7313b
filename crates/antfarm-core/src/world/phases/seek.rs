use super::AgentStep;
use crate::constants::{ACCUMULATED_LEVEL_MAX, ACCUMULATED_LEVEL_MIN, ACCUMULATED_SEEK_ATTEMPTS};
use crate::entity::Located;
use crate::geometry;

impl AgentStep<'_> {
    /// Remember the strongest level seen and head back towards it once the
    /// local level drops below the kind's threshold.
    pub(in crate::world) fn seek_threshold(&mut self) {
        let head = self.agent.head_position();
        let level = self.field.get(head[0], head[1]);
        self.agent.last_level = level;

        if self.agent.best_level < level {
            self.agent.best_level = level;
            self.agent.best_location = head;
        } else if self.agent.profile.seek_threshold > level
            && self.agent.energy > self.config.move_low_energy_threshold
        {
            let bearing = geometry::heading_towards(head, self.agent.best_location);
            self.set_heading(bearing);
        }
    }

    /// Probe a few headings for a stronger level. The more an agent has
    /// accumulated, the less often it bothers.
    pub(in crate::world) fn seek_accumulated(&mut self) {
        let head = self.agent.head_position();
        let mut level = self.field.get(head[0], head[1]);
        self.agent.last_level = level;

        let p = self.rand(0.0, 1.0);
        if p < 1.0 / self.agent.accumulated_level
            && self.agent.energy > self.config.move_low_energy_threshold
        {
            for _ in 0..ACCUMULATED_SEEK_ATTEMPTS {
                if self.agent.last_level < level {
                    self.agent.accumulated_level += level;
                    break;
                }
                self.turn_random(self.config.seek_turn_degrees);
                let head = self.agent.head_position();
                level = self.field.get(head[0], head[1]);
            }
        }

        self.agent.accumulated_level = geometry::clamp(
            self.agent.accumulated_level - self.agent.profile.pheromone_decay,
            ACCUMULATED_LEVEL_MIN,
            ACCUMULATED_LEVEL_MAX,
        );
    }
}
