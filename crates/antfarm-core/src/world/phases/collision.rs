use super::AgentStep;
use crate::entity::{EntityHandle, Located};
use crate::spatial::SpatialError;

impl AgentStep<'_> {
    /// React to the first thing touching the head, in neighbour scan order.
    pub(in crate::world) fn collision_phase(&mut self) -> Result<(), SpatialError> {
        let head = self.agent.head_position();
        let hit = self
            .index
            .detect_collision(self.handle, head, |handle, point| {
                self.peer_distance(handle, point)
            });

        match hit {
            Some(EntityHandle::Agent(_)) => {
                self.tax(self.config.energy_cost_collision);
                if !self.drop_sand()? {
                    self.turn_random(self.config.ant_collision_turn_degrees);
                }
            }
            Some(EntityHandle::Sand(sand)) => {
                self.tax(self.config.energy_cost_collision);
                if !self.drop_sand()? {
                    self.turn_random(self.config.sand_collision_turn_degrees);
                }
                self.pickup_sand(sand);
            }
            Some(EntityHandle::Marker(_)) => {
                self.tax(self.config.energy_cost_collision);
            }
            None => {
                self.drop_sand()?;
            }
        }
        Ok(())
    }
}
