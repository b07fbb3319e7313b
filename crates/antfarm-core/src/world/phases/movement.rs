use super::AgentStep;
use crate::config::SeekStrategy;
use crate::entity::Located;
use crate::geometry;
use crate::spatial::SpatialError;

impl AgentStep<'_> {
    /// Random turn, jitter and speed change, then displacement along the heading.
    /// Returns whether the position changed.
    pub(in crate::world) fn move_phase(&mut self) -> Result<bool, SpatialError> {
        let floor = self.config.move_low_energy_threshold;
        if self.agent.energy < floor && self.agent.is_carrying() {
            self.drop_load()?;
        }

        let p_turn = self.rand(0.0, 1.0);
        let p_jitter = self.rand(0.0, 1.0);
        let p_speed = self.rand(0.0, 1.0);

        let mut angle = 0.0;
        if p_turn < self.config.turn_probability && !self.agent.is_carrying() {
            let r = self.config.random_turn_degrees;
            angle += self.rand(-r, r);
        }
        if p_jitter < self.config.jitter_probability {
            let r = self.config.jitter_degrees;
            angle += self.rand(-r, r);
        }
        // The accumulated strategy does its own turning.
        if self.config.seek_strategy == SeekStrategy::Threshold
            && angle > 0.0
            && self.agent.energy > floor
        {
            let scaled = angle * self.config.turn_scale;
            self.set_heading(self.agent.heading + scaled.to_radians());
        }

        if p_speed < self.config.speed_change_probability && self.agent.energy > floor {
            let inc = self.agent.profile.speed_increment;
            let delta = self.rand(-inc, inc);
            self.set_speed(self.agent.speed + delta);
        }

        let [vx, vy] = geometry::polar_to_cartesian(self.agent.speed, self.agent.heading);
        let previous = self.agent.position;
        self.agent.position = [previous[0] + vx, previous[1] + vy];

        if self.agent.position != previous {
            self.tax(self.config.energy_cost_move);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Reflect the velocity component(s) whose head coordinate is on or past a wall,
    /// then step once more with the reflected velocity.
    ///
    /// The step is taken even when nothing was reflected, and the speed and heading
    /// setters always charge their costs.
    pub(in crate::world) fn wall_phase(&mut self) {
        let [hx, hy] = self.agent.head_position();
        let [mut vx, mut vy] = geometry::polar_to_cartesian(self.agent.speed, self.agent.heading);
        if hx <= 0.0 || hx >= self.config.world_width {
            vx = -vx;
        }
        if hy <= 0.0 || hy >= self.config.world_height {
            vy = -vy;
        }

        let heading = vy.atan2(vx);
        self.agent.position[0] += vx;
        self.agent.position[1] += vy;
        self.set_speed(self.agent.speed);
        self.set_heading(heading);
    }
}
