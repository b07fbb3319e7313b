use crate::constants::{
    AGENT_LENGTH, AGENT_WIDTH, ENERGY_FLOOR, MAX_SPEED_CEILING, MAX_SPEED_FLOOR, MIN_SPEED,
};
use crate::entity::Located;
use crate::geometry;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Works near the nest and carries sand away from the pheromone peak.
    Internal,
    /// Roams the whole arena.
    External,
    /// Nearly stationary brood.
    Passive,
}

/// Per-kind constants fixed at spawn time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindProfile {
    /// Half-width of the square spawn area around the arena centre.
    pub spawn_spread: f64,
    pub initial_energy: f64,
    pub max_energy: f64,
    /// Applied every tick through the energy tax, so negative values are a gain.
    pub energy_rebate: f64,
    pub pheromone_decay: f64,
    pub seek_threshold: f64,
    /// Initial speed is drawn from `[0, initial_speed_max)`.
    pub initial_speed_max: f64,
    pub speed_increment: f64,
    /// Offset added to the bearing of the best pheromone location after a pickup.
    pub carry_direction: f64,
}

impl AgentKind {
    pub const ALL: [AgentKind; 3] = [AgentKind::Internal, AgentKind::External, AgentKind::Passive];

    pub fn profile(self) -> KindProfile {
        match self {
            AgentKind::Internal => KindProfile {
                spawn_spread: 50.0,
                initial_energy: 0.5,
                max_energy: 0.5,
                energy_rebate: -0.05,
                pheromone_decay: 0.001,
                seek_threshold: 0.5,
                initial_speed_max: 2.0,
                speed_increment: 2.0,
                carry_direction: PI,
            },
            AgentKind::External => KindProfile {
                spawn_spread: 310.0,
                initial_energy: 0.5,
                max_energy: 0.5,
                energy_rebate: -0.05,
                pheromone_decay: 0.1,
                seek_threshold: 0.0,
                initial_speed_max: 2.0,
                speed_increment: 2.0,
                carry_direction: 0.0,
            },
            AgentKind::Passive => KindProfile {
                spawn_spread: 15.0,
                initial_energy: 0.3,
                max_energy: 0.5,
                energy_rebate: -0.0125,
                pheromone_decay: 0.5,
                seek_threshold: 0.9,
                initial_speed_max: 0.005,
                speed_increment: 0.001,
                carry_direction: 0.0,
            },
        }
    }
}

/// A mobile ant. Carried sand is referenced by index into the world's sand storage.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: u32,
    pub kind: AgentKind,
    pub position: [f64; 2],
    /// Radians, unbounded; only views wrap it.
    pub heading: f64,
    pub(crate) speed: f64,
    pub(crate) max_speed: f64,
    pub(crate) energy: f64,
    pub(crate) carried: Vec<u32>,
    pub(crate) last_level: f64,
    pub(crate) best_level: f64,
    pub(crate) best_location: [f64; 2],
    pub(crate) accumulated_level: f64,
    pub(crate) profile: KindProfile,
    cell: Option<usize>,
}

impl Agent {
    /// Agent with its kind's profile at an explicit pose. Speed starts at zero
    /// (clamped to the minimum) and max speed at the ceiling.
    pub fn new(id: u32, kind: AgentKind, position: [f64; 2], heading: f64) -> Self {
        let profile = kind.profile();
        Self {
            id,
            kind,
            position,
            heading,
            speed: MIN_SPEED,
            max_speed: MAX_SPEED_CEILING,
            energy: profile.initial_energy,
            carried: Vec::new(),
            last_level: 0.0,
            best_level: 0.0,
            best_location: [0.0, 0.0],
            accumulated_level: 1.0,
            profile,
            cell: None,
        }
    }

    /// Spawn around `center` with a random pose drawn from the kind's profile.
    ///
    /// Both axes are drawn from `[cx - s, cy + s)`; on a square arena this is the
    /// usual centred square.
    pub fn spawn<R: Rng + ?Sized>(id: u32, kind: AgentKind, center: [f64; 2], rng: &mut R) -> Self {
        let profile = kind.profile();
        let low = center[0] - profile.spawn_spread;
        let high = center[1] + profile.spawn_spread;
        let x = geometry::rand_range(rng, low, high);
        let y = geometry::rand_range(rng, low, high);
        let speed = geometry::rand_range(rng, 0.0, profile.initial_speed_max);
        let heading = geometry::rand_range(rng, 0.0, 360.0).to_radians();

        let mut agent = Self::new(id, kind, [x, y], heading);
        agent.speed = geometry::clamp(speed, MIN_SPEED, agent.max_speed);
        agent
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn max_energy(&self) -> f64 {
        self.profile.max_energy
    }

    pub fn profile(&self) -> &KindProfile {
        &self.profile
    }

    /// Indices of carried sand, in pickup order.
    pub fn carried(&self) -> &[u32] {
        &self.carried
    }

    pub fn is_carrying(&self) -> bool {
        !self.carried.is_empty()
    }

    /// Highest pheromone level seen so far and where it was seen.
    pub fn best_pheromone(&self) -> (f64, [f64; 2]) {
        (self.best_level, self.best_location)
    }

    pub fn last_pheromone_level(&self) -> f64 {
        self.last_level
    }

    pub fn accumulated_level(&self) -> f64 {
        self.accumulated_level
    }

    /// Subtract `delta` from energy, keeping it within `[ENERGY_FLOOR, max_energy]`.
    pub fn tax_energy(&mut self, delta: f64) {
        self.energy = geometry::clamp(self.energy - delta, ENERGY_FLOOR, self.profile.max_energy);
    }

    pub fn set_energy(&mut self, energy: f64) {
        self.energy = geometry::clamp(energy, ENERGY_FLOOR, self.profile.max_energy);
    }

    /// Shift max speed by `delta` and keep it within its band.
    pub(crate) fn adjust_max_speed(&mut self, delta: f64) {
        self.max_speed = geometry::clamp(self.max_speed + delta, MAX_SPEED_FLOOR, MAX_SPEED_CEILING);
    }
}

impl Located for Agent {
    fn id(&self) -> u32 {
        self.id
    }

    fn position(&self) -> [f64; 2] {
        self.position
    }

    // Both offsets scale with cos(heading); ants heading straight up or down have
    // their head at their position.
    fn head_position(&self) -> [f64; 2] {
        let c = self.heading.cos();
        [
            self.position[0] + AGENT_LENGTH * c,
            self.position[1] + AGENT_WIDTH * c,
        ]
    }

    /// Perpendicular distance from `point` to the line through the body and head.
    ///
    /// NaN when head and body coincide, which never registers as a collision.
    fn distance_to_point(&self, point: [f64; 2]) -> f64 {
        let [x1, y1] = self.position;
        let [x2, y2] = self.head_position();
        let [x0, y0] = point;
        let dx = x2 - x1;
        let dy = y2 - y1;
        let cross = dx * (y1 - y0) - (x1 - x0) * dy;
        cross.abs() / (dx * dx + dy * dy).sqrt()
    }

    fn cell(&self) -> Option<usize> {
        self.cell
    }

    fn set_cell(&mut self, cell: Option<usize>) {
        self.cell = cell;
    }
}
