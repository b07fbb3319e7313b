use serde::{Deserialize, Serialize};

/// Layout of the Gaussian anchors that make up the pheromone field.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldShape {
    /// Single bump at the arena centre.
    #[default]
    Normal,
    Square,
    Oval,
    Heart,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeekStrategy {
    /// Head back to the best remembered location when the local level drops below
    /// the kind's threshold.
    #[default]
    Threshold,
    /// Probe a few nearby headings, with probability falling as the agent's
    /// accumulated level grows. Replaces the random turn in the move phase.
    Accumulated,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deterministic seed for reproducible simulation runs.
    pub seed: u64,
    /// Arena width in world units; also the pheromone field width in cells.
    pub world_width: f64,
    /// Arena height in world units.
    pub world_height: f64,
    /// Width of one spatial-index cell.
    pub cell_width: f64,
    /// Height of one spatial-index cell.
    pub cell_height: f64,
    pub sand_count: usize,
    pub internal_count: usize,
    pub external_count: usize,
    pub passive_count: usize,
    /// Ticks between diagnostic reports (the first report is at tick 0).
    pub report_interval: u64,
    pub field_shape: FieldShape,
    pub seek_strategy: SeekStrategy,
    /// Maximum number of sand grains one ant can carry.
    pub max_carry_capacity: usize,
    /// Max-speed reduction per carried grain.
    pub carry_speed_penalty: f64,
    /// Below this energy an ant drops everything it carries and cannot pick up.
    pub carry_low_energy_threshold: f64,
    /// Below this energy an ant no longer turns, seeks or changes speed voluntarily.
    pub move_low_energy_threshold: f64,
    pub energy_cost_move: f64,
    pub energy_cost_turn: f64,
    pub energy_cost_speed_change: f64,
    /// Charged once per carried grain every tick.
    pub energy_cost_drag: f64,
    pub energy_cost_collision: f64,
    /// Per-tick probability of a large random turn (only while not carrying).
    pub turn_probability: f64,
    /// Per-tick probability of a small heading jitter.
    pub jitter_probability: f64,
    /// Per-tick probability of a random speed change.
    pub speed_change_probability: f64,
    /// Half-range in degrees of the large random turn.
    pub random_turn_degrees: f64,
    /// Half-range in degrees of the heading jitter.
    pub jitter_degrees: f64,
    /// Scale applied to the combined random turn before it is applied.
    pub turn_scale: f64,
    /// Half-range in degrees of the turn after bumping into another ant.
    pub ant_collision_turn_degrees: f64,
    /// Half-range in degrees of the turn after bumping into sand (and after a failed pickup).
    pub sand_collision_turn_degrees: f64,
    /// Half-range in degrees of the turn after dropping the carried load.
    pub drop_turn_degrees: f64,
    /// Half-range in degrees of each probe turn of the accumulated seek strategy.
    pub seek_turn_degrees: f64,
    /// Half-range of the jitter applied to dragged grains around the head.
    pub drag_jitter: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            world_width: 660.0,
            world_height: 660.0,
            cell_width: 10.0,
            cell_height: 10.0,
            sand_count: 6000,
            internal_count: 30,
            external_count: 20,
            passive_count: 50,
            report_interval: 10_000,
            field_shape: FieldShape::Normal,
            seek_strategy: SeekStrategy::Threshold,
            max_carry_capacity: 5,
            carry_speed_penalty: 0.2,
            carry_low_energy_threshold: 0.1,
            move_low_energy_threshold: 0.01,
            energy_cost_move: 0.0005,
            energy_cost_turn: 0.001,
            energy_cost_speed_change: 0.002,
            energy_cost_drag: 0.09,
            energy_cost_collision: 0.05,
            turn_probability: 0.2,
            jitter_probability: 0.2,
            speed_change_probability: 0.2,
            random_turn_degrees: 140.0,
            jitter_degrees: 5.0,
            turn_scale: 0.1,
            ant_collision_turn_degrees: 15.0,
            sand_collision_turn_degrees: 5.0,
            drop_turn_degrees: 140.0,
            seek_turn_degrees: 10.0,
            drag_jitter: 0.5,
        }
    }
}

macro_rules! define_sim_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum SimConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for SimConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_sim_config_error! {
    InvalidWorldSize => "world_width and world_height must be positive and finite";
    WorldSizeTooLarge { max: f64, actual: f64 } => "world dimension ({actual}) exceeds supported maximum ({max})";
    InvalidCellSize => "cell_width and cell_height must be positive and finite";
    CellLargerThanWorld => "cell_width/cell_height must not exceed the world dimensions";
    TooManyCells { max: usize, actual: f64 } => "spatial grid would need {actual} cells (max {max})";
    EntityCountOverflow => "Total entity count overflow";
    TooManyEntities { max: usize, actual: usize } => "Too many entities: {} > max {}", actual, max;
    InvalidReportInterval => "report_interval must be greater than 0";
    InvalidCarryCapacity => "max_carry_capacity must be greater than 0";
    InvalidCarrySpeedPenalty => "carry_speed_penalty must be finite and non-negative";
    InvalidEnergyThresholds => "carry_low_energy_threshold and move_low_energy_threshold must be finite and non-negative";
    InvalidEnergyCost { name: &'static str } => "{name} must be finite and non-negative";
    InvalidProbability { name: &'static str } => "{name} must be finite and within [0,1]";
    InvalidAngle { name: &'static str } => "{name} must be finite and non-negative";
    InvalidTurnScale => "turn_scale must be finite and non-negative";
    InvalidDragJitter => "drag_jitter must be finite and non-negative";
}

impl std::error::Error for SimConfigError {}

impl SimConfig {
    pub const MAX_WORLD_SIZE: f64 = crate::constants::MAX_WORLD_SIZE;

    pub const MAX_TOTAL_ENTITIES: usize = crate::constants::MAX_TOTAL_ENTITIES;

    pub const MAX_GRID_CELLS: usize = crate::constants::MAX_GRID_CELLS;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        self.validate_arena()?;
        self.validate_population()?;
        self.validate_carrying()?;
        self.validate_energy_costs()?;
        self.validate_motion()?;
        Ok(())
    }

    /// Total number of agents across all kinds.
    pub fn agent_count(&self) -> usize {
        self.internal_count
            .saturating_add(self.external_count)
            .saturating_add(self.passive_count)
    }

    /// Arena centre, which anchors spawning, the default field and sector reports.
    pub fn center(&self) -> [f64; 2] {
        [self.world_width / 2.0, self.world_height / 2.0]
    }

    fn validate_arena(&self) -> Result<(), SimConfigError> {
        for dim in [self.world_width, self.world_height] {
            if !(dim.is_finite() && dim > 0.0) {
                return Err(SimConfigError::InvalidWorldSize);
            }
            if dim > Self::MAX_WORLD_SIZE {
                return Err(SimConfigError::WorldSizeTooLarge {
                    max: Self::MAX_WORLD_SIZE,
                    actual: dim,
                });
            }
        }
        if !(self.cell_width.is_finite()
            && self.cell_width > 0.0
            && self.cell_height.is_finite()
            && self.cell_height > 0.0)
        {
            return Err(SimConfigError::InvalidCellSize);
        }
        if self.cell_width > self.world_width || self.cell_height > self.world_height {
            return Err(SimConfigError::CellLargerThanWorld);
        }
        let cells = (self.world_width / self.cell_width).ceil()
            * (self.world_height / self.cell_height).ceil();
        if cells > Self::MAX_GRID_CELLS as f64 {
            return Err(SimConfigError::TooManyCells {
                max: Self::MAX_GRID_CELLS,
                actual: cells,
            });
        }
        if self.report_interval == 0 {
            return Err(SimConfigError::InvalidReportInterval);
        }
        Ok(())
    }

    fn validate_population(&self) -> Result<(), SimConfigError> {
        let total = self
            .sand_count
            .checked_add(self.internal_count)
            .and_then(|n| n.checked_add(self.external_count))
            .and_then(|n| n.checked_add(self.passive_count))
            .ok_or(SimConfigError::EntityCountOverflow)?;
        if total > Self::MAX_TOTAL_ENTITIES {
            return Err(SimConfigError::TooManyEntities {
                max: Self::MAX_TOTAL_ENTITIES,
                actual: total,
            });
        }
        Ok(())
    }

    fn validate_carrying(&self) -> Result<(), SimConfigError> {
        if self.max_carry_capacity == 0 {
            return Err(SimConfigError::InvalidCarryCapacity);
        }
        if !(self.carry_speed_penalty.is_finite() && self.carry_speed_penalty >= 0.0) {
            return Err(SimConfigError::InvalidCarrySpeedPenalty);
        }
        if !(self.carry_low_energy_threshold.is_finite()
            && self.carry_low_energy_threshold >= 0.0
            && self.move_low_energy_threshold.is_finite()
            && self.move_low_energy_threshold >= 0.0)
        {
            return Err(SimConfigError::InvalidEnergyThresholds);
        }
        Ok(())
    }

    fn validate_energy_costs(&self) -> Result<(), SimConfigError> {
        let costs = [
            ("energy_cost_move", self.energy_cost_move),
            ("energy_cost_turn", self.energy_cost_turn),
            ("energy_cost_speed_change", self.energy_cost_speed_change),
            ("energy_cost_drag", self.energy_cost_drag),
            ("energy_cost_collision", self.energy_cost_collision),
        ];
        for (name, cost) in costs {
            if !(cost.is_finite() && cost >= 0.0) {
                return Err(SimConfigError::InvalidEnergyCost { name });
            }
        }
        Ok(())
    }

    fn validate_motion(&self) -> Result<(), SimConfigError> {
        let probabilities = [
            ("turn_probability", self.turn_probability),
            ("jitter_probability", self.jitter_probability),
            ("speed_change_probability", self.speed_change_probability),
        ];
        for (name, p) in probabilities {
            if !(p.is_finite() && (0.0..=1.0).contains(&p)) {
                return Err(SimConfigError::InvalidProbability { name });
            }
        }
        let angles = [
            ("random_turn_degrees", self.random_turn_degrees),
            ("jitter_degrees", self.jitter_degrees),
            ("ant_collision_turn_degrees", self.ant_collision_turn_degrees),
            ("sand_collision_turn_degrees", self.sand_collision_turn_degrees),
            ("drop_turn_degrees", self.drop_turn_degrees),
            ("seek_turn_degrees", self.seek_turn_degrees),
        ];
        for (name, degrees) in angles {
            if !(degrees.is_finite() && degrees >= 0.0) {
                return Err(SimConfigError::InvalidAngle { name });
            }
        }
        if !(self.turn_scale.is_finite() && self.turn_scale >= 0.0) {
            return Err(SimConfigError::InvalidTurnScale);
        }
        if !(self.drag_jitter.is_finite() && self.drag_jitter >= 0.0) {
            return Err(SimConfigError::InvalidDragJitter);
        }
        Ok(())
    }
}
