/// Largest valid arena dimension (world units). Bounds the pheromone grid and bucket count.
pub const MAX_WORLD_SIZE: f64 = 2048.0;

/// Upper bound on sand + ant population accepted by config validation.
pub const MAX_TOTAL_ENTITIES: usize = 1_000_000;

/// Upper bound on spatial-index buckets (`rows * cols`).
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Identity handed to the first seeded entity; later entities count up from here.
pub const FIRST_ENTITY_ID: u32 = 1000;

/// Ant body length along its heading. Sand head positions are offset by the same amount.
pub const AGENT_LENGTH: f64 = 10.0;
/// Ant body width.
pub const AGENT_WIDTH: f64 = 2.0;
/// Edge length of a sand grain.
pub const SAND_SIZE: f64 = 2.0;

/// Contact distance for collision detection (strict `<`).
pub const COLLISION_DISTANCE: f64 = 1.5;

/// Number of angular sectors in a sector report.
pub const SECTOR_COUNT: usize = 8;

/// Hard energy floor; energy is clamped to stay at or above this value.
pub const ENERGY_FLOOR: f64 = 0.0001;
/// Slowest speed the speed setter will accept.
pub const MIN_SPEED: f64 = 0.001;
/// Clamp range for an ant's load-dependent speed ceiling.
pub const MAX_SPEED_FLOOR: f64 = 0.1;
pub const MAX_SPEED_CEILING: f64 = 2.0;

/// Clamp range for the accumulated pheromone satisfaction level.
pub const ACCUMULATED_LEVEL_MIN: f64 = 1.0;
pub const ACCUMULATED_LEVEL_MAX: f64 = 100.0;
/// Re-sampling attempts per tick for the accumulation seek strategy.
pub const ACCUMULATED_SEEK_ATTEMPTS: usize = 5;
