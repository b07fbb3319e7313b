pub mod agent;
pub mod config;
pub mod constants;
pub mod entity;
pub mod field;
pub mod geometry;
pub mod metrics;
pub mod rng;
pub mod spatial;
pub mod world;

pub use agent::{Agent, AgentKind};
pub use config::{FieldShape, SeekStrategy, SimConfig, SimConfigError};
pub use constants::{MAX_GRID_CELLS, MAX_WORLD_SIZE};
pub use entity::{EntityHandle, EntityVariant, EntityView, Located, Marker, Sand};
pub use field::ScalarField;
pub use metrics::{RunSummary, SectorReport, SectorStats, StepMetrics};
pub use spatial::{RemoveOutcome, SpatialError, SpatialIndex};
pub use world::{ExperimentError, StepTimings, World, WorldError};
