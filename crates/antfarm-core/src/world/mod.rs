use crate::agent::{Agent, AgentKind};
use crate::config::{FieldShape, SimConfig, SimConfigError};
use crate::constants::FIRST_ENTITY_ID;
use crate::entity::{EntityHandle, EntityVariant, EntityView, Marker, Sand};
use crate::field::ScalarField;
use crate::geometry;
use crate::metrics::{collect_step_metrics, RunSummary, SectorReport};
use crate::rng::create_rng;
use crate::spatial::{SpatialError, SpatialIndex};
use rand_chacha::ChaCha12Rng;
use std::time::Instant;
use thiserror::Error;

use phases::AgentStep;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepTimings {
    pub agent_update_us: u64,
    pub diagnostics_us: u64,
    pub total_us: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    #[error("entity id space exhausted")]
    IdExhausted,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExperimentError {
    #[error("sample_every must be positive")]
    InvalidSampleEvery,
    #[error("steps ({actual}) exceed supported maximum ({max})")]
    TooManySteps { max: usize, actual: usize },
    #[error("sample count ({actual}) exceeds supported maximum ({max})")]
    TooManySamples { max: usize, actual: usize },
    #[error("simulation failed: {0}")]
    World(#[from] WorldError),
}

/// The whole colony: storage for every entity, the spatial index over them and the
/// pheromone field they navigate by.
pub struct World {
    sands: Vec<Sand>,
    markers: Vec<Marker>,
    agents: Vec<Agent>,
    index: SpatialIndex,
    field: ScalarField,
    config: SimConfig,
    rng: ChaCha12Rng,
    tick: u64,
    next_id: u32,
    stale_removals: usize,
    latest_report: Option<SectorReport>,
    last_timings: StepTimings,
}

impl World {
    pub const MAX_EXPERIMENT_STEPS: usize = 10_000_000;
    pub const MAX_EXPERIMENT_SAMPLES: usize = 50_000;

    /// Seed sand and ants, index all of them and build the pheromone field.
    pub fn new(config: SimConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let mut rng = create_rng(config.seed);
        let mut index = SpatialIndex::new(
            config.cell_width,
            config.cell_height,
            config.world_width,
            config.world_height,
        )?;
        let mut next_id = FIRST_ENTITY_ID;

        let mut sands = Vec::with_capacity(config.sand_count);
        for _ in 0..config.sand_count {
            let x = geometry::rand_range(&mut rng, 0.0, config.world_width);
            let y = geometry::rand_range(&mut rng, 0.0, config.world_height);
            sands.push(Sand::new(Self::take_id(&mut next_id)?, [x, y]));
        }

        let center = config.center();
        let populations = [
            (AgentKind::Internal, config.internal_count),
            (AgentKind::External, config.external_count),
            (AgentKind::Passive, config.passive_count),
        ];
        let mut agents = Vec::with_capacity(config.agent_count());
        for (kind, count) in populations {
            for _ in 0..count {
                let id = Self::take_id(&mut next_id)?;
                agents.push(Agent::spawn(id, kind, center, &mut rng));
            }
        }

        for (i, sand) in sands.iter_mut().enumerate() {
            index.insert(EntityHandle::Sand(i as u32), sand)?;
        }
        for (i, agent) in agents.iter_mut().enumerate() {
            index.insert(EntityHandle::Agent(i as u32), agent)?;
        }

        let field = build_pheromone_field(&config);
        tracing::debug!(
            sand = sands.len(),
            agents = agents.len(),
            audit = index.audit(),
            shape = ?config.field_shape,
            peak = field.peak(),
            "world constructed"
        );

        Ok(Self {
            sands,
            markers: Vec::new(),
            agents,
            index,
            field,
            config,
            rng,
            tick: 0,
            next_id,
            stale_removals: 0,
            latest_report: None,
            last_timings: StepTimings::default(),
        })
    }

    /// Default population on an arena of the given size.
    pub fn with_arena(width: f64, height: f64) -> Result<Self, WorldError> {
        Self::new(SimConfig {
            world_width: width,
            world_height: height,
            ..SimConfig::default()
        })
    }

    fn take_id(next_id: &mut u32) -> Result<u32, WorldError> {
        let id = *next_id;
        *next_id = id.checked_add(1).ok_or(WorldError::IdExhausted)?;
        Ok(id)
    }

    /// Place a static pheromone marker and index it. Returns its id.
    pub fn add_marker(&mut self, position: [f64; 2], strength: f64) -> Result<u32, WorldError> {
        let id = Self::take_id(&mut self.next_id)?;
        let slot = self.markers.len() as u32;
        let mut marker = Marker::new(id, position, strength);
        self.index.insert(EntityHandle::Marker(slot), &mut marker)?;
        self.markers.push(marker);
        Ok(id)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn sands(&self) -> &[Sand] {
        &self.sands
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Handles currently held by the spatial index.
    pub fn audit(&self) -> usize {
        self.index.audit()
    }

    /// Removals that missed their cached cell since construction.
    pub fn stale_removals(&self) -> usize {
        self.stale_removals
    }

    pub fn latest_report(&self) -> Option<&SectorReport> {
        self.latest_report.as_ref()
    }

    pub fn last_timings(&self) -> &StepTimings {
        &self.last_timings
    }

    /// Sector report of indexed sand around the arena centre, stamped with the current tick.
    pub fn sector_report(&self) -> SectorReport {
        let mut report = self.index.sector_report(self.config.center(), |handle| match handle {
            EntityHandle::Sand(i) => self.sands.get(i as usize).map(|s| s.position),
            EntityHandle::Marker(_) | EntityHandle::Agent(_) => None,
        });
        report.tick = self.tick;
        report
    }

    /// Snapshot of every entity in storage order: sand, markers, then ants.
    pub fn entities(&self) -> Vec<EntityView> {
        let sands = self.sands.iter().map(|s| EntityView {
            id: s.id,
            variant: EntityVariant::Sand,
            position: s.position,
            heading: 0.0,
        });
        let markers = self.markers.iter().map(|m| EntityView {
            id: m.id,
            variant: EntityVariant::Pheromone,
            position: m.position,
            heading: 0.0,
        });
        let agents = self.agents.iter().map(|a| EntityView {
            id: a.id,
            variant: EntityVariant::Ant(a.kind),
            position: a.position,
            heading: geometry::wrap_signed_angle(a.heading),
        });
        sands.chain(markers).chain(agents).collect()
    }

    /// Split borrows so one agent can be updated against the rest of the world.
    fn agent_step(&mut self, slot: usize) -> Option<AgentStep<'_>> {
        let (peers_before, rest) = self.agents.split_at_mut(slot);
        let (agent, peers_after) = rest.split_first_mut()?;
        Some(AgentStep {
            agent,
            handle: EntityHandle::Agent(slot as u32),
            slot,
            peers_before,
            peers_after,
            sands: &mut self.sands,
            markers: &self.markers,
            index: &mut self.index,
            field: &self.field,
            rng: &mut self.rng,
            config: &self.config,
            stale_removals: &mut self.stale_removals,
        })
    }

    /// Advance one tick. Agents update in storage order, each seeing the effects of
    /// the ones before it. Only fatal index errors are returned.
    pub fn step(&mut self) -> Result<(), WorldError> {
        let total_start = Instant::now();

        let t0 = Instant::now();
        for slot in 0..self.agents.len() {
            if let Some(mut step) = self.agent_step(slot) {
                step.run()?;
            }
        }
        let agent_update_us = t0.elapsed().as_micros() as u64;

        let t1 = Instant::now();
        if self.tick.is_multiple_of(self.config.report_interval) {
            self.emit_report();
        }
        let diagnostics_us = t1.elapsed().as_micros() as u64;

        self.tick += 1;
        self.last_timings = StepTimings {
            agent_update_us,
            diagnostics_us,
            total_us: total_start.elapsed().as_micros() as u64,
        };
        Ok(())
    }

    fn emit_report(&mut self) {
        let audit = self.index.audit();
        let report = self.sector_report();
        tracing::info!(
            tick = report.tick,
            audit,
            sand = report.sand_count,
            distance_mean = report.distance_mean,
            distance_std = report.distance_std,
            count_mean = report.count_mean,
            count_std = report.count_std,
            stale_removals = self.stale_removals,
            "sector report"
        );
        for s in &report.sectors {
            tracing::debug!(
                tick = report.tick,
                sector = s.sector,
                count = s.count,
                distance_mean = s.distance_mean,
                distance_std = s.distance_std,
                "sector"
            );
        }
        self.latest_report = Some(report);
    }

    /// Run `steps` ticks, sampling metrics every `sample_every` ticks and after the last one.
    pub fn run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if steps > Self::MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_EXPERIMENT_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_EXPERIMENT_SAMPLES,
                actual: estimated_samples,
            });
        }

        let mut samples = Vec::with_capacity(estimated_samples);
        for step in 1..=steps {
            self.step()?;
            if step % sample_every == 0 || step == steps {
                samples.push(collect_step_metrics(
                    self.tick,
                    self.index.audit(),
                    self.stale_removals,
                    &self.agents,
                ));
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            samples,
            final_report: self.sector_report(),
        })
    }
}

/// Sum of unit-peak Gaussian bumps for the configured shape, sampled at every integer cell.
fn build_pheromone_field(config: &SimConfig) -> ScalarField {
    let width = config.world_width.ceil() as usize;
    let height = config.world_height.ceil() as usize;
    let [cx, cy] = config.center();
    // (anchor, weight) pairs and the shared dispersion.
    let (anchors, spread): (Vec<([f64; 2], f64)>, f64) = match config.field_shape {
        FieldShape::Normal => (vec![([cx, cy], 1.0)], 100.0),
        FieldShape::Square => (
            vec![
                ([cx - 75.0, cy - 75.0], 1.0),
                ([cx + 75.0, cy - 75.0], 1.0),
                ([cx - 75.0, cy + 75.0], 1.0),
                ([cx + 75.0, cy + 75.0], 1.0),
            ],
            75.0,
        ),
        FieldShape::Oval => (
            vec![([cx - 75.0, cy], 1.0), ([cx + 75.0, cy], 1.0)],
            75.0,
        ),
        FieldShape::Heart => (
            vec![
                ([cx - 75.0, cy - 45.0], 1.0),
                ([cx + 75.0, cy - 45.0], 1.0),
                ([cx, cy + 45.0], 1.0 / 3.0),
            ],
            50.0,
        ),
    };

    let mut field = ScalarField::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let point = [x as f64, y as f64];
            let value: f64 = anchors
                .iter()
                .map(|&(anchor, weight)| {
                    weight * geometry::gaussian(geometry::distance(point, anchor), 0.0, spread)
                })
                .sum();
            field.set(point[0], point[1], value);
        }
    }
    field
}

mod phases;
