use crate::agent::AgentKind;
use crate::constants::{AGENT_LENGTH, AGENT_WIDTH, SAND_SIZE};
use crate::geometry;
use serde::{Deserialize, Serialize};

/// Handle stored in spatial-index buckets: the variant plus a dense index into the
/// world's storage for that variant. Buckets never own entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityHandle {
    Sand(u32),
    Marker(u32),
    Agent(u32),
}

impl EntityHandle {
    /// Index into the per-variant storage.
    pub fn index(self) -> usize {
        match self {
            EntityHandle::Sand(i) | EntityHandle::Marker(i) | EntityHandle::Agent(i) => i as usize,
        }
    }
}

/// Capability shared by everything that can sit in the spatial index.
pub trait Located {
    fn id(&self) -> u32;
    fn position(&self) -> [f64; 2];
    /// Point used for bucketing and collision probes.
    fn head_position(&self) -> [f64; 2];
    fn distance_to_point(&self, point: [f64; 2]) -> f64;
    /// Bucket recorded at the last insertion, `None` if never indexed.
    fn cell(&self) -> Option<usize>;
    fn set_cell(&mut self, cell: Option<usize>);
}

/// A passive grain. Only moves while being dragged by an ant.
#[derive(Clone, Debug, PartialEq)]
pub struct Sand {
    pub id: u32,
    pub position: [f64; 2],
    cell: Option<usize>,
}

impl Sand {
    pub fn new(id: u32, position: [f64; 2]) -> Self {
        Self {
            id,
            position,
            cell: None,
        }
    }

    /// Geometric centre of the grain.
    pub fn center(&self) -> [f64; 2] {
        [
            self.position[0] + SAND_SIZE / 2.0,
            self.position[1] + SAND_SIZE / 2.0,
        ]
    }
}

impl Located for Sand {
    fn id(&self) -> u32 {
        self.id
    }

    fn position(&self) -> [f64; 2] {
        self.position
    }

    // Grains are bucketed by the same offset an ant body uses, not by their centre.
    fn head_position(&self) -> [f64; 2] {
        [self.position[0] + AGENT_LENGTH, self.position[1] + AGENT_WIDTH]
    }

    fn distance_to_point(&self, point: [f64; 2]) -> f64 {
        geometry::distance(self.center(), point)
    }

    fn cell(&self) -> Option<usize> {
        self.cell
    }

    fn set_cell(&mut self, cell: Option<usize>) {
        self.cell = cell;
    }
}

/// Static pheromone marker. Indexable and collidable; the default world places none.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub id: u32,
    pub position: [f64; 2],
    pub strength: f64,
    cell: Option<usize>,
}

impl Marker {
    pub fn new(id: u32, position: [f64; 2], strength: f64) -> Self {
        Self {
            id,
            position,
            strength,
            cell: None,
        }
    }
}

impl Located for Marker {
    fn id(&self) -> u32 {
        self.id
    }

    fn position(&self) -> [f64; 2] {
        self.position
    }

    fn head_position(&self) -> [f64; 2] {
        self.position
    }

    fn distance_to_point(&self, point: [f64; 2]) -> f64 {
        geometry::distance(self.position, point)
    }

    fn cell(&self) -> Option<usize> {
        self.cell
    }

    fn set_cell(&mut self, cell: Option<usize>) {
        self.cell = cell;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityVariant {
    Sand,
    Pheromone,
    Ant(AgentKind),
}

/// Read-only snapshot of one entity for drawing layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub variant: EntityVariant,
    pub position: [f64; 2],
    /// Heading in `(-π, π]`; zero for entities without orientation.
    pub heading: f64,
}
