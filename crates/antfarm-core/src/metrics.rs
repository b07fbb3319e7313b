use crate::agent::{Agent, AgentKind};
use serde::{Deserialize, Serialize};

/// Distance statistics for one angular sector around the report centre.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SectorStats {
    pub sector: usize,
    pub count: usize,
    pub distance_mean: f64,
    pub distance_std: f64,
}

/// How indexed (not carried) sand is spread around a centre point.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SectorReport {
    pub tick: u64,
    pub center: [f64; 2],
    pub sand_count: usize,
    pub sectors: Vec<SectorStats>,
    pub distance_mean: f64,
    pub distance_std: f64,
    /// Mean and population std of the per-sector counts.
    pub count_mean: f64,
    pub count_std: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StepMetrics {
    pub tick: u64,
    /// Handles in the spatial index.
    pub indexed_count: usize,
    /// Sand currently held by ants.
    pub carried_count: usize,
    pub internal_energy_mean: f64,
    pub external_energy_mean: f64,
    pub passive_energy_mean: f64,
    pub max_speed_mean: f64,
    /// Cumulative count of removals that missed their cached cell.
    pub stale_removals: usize,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    pub samples: Vec<StepMetrics>,
    pub final_report: SectorReport,
}

fn kind_energy_mean(agents: &[Agent], kind: AgentKind) -> f64 {
    let (sum, n) = agents
        .iter()
        .filter(|a| a.kind == kind)
        .fold((0.0, 0usize), |(sum, n), a| (sum + a.energy(), n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

pub fn collect_step_metrics(
    tick: u64,
    indexed_count: usize,
    stale_removals: usize,
    agents: &[Agent],
) -> StepMetrics {
    let carried_count = agents.iter().map(|a| a.carried().len()).sum();
    let max_speed_mean = if agents.is_empty() {
        0.0
    } else {
        agents.iter().map(Agent::max_speed).sum::<f64>() / agents.len() as f64
    };

    StepMetrics {
        tick,
        indexed_count,
        carried_count,
        internal_energy_mean: kind_energy_mean(agents, AgentKind::Internal),
        external_energy_mean: kind_energy_mean(agents, AgentKind::External),
        passive_energy_mean: kind_energy_mean(agents, AgentKind::Passive),
        max_speed_mean,
        stale_removals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_means_are_per_kind() {
        let mut agents = vec![
            Agent::new(1, AgentKind::Internal, [0.0, 0.0], 0.0),
            Agent::new(2, AgentKind::Internal, [0.0, 0.0], 0.0),
            Agent::new(3, AgentKind::Passive, [0.0, 0.0], 0.0),
        ];
        agents[1].set_energy(0.1);
        agents[1].carried.push(4);

        let m = collect_step_metrics(12, 40, 0, &agents);
        assert_eq!(m.tick, 12);
        assert_eq!(m.indexed_count, 40);
        assert_eq!(m.carried_count, 1);
        assert!((m.internal_energy_mean - 0.3).abs() < 1e-12);
        assert_eq!(m.external_energy_mean, 0.0);
        assert!((m.passive_energy_mean - 0.3).abs() < 1e-12);
        assert_eq!(m.max_speed_mean, 2.0);
    }

    #[test]
    fn no_agents_yields_zeroed_metrics() {
        let m = collect_step_metrics(0, 0, 3, &[]);
        assert_eq!(m.carried_count, 0);
        assert_eq!(m.max_speed_mean, 0.0);
        assert_eq!(m.stale_removals, 3);
    }
}
