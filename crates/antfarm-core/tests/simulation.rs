use antfarm_core::{
    EntityHandle, EntityVariant, FieldShape, Located, RunSummary, Sand, SeekStrategy, SimConfig,
    SpatialIndex, World,
};

fn config(seed: u64) -> SimConfig {
    SimConfig {
        seed,
        world_width: 240.0,
        world_height: 240.0,
        sand_count: 800,
        internal_count: 10,
        external_count: 6,
        passive_count: 12,
        report_interval: 100,
        ..SimConfig::default()
    }
}

#[test]
fn long_run_keeps_every_grain_accounted_for() {
    let mut world = World::new(config(1234)).unwrap();
    let total = world.sands().len() + world.agents().len();
    for _ in 0..1_000 {
        world.step().unwrap();
    }
    let carried: usize = world.agents().iter().map(|a| a.carried().len()).sum();
    assert_eq!(world.audit() + carried, total);
    assert_eq!(world.stale_removals(), 0);
    assert_eq!(world.latest_report().unwrap().tick, 900);
}

#[test]
fn every_strategy_and_shape_runs() {
    let shapes = [
        FieldShape::Normal,
        FieldShape::Square,
        FieldShape::Oval,
        FieldShape::Heart,
    ];
    for shape in shapes {
        for strategy in [SeekStrategy::Threshold, SeekStrategy::Accumulated] {
            let mut world = World::new(SimConfig {
                field_shape: shape,
                seek_strategy: strategy,
                ..config(5)
            })
            .unwrap();
            let summary = world.run_experiment(150, 50).unwrap();
            assert_eq!(summary.samples.len(), 3);
            for agent in world.agents() {
                assert!(agent.energy() > 0.0 && agent.energy() <= agent.max_energy());
                assert!(agent.carried().len() <= 5);
            }
        }
    }
}

#[test]
fn run_summary_serializes_to_json() {
    let mut world = World::new(config(77)).unwrap();
    let summary = world.run_experiment(40, 20).unwrap();
    let json = serde_json::to_string(&summary).unwrap();
    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back.steps, 40);
    let ticks: Vec<u64> = back.samples.iter().map(|s| s.tick).collect();
    assert_eq!(ticks, vec![20, 40]);
    assert_eq!(back.samples[1].indexed_count, summary.samples[1].indexed_count);
    assert_eq!(back.final_report.sectors.len(), 8);
}

#[test]
fn config_json_round_trip_builds_identical_worlds() {
    let original = config(9);
    let json = serde_json::to_string_pretty(&original).unwrap();
    let parsed: SimConfig = serde_json::from_str(&json).unwrap();

    let mut a = World::new(original).unwrap();
    let mut b = World::new(parsed).unwrap();
    for _ in 0..30 {
        a.step().unwrap();
        b.step().unwrap();
    }
    assert_eq!(a.entities(), b.entities());
}

#[test]
fn snapshot_exposes_ant_kinds() {
    let world = World::new(config(3)).unwrap();
    let ants = world
        .entities()
        .into_iter()
        .filter(|v| matches!(v.variant, EntityVariant::Ant(_)))
        .count();
    assert_eq!(ants, 28);
}

#[test]
fn grain_at_report_centre_lands_in_first_sector() {
    let mut index = SpatialIndex::new(10.0, 10.0, 660.0, 660.0).unwrap();
    let mut sand = Sand::new(1000, [330.0, 330.0]);
    index.insert(EntityHandle::Sand(0), &mut sand).unwrap();
    assert!(sand.cell().is_some());

    let report = index.sector_report([330.0, 330.0], |handle| match handle {
        EntityHandle::Sand(0) => Some(sand.position),
        _ => None,
    });
    assert_eq!(report.sectors[0].count, 1);
    assert_eq!(report.sectors[0].distance_mean, 0.0);
    assert_eq!(report.distance_std, 0.0);
}
