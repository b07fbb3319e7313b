use anyhow::{Context, Result};
use antfarm_core::{SimConfig, World};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const WARMUP_STEPS: usize = 10;
const BENCHMARK_STEPS: usize = 200;
const TARGET_SPS: f64 = 25.0;

#[derive(Parser)]
#[command(name = "antfarm")]
#[command(about = "Ant, sand and pheromone colony simulation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for results (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of simulation ticks to run
        #[arg(long, default_value_t = 10000)]
        steps: usize,

        /// Record step metrics every N ticks
        #[arg(long, default_value_t = 100)]
        sample_every: usize,
    },
    /// Time the tick loop at several colony sizes
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_benchmark(sand_count: usize, ants_per_kind: usize) -> Result<()> {
    let config = SimConfig {
        sand_count,
        internal_count: ants_per_kind,
        external_count: ants_per_kind,
        passive_count: ants_per_kind,
        // Keep diagnostics out of the measured window.
        report_interval: u64::MAX,
        ..SimConfig::default()
    };
    let mut world = World::new(config).context("benchmark world failed to initialize")?;

    for _ in 0..WARMUP_STEPS {
        world.step().context("warmup step failed")?;
    }

    let mut total_agents = 0u64;
    let mut total_diagnostics = 0u64;
    let mut total_time = 0u64;
    for _ in 0..BENCHMARK_STEPS {
        world.step().context("benchmark step failed")?;
        let timings = world.last_timings();
        total_agents += timings.agent_update_us;
        total_diagnostics += timings.diagnostics_us;
        total_time += timings.total_us;
    }

    let avg_step_us = (total_time as f64 / BENCHMARK_STEPS as f64).max(1.0);
    let steps_per_sec = 1_000_000.0 / avg_step_us;

    println!(
        "--- {sand_count} sand, {} ants ({ants_per_kind} per kind) ---",
        ants_per_kind * 3
    );
    println!("  Avg tick:      {avg_step_us:.0} us ({steps_per_sec:.1} ticks/sec)");
    println!(
        "  Breakdown:     agents={:.0} us, diagnostics={:.0} us",
        total_agents as f64 / BENCHMARK_STEPS as f64,
        total_diagnostics as f64 / BENCHMARK_STEPS as f64,
    );
    let verdict = if steps_per_sec >= TARGET_SPS {
        "GO"
    } else {
        "NO-GO"
    };
    println!("  Verdict:       {verdict} (target: >={TARGET_SPS} ticks/sec)");

    let report = world.sector_report();
    println!(
        "  Indexed sand:  {} (distance mean {:.1})",
        report.sand_count, report.distance_mean
    );
    println!();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p antfarm-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== Antfarm tick benchmark ===");
            println!("Warmup: {WARMUP_STEPS} ticks, Benchmark: {BENCHMARK_STEPS} ticks");
            println!();

            let sizes = [
                (1_000, 10),
                (6_000, 33), // default colony
                (20_000, 100),
                (60_000, 300),
            ];
            for (sand, ants) in sizes {
                run_benchmark(sand, ants)?;
            }
        }
        Commands::Run {
            config,
            out,
            steps,
            sample_every,
        } => {
            let file = File::open(&config).context("failed to open config file")?;
            let reader = BufReader::new(file);
            let sim_config: SimConfig =
                serde_json::from_reader(reader).context("failed to parse config")?;

            info!(path = %config.display(), steps, "loaded config");
            let mut world = World::new(sim_config).context("failed to initialize world")?;
            let summary = world
                .run_experiment(steps, sample_every)
                .context("simulation run failed")?;

            if let Some(out_dir) = out {
                std::fs::create_dir_all(&out_dir).context("failed to create output directory")?;
                let summary_path = out_dir.join("summary.json");
                let file = File::create(summary_path).context("failed to create summary file")?;
                serde_json::to_writer_pretty(file, &summary).context("failed to write summary")?;
                println!("Run complete. Results saved to {}", out_dir.display());
            } else {
                let report = &summary.final_report;
                println!(
                    "Run complete. Indexed sand: {}, distance mean {:.2} (std {:.2}), stale removals: {}",
                    report.sand_count,
                    report.distance_mean,
                    report.distance_std,
                    world.stale_removals()
                );
            }
        }
    }
    Ok(())
}
