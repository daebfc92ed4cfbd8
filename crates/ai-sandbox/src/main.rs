//! ai-sandbox - run actor scenarios headlessly.
//!
//! - `ai-sandbox run <scenario>` - simulate and print a summary
//! - `ai-sandbox check <scenario>` - load and validate only

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use ai_sandbox::{Scenario, SimOptions, Simulation};

#[derive(Parser)]
#[command(name = "ai-sandbox")]
#[command(about = "Headless host for autonomous-actor scenarios", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario
    Run {
        /// Scenario file (YAML)
        scenario: PathBuf,

        /// Ticks to simulate (defaults to the scenario's)
        #[arg(long)]
        ticks: Option<u64>,

        /// Seconds per tick
        #[arg(long)]
        dt: Option<f32>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print every controller's HUD line every N ticks
        #[arg(long)]
        hud_every: Option<u64>,

        /// Keep the last N trace events per controller and print them at the end
        #[arg(long)]
        trace: Option<usize>,
    },

    /// Load and validate a scenario without running it
    Check {
        /// Scenario file (YAML)
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            dt,
            seed,
            hud_every,
            trace,
        } => {
            let options = SimOptions {
                dt,
                seed,
                trace_capacity: trace,
            };
            run_scenario(&scenario, ticks, hud_every, options)
        }
        Commands::Check { scenario } => check_scenario(&scenario),
    }
}

fn load(path: &Path) -> Result<Scenario> {
    Scenario::load(path).with_context(|| format!("Failed to load scenario {}", path.display()))
}

fn run_scenario(
    path: &Path,
    ticks: Option<u64>,
    hud_every: Option<u64>,
    options: SimOptions,
) -> Result<()> {
    let scenario = load(path)?;
    let ticks = ticks.unwrap_or(scenario.ticks);
    tracing::info!(scenario = %scenario.name, ticks, "Starting simulation");

    let mut sim = Simulation::new(&scenario, options);
    for _ in 0..ticks {
        sim.step();
        let tick = sim.ctx().tick;
        if hud_every.is_some_and(|n| n > 0 && tick % n == 0) {
            println!("-- tick {tick}");
            for line in sim.hud_lines() {
                println!("  {line}");
            }
        }
    }

    if options.trace_capacity.is_some() {
        println!("Trace:");
        for controller in sim.world().controllers.values() {
            for event in controller.trace().into_iter().flat_map(|log| &log.events) {
                println!("  {event}");
            }
        }
        for event in &sim.world().events.events {
            println!("  {event}");
        }
    }

    let summary = sim.summary();
    tracing::info!(%summary, "Simulation finished");
    println!("{summary}");
    Ok(())
}

fn check_scenario(path: &Path) -> Result<()> {
    let scenario = load(path)?;
    println!("Scenario {} is valid", scenario.name);
    println!("  classes:   {}", scenario.classes.len());
    println!("  behaviors: {}", scenario.behaviors.len());
    println!("  squads:    {}", scenario.squads.len());
    println!("  actors:    {}", scenario.actors.len());
    let (_, extent) = scenario.field.bounds();
    println!(
        "  map:       {}x{} tiles of {} ({}x{})",
        scenario.field.width(),
        scenario.field.height(),
        ai_nav::FlowSource::tile_size(&scenario.field),
        extent.x,
        extent.y
    );
    Ok(())
}
