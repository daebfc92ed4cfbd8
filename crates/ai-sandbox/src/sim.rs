use std::fmt;
use std::time::Duration;

use ai_core::TickContext;

use crate::scenario::Scenario;
use crate::world::SandboxWorld;

/// Overrides applied on top of the scenario's simulation parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimOptions {
    pub dt: Option<f32>,
    pub seed: Option<u64>,
    /// Per-controller trace log capacity; `None` disables tracing.
    pub trace_capacity: Option<usize>,
}

/// A populated world plus the clock that drives it.
pub struct Simulation {
    world: SandboxWorld,
    ctx: TickContext,
}

impl Simulation {
    pub fn new(scenario: &Scenario, options: SimOptions) -> Self {
        let dt = options.dt.unwrap_or(scenario.dt);
        let seed = options.seed.unwrap_or(scenario.seed);
        Self {
            world: SandboxWorld::populate(scenario, options.trace_capacity),
            ctx: TickContext::new(0, dt, seed),
        }
    }

    pub fn world(&self) -> &SandboxWorld {
        &self.world
    }

    /// Context of the next tick to run.
    pub fn ctx(&self) -> &TickContext {
        &self.ctx
    }

    pub fn step(&mut self) {
        self.world.tick(&self.ctx);
        self.ctx = self.ctx.next();
    }

    pub fn run(&mut self, ticks: u64) -> Summary {
        for _ in 0..ticks {
            self.step();
        }
        self.summary()
    }

    /// One line per controller, in ascending actor id.
    pub fn hud_lines(&self) -> Vec<String> {
        self.world
            .controllers
            .values()
            .map(|c| c.hud_line())
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let stats = self.world.stats;
        Summary {
            ticks: self.ctx.tick,
            elapsed: self.ctx.elapsed,
            actors: self.world.bodies.len(),
            alive: self.world.alive_count(),
            shots: stats.shots,
            hits: stats.hits,
            kills: stats.kills,
            spawned: stats.spawned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub ticks: u64,
    pub elapsed: Duration,
    pub actors: usize,
    pub alive: usize,
    pub shots: u64,
    pub hits: u64,
    pub kills: u64,
    /// Actors created by squad spawning.
    pub spawned: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticks={} elapsed={:.1}s actors={} alive={} shots={} hits={} kills={} spawned={}",
            self.ticks,
            self.elapsed.as_secs_f32(),
            self.actors,
            self.alive,
            self.shots,
            self.hits,
            self.kills,
            self.spawned
        )
    }
}
