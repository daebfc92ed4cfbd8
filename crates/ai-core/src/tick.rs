use std::time::Duration;

use crate::{rng, AgentId, SplitMix64};

/// Per-tick inputs shared by every controller stepped during that tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    /// Simulation clock at the start of this tick. All deadlines are measured against it.
    pub elapsed: Duration,
    pub seed: u64,
    /// Host-level AI gate. Controllers do nothing while this is false.
    pub simulation_enabled: bool,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32, seed: u64) -> Self {
        Self {
            tick,
            dt_seconds,
            elapsed: Duration::from_secs_f64(tick as f64 * dt_seconds.max(0.0) as f64),
            seed,
            simulation_enabled: true,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_simulation_enabled(mut self, enabled: bool) -> Self {
        self.simulation_enabled = enabled;
        self
    }

    /// Context for the following tick, advancing the clock by `dt_seconds`.
    pub fn next(&self) -> Self {
        Self {
            tick: self.tick + 1,
            elapsed: self.elapsed + Duration::from_secs_f32(self.dt_seconds.max(0.0)),
            ..*self
        }
    }

    pub fn rng_for_agent<A: AgentId>(&self, agent: A, stream: u64) -> SplitMix64 {
        let seed = rng::derive_seed(self.seed ^ self.tick, agent.stable_id(), stream);
        SplitMix64::new(seed)
    }

    /// Time elapsed since `since`, saturating at zero for timestamps in the future.
    pub fn since(&self, since: Duration) -> Duration {
        self.elapsed.saturating_sub(since)
    }
}
