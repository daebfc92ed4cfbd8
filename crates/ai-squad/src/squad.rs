use std::sync::Arc;
use std::time::Duration;

use ai_core::rng::streams;
use ai_core::{AgentId, DeterministicRng, TickContext};
use ai_nav::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{SquadConfig, SquadWorld};

/// Placement retries per spawned actor before the spawn is skipped.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SquadId(pub u32);

impl AgentId for SquadId {
    fn stable_id(self) -> u64 {
        0x5000_0000_0000_0000 | self.0 as u64
    }
}

/// Live roster of one squad.
///
/// `units` includes the leader. Members that died or left the simulation are dropped on the
/// next [`Squad::update`].
#[derive(Debug, Clone)]
pub struct Squad<A> {
    id: SquadId,
    config: Arc<SquadConfig>,
    leader: Option<A>,
    units: Vec<A>,
    has_spawned: bool,
    total_spawned: u32,
    last_spawn: Option<Duration>,
    depleted_at: Option<Duration>,
}

impl<A: AgentId> Squad<A> {
    pub fn new(id: SquadId, config: Arc<SquadConfig>) -> Self {
        Self {
            id,
            config,
            leader: None,
            units: Vec::new(),
            has_spawned: false,
            total_spawned: 0,
            last_spawn: None,
            depleted_at: None,
        }
    }

    pub fn id(&self) -> SquadId {
        self.id
    }

    pub fn config(&self) -> &SquadConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn leader(&self) -> Option<A> {
        self.leader
    }

    pub fn units(&self) -> &[A] {
        &self.units
    }

    pub fn has_spawned(&self) -> bool {
        self.has_spawned
    }

    pub fn total_spawned(&self) -> u32 {
        self.total_spawned
    }

    pub fn contains(&self, agent: A) -> bool {
        self.units.contains(&agent)
    }

    pub fn is_leader(&self, agent: A) -> bool {
        self.leader == Some(agent)
    }

    /// Members other than the leader.
    pub fn unit_count(&self) -> usize {
        self.units.len() - usize::from(self.leader.is_some_and(|l| self.units.contains(&l)))
    }

    /// The squad was built around a leader that is no longer alive.
    pub fn leader_is_dead(&self) -> bool {
        self.config.has_leader() && self.has_spawned && self.leader.is_none()
    }

    /// Adopts an existing actor as a unit.
    pub fn add_unit(&mut self, agent: A) {
        if !self.units.contains(&agent) {
            self.units.push(agent);
        }
        self.has_spawned = true;
    }

    /// Adopts an existing actor as the leader.
    pub fn set_leader(&mut self, agent: A) {
        self.add_unit(agent);
        self.leader = Some(agent);
    }

    /// Spawns left before the lifetime cap; `None` when unlimited.
    pub fn remaining_spawns(&self) -> Option<u32> {
        (self.config.max_spawn_count > 0)
            .then(|| self.config.max_spawn_count.saturating_sub(self.total_spawned))
    }

    fn can_spawn_more(&self) -> bool {
        self.remaining_spawns() != Some(0)
    }

    /// Drops members that are dead or gone, clearing the leader if it was one of them.
    pub fn prune<W: SquadWorld<Agent = A>>(&mut self, world: &W) -> usize {
        let before = self.units.len();
        self.units.retain(|a| world.is_alive(*a));
        if self.leader.is_some_and(|l| !world.is_alive(l)) {
            self.leader = None;
        }
        before - self.units.len()
    }

    /// Initial spawn: a leader (if the squad has leader templates) plus a randomized number of
    /// each unit template, capped by the live and lifetime limits.
    pub fn spawn_units<W: SquadWorld<Agent = A>>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
    ) -> usize {
        let mut rng = ctx.rng_for_agent(self.id, streams::SQUAD_SPAWN);
        let mut spawned = 0;

        if self.leader.is_none() && self.config.has_leader() && self.can_spawn_more() {
            let pick = rng.next_index(self.config.leader_templates.len());
            let config = Arc::clone(&self.config);
            if let Some(leader) = self.spawn_one(ctx, world, &config.leader_templates[pick]) {
                self.leader = Some(leader);
                spawned += 1;
            }
        }

        let config = Arc::clone(&self.config);
        'templates: for template in &config.unit_templates {
            let count = rng.next_range_u32(template.min_count, template.max_count);
            for _ in 0..count {
                if self.unit_count() >= config.max_live_count as usize || !self.can_spawn_more() {
                    break 'templates;
                }
                if self.spawn_one(ctx, world, &template.class).is_some() {
                    spawned += 1;
                }
            }
        }

        self.has_spawned = true;
        self.last_spawn = Some(ctx.elapsed);
        tracing::debug!(squad = %self.config.name, spawned, "squad spawned");
        spawned
    }

    /// Per-tick maintenance: prune, reset, then spawn according to the live-count rules.
    /// Returns the number of actors spawned.
    pub fn update<W: SquadWorld<Agent = A>>(&mut self, ctx: &TickContext, world: &mut W) -> usize {
        self.prune(world);
        self.check_reset(ctx);

        if !self.has_spawned {
            return if self.config.spawn_automatically {
                self.spawn_units(ctx, world)
            } else {
                0
            };
        }

        if self.config.suspend_while_leader_dead && self.leader_is_dead() {
            return 0;
        }

        let units = self.unit_count();
        if units < self.config.min_live_count as usize {
            return self.top_up(ctx, world, self.config.min_live_count);
        }

        let delay_elapsed = self
            .last_spawn
            .is_none_or(|last| ctx.since(last) >= self.config.spawn_delay);
        if delay_elapsed && units < self.config.max_live_count as usize {
            return self.top_up(ctx, world, self.config.max_live_count);
        }
        0
    }

    /// Kills every member except `keep`. Returns how many were killed.
    pub fn kill_units<W: SquadWorld<Agent = A>>(
        &mut self,
        world: &mut W,
        keep: Option<A>,
    ) -> usize {
        let mut killed = 0;
        for unit in std::mem::take(&mut self.units) {
            if Some(unit) == keep {
                self.units.push(unit);
            } else {
                world.kill(unit);
                killed += 1;
            }
        }
        if self.leader.is_some_and(|l| Some(l) != keep) {
            self.leader = None;
        }
        killed
    }

    /// Kills all members.
    pub fn teardown<W: SquadWorld<Agent = A>>(&mut self, world: &mut W) -> usize {
        self.kill_units(world, None)
    }

    fn check_reset(&mut self, ctx: &TickContext) {
        let Some(reset_delay) = self.config.reset_delay else {
            return;
        };
        let exhausted = self.has_spawned && self.units.is_empty() && !self.can_spawn_more();
        if !exhausted {
            self.depleted_at = None;
            return;
        }
        let since = *self.depleted_at.get_or_insert(ctx.elapsed);
        if ctx.since(since) >= reset_delay {
            tracing::debug!(squad = %self.config.name, "squad reset");
            self.total_spawned = 0;
            self.has_spawned = false;
            self.depleted_at = None;
        }
    }

    fn top_up<W: SquadWorld<Agent = A>>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        target: u32,
    ) -> usize {
        if self.config.unit_templates.is_empty() {
            return 0;
        }
        let mut rng = ctx.rng_for_agent(self.id, streams::SQUAD_SPAWN);
        let config = Arc::clone(&self.config);
        let mut spawned = 0;
        while self.unit_count() < target as usize && self.can_spawn_more() {
            let template = &config.unit_templates[rng.next_index(config.unit_templates.len())];
            if self.spawn_one(ctx, world, &template.class).is_none() {
                break;
            }
            spawned += 1;
        }
        if spawned > 0 {
            self.last_spawn = Some(ctx.elapsed);
            tracing::debug!(squad = %self.config.name, spawned, "squad topped up");
        }
        spawned
    }

    fn spawn_one<W: SquadWorld<Agent = A>>(
        &mut self,
        ctx: &TickContext,
        world: &mut W,
        class: &str,
    ) -> Option<A> {
        let radius = world.class_radius(class)?;
        let position = self.find_spawn_position(ctx, world, radius)?;
        let agent = world.spawn(class, position, self.id)?;
        self.units.push(agent);
        self.total_spawned += 1;
        Some(agent)
    }

    /// Rejection-samples a free spot inside the spawn circle.
    fn find_spawn_position<W: SquadWorld<Agent = A>>(
        &self,
        ctx: &TickContext,
        world: &W,
        radius: f32,
    ) -> Option<Vec2> {
        let salt = self.total_spawned as u64;
        let mut rng = ctx.rng_for_agent(self.id, streams::SQUAD_PLACEMENT ^ salt);
        let center = self.config.spawn_position;
        let spread = self.config.spawn_radius.max(0.0);
        (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
            let angle = rng.next_range_f32(0.0, std::f32::consts::TAU);
            let dist = spread * rng.next_f32_unit().sqrt();
            let candidate = center + Vec2::from_angle(angle) * dist;
            world.is_area_free(candidate, radius).then_some(candidate)
        })
    }
}
