//! World-state facts as a bitmask, computed on demand.
//!
//! Some facts are expensive (the crowd count runs a spatial trace), so [`evaluate`] only
//! computes the groups a caller asks for and always returns a subset of the request.

use bitflags::bitflags;

use ai_core::AgentId;
use ai_nav::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::world::{ActorView, SpatialQuery, SquadAccess};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Senses: u32 {
        const FULL_HEALTH = 1 << 0;
        const HEALTH_BELOW_FULL = 1 << 1;
        const HEALTH_BELOW_75_PCT = 1 << 2;
        const HEALTH_BELOW_50_PCT = 1 << 3;
        const HEALTH_BELOW_25_PCT = 1 << 4;
        const HEALTH_BELOW_10_PCT = 1 << 5;

        const DAMAGE_TAKEN = 1 << 6;
        const IS_MOVING = 1 << 7;
        const HAS_LOCOMOTOR = 1 << 8;

        const HAS_TARGET = 1 << 9;
        const TARGET_VISIBLE = 1 << 10;
        const TARGET_IN_RANGE = 1 << 11;
        const TARGET_FACING_ME = 1 << 12;
        const TARGET_DEAD = 1 << 13;

        const HAS_WEAPON = 1 << 14;
        const HAS_AMMO = 1 << 15;

        const ALLIES_NEARBY = 1 << 16;
        const ENEMIES_NEARBY = 1 << 17;
        const SUPREMACY = 1 << 18;
        const OUTNUMBERED = 1 << 19;

        const IN_SQUAD = 1 << 20;
        const IS_SQUAD_LEADER = 1 << 21;
        const SQUAD_LEADER_DEAD = 1 << 22;
        const SQUAD_UNITS_DEAD = 1 << 23;
    }
}

impl Senses {
    /// Mutually exclusive health buckets.
    pub const HEALTH_BUCKETS: Senses = Senses::FULL_HEALTH
        .union(Senses::HEALTH_BELOW_FULL)
        .union(Senses::HEALTH_BELOW_75_PCT)
        .union(Senses::HEALTH_BELOW_50_PCT)
        .union(Senses::HEALTH_BELOW_25_PCT)
        .union(Senses::HEALTH_BELOW_10_PCT);

    pub const MOTION: Senses = Senses::IS_MOVING.union(Senses::HAS_LOCOMOTOR);

    /// Facts that need a live target handle (beyond `HAS_TARGET` itself).
    pub const TARGET_DETAILS: Senses = Senses::TARGET_VISIBLE
        .union(Senses::TARGET_IN_RANGE)
        .union(Senses::TARGET_FACING_ME)
        .union(Senses::TARGET_DEAD);

    pub const WEAPON: Senses = Senses::HAS_WEAPON.union(Senses::HAS_AMMO);

    /// Facts derived from the ally/enemy trace.
    pub const CROWD: Senses = Senses::ALLIES_NEARBY
        .union(Senses::ENEMIES_NEARBY)
        .union(Senses::SUPREMACY)
        .union(Senses::OUTNUMBERED);

    pub const SQUAD: Senses = Senses::IN_SQUAD
        .union(Senses::IS_SQUAD_LEADER)
        .union(Senses::SQUAD_LEADER_DEAD)
        .union(Senses::SQUAD_UNITS_DEAD);

    /// The single health bucket for `ratio` (current / max health).
    pub fn health_bucket(ratio: f32) -> Senses {
        if ratio >= 1.0 {
            Senses::FULL_HEALTH
        } else if ratio <= 0.10 || ratio.is_nan() {
            Senses::HEALTH_BELOW_10_PCT
        } else if ratio <= 0.25 {
            Senses::HEALTH_BELOW_25_PCT
        } else if ratio <= 0.50 {
            Senses::HEALTH_BELOW_50_PCT
        } else if ratio <= 0.75 {
            Senses::HEALTH_BELOW_75_PCT
        } else {
            Senses::HEALTH_BELOW_FULL
        }
    }
}

/// One count must exceed the other by more than this for supremacy/outnumbered.
pub const CROWD_MARGIN: usize = 3;

/// Speeds at or below this count as standing still.
pub const MOVING_EPSILON: f32 = 0.01;

/// Perception tunables of an actor class.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Perception {
    pub sight_range: f32,
    /// Full field of view.
    pub sight_cone_degrees: f32,
    /// Gap between bodies within which the target counts as in range.
    pub attack_range: f32,
}

impl Default for Perception {
    fn default() -> Self {
        Self {
            sight_range: 400.0,
            sight_cone_degrees: 120.0,
            attack_range: 250.0,
        }
    }
}

impl Perception {
    pub fn half_angle(&self) -> f32 {
        (self.sight_cone_degrees.clamp(0.0, 360.0) * 0.5).to_radians()
    }

    /// Whether `direction` (unit) lies inside the cone around `forward` (unit).
    pub fn in_cone(&self, forward: Vec2, direction: Vec2) -> bool {
        forward.dot(direction) >= self.half_angle().cos() - 1e-6
    }

    /// Half-width of the crowd trace strip at the far end of the sight range.
    pub fn trace_half_width(&self) -> f32 {
        self.sight_range.max(0.0) * self.half_angle().min(std::f32::consts::FRAC_PI_2).sin()
    }
}

/// State the evaluator keeps between evaluations.
#[derive(Debug, Clone)]
pub struct SenseMemory<A> {
    pub last_health: Option<f32>,
    scratch: Vec<A>,
}

impl<A> Default for SenseMemory<A> {
    fn default() -> Self {
        Self {
            last_health: None,
            scratch: Vec::new(),
        }
    }
}

/// Who is sensing, and what it is currently focused on.
#[derive(Debug, Clone, Copy)]
pub struct SenseProbe<A> {
    pub agent: A,
    pub target: Option<A>,
    pub has_locomotor: bool,
    pub perception: Perception,
}

/// Computes the facts in `requested` for `probe.agent`.
///
/// Health buckets and `DAMAGE_TAKEN` are cheap and always computed (the health memory is
/// updated on every call); every other group only when one of its bits is requested. The
/// result is always masked to `requested`.
pub fn evaluate<A, W>(
    requested: Senses,
    probe: &SenseProbe<A>,
    memory: &mut SenseMemory<A>,
    world: &W,
) -> Senses
where
    A: AgentId,
    W: ActorView<Agent = A> + SpatialQuery + SquadAccess,
{
    let agent = probe.agent;
    let mut out = Senses::empty();

    if let Some(health) = world.health(agent) {
        out |= Senses::health_bucket(health.ratio());
        if memory.last_health.is_some_and(|last| health.current < last) {
            out |= Senses::DAMAGE_TAKEN;
        }
        memory.last_health = Some(health.current);
    }

    if requested.intersects(Senses::MOTION) {
        let speed = world.velocity(agent).map_or(0.0, Vec2::length);
        out.set(Senses::IS_MOVING, speed > MOVING_EPSILON);
        out.set(Senses::HAS_LOCOMOTOR, probe.has_locomotor);
    }

    let target = world.resolve(probe.target);
    out.set(Senses::HAS_TARGET, target.is_some());
    if let Some(target) = target.filter(|_| requested.intersects(Senses::TARGET_DETAILS)) {
        out |= target_facts(agent, target, &probe.perception, world);
    }

    if requested.intersects(Senses::WEAPON) {
        if let Some(weapon) = world.weapon(agent) {
            out |= Senses::HAS_WEAPON;
            out.set(Senses::HAS_AMMO, weapon.has_ammo());
        }
    }

    if requested.intersects(Senses::CROWD) {
        out |= crowd_facts(agent, &probe.perception, memory, world);
    }

    if requested.intersects(Senses::SQUAD) {
        out |= squad_facts(agent, world);
    }

    out & requested
}

fn target_facts<A, W>(agent: A, target: A, perception: &Perception, world: &W) -> Senses
where
    A: AgentId,
    W: ActorView<Agent = A>,
{
    if !world.is_alive(target) {
        return Senses::TARGET_DEAD;
    }
    let (Some(pos), Some(target_pos)) = (world.position(agent), world.position(target)) else {
        return Senses::empty();
    };

    let mut out = Senses::empty();
    let diff = target_pos - pos;
    let dist = diff.length();
    let dir = diff.normalize_or_zero();

    let forward = world.forward(agent).unwrap_or(Vec2::ZERO);
    let visible = dist <= perception.sight_range
        && (dist <= f32::EPSILON || perception.in_cone(forward, dir));
    out.set(Senses::TARGET_VISIBLE, visible);

    let gap = dist - world.radius(agent).unwrap_or(0.0) - world.radius(target).unwrap_or(0.0);
    out.set(Senses::TARGET_IN_RANGE, gap <= perception.attack_range);

    let target_forward = world.forward(target).unwrap_or(Vec2::ZERO);
    out.set(
        Senses::TARGET_FACING_ME,
        dist > f32::EPSILON && perception.in_cone(target_forward, -dir),
    );
    out
}

fn crowd_facts<A, W>(
    agent: A,
    perception: &Perception,
    memory: &mut SenseMemory<A>,
    world: &W,
) -> Senses
where
    A: AgentId,
    W: ActorView<Agent = A> + SpatialQuery,
{
    let (Some(pos), Some(forward), Some(mine)) = (
        world.position(agent),
        world.forward(agent),
        world.factions(agent),
    ) else {
        return Senses::empty();
    };

    memory.scratch.clear();
    world.agents_along_ray(
        pos,
        forward,
        perception.sight_range,
        perception.trace_half_width(),
        &mut memory.scratch,
    );

    let (mut allies, mut enemies) = (0usize, 0usize);
    for other in memory.scratch.iter().copied() {
        if other == agent || !world.is_alive(other) {
            continue;
        }
        match world.factions(other) {
            Some(theirs) if mine.is_allied_with(theirs) => allies += 1,
            Some(_) => enemies += 1,
            None => {}
        }
    }

    let mut out = Senses::empty();
    out.set(Senses::ALLIES_NEARBY, allies > 0);
    out.set(Senses::ENEMIES_NEARBY, enemies > 0);
    out.set(Senses::SUPREMACY, allies > enemies + CROWD_MARGIN);
    out.set(Senses::OUTNUMBERED, enemies > allies + CROWD_MARGIN);
    out
}

fn squad_facts<A, W>(agent: A, world: &W) -> Senses
where
    A: AgentId,
    W: ActorView<Agent = A> + SquadAccess,
{
    let Some(squad) = world.squad_of(agent).and_then(|id| world.squad(id)) else {
        return Senses::empty();
    };

    let mut out = Senses::IN_SQUAD;
    out.set(Senses::IS_SQUAD_LEADER, squad.is_leader(agent));
    let leader_dead = squad.config().has_leader()
        && squad.has_spawned()
        && squad.leader().is_none_or(|l| !world.is_alive(l));
    out.set(Senses::SQUAD_LEADER_DEAD, leader_dead);
    out.set(
        Senses::SQUAD_UNITS_DEAD,
        squad
            .units()
            .iter()
            .filter(|u| **u != agent)
            .all(|u| !world.is_alive(*u)),
    );
    out
}
