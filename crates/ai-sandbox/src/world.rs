//! The sandbox's world: kinematic bodies, hit-scan weapons and squads on a flow-field map.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ai_behavior::{
    ActorMut, ActorView, AiController, AiProfile, ControllerAccess, Factions, Health,
    SpatialQuery, SquadAccess, WeaponInfo,
};
use ai_core::{TickContext, WorldMut, WorldView};
use ai_nav::{FlowField, FlowSource, NavWorldMut, NavWorldView, Vec2};
use ai_squad::{Squad, SquadId, SquadWorld};
use ai_tools::{tags, TraceEvent, TraceLog, TraceSink};

use crate::scenario::{ActorClass, Scenario, WeaponSpec};

pub type ActorId = u64;

/// Streams controller trace events into the `tracing` subscriber.
struct LogSink;

impl TraceSink for LogSink {
    fn emit(&mut self, event: TraceEvent) {
        tracing::debug!(
            tick = event.tick,
            agent = event.agent,
            tag = %event.tag,
            a = event.a,
            b = event.b,
            "trace"
        );
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: String,
    pub spec: WeaponSpec,
    pub ammo: Option<u32>,
    pub ready_at: Duration,
}

impl Weapon {
    fn new(name: &str, spec: WeaponSpec) -> Self {
        Self {
            name: name.to_string(),
            spec,
            ammo: spec.ammo,
            ready_at: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub class: String,
    pub position: Vec2,
    pub forward: Vec2,
    pub velocity: Vec2,
    /// Requested acceleration direction for the current tick.
    pub thrust: Vec2,
    pub acceleration: f32,
    pub radius: f32,
    pub max_speed: f32,
    /// Radians per second.
    pub turn_rate: f32,
    pub factions: Factions,
    pub health: Health,
    pub alive: bool,
    pub weapon: Option<Weapon>,
    pub last_aggressor: Option<ActorId>,
    pub parent: Option<ActorId>,
    pub squad: Option<SquadId>,
    /// Active conditions and when they wear off.
    pub conditions: BTreeMap<String, Duration>,
    pub animation: Option<String>,
}

/// Running totals for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub shots: u64,
    pub hits: u64,
    pub kills: u64,
    pub spawned: u64,
    pub clones: u64,
    pub effects: u64,
}

pub struct SandboxWorld {
    next_id: ActorId,
    now: Duration,
    classes: BTreeMap<String, ActorClass>,
    weapons: BTreeMap<String, WeaponSpec>,
    field: FlowField,
    trace_capacity: Option<usize>,
    pub bodies: BTreeMap<ActorId, Body>,
    pub controllers: BTreeMap<ActorId, AiController<ActorId>>,
    pub squads: BTreeMap<SquadId, Squad<ActorId>>,
    /// World-level events (squad spawns).
    pub events: TraceLog,
    pub stats: Stats,
    tick: u64,
}

impl SandboxWorld {
    /// An empty world with the scenario's map, classes and weapons, plus its squads.
    pub fn new(scenario: &Scenario) -> Self {
        let squads = scenario
            .squads
            .iter()
            .enumerate()
            .map(|(i, config)| {
                let id = SquadId(i as u32 + 1);
                (id, Squad::new(id, Arc::new(config.clone())))
            })
            .collect();
        Self {
            next_id: 0,
            now: Duration::ZERO,
            classes: scenario.classes.clone(),
            weapons: scenario.weapons.clone(),
            field: scenario.field.clone(),
            trace_capacity: None,
            bodies: BTreeMap::new(),
            controllers: BTreeMap::new(),
            squads,
            events: TraceLog::with_capacity(256),
            stats: Stats::default(),
            tick: 0,
        }
    }

    /// Builds the world and places every actor the scenario lists. With `trace_capacity`, each
    /// controller keeps that many of its most recent trace events.
    pub fn populate(scenario: &Scenario, trace_capacity: Option<usize>) -> Self {
        let mut world = Self::new(scenario);
        world.trace_capacity = trace_capacity;

        let mut placed = Vec::with_capacity(scenario.actors.len());
        for spec in &scenario.actors {
            let forward = Vec2::from_angle(spec.facing.to_radians());
            let id = world.spawn_body(&spec.class, spec.position, forward);
            placed.push(id);

            let Some(id) = id else { continue };
            let squad = spec.squad.as_ref().and_then(|name| {
                world
                    .squads
                    .iter()
                    .find(|(_, s)| s.name() == name)
                    .map(|(sid, _)| *sid)
            });
            if let Some(squad) = squad {
                world.join_squad(id, squad, spec.leader);
            }
        }

        for (spec, id) in scenario.actors.iter().zip(&placed) {
            let (Some(id), Some(target)) = (id, spec.target) else {
                continue;
            };
            let target = placed.get(target).copied().flatten();
            if let Some(controller) = world.controllers.get_mut(id) {
                controller.set_target(target);
            }
        }
        world
    }

    pub fn field(&self) -> &FlowField {
        &self.field
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn body(&self, id: ActorId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn alive_count(&self) -> usize {
        self.bodies.values().filter(|b| b.alive).count()
    }

    /// Creates a body of `class` and, if the class has a profile, its controller.
    pub fn spawn_body(&mut self, class: &str, position: Vec2, forward: Vec2) -> Option<ActorId> {
        let class = self.classes.get(class)?;
        let spec = &class.spec;
        let weapon = spec
            .weapon
            .as_ref()
            .and_then(|name| self.weapons.get(name).map(|w| Weapon::new(name, *w)));
        let body = Body {
            class: class.name.clone(),
            position,
            forward: forward.normalized().unwrap_or(Vec2::UNIT_X),
            velocity: Vec2::ZERO,
            thrust: Vec2::ZERO,
            acceleration: spec.acceleration,
            radius: spec.radius,
            max_speed: spec.max_speed,
            turn_rate: spec.turn_rate.to_radians(),
            factions: spec.factions,
            health: Health::new(spec.health, spec.health),
            alive: true,
            weapon,
            last_aggressor: None,
            parent: None,
            squad: None,
            conditions: BTreeMap::new(),
            animation: None,
        };
        let profile = class.profile.clone();

        self.next_id += 1;
        let id = self.next_id;
        tracing::debug!(agent = id, class = %body.class, "actor spawned");
        self.bodies.insert(id, body);
        if let Some(profile) = profile {
            let controller = self.new_controller(id, profile);
            self.controllers.insert(id, controller);
        }
        Some(id)
    }

    fn new_controller(&self, id: ActorId, profile: Arc<AiProfile>) -> AiController<ActorId> {
        let controller = AiController::new(id, profile);
        let controller = match self.trace_capacity {
            Some(capacity) => controller.with_trace_log(capacity),
            None => controller,
        };
        controller.with_trace_sink(Box::new(LogSink))
    }

    pub fn join_squad(&mut self, agent: ActorId, id: SquadId, leader: bool) {
        let Some(squad) = self.squads.get_mut(&id) else {
            return;
        };
        if leader {
            squad.set_leader(agent);
        } else {
            squad.add_unit(agent);
        }
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.squad = Some(id);
        }
    }

    /// Thinks for one actor: its controller leaves storage for the duration.
    pub fn think(&mut self, ctx: &TickContext, agent: ActorId) {
        if let Some(mut controller) = self.controllers.remove(&agent) {
            controller.think(ctx, self);
            self.controllers.insert(agent, controller);
        }
    }

    /// One simulation step: controllers in ascending id order, squad upkeep, then physics.
    pub fn tick(&mut self, ctx: &TickContext) {
        self.now = ctx.elapsed;
        self.tick = ctx.tick;

        let ids: Vec<ActorId> = self.controllers.keys().copied().collect();
        for id in ids {
            self.think(ctx, id);
        }

        let squad_ids: Vec<SquadId> = self.squads.keys().copied().collect();
        for id in squad_ids {
            if let Some(mut squad) = self.squads.remove(&id) {
                let spawned = squad.update(ctx, self);
                self.squads.insert(id, squad);
                self.record_squad_spawn(id, spawned);
            }
        }

        self.integrate(ctx.dt_seconds);
        self.expire_conditions();
    }

    fn record_squad_spawn(&mut self, id: SquadId, spawned: usize) {
        if spawned == 0 {
            return;
        }
        self.stats.spawned += spawned as u64;
        self.events.push(
            TraceEvent::new(self.tick, u64::from(id.0), tags::SQUAD_SPAWN).with_a(spawned as u64),
        );
    }

    pub fn integrate(&mut self, dt: f32) {
        for body in self.bodies.values_mut().filter(|b| b.alive) {
            body.velocity = (body.velocity + body.thrust * body.acceleration * dt)
                .clamp_length(body.max_speed);
            body.position += body.velocity * dt;
            body.thrust = Vec2::ZERO;
        }

        let attached: Vec<(ActorId, ActorId)> = self
            .bodies
            .iter()
            .filter_map(|(id, b)| b.parent.map(|p| (*id, p)))
            .collect();
        for (child, parent) in attached {
            let Some(anchor) = self.bodies.get(&parent).map(|p| (p.position, p.velocity)) else {
                continue;
            };
            if let Some(body) = self.bodies.get_mut(&child) {
                body.position = anchor.0;
                body.velocity = anchor.1;
            }
        }
    }

    fn expire_conditions(&mut self) {
        let now = self.now;
        for body in self.bodies.values_mut() {
            body.conditions.retain(|_, until| *until > now);
        }
    }

    /// The first living body other than `shooter` on the firing line, nearest first.
    fn first_hit(
        &self,
        shooter: ActorId,
        origin: Vec2,
        direction: Vec2,
        range: f32,
    ) -> Option<ActorId> {
        let mut candidates = Vec::new();
        self.agents_along_ray(origin, direction, range, 0.0, &mut candidates);
        candidates
            .into_iter()
            .filter(|id| *id != shooter)
            .filter_map(|id| self.bodies.get(&id).filter(|b| b.alive).map(|b| (id, b)))
            .filter(|(_, b)| b.parent != Some(shooter))
            .map(|(id, b)| (id, (b.position - origin).dot(direction)))
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .map(|(id, _)| id)
    }

    fn damage(&mut self, victim: ActorId, attacker: ActorId, amount: f32) {
        let Some(body) = self.bodies.get_mut(&victim) else {
            return;
        };
        body.health.current -= amount;
        body.last_aggressor = Some(attacker);
        self.stats.hits += 1;
        if body.health.current <= 0.0 {
            ActorMut::kill(self, victim);
            self.stats.kills += 1;
            tracing::debug!(agent = victim, by = attacker, "actor killed");
        }
    }
}

impl WorldView for SandboxWorld {
    type Agent = ActorId;

    fn exists(&self, agent: ActorId) -> bool {
        self.bodies.contains_key(&agent)
    }

    fn is_alive(&self, agent: ActorId) -> bool {
        self.bodies.get(&agent).is_some_and(|b| b.alive)
    }
}

impl WorldMut for SandboxWorld {}

impl NavWorldView for SandboxWorld {
    fn position(&self, agent: ActorId) -> Option<Vec2> {
        self.bodies.get(&agent).map(|b| b.position)
    }

    fn forward(&self, agent: ActorId) -> Option<Vec2> {
        self.bodies.get(&agent).map(|b| b.forward)
    }

    fn velocity(&self, agent: ActorId) -> Option<Vec2> {
        self.bodies.get(&agent).map(|b| b.velocity)
    }

    fn radius(&self, agent: ActorId) -> Option<f32> {
        self.bodies.get(&agent).map(|b| b.radius)
    }

    fn flow_field(&self) -> &dyn FlowSource {
        &self.field
    }
}

impl NavWorldMut for SandboxWorld {
    fn turn_towards(&mut self, agent: ActorId, direction: Vec2, dt_seconds: f32) {
        let (Some(body), Some(direction)) = (self.bodies.get_mut(&agent), direction.normalized())
        else {
            return;
        };
        let max_step = body.turn_rate * dt_seconds;
        let delta = body.forward.cross(direction).atan2(body.forward.dot(direction));
        body.forward = if delta.abs() <= max_step {
            direction
        } else {
            body.forward.rotated(max_step.copysign(delta))
        };
    }

    fn set_forward(&mut self, agent: ActorId, direction: Vec2) {
        if let (Some(body), Some(direction)) = (self.bodies.get_mut(&agent), direction.normalized())
        {
            body.forward = direction;
        }
    }

    fn accelerate(&mut self, agent: ActorId, direction: Vec2) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.thrust = direction.clamp_length(1.0);
        }
    }
}

impl ActorView for SandboxWorld {
    fn acceleration(&self, agent: ActorId) -> Option<Vec2> {
        self.bodies.get(&agent).map(|b| b.thrust * b.acceleration)
    }

    fn max_speed(&self, agent: ActorId) -> Option<f32> {
        self.bodies.get(&agent).map(|b| b.max_speed)
    }

    fn factions(&self, agent: ActorId) -> Option<Factions> {
        self.bodies.get(&agent).map(|b| b.factions)
    }

    fn health(&self, agent: ActorId) -> Option<Health> {
        self.bodies.get(&agent).map(|b| b.health)
    }

    fn class(&self, agent: ActorId) -> Option<&str> {
        self.bodies.get(&agent).map(|b| b.class.as_str())
    }

    fn weapon(&self, agent: ActorId) -> Option<WeaponInfo> {
        self.bodies
            .get(&agent)
            .and_then(|b| b.weapon.as_ref())
            .map(|w| w.spec.info(w.ammo))
    }

    fn last_aggressor(&self, agent: ActorId) -> Option<ActorId> {
        self.bodies.get(&agent).and_then(|b| b.last_aggressor)
    }

    fn parent(&self, agent: ActorId) -> Option<ActorId> {
        self.bodies.get(&agent).and_then(|b| b.parent)
    }
}

impl ActorMut for SandboxWorld {
    fn set_health(&mut self, agent: ActorId, health: f32) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.health.current = health;
        }
    }

    fn kill(&mut self, agent: ActorId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.alive = false;
            body.health.current = 0.0;
            body.velocity = Vec2::ZERO;
        }
    }

    fn resurrect(&mut self, agent: ActorId) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.alive = true;
        }
    }

    fn set_factions(&mut self, agent: ActorId, factions: Factions) {
        if let Some(body) = self.bodies.get_mut(&agent) {
            body.factions = factions;
        }
    }

    fn set_class(&mut self, agent: ActorId, class: &str) -> bool {
        let Some(spec) = self.classes.get(class).map(|c| c.spec.clone()) else {
            return false;
        };
        let Some(body) = self.bodies.get_mut(&agent) else {
            return false;
        };
        body.class = class.to_string();
        body.radius = spec.radius;
        body.max_speed = spec.max_speed;
        body.acceleration = spec.acceleration;
        body.turn_rate = spec.turn_rate.to_radians();
        body.health.max = spec.health;
        body.health.current = body.health.current.min(spec.health);
        true
    }

    fn set_weapon(&mut self, agent: ActorId, weapon: &str) -> bool {
        let Some(spec) = self.weapons.get(weapon).copied() else {
            return false;
        };
        match self.bodies.get_mut(&agent) {
            Some(body) => {
                body.weapon = Some(Weapon::new(weapon, spec));
                true
            }
            None => false,
        }
    }

    fn try_use_weapon(&mut self, agent: ActorId) -> bool {
        let now = self.now;
        let Some(body) = self.bodies.get_mut(&agent).filter(|b| b.alive) else {
            return false;
        };
        let Some(weapon) = body.weapon.as_mut() else {
            return false;
        };
        if now < weapon.ready_at || weapon.ammo == Some(0) {
            return false;
        }
        if let Some(ammo) = weapon.ammo.as_mut() {
            *ammo -= 1;
        }
        weapon.ready_at = now + weapon.spec.cooldown;
        let (origin, direction, spec) = (body.position, body.forward, weapon.spec);
        self.stats.shots += 1;

        if let Some(victim) = self.first_hit(agent, origin, direction, spec.range) {
            self.damage(victim, agent, spec.damage);
        }
        true
    }

    fn apply_condition(&mut self, agent: ActorId, condition: &str, duration: Duration) -> bool {
        let until = self.now + duration;
        match self.bodies.get_mut(&agent) {
            Some(body) => {
                let entry = body.conditions.entry(condition.to_string()).or_default();
                *entry = (*entry).max(until);
                true
            }
            None => false,
        }
    }

    fn play_animation(&mut self, agent: ActorId, animation: &str) -> bool {
        match self.bodies.get_mut(&agent) {
            Some(body) => {
                body.animation = Some(animation.to_string());
                true
            }
            None => false,
        }
    }

    fn spawn_effect(&mut self, at: Vec2, effect: &str) {
        self.stats.effects += 1;
        tracing::trace!(effect, x = at.x, y = at.y, "effect");
    }

    fn clone_actor(&mut self, agent: ActorId, position: Vec2) -> Option<ActorId> {
        let mut copy = self.bodies.get(&agent)?.clone();
        copy.position = position;
        copy.velocity = Vec2::ZERO;
        copy.parent = None;
        copy.squad = None;

        self.next_id += 1;
        let id = self.next_id;
        self.bodies.insert(id, copy);
        if let Some(controller) = self.controllers.get(&agent).map(|c| c.fork(id)) {
            self.controllers
                .insert(id, controller.with_trace_sink(Box::new(LogSink)));
        } else if let Some(profile) = self
            .bodies
            .get(&agent)
            .and_then(|b| self.classes.get(&b.class))
            .and_then(|c| c.profile.clone())
        {
            // The cloning actor is mid-think, so its controller is not in storage.
            let controller = self.new_controller(id, profile);
            self.controllers.insert(id, controller);
        }
        self.stats.clones += 1;
        Some(id)
    }

    fn attach(&mut self, child: ActorId, parent: ActorId) -> bool {
        if child == parent || !self.bodies.contains_key(&parent) {
            return false;
        }
        match self.bodies.get_mut(&child) {
            Some(body) => {
                body.parent = Some(parent);
                true
            }
            None => false,
        }
    }
}

impl SpatialQuery for SandboxWorld {
    fn agents_in_radius(&self, center: Vec2, radius: f32, out: &mut Vec<ActorId>) {
        out.extend(
            self.bodies
                .iter()
                .filter(|(_, b)| b.position.distance(center) <= radius + b.radius)
                .map(|(id, _)| *id),
        );
    }

    fn agents_along_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        distance: f32,
        half_width: f32,
        out: &mut Vec<ActorId>,
    ) {
        let Some(dir) = direction.normalized() else {
            return;
        };
        out.extend(
            self.bodies
                .iter()
                .filter(|(_, b)| {
                    let rel = b.position - origin;
                    let along = rel.dot(dir);
                    along >= -b.radius
                        && along <= distance + b.radius
                        && rel.cross(dir).abs() <= half_width + b.radius
                })
                .map(|(id, _)| *id),
        );
    }
}

impl SquadWorld for SandboxWorld {
    fn is_area_free(&self, center: Vec2, radius: f32) -> bool {
        self.field.contains(center)
            && self
                .bodies
                .values()
                .filter(|b| b.alive)
                .all(|b| b.position.distance(center) >= radius + b.radius)
    }

    fn class_radius(&self, class: &str) -> Option<f32> {
        self.classes.get(class).map(|c| c.spec.radius)
    }

    fn spawn(&mut self, class: &str, position: Vec2, squad: SquadId) -> Option<ActorId> {
        let id = self.spawn_body(class, position, Vec2::UNIT_X)?;
        if let Some(body) = self.bodies.get_mut(&id) {
            body.squad = Some(squad);
        }
        Some(id)
    }

    fn kill(&mut self, agent: ActorId) {
        ActorMut::kill(self, agent);
    }
}

impl SquadAccess for SandboxWorld {
    fn squad_of(&self, agent: ActorId) -> Option<SquadId> {
        self.bodies.get(&agent).and_then(|b| b.squad)
    }

    fn squad(&self, id: SquadId) -> Option<&Squad<ActorId>> {
        self.squads.get(&id)
    }

    fn spawn_squad_units(&mut self, ctx: &TickContext, id: SquadId) -> usize {
        let Some(mut squad) = self.squads.remove(&id) else {
            return 0;
        };
        let spawned = squad.spawn_units(ctx, self);
        self.squads.insert(id, squad);
        self.record_squad_spawn(id, spawned);
        spawned
    }

    fn kill_squad_units(&mut self, id: SquadId, keep: Option<ActorId>) -> usize {
        let Some(mut squad) = self.squads.remove(&id) else {
            return 0;
        };
        let killed = squad.kill_units(self, keep);
        self.squads.insert(id, squad);
        killed
    }
}

impl ControllerAccess for SandboxWorld {
    fn controller(&self, agent: ActorId) -> Option<&AiController<ActorId>> {
        self.controllers.get(&agent)
    }

    fn controller_mut(&mut self, agent: ActorId) -> Option<&mut AiController<ActorId>> {
        self.controllers.get_mut(&agent)
    }
}
