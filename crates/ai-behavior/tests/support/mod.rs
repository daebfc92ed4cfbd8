#![allow(dead_code)]

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use ai_behavior::{
    ActorMut, ActorView, AiController, AiProfile, Behavior, ControllerAccess, Factions, Health,
    SpatialQuery, SquadAccess, WeaponInfo,
};
use ai_core::{TickContext, WorldMut, WorldView};
use ai_nav::{FlowField, FlowSource, NavWorldMut, NavWorldView, Vec2};
use ai_squad::{Squad, SquadConfig, SquadId, SquadWorld};

pub const DT: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct Actor {
    pub class: String,
    pub position: Vec2,
    pub forward: Vec2,
    pub velocity: Vec2,
    pub thrust: Vec2,
    pub acceleration: f32,
    pub radius: f32,
    pub max_speed: f32,
    /// Radians per second; infinite snaps instantly.
    pub turn_rate: f32,
    pub factions: Factions,
    pub health: Health,
    pub alive: bool,
    pub weapon: Option<WeaponInfo>,
    pub shots: u32,
    pub last_aggressor: Option<u64>,
    pub parent: Option<u64>,
    pub squad: Option<SquadId>,
    pub conditions: Vec<(String, Duration)>,
    pub animations: Vec<String>,
}

impl Actor {
    pub fn new(class: &str, position: Vec2) -> Self {
        Self {
            class: class.to_string(),
            position,
            forward: Vec2::UNIT_X,
            velocity: Vec2::ZERO,
            thrust: Vec2::ZERO,
            acceleration: 100.0,
            radius: 1.0,
            max_speed: 10.0,
            turn_rate: f32::INFINITY,
            factions: Factions::ENEMY,
            health: Health::new(100.0, 100.0),
            alive: true,
            weapon: None,
            shots: 0,
            last_aggressor: None,
            parent: None,
            squad: None,
            conditions: Vec::new(),
            animations: Vec::new(),
        }
    }

    pub fn facing(mut self, forward: Vec2) -> Self {
        self.forward = forward.normalize_or_zero();
        self
    }

    pub fn with_factions(mut self, factions: Factions) -> Self {
        self.factions = factions;
        self
    }

    pub fn with_health(mut self, current: f32) -> Self {
        self.health.current = current;
        self
    }

    pub fn armed(mut self, muzzle_speed: f32) -> Self {
        self.weapon = Some(WeaponInfo {
            muzzle_speed,
            ammo: None,
        });
        self
    }
}

pub struct TestWorld {
    next_id: u64,
    pub actors: BTreeMap<u64, Actor>,
    pub controllers: BTreeMap<u64, AiController<u64>>,
    pub squads: BTreeMap<SquadId, Squad<u64>>,
    pub profiles: BTreeMap<String, Arc<AiProfile>>,
    pub field: FlowField,
    pub effects: Vec<(Vec2, String)>,
    /// Number of `agents_along_ray` calls so far.
    pub ray_queries: Cell<usize>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_field(FlowField::new(64, 64, 10.0, 0))
    }

    pub fn with_field(field: FlowField) -> Self {
        Self {
            next_id: 0,
            actors: BTreeMap::new(),
            controllers: BTreeMap::new(),
            squads: BTreeMap::new(),
            profiles: BTreeMap::new(),
            field,
            effects: Vec::new(),
            ray_queries: Cell::new(0),
        }
    }

    pub fn add(&mut self, actor: Actor) -> u64 {
        self.next_id += 1;
        self.actors.insert(self.next_id, actor);
        self.next_id
    }

    /// Adds an actor driven by `profile`; its class's squad spawns use the same profile.
    pub fn add_ai(&mut self, actor: Actor, profile: Arc<AiProfile>) -> u64 {
        self.profiles
            .insert(actor.class.clone(), Arc::clone(&profile));
        let id = self.add(actor);
        self.controllers.insert(id, AiController::new(id, profile));
        id
    }

    pub fn add_squad(&mut self, config: SquadConfig) -> SquadId {
        let id = SquadId(self.squads.len() as u32 + 1);
        self.squads.insert(id, Squad::new(id, Arc::new(config)));
        id
    }

    pub fn join_squad(&mut self, agent: u64, id: SquadId, leader: bool) {
        if let Some(actor) = self.actors.get_mut(&agent) {
            actor.squad = Some(id);
        }
        if let Some(squad) = self.squads.get_mut(&id) {
            if leader {
                squad.set_leader(agent);
            } else {
                squad.add_unit(agent);
            }
        }
    }

    pub fn actor(&self, agent: u64) -> &Actor {
        &self.actors[&agent]
    }

    pub fn actor_mut(&mut self, agent: u64) -> &mut Actor {
        self.actors.get_mut(&agent).expect("actor")
    }

    pub fn controller_of(&self, agent: u64) -> &AiController<u64> {
        &self.controllers[&agent]
    }

    pub fn set_target(&mut self, agent: u64, target: Option<u64>) {
        if let Some(controller) = self.controllers.get_mut(&agent) {
            controller.set_target(target);
        }
    }

    pub fn set_behavior(&mut self, ctx: &TickContext, agent: u64, behavior: Arc<Behavior>) {
        if let Some(controller) = self.controllers.get_mut(&agent) {
            controller.set_behavior(ctx, Some(behavior));
        }
    }

    /// Thinks for one actor the way a host does: controller out, think, controller back.
    pub fn think(&mut self, ctx: &TickContext, agent: u64) {
        if let Some(mut controller) = self.controllers.remove(&agent) {
            controller.think(ctx, self);
            self.controllers.insert(agent, controller);
        }
    }

    /// Every controller in ascending id order, then squad upkeep and integration.
    pub fn tick(&mut self, ctx: &TickContext) {
        let ids: Vec<u64> = self.controllers.keys().copied().collect();
        for id in ids {
            self.think(ctx, id);
        }
        let squad_ids: Vec<SquadId> = self.squads.keys().copied().collect();
        for id in squad_ids {
            if let Some(mut squad) = self.squads.remove(&id) {
                squad.update(ctx, self);
                self.squads.insert(id, squad);
            }
        }
        self.integrate(ctx.dt_seconds);
    }

    pub fn integrate(&mut self, dt: f32) {
        for actor in self.actors.values_mut().filter(|a| a.alive) {
            let thrust = actor.thrust * actor.acceleration * dt;
            actor.velocity = (actor.velocity + thrust).clamp_length(actor.max_speed);
            actor.position += actor.velocity * dt;
            actor.thrust = Vec2::ZERO;
        }
    }

    /// Runs `ticks` ticks from `ctx`, returning the context after the last one.
    pub fn run(&mut self, mut ctx: TickContext, ticks: u32) -> TickContext {
        for _ in 0..ticks {
            self.tick(&ctx);
            ctx = ctx.next();
        }
        ctx
    }
}

pub fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, DT, 7)
}

impl WorldView for TestWorld {
    type Agent = u64;

    fn exists(&self, agent: u64) -> bool {
        self.actors.contains_key(&agent)
    }

    fn is_alive(&self, agent: u64) -> bool {
        self.actors.get(&agent).is_some_and(|a| a.alive)
    }
}

impl WorldMut for TestWorld {}

impl NavWorldView for TestWorld {
    fn position(&self, agent: u64) -> Option<Vec2> {
        self.actors.get(&agent).map(|a| a.position)
    }

    fn forward(&self, agent: u64) -> Option<Vec2> {
        self.actors.get(&agent).map(|a| a.forward)
    }

    fn velocity(&self, agent: u64) -> Option<Vec2> {
        self.actors.get(&agent).map(|a| a.velocity)
    }

    fn radius(&self, agent: u64) -> Option<f32> {
        self.actors.get(&agent).map(|a| a.radius)
    }

    fn flow_field(&self) -> &dyn FlowSource {
        &self.field
    }
}

impl NavWorldMut for TestWorld {
    fn turn_towards(&mut self, agent: u64, direction: Vec2, dt_seconds: f32) {
        let Some(actor) = self.actors.get_mut(&agent) else {
            return;
        };
        let Some(direction) = direction.normalized() else {
            return;
        };
        let max_step = actor.turn_rate * dt_seconds;
        let delta = actor.forward.cross(direction).atan2(actor.forward.dot(direction));
        actor.forward = if delta.abs() <= max_step {
            direction
        } else {
            actor.forward.rotated(max_step.copysign(delta))
        };
    }

    fn set_forward(&mut self, agent: u64, direction: Vec2) {
        let direction = direction.normalized();
        if let (Some(actor), Some(direction)) = (self.actors.get_mut(&agent), direction) {
            actor.forward = direction;
        }
    }

    fn accelerate(&mut self, agent: u64, direction: Vec2) {
        if let Some(actor) = self.actors.get_mut(&agent) {
            actor.thrust = direction;
        }
    }
}

impl ActorView for TestWorld {
    fn acceleration(&self, agent: u64) -> Option<Vec2> {
        self.actors.get(&agent).map(|a| a.thrust * a.acceleration)
    }

    fn max_speed(&self, agent: u64) -> Option<f32> {
        self.actors.get(&agent).map(|a| a.max_speed)
    }

    fn factions(&self, agent: u64) -> Option<Factions> {
        self.actors.get(&agent).map(|a| a.factions)
    }

    fn health(&self, agent: u64) -> Option<Health> {
        self.actors.get(&agent).map(|a| a.health)
    }

    fn class(&self, agent: u64) -> Option<&str> {
        self.actors.get(&agent).map(|a| a.class.as_str())
    }

    fn weapon(&self, agent: u64) -> Option<WeaponInfo> {
        self.actors.get(&agent).and_then(|a| a.weapon)
    }

    fn last_aggressor(&self, agent: u64) -> Option<u64> {
        self.actors.get(&agent).and_then(|a| a.last_aggressor)
    }

    fn parent(&self, agent: u64) -> Option<u64> {
        self.actors.get(&agent).and_then(|a| a.parent)
    }
}

impl ActorMut for TestWorld {
    fn set_health(&mut self, agent: u64, health: f32) {
        if let Some(actor) = self.actors.get_mut(&agent) {
            actor.health.current = health;
        }
    }

    fn kill(&mut self, agent: u64) {
        if let Some(actor) = self.actors.get_mut(&agent) {
            actor.alive = false;
            actor.health.current = 0.0;
        }
    }

    fn resurrect(&mut self, agent: u64) {
        if let Some(actor) = self.actors.get_mut(&agent) {
            actor.alive = true;
        }
    }

    fn set_factions(&mut self, agent: u64, factions: Factions) {
        if let Some(actor) = self.actors.get_mut(&agent) {
            actor.factions = factions;
        }
    }

    fn set_class(&mut self, agent: u64, class: &str) -> bool {
        match self.actors.get_mut(&agent) {
            Some(actor) => {
                actor.class = class.to_string();
                true
            }
            None => false,
        }
    }

    fn set_weapon(&mut self, agent: u64, weapon: &str) -> bool {
        let muzzle_speed = match weapon {
            "pistol" => 50.0,
            "rifle" => 120.0,
            _ => return false,
        };
        match self.actors.get_mut(&agent) {
            Some(actor) => {
                actor.weapon = Some(WeaponInfo {
                    muzzle_speed,
                    ammo: None,
                });
                true
            }
            None => false,
        }
    }

    fn try_use_weapon(&mut self, agent: u64) -> bool {
        match self.actors.get_mut(&agent) {
            Some(actor) if actor.weapon.is_some_and(WeaponInfo::has_ammo) => {
                actor.shots += 1;
                true
            }
            _ => false,
        }
    }

    fn apply_condition(&mut self, agent: u64, condition: &str, duration: Duration) -> bool {
        match self.actors.get_mut(&agent) {
            Some(actor) => {
                actor.conditions.push((condition.to_string(), duration));
                true
            }
            None => false,
        }
    }

    fn play_animation(&mut self, agent: u64, animation: &str) -> bool {
        match self.actors.get_mut(&agent) {
            Some(actor) => {
                actor.animations.push(animation.to_string());
                true
            }
            None => false,
        }
    }

    fn spawn_effect(&mut self, at: Vec2, effect: &str) {
        self.effects.push((at, effect.to_string()));
    }

    fn clone_actor(&mut self, agent: u64, position: Vec2) -> Option<u64> {
        let mut copy = self.actors.get(&agent)?.clone();
        copy.position = position;
        copy.velocity = Vec2::ZERO;
        let id = self.add(copy);
        let forked = self
            .controllers
            .get(&agent)
            .map(|c| c.fork(id))
            .or_else(|| {
                let class = &self.actors[&agent].class;
                self.profiles
                    .get(class)
                    .map(|p| AiController::new(id, Arc::clone(p)))
            });
        if let Some(controller) = forked {
            self.controllers.insert(id, controller);
        }
        Some(id)
    }

    fn attach(&mut self, child: u64, parent: u64) -> bool {
        if !self.actors.contains_key(&parent) {
            return false;
        }
        match self.actors.get_mut(&child) {
            Some(actor) => {
                actor.parent = Some(parent);
                true
            }
            None => false,
        }
    }
}

impl SpatialQuery for TestWorld {
    fn agents_in_radius(&self, center: Vec2, radius: f32, out: &mut Vec<u64>) {
        out.extend(
            self.actors
                .iter()
                .filter(|(_, a)| a.position.distance(center) <= radius + a.radius)
                .map(|(id, _)| *id),
        );
    }

    fn agents_along_ray(
        &self,
        origin: Vec2,
        direction: Vec2,
        distance: f32,
        half_width: f32,
        out: &mut Vec<u64>,
    ) {
        self.ray_queries.set(self.ray_queries.get() + 1);
        let dir = direction.normalize_or_zero();
        out.extend(
            self.actors
                .iter()
                .filter(|(_, a)| {
                    let rel = a.position - origin;
                    let along = rel.dot(dir);
                    along >= -a.radius
                        && along <= distance + a.radius
                        && rel.cross(dir).abs() <= half_width + a.radius
                })
                .map(|(id, _)| *id),
        );
    }
}

impl SquadWorld for TestWorld {
    fn is_area_free(&self, center: Vec2, radius: f32) -> bool {
        self.actors
            .values()
            .filter(|a| a.alive)
            .all(|a| a.position.distance(center) >= radius + a.radius)
    }

    fn class_radius(&self, _class: &str) -> Option<f32> {
        Some(1.0)
    }

    fn spawn(&mut self, class: &str, position: Vec2, squad: SquadId) -> Option<u64> {
        let mut actor = Actor::new(class, position);
        actor.squad = Some(squad);
        let id = match self.profiles.get(class).cloned() {
            Some(profile) => self.add_ai(actor, profile),
            None => self.add(actor),
        };
        Some(id)
    }

    fn kill(&mut self, agent: u64) {
        ActorMut::kill(self, agent);
    }
}

impl SquadAccess for TestWorld {
    fn squad_of(&self, agent: u64) -> Option<SquadId> {
        self.actors.get(&agent).and_then(|a| a.squad)
    }

    fn squad(&self, id: SquadId) -> Option<&Squad<u64>> {
        self.squads.get(&id)
    }

    fn spawn_squad_units(&mut self, ctx: &TickContext, id: SquadId) -> usize {
        let Some(mut squad) = self.squads.remove(&id) else {
            return 0;
        };
        let spawned = squad.spawn_units(ctx, self);
        self.squads.insert(id, squad);
        spawned
    }

    fn kill_squad_units(&mut self, id: SquadId, keep: Option<u64>) -> usize {
        let Some(mut squad) = self.squads.remove(&id) else {
            return 0;
        };
        let killed = squad.kill_units(self, keep);
        self.squads.insert(id, squad);
        killed
    }
}

impl ControllerAccess for TestWorld {
    fn controller(&self, agent: u64) -> Option<&AiController<u64>> {
        self.controllers.get(&agent)
    }

    fn controller_mut(&mut self, agent: u64) -> Option<&mut AiController<u64>> {
        self.controllers.get_mut(&agent)
    }
}
