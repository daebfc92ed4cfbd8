use ai_nav::Vec2;
use ai_sandbox::{Scenario, SimOptions, Simulation};
use ai_squad::SquadId;
use ai_tools::tags;

const SKIRMISH: &str = include_str!("../scenarios/skirmish.yaml");

const RANGE: &str = r#"
name: range
flow_field: { width: 20, height: 20 }
weapons:
  gun: { damage: 25, range: 200, cooldown: 0.2 }
classes:
  shooter: { factions: PLAYER, weapon: gun, profile: shooter }
  dummy: { factions: ENEMY, health: 100 }
behaviors:
  - name: shoot
    requisite_senses: HAS_TARGET
    requisite_not_senses: TARGET_DEAD
    tasks:
      - type: ShootAtTarget
profiles:
  - name: shooter
    defaults: [shoot]
actors:
  - { class: shooter, position: { x: 50, y: 100 }, target: 1 }
  - { class: dummy, position: { x: 120, y: 100 } }
"#;

fn positions(sim: &Simulation) -> Vec<(u64, Vec2)> {
    sim.world()
        .bodies
        .iter()
        .map(|(id, body)| (*id, body.position))
        .collect()
}

#[test]
fn shooter_kills_a_stationary_dummy() {
    let scenario = Scenario::from_yaml(RANGE).unwrap();
    let mut sim = Simulation::new(&scenario, SimOptions::default());

    let summary = sim.run(40);

    let dummy = sim.world().body(2).expect("dummy");
    assert!(!dummy.alive);
    assert_eq!(dummy.last_aggressor, Some(1));
    assert_eq!(summary.kills, 1);
    assert_eq!(summary.hits, 4);
    assert_eq!(summary.alive, 1);
    // Nothing left to shoot at once the target is dead.
    assert!(sim.world().controllers[&1].behavior().is_none());
}

#[test]
fn cooldown_limits_the_rate_of_fire() {
    let scenario = Scenario::from_yaml(RANGE).unwrap();
    let mut sim = Simulation::new(&scenario, SimOptions::default());

    sim.run(1);
    assert_eq!(sim.world().stats.shots, 1);
    sim.run(1);
    assert_eq!(sim.world().stats.shots, 1);
}

#[test]
fn controller_traces_record_behavior_selection() {
    let scenario = Scenario::from_yaml(RANGE).unwrap();
    let options = SimOptions {
        trace_capacity: Some(32),
        ..SimOptions::default()
    };
    let mut sim = Simulation::new(&scenario, options);
    sim.run(3);

    let log = sim.world().controllers[&1].trace().expect("trace log");
    assert!(log.iter_tag(tags::BEHAVIOR_SELECT).count() >= 1);
    assert!(log.iter_tag(tags::TASK_SUCCESS).count() >= 1);
}

#[test]
fn squad_spawns_around_its_leader_on_the_first_tick() {
    let scenario = Scenario::from_yaml(SKIRMISH).unwrap();
    let mut sim = Simulation::new(&scenario, SimOptions::default());

    sim.step();

    let squad = &sim.world().squads[&SquadId(1)];
    let leader = squad.leader().expect("captain spawned");
    assert_eq!(sim.world().body(leader).unwrap().class, "captain");
    assert!(squad.unit_count() >= 2);
    assert!(sim.world().controllers.contains_key(&leader));

    let spawn = sim
        .world()
        .events
        .iter_tag(tags::SQUAD_SPAWN)
        .next()
        .expect("spawn event");
    assert_eq!(spawn.agent, 1);
    assert_eq!(spawn.a, sim.world().stats.spawned);
}

#[test]
fn same_seed_same_run() {
    let scenario = Scenario::from_yaml(SKIRMISH).unwrap();
    let mut a = Simulation::new(&scenario, SimOptions::default());
    let mut b = Simulation::new(&scenario, SimOptions::default());

    let summary_a = a.run(200);
    let summary_b = b.run(200);

    assert_eq!(summary_a, summary_b);
    assert_eq!(positions(&a), positions(&b));
    assert_eq!(a.hud_lines(), b.hud_lines());
}

#[test]
fn options_override_scenario_parameters() {
    let scenario = Scenario::from_yaml(SKIRMISH).unwrap();
    let options = SimOptions {
        dt: Some(0.05),
        seed: Some(1),
        trace_capacity: None,
    };
    let mut sim = Simulation::new(&scenario, options);
    assert_eq!(sim.ctx().dt_seconds, 0.05);
    assert_eq!(sim.ctx().seed, 1);

    let summary = sim.run(20);
    assert_eq!(summary.ticks, 20);
    assert!((summary.elapsed.as_secs_f32() - 1.0).abs() < 1e-3);
}

#[test]
fn hud_has_a_line_per_controller() {
    let scenario = Scenario::from_yaml(SKIRMISH).unwrap();
    let mut sim = Simulation::new(&scenario, SimOptions::default());
    sim.run(5);

    let lines = sim.hud_lines();
    assert_eq!(lines.len(), sim.world().controllers.len());
    assert!(lines[0].starts_with("agent=1 "));
}

#[test]
fn placed_actor_starts_with_its_target() {
    let scenario = Scenario::from_yaml(SKIRMISH).unwrap();
    let sim = Simulation::new(&scenario, SimOptions::default());

    assert_eq!(sim.world().controllers[&3].target(), Some(1));
    assert_eq!(sim.world().controllers[&1].target(), None);
}
