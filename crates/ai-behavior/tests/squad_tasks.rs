mod support;

use std::sync::Arc;
use std::time::Duration;

use ai_behavior::{AiController, AiProfile, Behavior, Task};
use ai_nav::Vec2;
use ai_squad::{SquadConfig, SquadId, UnitTemplate};
use ai_tools::tags;

use support::{ctx, Actor, TestWorld};

const HOLD: Task = Task::Wait {
    duration: Duration::from_secs(1000),
    interrupt_locomotion: false,
};

fn profile(tasks: Vec<Task>) -> Arc<AiProfile> {
    let mut tasks = tasks;
    tasks.push(HOLD);
    Arc::new(AiProfile::new("squad").with_default(Behavior::new("orders", tasks).shared()))
}

fn idle() -> Arc<AiProfile> {
    Arc::new(AiProfile::new("idle"))
}

/// A leader running `leader_tasks` plus two idle AI units.
fn squad_world(leader_tasks: Vec<Task>) -> (TestWorld, SquadId, u64, [u64; 2]) {
    let mut world = TestWorld::new();
    let squad = world.add_squad(SquadConfig {
        name: "alpha".into(),
        leader_templates: vec!["captain".into()],
        ..SquadConfig::default()
    });
    let leader = world.add_ai(
        Actor::new("captain", Vec2::new(100.0, 100.0)),
        profile(leader_tasks),
    );
    let a = world.add_ai(Actor::new("grunt", Vec2::new(110.0, 100.0)), idle());
    let b = world.add_ai(Actor::new("grunt", Vec2::new(120.0, 100.0)), idle());
    world.join_squad(leader, squad, true);
    world.join_squad(a, squad, false);
    world.join_squad(b, squad, false);
    (world, squad, leader, [a, b])
}

#[test]
fn leader_shares_its_target() {
    let (mut world, _, leader, units) = squad_world(vec![Task::ShareTargetIfLeader]);
    let enemy = world.add(Actor::new("player", Vec2::new(300.0, 300.0)));
    world.set_target(leader, Some(enemy));

    world.think(&ctx(0), leader);
    for unit in units {
        assert_eq!(world.controller_of(unit).target(), Some(enemy));
    }
}

#[test]
fn only_the_leader_may_give_orders() {
    let (mut world, _, _, [unit, _]) = squad_world(Vec::new());
    world.controllers.insert(
        unit,
        AiController::new(unit, profile(vec![Task::ShareTargetIfLeader])).with_trace_log(16),
    );

    world.think(&ctx(0), unit);
    let log = world.controller_of(unit).trace().expect("trace log");
    assert_eq!(log.iter_tag(tags::TASK_FAILURE).count(), 1);
    assert_eq!(world.controller_of(unit).current_behavior_name(), None);
}

#[test]
fn leader_sets_unit_behavior() {
    let charge = Behavior::new("charge", vec![HOLD]).shared();
    let (mut world, _, leader, units) = squad_world(vec![Task::SetUnitBehaviorIfLeader {
        behavior: Some(charge),
    }]);

    world.think(&ctx(0), leader);
    for unit in units {
        assert_eq!(world.controller_of(unit).current_behavior_name(), Some("charge"));
    }
    assert_eq!(world.controller_of(leader).current_behavior_name(), Some("orders"));
}

#[test]
fn units_inherit_the_leaders_target() {
    let (mut world, _, leader, [a, b]) = squad_world(Vec::new());
    let enemy = world.add(Actor::new("player", Vec2::new(300.0, 300.0)));
    world.set_target(leader, Some(enemy));
    world
        .controllers
        .insert(a, AiController::new(a, profile(vec![Task::InheritLeadersTarget])));
    world.controllers.insert(
        b,
        AiController::new(
            b,
            profile(vec![Task::InheritSquadLeadersTarget {
                inherit_even_if_none: false,
            }]),
        ),
    );

    world.think(&ctx(0), a);
    world.think(&ctx(0), b);
    assert_eq!(world.controller_of(a).target(), Some(enemy));
    assert_eq!(world.controller_of(b).target(), Some(enemy));
}

#[test]
fn inheriting_none_is_opt_in() {
    let (mut world, _, _, [a, b]) = squad_world(Vec::new());
    let own = world.add(Actor::new("player", Vec2::new(300.0, 300.0)));
    for (unit, inherit_even_if_none) in [(a, false), (b, true)] {
        world.controllers.insert(
            unit,
            AiController::new(
                unit,
                profile(vec![Task::InheritSquadLeadersTarget {
                    inherit_even_if_none,
                }]),
            ),
        );
        world.set_target(unit, Some(own));
        world.think(&ctx(0), unit);
    }
    assert_eq!(world.controller_of(a).target(), Some(own));
    assert_eq!(world.controller_of(b).target(), None);
}

#[test]
fn inherit_leaders_target_fails_once_the_leader_died() {
    let (mut world, _, leader, [a, _]) = squad_world(Vec::new());
    world.controllers.insert(
        a,
        AiController::new(a, profile(vec![Task::InheritLeadersTarget])).with_trace_log(16),
    );
    world.actor_mut(leader).alive = false;

    world.think(&ctx(0), a);
    let log = world.controller_of(a).trace().expect("trace log");
    assert_eq!(log.iter_tag(tags::TASK_FAILURE).count(), 1);
}

#[test]
fn kill_squad_units_spares_the_leader_unless_asked() {
    let (mut world, squad, leader, units) = squad_world(vec![Task::KillSquadUnits {
        include_self: false,
    }]);
    world.think(&ctx(0), leader);

    assert!(world.actor(leader).alive);
    assert!(units.iter().all(|u| !world.actor(*u).alive));
    assert_eq!(world.squads[&squad].units(), &[leader]);
    assert_eq!(world.squads[&squad].leader(), Some(leader));

    let (mut world, squad, leader, _) =
        squad_world(vec![Task::KillSquadUnits { include_self: true }]);
    world.think(&ctx(0), leader);
    assert!(!world.actor(leader).alive);
    assert!(world.squads[&squad].units().is_empty());
}

#[test]
fn spawn_squad_units_on_command() {
    let mut world = TestWorld::new();
    let squad = world.add_squad(SquadConfig {
        name: "reinforcements".into(),
        unit_templates: vec![UnitTemplate::new("grunt", 2, 2)],
        spawn_position: Vec2::new(300.0, 300.0),
        spawn_radius: 50.0,
        spawn_automatically: false,
        max_live_count: 4,
        ..SquadConfig::default()
    });
    let caller = world.add_ai(
        Actor::new("captain", Vec2::new(100.0, 100.0)),
        profile(vec![Task::SpawnSquadUnits {
            must_be_leader: false,
        }]),
    );
    world.join_squad(caller, squad, false);

    world.think(&ctx(0), caller);
    let spawned: Vec<u64> = world
        .actors
        .iter()
        .filter(|(_, a)| a.class == "grunt")
        .map(|(id, _)| *id)
        .collect();
    assert_eq!(spawned.len(), 2);
    assert!(spawned.iter().all(|id| world.squads[&squad].contains(*id)));
}

#[test]
fn spawn_squad_units_can_require_leadership() {
    let mut world = TestWorld::new();
    let squad = world.add_squad(SquadConfig {
        unit_templates: vec![UnitTemplate::new("grunt", 1, 1)],
        spawn_automatically: false,
        ..SquadConfig::default()
    });
    let caller = world.add_ai(
        Actor::new("captain", Vec2::new(100.0, 100.0)),
        profile(vec![Task::SpawnSquadUnits {
            must_be_leader: true,
        }]),
    );
    world.join_squad(caller, squad, false);

    world.think(&ctx(0), caller);
    assert_eq!(world.actors.len(), 1);
}
