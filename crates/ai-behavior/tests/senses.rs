mod support;

use ai_behavior::senses::{evaluate, SenseMemory, SenseProbe};
use ai_behavior::{Factions, Perception, Senses};
use ai_nav::Vec2;
use ai_squad::SquadConfig;

use support::{Actor, TestWorld};

fn probe(agent: u64, target: Option<u64>) -> SenseProbe<u64> {
    SenseProbe {
        agent,
        target,
        has_locomotor: false,
        perception: Perception::default(),
    }
}

/// An actor facing +X with a target ahead, a weapon, a squad and company.
fn busy_world() -> (TestWorld, u64, u64) {
    let mut world = TestWorld::new();
    let me = world.add(Actor::new("grunt", Vec2::new(100.0, 100.0)).armed(50.0));
    let target = world.add(
        Actor::new("player", Vec2::new(150.0, 100.0))
            .facing(Vec2::new(-1.0, 0.0))
            .with_factions(Factions::PLAYER),
    );
    world.add(Actor::new("grunt", Vec2::new(130.0, 110.0)));
    let squad = world.add_squad(SquadConfig::default());
    world.join_squad(me, squad, true);
    (world, me, target)
}

#[test]
fn evaluation_never_reports_unrequested_senses() {
    let (world, me, target) = busy_world();
    let mut masks = vec![
        Senses::empty(),
        Senses::all(),
        Senses::HEALTH_BUCKETS,
        Senses::MOTION,
        Senses::TARGET_DETAILS,
        Senses::WEAPON,
        Senses::CROWD,
        Senses::SQUAD,
        Senses::HAS_TARGET | Senses::ALLIES_NEARBY,
    ];
    masks.extend(Senses::all().iter());

    for mask in masks {
        let mut memory = SenseMemory::default();
        let sensed = evaluate(mask, &probe(me, Some(target)), &mut memory, &world);
        assert!(mask.contains(sensed), "{sensed:?} not within {mask:?}");
    }
}

#[test]
fn crowd_ray_runs_only_for_crowd_senses() {
    let (world, me, target) = busy_world();
    let mut memory = SenseMemory::default();
    let everything_else = Senses::all() - Senses::CROWD;

    for mask in [everything_else, Senses::HEALTH_BUCKETS, Senses::SQUAD, Senses::empty()] {
        evaluate(mask, &probe(me, Some(target)), &mut memory, &world);
    }
    assert_eq!(world.ray_queries.get(), 0);

    evaluate(Senses::ENEMIES_NEARBY, &probe(me, Some(target)), &mut memory, &world);
    assert_eq!(world.ray_queries.get(), 1);
}

#[test]
fn exactly_one_health_bucket_for_every_ratio() {
    for step in -20..=140 {
        let ratio = step as f32 / 100.0;
        let bucket = Senses::health_bucket(ratio);
        assert_eq!(bucket.bits().count_ones(), 1, "ratio {ratio}");
        assert!(Senses::HEALTH_BUCKETS.contains(bucket));
    }
    assert_eq!(Senses::health_bucket(1.0), Senses::FULL_HEALTH);
    assert_eq!(Senses::health_bucket(0.9), Senses::HEALTH_BELOW_FULL);
    assert_eq!(Senses::health_bucket(0.75), Senses::HEALTH_BELOW_75_PCT);
    assert_eq!(Senses::health_bucket(0.5), Senses::HEALTH_BELOW_50_PCT);
    assert_eq!(Senses::health_bucket(0.2), Senses::HEALTH_BELOW_25_PCT);
    assert_eq!(Senses::health_bucket(0.05), Senses::HEALTH_BELOW_10_PCT);
    assert_eq!(Senses::health_bucket(f32::NAN), Senses::HEALTH_BELOW_10_PCT);
}

#[test]
fn damage_is_measured_against_the_previous_evaluation() {
    let (mut world, me, _) = busy_world();
    let mut memory = SenseMemory::default();
    let mask = Senses::DAMAGE_TAKEN | Senses::HEALTH_BUCKETS;

    let first = evaluate(mask, &probe(me, None), &mut memory, &world);
    assert_eq!(first, Senses::FULL_HEALTH);

    world.actor_mut(me).health.current = 40.0;
    let hurt = evaluate(mask, &probe(me, None), &mut memory, &world);
    assert_eq!(hurt, Senses::DAMAGE_TAKEN | Senses::HEALTH_BELOW_50_PCT);

    // Health memory updates even when damage was not asked for.
    world.actor_mut(me).health.current = 30.0;
    evaluate(Senses::HAS_TARGET, &probe(me, None), &mut memory, &world);
    let steady = evaluate(mask, &probe(me, None), &mut memory, &world);
    assert!(!steady.contains(Senses::DAMAGE_TAKEN));
}

#[test]
fn target_facts() {
    let (mut world, me, target) = busy_world();
    let mut memory = SenseMemory::default();

    let sensed = evaluate(Senses::all(), &probe(me, Some(target)), &mut memory, &world);
    assert!(sensed.contains(
        Senses::HAS_TARGET
            | Senses::TARGET_VISIBLE
            | Senses::TARGET_IN_RANGE
            | Senses::TARGET_FACING_ME
    ));
    assert!(!sensed.contains(Senses::TARGET_DEAD));

    // Behind us: out of the sight cone, and now looking away.
    world.actor_mut(target).position = Vec2::new(20.0, 100.0);
    let sensed = evaluate(Senses::all(), &probe(me, Some(target)), &mut memory, &world);
    assert!(sensed.contains(Senses::HAS_TARGET));
    assert!(!sensed.intersects(Senses::TARGET_VISIBLE | Senses::TARGET_FACING_ME));

    world.actor_mut(target).alive = false;
    let sensed = evaluate(Senses::all(), &probe(me, Some(target)), &mut memory, &world);
    assert!(sensed.contains(Senses::HAS_TARGET | Senses::TARGET_DEAD));
    assert!(!sensed.contains(Senses::TARGET_VISIBLE));

    world.actors.remove(&target);
    let sensed = evaluate(Senses::all(), &probe(me, Some(target)), &mut memory, &world);
    assert!(!sensed.intersects(Senses::HAS_TARGET | Senses::TARGET_DETAILS));
}

#[test]
fn weapon_and_ammo() {
    let (mut world, me, _) = busy_world();
    let mut memory = SenseMemory::default();

    let sensed = evaluate(Senses::WEAPON, &probe(me, None), &mut memory, &world);
    assert_eq!(sensed, Senses::HAS_WEAPON | Senses::HAS_AMMO);

    if let Some(weapon) = world.actor_mut(me).weapon.as_mut() {
        weapon.ammo = Some(0);
    }
    let sensed = evaluate(Senses::WEAPON, &probe(me, None), &mut memory, &world);
    assert_eq!(sensed, Senses::HAS_WEAPON);
}

#[test]
fn crowd_counts_decide_supremacy_and_outnumbered() {
    let mut world = TestWorld::new();
    let me = world.add(Actor::new("grunt", Vec2::new(100.0, 300.0)));
    for i in 0..5 {
        world.add(
            Actor::new("player", Vec2::new(150.0 + 20.0 * i as f32, 300.0))
                .with_factions(Factions::PLAYER),
        );
    }
    let ally = world.add(Actor::new("grunt", Vec2::new(140.0, 320.0)));
    // Behind the actor: outside the trace.
    world.add(Actor::new("player", Vec2::new(20.0, 300.0)).with_factions(Factions::PLAYER));

    let mut memory = SenseMemory::default();
    let sensed = evaluate(Senses::CROWD, &probe(me, None), &mut memory, &world);
    assert_eq!(
        sensed,
        Senses::ALLIES_NEARBY | Senses::ENEMIES_NEARBY | Senses::OUTNUMBERED
    );

    // Dead allies do not count; 0 allies vs 5 enemies is still outnumbered.
    world.actor_mut(ally).alive = false;
    let sensed = evaluate(Senses::CROWD, &probe(me, None), &mut memory, &world);
    assert_eq!(sensed, Senses::ENEMIES_NEARBY | Senses::OUTNUMBERED);
}

#[test]
fn squad_facts() {
    let mut world = TestWorld::new();
    let leader = world.add(Actor::new("captain", Vec2::new(100.0, 100.0)));
    let unit = world.add(Actor::new("grunt", Vec2::new(110.0, 100.0)));
    let squad = world.add_squad(SquadConfig {
        leader_templates: vec!["captain".into()],
        ..SquadConfig::default()
    });
    world.join_squad(leader, squad, true);
    world.join_squad(unit, squad, false);

    let mut memory = SenseMemory::default();
    let sensed = evaluate(Senses::SQUAD, &probe(leader, None), &mut memory, &world);
    assert_eq!(sensed, Senses::IN_SQUAD | Senses::IS_SQUAD_LEADER);

    let sensed = evaluate(Senses::SQUAD, &probe(unit, None), &mut memory, &world);
    assert_eq!(sensed, Senses::IN_SQUAD);

    world.actor_mut(leader).alive = false;
    let sensed = evaluate(Senses::SQUAD, &probe(unit, None), &mut memory, &world);
    assert!(sensed.contains(Senses::SQUAD_LEADER_DEAD));

    let loner = world.add(Actor::new("grunt", Vec2::new(300.0, 300.0)));
    let sensed = evaluate(Senses::SQUAD, &probe(loner, None), &mut memory, &world);
    assert_eq!(sensed, Senses::empty());
}
