use std::collections::BTreeMap;
use std::time::Duration;

use switchback_core::{
    BlockKind, Command, Event, GameConfig, ItemKind, LevelId, LevelLayout, MobKind, PlayerConfig,
    Spawn, SpawnKind, WorldConfig, WorldPoint,
};
use switchback_world::{self as world, query, World};

#[test]
fn landing_on_the_flag_raises_max_health_and_heals() {
    let spawns = vec![Spawn::new(SpawnKind::Block(BlockKind::Flag), 5, 10)];
    let mut world = start_session(WorldPoint::new(82.0, 16.0), 5, 7, 12, spawns);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Duck, &mut events);
    events.extend(run_ticks(&mut world, 5, 100));

    assert!(events.iter().any(|event| matches!(
        event,
        Event::GoalReached {
            from_above: true,
            ..
        }
    )));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::MaxHealthRaised { max_health: 8 })));
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.max_health, 8);
    assert_eq!(player.health, 8, "the bonus also heals to the new maximum");
    assert_eq!(player.position.y(), 24.0, "the player rests on the pole top");
}

#[test]
fn walking_into_the_flag_scores_the_goal_without_a_bonus() {
    let spawns = vec![Spawn::new(SpawnKind::Block(BlockKind::Flag), 5, 10)];
    let mut world = start_session(WorldPoint::new(40.0, 104.0), 5, 7, 12, spawns);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::MovePlayer { velocity_x: 48.0 },
        &mut events,
    );
    events.extend(run_ticks(&mut world, 12, 100));

    let goals: Vec<bool> = events
        .iter()
        .filter_map(|event| match event {
            Event::GoalReached { from_above, .. } => Some(*from_above),
            _ => None,
        })
        .collect();
    assert_eq!(goals, vec![false]);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::MaxHealthRaised { .. })));
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.max_health, 5);
    assert_eq!(player.health, 5);
    assert!((player.position.x() - 72.0).abs() < 0.01, "the pole is solid");
}

#[test]
fn tunnel_steps_and_descent_follow_the_player() {
    let spawns = vec![Spawn::new(SpawnKind::Block(BlockKind::Tunnel), 2, 4)];
    let mut world = start_session(WorldPoint::new(48.0, 40.0), 5, 6, 8, spawns);
    let tunnel_id = query::blocks(&world).into_vec()[0].id;

    let mut events = Vec::new();
    world::apply(&mut world, Command::Duck, &mut events);
    events.extend(run_ticks(&mut world, 7, 100));
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.standing_on_tunnel, Some(tunnel_id));

    world::apply(&mut world, Command::Jump, &mut events);
    events.extend(run_ticks(&mut world, 4, 100));
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.standing_on_tunnel, None);

    world::apply(&mut world, Command::Duck, &mut events);
    events.extend(run_ticks(&mut world, 18, 100));
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.standing_on_tunnel, Some(tunnel_id));

    // Ducking while standing commits to the descent.
    world::apply(&mut world, Command::Duck, &mut events);
    events.extend(run_ticks(&mut world, 2, 100));
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.standing_on_tunnel, None);

    let steps: Vec<&Event> = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::SteppedOntoTunnel { .. }
                    | Event::SteppedOffTunnel { .. }
                    | Event::TunnelDescended { .. }
            )
        })
        .collect();
    assert_eq!(steps.len(), 4);
    assert!(matches!(steps[0], Event::SteppedOntoTunnel { tunnel } if *tunnel == tunnel_id));
    assert!(matches!(steps[1], Event::SteppedOffTunnel { tunnel } if *tunnel == tunnel_id));
    assert!(matches!(steps[2], Event::SteppedOntoTunnel { tunnel } if *tunnel == tunnel_id));
    assert!(matches!(steps[3], Event::TunnelDescended { tunnel } if *tunnel == tunnel_id));
}

#[test]
fn death_is_reported_once_until_stats_are_reset() {
    let spawns = vec![Spawn::new(SpawnKind::Mob(MobKind::Mushroom), 5, 1)];
    let mut world = start_session(WorldPoint::new(24.0, 24.0), 1, 7, 3, spawns);

    let mut events = run_ticks(&mut world, 30, 100);
    assert_eq!(count_deaths(&events), 1);
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.health, 0);

    // Health stays depleted; the report must not repeat.
    events.extend(run_ticks(&mut world, 10, 100));
    assert_eq!(count_deaths(&events), 1);

    world::apply(&mut world, Command::ResetPlayerStats, &mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PlayerStatsReset { health: 1 })));
    let player = query::player(&world).expect("player snapshot");
    assert_eq!(player.health, 1);
    assert_eq!(player.score, 0);

    // The patrol swings back around and depletes the fresh health bar.
    events.extend(run_ticks(&mut world, 45, 100));
    assert_eq!(count_deaths(&events), 2);
}

#[test]
fn loading_a_level_cancels_timed_effects_and_respawns_the_player() {
    let spawns = vec![
        Spawn::new(SpawnKind::Item(ItemKind::Star), 1, 1),
        Spawn::new(SpawnKind::Block(BlockKind::Switch), 1, 3),
        Spawn::new(SpawnKind::Block(BlockKind::Brick), 3, 3),
    ];
    let mut world = start_session(WorldPoint::new(24.0, 24.0), 5, 8, 7, spawns);

    let mut events = Vec::new();
    world::apply(&mut world, Command::Duck, &mut events);
    events.extend(run_ticks(&mut world, 8, 100));
    let player = query::player(&world).expect("player snapshot");
    let old_id = player.id;
    assert!(player.invincible_until.is_some());
    assert!(player.switch_pending);

    world::apply(
        &mut world,
        Command::LoadLevel {
            level: LevelId::new("caves"),
            layout: LevelLayout::new(
                6,
                6,
                vec![
                    Spawn::new(SpawnKind::Block(BlockKind::Cube), 1, 4),
                    Spawn::new(SpawnKind::Item(ItemKind::Coin), 2, 2),
                ],
            ),
        },
        &mut events,
    );

    assert!(events.iter().any(|event| matches!(
        event,
        Event::LevelLoaded {
            level,
            blocks: 1,
            mobs: 0,
            items: 1,
        } if level == &LevelId::new("caves")
    )));
    assert_eq!(query::current_level(&world), Some(&LevelId::new("caves")));
    assert_eq!(query::clock(&world), Duration::from_millis(800));

    let player = query::player(&world).expect("player snapshot");
    assert_ne!(player.id, old_id, "the level load rebuilt the arena");
    assert_eq!(player.position, WorldPoint::new(24.0, 24.0));
    assert_eq!(player.invincible_until, None);
    assert!(!player.switch_pending);
    assert_eq!(player.health, 5, "health carries across level loads");

    // Neither canceled window may fire later.
    let later = run_ticks(&mut world, 120, 100);
    assert!(!later
        .iter()
        .any(|event| matches!(event, Event::SwitchReleased { .. })));
    assert!(!later
        .iter()
        .any(|event| matches!(event, Event::InvincibilityEnded { .. })));
    assert_eq!(query::items(&world).iter().count(), 1);
}

fn start_session(
    player_spawn: WorldPoint,
    max_health: u32,
    columns: u32,
    rows: u32,
    spawns: Vec<Spawn>,
) -> World {
    let config = GameConfig::new(
        WorldConfig::new(LevelId::new("stage"), 0.0),
        PlayerConfig::new(
            "Scout",
            max_health,
            player_spawn,
            1.0,
            PlayerConfig::DEFAULT_MAX_VELOCITY,
        ),
        BTreeMap::new(),
    );
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureWorld {
            config,
            rng_seed: 11,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::LoadLevel {
            level: LevelId::new("stage"),
            layout: LevelLayout::new(columns, rows, spawns),
        },
        &mut events,
    );
    world
}

fn run_ticks(world: &mut World, count: u32, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    for _ in 0..count {
        world::apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
    }
    events
}

fn count_deaths(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::PlayerDied { score: 0 }))
        .count()
}
