#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Switchback.

use std::{collections::BTreeMap, time::Duration};

use switchback_core::{
    Command, EntityId, Event, GameConfig, LevelId, LevelLayout, LoadRejection, MobKind,
    SpawnKind, WorldExtent, WorldPoint, WorldVector, CELL_LENGTH, WELCOME_BANNER,
};

mod effects;
mod entities;
mod physics;
mod router;

pub use router::{BeginHandler, CollisionRouter, ContactBinding, SeparateHandler};

use effects::SwitchEffect;
use entities::{Arena, EntityKind, FIREBALL_INTERVAL};
use router::Contact;

/// Upward launch speed applied when the player jumps from vertical rest.
pub(crate) const JUMP_SPEED: f32 = 150.0;
/// Downward speed applied when the player ducks.
pub(crate) const DUCK_SPEED: f32 = 30.0;
/// Upward launch applied by bounce blocks struck from above.
pub(crate) const BOUNCE_LAUNCH_SPEED: f32 = 180.0;
/// Upward hop applied to the player after stomping a mob.
pub(crate) const STOMP_LAUNCH_SPEED: f32 = 50.0;
/// Horizontal knockback impulse magnitude, divided by the player's mass.
pub(crate) const KNOCKBACK_IMPULSE: f32 = 50.0;
/// Radius around a pressed switch within which bricks are captured.
pub(crate) const SWITCH_RADIUS: f32 = 60.0;
/// Permanent health ceiling increase granted by reaching a flag top.
pub(crate) const FLAG_HEALTH_BONUS: u32 = 3;
/// Fewest items a stocked container block releases when opened.
pub(crate) const MYSTERY_DROP_MIN: u32 = 3;

/// Authoritative simulation state for one play session.
///
/// All mutation flows through [`apply`]; adapters observe the world through
/// the [`query`] module and the events each command emits.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    pub(crate) rules: Option<Rules>,
    pub(crate) player: Option<PlayerState>,
    pub(crate) arena: Arena,
    pub(crate) router: CollisionRouter,
    pub(crate) contacts: BTreeMap<(EntityId, EntityId), Contact>,
    pub(crate) clock: Duration,
    bounds: WorldExtent,
    level: Option<LevelId>,
    pub(crate) random_state: u64,
}

impl World {
    /// Creates a new Switchback world awaiting configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            rules: None,
            player: None,
            arena: Arena::default(),
            router: CollisionRouter::with_default_bindings(),
            contacts: BTreeMap::new(),
            clock: Duration::ZERO,
            bounds: WorldExtent::new(0.0, 0.0),
            level: None,
            random_state: 0,
        }
    }

    fn configure(&mut self, config: GameConfig, rng_seed: u64, out_events: &mut Vec<Event>) {
        let player = config.player();
        self.rules = Some(Rules {
            gravity: config.world().gravity(),
            mass: player.mass(),
            max_velocity: player.max_velocity(),
            spawn: player.spawn(),
        });
        self.player = Some(PlayerState {
            body: None,
            name: player.name().to_string(),
            health: player.max_health(),
            max_health: player.max_health(),
            score: 0,
            invincible_until: None,
            switch: SwitchEffect::Ready,
            standing_on_tunnel: None,
            death_reported: false,
        });
        self.random_state = rng_seed;
        out_events.push(Event::WorldConfigured {
            player_name: player.name().to_string(),
            max_health: player.max_health(),
        });
    }

    /// Replaces the arena contents with a level layout.
    ///
    /// Pending effect windows are cancelled rather than carried across the
    /// transition, and the player body respawns at the configured spawn point
    /// with its persistent stats intact.
    fn load_level(&mut self, level: LevelId, layout: LevelLayout, out_events: &mut Vec<Event>) {
        let spawn = match self.rules.as_ref() {
            Some(rules) => rules.spawn,
            None => {
                out_events.push(Event::LevelLoadRejected {
                    level,
                    reason: LoadRejection::WorldNotConfigured,
                });
                return;
            }
        };
        self.arena.clear();
        self.contacts.clear();
        self.bounds = WorldExtent::new(layout.width(), layout.height());

        let mut blocks = 0_u32;
        let mut mobs = 0_u32;
        let mut items = 0_u32;
        for entry in layout.spawns() {
            let kind = match entry.kind() {
                SpawnKind::Block(kind) => {
                    blocks += 1;
                    EntityKind::Block(kind)
                }
                SpawnKind::Item(kind) => {
                    items += 1;
                    EntityKind::Item(kind)
                }
                SpawnKind::Mob(kind) => {
                    mobs += 1;
                    EntityKind::Mob(kind)
                }
            };
            let position = entities::spawn_position(kind, entry.column(), entry.row());
            let _ = self.arena.allocate(kind, position, self.clock);
        }
        let body = self.arena.allocate(EntityKind::Player, spawn, self.clock);

        if let Some(player) = self.player.as_mut() {
            player.body = Some(body);
            player.invincible_until = None;
            player.switch = SwitchEffect::Ready;
            player.standing_on_tunnel = None;
            player.death_reported = false;
        }
        self.level = Some(level.clone());
        out_events.push(Event::LevelLoaded {
            level,
            blocks,
            mobs,
            items,
        });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });
        let Some(rules) = self.rules.as_ref() else {
            return;
        };
        let gravity = rules.gravity;
        physics::integrate(&mut self.arena, self.bounds, gravity, dt, out_events);
        self.drop_due_fireballs(out_events);
        router::dispatch_contacts(self, out_events);
        effects::evaluate(self, out_events);
        self.check_player_death(out_events);
        self.sweep();
    }

    fn move_player(&mut self, velocity_x: f32) {
        let Some(cap) = self.rules.as_ref().map(|rules| rules.max_velocity) else {
            return;
        };
        let Some(body) = self.player_body() else {
            return;
        };
        if let Some(record) = self.arena.record_mut(body) {
            let vy = record.velocity.y();
            record.velocity = WorldVector::new(velocity_x.clamp(-cap, cap), vy);
        }
    }

    fn jump(&mut self) {
        let Some(body) = self.player_body() else {
            return;
        };
        if let Some(record) = self.arena.record_mut(body) {
            if record.velocity.y() == 0.0 {
                let vx = record.velocity.x();
                record.velocity = WorldVector::new(vx, -JUMP_SPEED);
            }
        }
    }

    fn duck(&mut self, out_events: &mut Vec<Event>) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        let Some(body) = player.body else {
            return;
        };
        let tunnel = player.standing_on_tunnel.take();
        if let Some(record) = self.arena.record_mut(body) {
            let vx = record.velocity.x();
            record.velocity = WorldVector::new(vx, DUCK_SPEED);
        }
        if let Some(tunnel) = tunnel {
            if self.arena.is_alive(tunnel) {
                out_events.push(Event::TunnelDescended { tunnel });
            }
        }
    }

    fn reset_player_stats(&mut self, out_events: &mut Vec<Event>) {
        if let Some(player) = self.player.as_mut() {
            player.health = player.max_health;
            player.score = 0;
            player.death_reported = false;
            out_events.push(Event::PlayerStatsReset {
                health: player.health,
            });
        }
    }

    /// Spawns fireballs from clouds whose drop deadline has passed.
    fn drop_due_fireballs(&mut self, out_events: &mut Vec<Event>) {
        let now = self.clock;
        let due: Vec<(EntityId, WorldPoint)> = self
            .arena
            .iter()
            .filter_map(|record| match (record.kind, record.next_drop_at) {
                (EntityKind::Mob(MobKind::Cloud), Some(at)) if now >= at => {
                    Some((record.id, record.position))
                }
                _ => None,
            })
            .collect();
        for (cloud, position) in due {
            let drop_point = WorldPoint::new(position.x(), position.y() + CELL_LENGTH);
            let fireball = self
                .arena
                .allocate(EntityKind::Mob(MobKind::Fireball), drop_point, now);
            if let Some(record) = self.arena.record_mut(cloud) {
                record.next_drop_at = Some(now.saturating_add(FIREBALL_INTERVAL));
            }
            out_events.push(Event::FireballDropped { cloud, fireball });
        }
    }

    /// Reports the player's death exactly once per depletion of health.
    fn check_player_death(&mut self, out_events: &mut Vec<Event>) {
        if let Some(player) = self.player.as_mut() {
            if player.health == 0 && !player.death_reported {
                player.death_reported = true;
                out_events.push(Event::PlayerDied {
                    score: player.score,
                });
            }
        }
    }

    fn sweep(&mut self) {
        self.arena.sweep();
        let arena = &self.arena;
        self.contacts
            .retain(|pair, _| arena.is_alive(pair.0) && arena.is_alive(pair.1));
    }

    fn player_body(&self) -> Option<EntityId> {
        self.player.as_ref().and_then(|player| player.body)
    }

    pub(crate) fn player_is_invincible(&self) -> bool {
        self.player
            .as_ref()
            .and_then(|player| player.invincible_until)
            .map_or(false, |expires_at| self.clock < expires_at)
    }

    pub(crate) fn damage_player(&mut self, by: EntityId, out_events: &mut Vec<Event>) {
        if let Some(player) = self.player.as_mut() {
            player.health = player.health.saturating_sub(1);
            out_events.push(Event::PlayerDamaged {
                by,
                health: player.health,
            });
        }
    }

    pub(crate) fn player_mass(&self) -> f32 {
        self.rules.as_ref().map_or(1.0, |rules| rules.mass)
    }

    /// Draws the next value in `0..span` from the deterministic stream.
    pub(crate) fn roll(&mut self, span: u64) -> u64 {
        self.random_state = next_random(self.random_state);
        (self.random_state >> 33) % span
    }
}

/// Applies a command to the world, recording emitted events.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureWorld { config, rng_seed } => {
            world.configure(config, rng_seed, out_events);
        }
        Command::LoadLevel { level, layout } => world.load_level(level, layout, out_events),
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePlayer { velocity_x } => world.move_player(velocity_x),
        Command::Jump => world.jump(),
        Command::Duck => world.duck(out_events),
        Command::ResetPlayerStats => world.reset_player_stats(out_events),
    }
}

/// Read-only access to world state for adapters and systems.
pub mod query {
    use std::time::Duration;

    use switchback_core::{
        BlockSnapshot, BlockView, EntityId, ItemSnapshot, ItemView, LevelId, MobSnapshot,
        MobView, PlayerSnapshot, WorldPoint,
    };

    use crate::entities::EntityKind;
    use crate::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current simulation clock reading.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Identifier of the currently loaded level, if any.
    #[must_use]
    pub fn current_level(world: &World) -> Option<&LevelId> {
        world.level.as_ref()
    }

    /// Snapshot of the player's stats and body, if a level is loaded.
    #[must_use]
    pub fn player(world: &World) -> Option<PlayerSnapshot> {
        let state = world.player.as_ref()?;
        let body = state.body?;
        let record = world.arena.record(body)?;
        Some(PlayerSnapshot {
            id: body,
            name: state.name.clone(),
            health: state.health,
            max_health: state.max_health,
            score: state.score,
            position: record.position,
            velocity: record.velocity,
            invincible_until: state.invincible_until,
            switch_pending: state.switch.is_pending(),
            standing_on_tunnel: state.standing_on_tunnel,
        })
    }

    /// View of every live block, ordered by identifier.
    #[must_use]
    pub fn blocks(world: &World) -> BlockView {
        let snapshots = world
            .arena
            .iter()
            .filter_map(|record| match record.kind {
                EntityKind::Block(kind) => Some(BlockSnapshot {
                    id: record.id,
                    kind,
                    position: record.position,
                    size: record.size,
                    active: record.active,
                }),
                _ => None,
            })
            .collect();
        BlockView::from_snapshots(snapshots)
    }

    /// View of every live mob, ordered by identifier.
    #[must_use]
    pub fn mobs(world: &World) -> MobView {
        let snapshots = world
            .arena
            .iter()
            .filter_map(|record| match record.kind {
                EntityKind::Mob(kind) => Some(MobSnapshot {
                    id: record.id,
                    kind,
                    position: record.position,
                    size: record.size,
                    tempo: record.tempo,
                }),
                _ => None,
            })
            .collect();
        MobView::from_snapshots(snapshots)
    }

    /// View of every live item, ordered by identifier.
    #[must_use]
    pub fn items(world: &World) -> ItemView {
        let snapshots = world
            .arena
            .iter()
            .filter_map(|record| match record.kind {
                EntityKind::Item(kind) => Some(ItemSnapshot {
                    id: record.id,
                    kind,
                    position: record.position,
                    size: record.size,
                }),
                _ => None,
            })
            .collect();
        ItemView::from_snapshots(snapshots)
    }

    /// Identifiers of live entities whose centers lie within the radius.
    #[must_use]
    pub fn entities_within_radius(
        world: &World,
        center: WorldPoint,
        radius: f32,
    ) -> Vec<EntityId> {
        world.arena.within_radius(center, radius)
    }
}

/// Session rules captured from the configuration at startup.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Rules {
    pub(crate) gravity: f32,
    pub(crate) mass: f32,
    pub(crate) max_velocity: f32,
    pub(crate) spawn: WorldPoint,
}

/// Persistent player stats that survive level transitions.
#[derive(Clone, Debug)]
pub(crate) struct PlayerState {
    pub(crate) body: Option<EntityId>,
    pub(crate) name: String,
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) score: u32,
    pub(crate) invincible_until: Option<Duration>,
    pub(crate) switch: SwitchEffect,
    pub(crate) standing_on_tunnel: Option<EntityId>,
    /// Guards the death report so one depletion emits exactly one event.
    pub(crate) death_reported: bool,
}

fn next_random(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::{apply, query, World};
    use std::collections::BTreeMap;
    use std::time::Duration;
    use switchback_core::{
        BlockKind, Command, Event, GameConfig, ItemKind, LevelId, LevelLayout, LoadRejection,
        MobKind, PlayerConfig, Spawn, SpawnKind, WorldConfig, WorldPoint, WELCOME_BANNER,
    };

    fn test_config(gravity: f32) -> GameConfig {
        GameConfig::new(
            WorldConfig::new(LevelId::new("plains"), gravity),
            PlayerConfig::new(
                "Scout",
                5,
                WorldPoint::new(24.0, 24.0),
                1.0,
                PlayerConfig::DEFAULT_MAX_VELOCITY,
            ),
            BTreeMap::new(),
        )
    }

    fn configured_world(gravity: f32, spawns: Vec<Spawn>) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureWorld {
                config: test_config(gravity),
                rng_seed: 11,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::LoadLevel {
                level: LevelId::new("plains"),
                layout: LevelLayout::new(20, 20, spawns),
            },
            &mut events,
        );
        (world, events)
    }

    #[test]
    fn world_reports_welcome_banner() {
        let world = World::new();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn configure_announces_the_player() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureWorld {
                config: test_config(0.0),
                rng_seed: 1,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::WorldConfigured {
                player_name: "Scout".to_string(),
                max_health: 5,
            }]
        );
        assert!(query::player(&world).is_none(), "no body before a load");
    }

    #[test]
    fn load_before_configure_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::LoadLevel {
                level: LevelId::new("plains"),
                layout: LevelLayout::new(4, 4, Vec::new()),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::LevelLoadRejected {
                level: LevelId::new("plains"),
                reason: LoadRejection::WorldNotConfigured,
            }]
        );
    }

    #[test]
    fn load_level_spawns_layout_and_player() {
        let spawns = vec![
            Spawn::new(SpawnKind::Block(BlockKind::Brick), 0, 10),
            Spawn::new(SpawnKind::Block(BlockKind::Cube), 1, 10),
            Spawn::new(SpawnKind::Item(ItemKind::Coin), 5, 5),
            Spawn::new(SpawnKind::Mob(MobKind::Mushroom), 8, 10),
        ];
        let (world, events) = configured_world(0.0, spawns);
        assert!(events.contains(&Event::LevelLoaded {
            level: LevelId::new("plains"),
            blocks: 2,
            mobs: 1,
            items: 1,
        }));
        assert_eq!(query::blocks(&world).iter().count(), 2);
        assert_eq!(query::mobs(&world).iter().count(), 1);
        assert_eq!(query::items(&world).iter().count(), 1);
        let player = query::player(&world).expect("player snapshot");
        assert_eq!(player.position, WorldPoint::new(24.0, 24.0));
        assert_eq!(query::current_level(&world), Some(&LevelId::new("plains")));
    }

    #[test]
    fn tick_advances_the_clock() {
        let (mut world, _) = configured_world(0.0, Vec::new());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(10),
            },
            &mut events,
        );
        assert_eq!(
            events.first(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(10)
            })
        );
        assert_eq!(query::clock(&world), Duration::from_millis(10));
    }

    #[test]
    fn move_player_clamps_to_the_configured_cap() {
        let (mut world, _) = configured_world(0.0, Vec::new());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer { velocity_x: 9999.0 },
            &mut events,
        );
        let player = query::player(&world).expect("player snapshot");
        assert_eq!(player.velocity.x(), PlayerConfig::DEFAULT_MAX_VELOCITY);
    }

    #[test]
    fn jump_requires_vertical_rest() {
        let (mut world, _) = configured_world(0.0, Vec::new());
        let mut events = Vec::new();
        apply(&mut world, Command::Jump, &mut events);
        let airborne = query::player(&world).expect("player snapshot");
        assert_eq!(airborne.velocity.y(), -super::JUMP_SPEED);

        apply(&mut world, Command::Jump, &mut events);
        let still_airborne = query::player(&world).expect("player snapshot");
        assert_eq!(still_airborne.velocity.y(), -super::JUMP_SPEED);
    }

    #[test]
    fn duck_pushes_the_player_down() {
        let (mut world, _) = configured_world(0.0, Vec::new());
        let mut events = Vec::new();
        apply(&mut world, Command::Duck, &mut events);
        let player = query::player(&world).expect("player snapshot");
        assert_eq!(player.velocity.y(), super::DUCK_SPEED);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::TunnelDescended { .. })),
            "ducking away from a tunnel must not descend",
        );
    }

    #[test]
    fn reset_restores_health_and_clears_score() {
        let (mut world, _) = configured_world(0.0, Vec::new());
        if let Some(player) = world.player.as_mut() {
            player.health = 1;
            player.score = 42;
        }
        let mut events = Vec::new();
        apply(&mut world, Command::ResetPlayerStats, &mut events);
        assert_eq!(events, vec![Event::PlayerStatsReset { health: 5 }]);
        let player = query::player(&world).expect("player snapshot");
        assert_eq!(player.score, 0);
        assert_eq!(player.health, 5);
    }

    #[test]
    fn player_commands_before_configure_are_ignored() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::MovePlayer { velocity_x: 10.0 },
            &mut events,
        );
        apply(&mut world, Command::Jump, &mut events);
        apply(&mut world, Command::Duck, &mut events);
        assert!(events.is_empty());
    }
}
