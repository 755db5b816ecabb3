//! Time-gated player status effects and their expiry handling.

use std::time::Duration;

use switchback_core::{BlockKind, EntityId, Event, WorldPoint};

use crate::entities::EntityKind;
use crate::World;

/// How long star invincibility lasts once collected.
pub(crate) const INVINCIBILITY_WINDOW: Duration = Duration::from_secs(10);
/// How long pressed-switch bricks stay removed before restoration.
pub(crate) const SWITCH_WINDOW: Duration = Duration::from_secs(10);

/// Switch effect state carried by the player.
///
/// At most one effect can be pending; a press while pending is suppressed.
/// The pending state remembers where the captured bricks stood so expiry can
/// restore them at exactly those positions.
#[derive(Clone, Debug)]
pub(crate) enum SwitchEffect {
    Ready,
    Pending {
        switch: EntityId,
        expires_at: Duration,
        bricks: Vec<WorldPoint>,
    },
}

impl SwitchEffect {
    pub(crate) const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Expires effect windows whose deadline the clock has reached.
///
/// Runs after contact dispatch each tick, so a contact landing on the same
/// tick as the deadline still sees the effect active.
pub(crate) fn evaluate(world: &mut World, out_events: &mut Vec<Event>) {
    let now = world.clock;

    if let Some(player) = world.player.as_mut() {
        if let Some(expires_at) = player.invincible_until {
            if now >= expires_at {
                player.invincible_until = None;
                out_events.push(Event::InvincibilityEnded { at: now });
            }
        }
    }

    let due = world.player.as_ref().map_or(false, |player| {
        matches!(&player.switch, SwitchEffect::Pending { expires_at, .. } if now >= *expires_at)
    });
    if !due {
        return;
    }
    let effect = match world.player.as_mut() {
        Some(player) => std::mem::replace(&mut player.switch, SwitchEffect::Ready),
        None => return,
    };
    let SwitchEffect::Pending { switch, bricks, .. } = effect else {
        return;
    };
    let bricks_restored = bricks.len() as u32;
    for position in bricks {
        let _ = world
            .arena
            .allocate(EntityKind::Block(BlockKind::Brick), position, now);
    }
    if let Some(record) = world.arena.record_mut(switch) {
        record.active = true;
    }
    out_events.push(Event::SwitchReleased {
        switch,
        bricks_restored,
    });
}

#[cfg(test)]
mod tests {
    use super::{evaluate, SwitchEffect};
    use crate::entities::EntityKind;
    use crate::{apply, query, World};
    use std::collections::BTreeMap;
    use std::time::Duration;
    use switchback_core::{
        BlockKind, Command, Event, GameConfig, LevelId, LevelLayout, PlayerConfig, WorldConfig,
        WorldPoint,
    };

    fn configured_world() -> World {
        let config = GameConfig::new(
            WorldConfig::new(LevelId::new("plains"), 0.0),
            PlayerConfig::new(
                "Scout",
                5,
                WorldPoint::new(24.0, 24.0),
                1.0,
                PlayerConfig::DEFAULT_MAX_VELOCITY,
            ),
            BTreeMap::new(),
        );
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureWorld {
                config,
                rng_seed: 7,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::LoadLevel {
                level: LevelId::new("plains"),
                layout: LevelLayout::new(10, 10, Vec::new()),
            },
            &mut events,
        );
        world
    }

    #[test]
    fn invincibility_expires_once_the_deadline_passes() {
        let mut world = configured_world();
        if let Some(player) = world.player.as_mut() {
            player.invincible_until = Some(Duration::from_secs(5));
        }
        world.clock = Duration::from_secs(4);
        let mut events = Vec::new();
        evaluate(&mut world, &mut events);
        assert!(events.is_empty());

        world.clock = Duration::from_secs(5);
        evaluate(&mut world, &mut events);
        assert_eq!(
            events,
            vec![Event::InvincibilityEnded {
                at: Duration::from_secs(5)
            }]
        );
        let snapshot = query::player(&world).expect("player snapshot");
        assert_eq!(snapshot.invincible_until, None);
    }

    #[test]
    fn switch_expiry_restores_bricks_and_rearms_the_switch() {
        let mut world = configured_world();
        let position = WorldPoint::new(56.0, 56.0);
        let switch = world.arena.allocate(
            EntityKind::Block(BlockKind::Switch),
            WorldPoint::new(24.0, 56.0),
            Duration::ZERO,
        );
        if let Some(record) = world.arena.record_mut(switch) {
            record.active = false;
        }
        if let Some(player) = world.player.as_mut() {
            player.switch = SwitchEffect::Pending {
                switch,
                expires_at: Duration::from_secs(10),
                bricks: vec![position],
            };
        }
        world.clock = Duration::from_secs(10);
        let mut events = Vec::new();
        evaluate(&mut world, &mut events);

        assert!(events.contains(&Event::SwitchReleased {
            switch,
            bricks_restored: 1,
        }));
        let blocks = query::blocks(&world);
        assert!(blocks
            .iter()
            .any(|block| block.kind == BlockKind::Brick && block.position == position));
        let rearmed = blocks
            .iter()
            .find(|block| block.id == switch)
            .expect("switch present");
        assert!(rearmed.active);
        let snapshot = query::player(&world).expect("player snapshot");
        assert!(!snapshot.switch_pending);
    }

    #[test]
    fn pending_switch_holds_until_its_deadline() {
        let mut world = configured_world();
        if let Some(player) = world.player.as_mut() {
            player.switch = SwitchEffect::Pending {
                switch: switchback_core::EntityId::new(999),
                expires_at: Duration::from_secs(10),
                bricks: Vec::new(),
            };
        }
        world.clock = Duration::from_secs(9);
        let mut events = Vec::new();
        evaluate(&mut world, &mut events);
        assert!(events.is_empty());
        assert!(world
            .player
            .as_ref()
            .map_or(false, |player| player.switch.is_pending()));
    }
}
