//! Contact dispatch table and the per-pair interaction handlers.

use std::collections::BTreeMap;

use switchback_core::{
    BlockKind, Category, ContactSide, DestructionCause, EntityId, Event, ItemKind, WorldPoint,
    WorldVector, CELL_LENGTH,
};

use crate::effects::{SwitchEffect, INVINCIBILITY_WINDOW, SWITCH_WINDOW};
use crate::entities::{Arena, EntityKind};
use crate::physics;
use crate::{
    World, BOUNCE_LAUNCH_SPEED, FLAG_HEALTH_BONUS, KNOCKBACK_IMPULSE, MYSTERY_DROP_MIN,
    STOMP_LAUNCH_SPEED, SWITCH_RADIUS,
};

/// Named contact-begin handler understood by the dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeginHandler {
    /// Pickup resolution between the player and an item.
    PlayerItem,
    /// Terrain interaction between the player and a block.
    PlayerBlock,
    /// Combat resolution between the player and a mob.
    PlayerMob,
    /// Terrain interaction between a mob and a block.
    MobBlock,
    /// Mutual resolution between two mobs.
    MobMob,
    /// Inert pairing between a mob and an item.
    MobItem,
}

/// Named contact-end handler understood by the dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeparateHandler {
    /// Clears standing state when the player leaves a block.
    PlayerBlock,
}

/// Handlers bound to one category pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactBinding {
    /// Handler invoked when the pair starts overlapping.
    pub on_begin: BeginHandler,
    /// Handler invoked when an established contact ends, if any.
    pub on_separate: Option<SeparateHandler>,
}

/// Dispatch table mapping unordered category pairs to their handlers.
///
/// Lookups are symmetric: binding `(Player, Block)` also answers
/// `(Block, Player)`. Unbound pairs are ignored by dispatch.
#[derive(Clone, Debug, Default)]
pub struct CollisionRouter {
    bindings: BTreeMap<(Category, Category), ContactBinding>,
}

impl CollisionRouter {
    /// Creates an empty table with no pairs bound.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the table with every interaction pair bound.
    #[must_use]
    pub fn with_default_bindings() -> Self {
        let mut router = Self::empty();
        router.bind(
            Category::Player,
            Category::Item,
            ContactBinding {
                on_begin: BeginHandler::PlayerItem,
                on_separate: None,
            },
        );
        router.bind(
            Category::Player,
            Category::Block,
            ContactBinding {
                on_begin: BeginHandler::PlayerBlock,
                on_separate: Some(SeparateHandler::PlayerBlock),
            },
        );
        router.bind(
            Category::Player,
            Category::Mob,
            ContactBinding {
                on_begin: BeginHandler::PlayerMob,
                on_separate: None,
            },
        );
        router.bind(
            Category::Mob,
            Category::Block,
            ContactBinding {
                on_begin: BeginHandler::MobBlock,
                on_separate: None,
            },
        );
        router.bind(
            Category::Mob,
            Category::Mob,
            ContactBinding {
                on_begin: BeginHandler::MobMob,
                on_separate: None,
            },
        );
        router.bind(
            Category::Mob,
            Category::Item,
            ContactBinding {
                on_begin: BeginHandler::MobItem,
                on_separate: None,
            },
        );
        router
    }

    /// Binds a category pair to its handlers, replacing any previous binding.
    pub fn bind(&mut self, a: Category, b: Category, binding: ContactBinding) {
        let _ = self.bindings.insert(normalize(a, b), binding);
    }

    /// Looks up the binding for a category pair in either order.
    #[must_use]
    pub fn binding(&self, a: Category, b: Category) -> Option<ContactBinding> {
        self.bindings.get(&normalize(a, b)).copied()
    }
}

fn normalize(a: Category, b: Category) -> (Category, Category) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Bookkeeping for one established contact episode.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Contact {
    pub(crate) solid: bool,
}

/// Runs one tick's worth of contact bookkeeping.
///
/// Established contacts that no longer hold are separated first, then new
/// overlaps begin, then every surviving solid contact has its penetration
/// resolved. Handlers observe removals from earlier in the same pass through
/// the liveness flags and degrade to no-ops.
pub(crate) fn dispatch_contacts(world: &mut World, out_events: &mut Vec<Event>) {
    let established: Vec<(EntityId, EntityId)> = world.contacts.keys().copied().collect();
    for pair in established {
        if physics::still_touching(&world.arena, pair.0, pair.1) {
            continue;
        }
        let both_alive = world.arena.is_alive(pair.0) && world.arena.is_alive(pair.1);
        if world.contacts.remove(&pair).is_some() && both_alive {
            dispatch_separate(world, pair.0, pair.1, out_events);
        }
    }

    for pair in physics::overlapping_pairs(&world.arena) {
        if world.contacts.contains_key(&pair) {
            continue;
        }
        let solid = dispatch_begin(world, pair.0, pair.1, out_events);
        let _ = world.contacts.insert(pair, Contact { solid });
    }

    let solid_pairs: Vec<(EntityId, EntityId)> = world
        .contacts
        .iter()
        .filter(|(_, contact)| contact.solid)
        .map(|(pair, _)| *pair)
        .collect();
    for (a, b) in solid_pairs {
        if !world.arena.is_alive(a) || !world.arena.is_alive(b) {
            continue;
        }
        let (agent, object) = role_order(&world.arena, a, b);
        physics::resolve_penetration(&mut world.arena, agent, object);
    }
}

/// Orders a pair so the moving agent comes first: player before anything,
/// mobs before terrain and items.
fn role_order(arena: &Arena, a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    let category_of = |id: EntityId| arena.record(id).map(|record| record.category());
    match (category_of(a), category_of(b)) {
        (_, Some(Category::Player)) => (b, a),
        (Some(Category::Player), _) => (a, b),
        (_, Some(Category::Mob)) if category_of(a) != Some(Category::Mob) => (b, a),
        _ => (a, b),
    }
}

fn dispatch_begin(
    world: &mut World,
    a: EntityId,
    b: EntityId,
    out_events: &mut Vec<Event>,
) -> bool {
    let (agent, object) = role_order(&world.arena, a, b);
    let (side, pair) = {
        let (Some(first), Some(second)) = (world.arena.record(agent), world.arena.record(object))
        else {
            return false;
        };
        (
            physics::contact_side(first, second),
            (first.category(), second.category()),
        )
    };
    let Some(binding) = world.router.binding(pair.0, pair.1) else {
        return false;
    };
    match binding.on_begin {
        BeginHandler::PlayerItem => on_player_item(world, agent, object, out_events),
        BeginHandler::PlayerBlock => on_player_block(world, agent, object, side, out_events),
        BeginHandler::PlayerMob => on_player_mob(world, agent, object, side, out_events),
        BeginHandler::MobBlock => on_mob_block(world, agent, object, side, out_events),
        BeginHandler::MobMob => on_mob_mob(world, agent, object, out_events),
        BeginHandler::MobItem => false,
    }
}

fn dispatch_separate(world: &mut World, a: EntityId, b: EntityId, out_events: &mut Vec<Event>) {
    let (agent, object) = role_order(&world.arena, a, b);
    let pair = {
        let (Some(first), Some(second)) = (world.arena.record(agent), world.arena.record(object))
        else {
            return;
        };
        (first.category(), second.category())
    };
    let Some(binding) = world.router.binding(pair.0, pair.1) else {
        return;
    };
    match binding.on_separate {
        Some(SeparateHandler::PlayerBlock) => {
            on_player_block_separate(world, agent, object, out_events);
        }
        None => {}
    }
}

/// Pickups are consumed on first touch and never block movement.
fn on_player_item(
    world: &mut World,
    player_id: EntityId,
    item_id: EntityId,
    out_events: &mut Vec<Event>,
) -> bool {
    let Some(item) = world.arena.record(item_id) else {
        return false;
    };
    let EntityKind::Item(kind) = item.kind else {
        return false;
    };
    if !world.arena.is_alive(player_id) {
        return false;
    }
    let _ = world.arena.mark_dead(item_id);
    let Some(player) = world.player.as_mut() else {
        return false;
    };
    let value = kind.score_value();
    player.score = player.score.saturating_add(value);
    out_events.push(Event::ItemCollected {
        item: item_id,
        kind,
        value,
        score: player.score,
    });
    if kind == ItemKind::Star {
        let expires_at = world.clock.saturating_add(INVINCIBILITY_WINDOW);
        player.invincible_until = Some(expires_at);
        out_events.push(Event::InvincibilityStarted { expires_at });
    }
    false
}

fn on_player_block(
    world: &mut World,
    player_id: EntityId,
    block_id: EntityId,
    side: ContactSide,
    out_events: &mut Vec<Event>,
) -> bool {
    let Some(block) = world.arena.record(block_id) else {
        return false;
    };
    let EntityKind::Block(kind) = block.kind else {
        return false;
    };
    let block_position = block.position;
    let block_active = block.active;
    if !world.arena.is_alive(player_id) {
        return false;
    }
    match kind {
        BlockKind::Brick | BlockKind::BrickBase | BlockKind::Cube => true,
        BlockKind::Bounce => {
            if side == ContactSide::Above {
                if let Some(player) = world.arena.record_mut(player_id) {
                    player.velocity = WorldVector::new(0.0, -BOUNCE_LAUNCH_SPEED);
                }
                out_events.push(Event::PlayerBounced {
                    by: block_id,
                    velocity_y: -BOUNCE_LAUNCH_SPEED,
                });
            }
            true
        }
        BlockKind::Switch => {
            if side == ContactSide::Above && block_active {
                press_switch(world, block_id, block_position, out_events);
            }
            true
        }
        BlockKind::Mystery { drop } => {
            if side == ContactSide::Below && block_active {
                open_mystery(world, block_id, block_position, drop, out_events);
            }
            true
        }
        BlockKind::Flag => {
            let from_above = side == ContactSide::Above;
            if from_above {
                if let Some(player) = world.player.as_mut() {
                    player.max_health = player.max_health.saturating_add(FLAG_HEALTH_BONUS);
                    player.health = player.max_health;
                    out_events.push(Event::MaxHealthRaised {
                        max_health: player.max_health,
                    });
                }
            }
            out_events.push(Event::GoalReached {
                goal: block_id,
                from_above,
            });
            true
        }
        BlockKind::Tunnel => {
            if side == ContactSide::Above {
                if let Some(player) = world.player.as_mut() {
                    if player.standing_on_tunnel.is_none() {
                        player.standing_on_tunnel = Some(block_id);
                        out_events.push(Event::SteppedOntoTunnel { tunnel: block_id });
                    }
                }
            }
            true
        }
    }
}

fn on_player_block_separate(
    world: &mut World,
    _player_id: EntityId,
    block_id: EntityId,
    out_events: &mut Vec<Event>,
) {
    if let Some(player) = world.player.as_mut() {
        if player.standing_on_tunnel == Some(block_id) {
            player.standing_on_tunnel = None;
            out_events.push(Event::SteppedOffTunnel { tunnel: block_id });
        }
    }
}

fn on_player_mob(
    world: &mut World,
    player_id: EntityId,
    mob_id: EntityId,
    side: ContactSide,
    out_events: &mut Vec<Event>,
) -> bool {
    let Some(mob) = world.arena.record(mob_id) else {
        return false;
    };
    let EntityKind::Mob(kind) = mob.kind else {
        return false;
    };
    let mob_x = mob.position.x();
    if !world.arena.is_alive(player_id) {
        return false;
    }
    let invincible = world.player_is_invincible();

    if kind.is_projectile() {
        let _ = world.arena.mark_dead(mob_id);
        out_events.push(Event::MobDestroyed {
            mob: mob_id,
            kind,
            cause: DestructionCause::Impact,
        });
        if !invincible {
            world.damage_player(mob_id, out_events);
        }
        return false;
    }

    if invincible {
        let _ = world.arena.mark_dead(mob_id);
        out_events.push(Event::MobDestroyed {
            mob: mob_id,
            kind,
            cause: DestructionCause::InvincibleContact,
        });
        return true;
    }

    if side == ContactSide::Above {
        let _ = world.arena.mark_dead(mob_id);
        out_events.push(Event::MobDestroyed {
            mob: mob_id,
            kind,
            cause: DestructionCause::Stomped,
        });
        if let Some(player) = world.arena.record_mut(player_id) {
            player.velocity = WorldVector::new(0.0, -STOMP_LAUNCH_SPEED);
        }
        out_events.push(Event::PlayerBounced {
            by: mob_id,
            velocity_y: -STOMP_LAUNCH_SPEED,
        });
        return true;
    }

    world.damage_player(mob_id, out_events);
    let impulse = KNOCKBACK_IMPULSE / world.player_mass();
    let player_x = world
        .arena
        .record(player_id)
        .map_or(mob_x, |player| player.position.x());
    let velocity_x = if player_x <= mob_x { -impulse } else { impulse };
    if let Some(player) = world.arena.record_mut(player_id) {
        let vy = player.velocity.y();
        player.velocity = WorldVector::new(velocity_x, vy);
    }
    out_events.push(Event::PlayerKnockedBack {
        by: mob_id,
        velocity_x,
    });
    if let Some(record) = world.arena.record_mut(mob_id) {
        record.tempo = -record.tempo;
        let tempo = record.tempo;
        out_events.push(Event::MobReversed { mob: mob_id, tempo });
    }
    true
}

fn on_mob_block(
    world: &mut World,
    mob_id: EntityId,
    block_id: EntityId,
    side: ContactSide,
    out_events: &mut Vec<Event>,
) -> bool {
    let (Some(mob), Some(block)) = (world.arena.record(mob_id), world.arena.record(block_id))
    else {
        return false;
    };
    let EntityKind::Mob(kind) = mob.kind else {
        return false;
    };
    let EntityKind::Block(block_kind) = block.kind else {
        return false;
    };

    if kind.is_projectile() {
        if block_kind.is_brick() {
            let _ = world.arena.mark_dead(block_id);
            out_events.push(Event::BlockDestroyed {
                block: block_id,
                by: mob_id,
            });
        }
        let _ = world.arena.mark_dead(mob_id);
        out_events.push(Event::MobDestroyed {
            mob: mob_id,
            kind,
            cause: DestructionCause::Impact,
        });
        return false;
    }

    if side.is_lateral() {
        if let Some(record) = world.arena.record_mut(mob_id) {
            record.tempo = -record.tempo;
            let tempo = record.tempo;
            out_events.push(Event::MobReversed { mob: mob_id, tempo });
        }
    }
    true
}

/// Mobs never push each other around, so the pair is always passable.
fn on_mob_mob(
    world: &mut World,
    first_id: EntityId,
    second_id: EntityId,
    out_events: &mut Vec<Event>,
) -> bool {
    let (Some(first), Some(second)) = (
        world.arena.record(first_id),
        world.arena.record(second_id),
    ) else {
        return false;
    };
    let (EntityKind::Mob(first_kind), EntityKind::Mob(second_kind)) = (first.kind, second.kind)
    else {
        return false;
    };

    if first_kind.is_projectile() || second_kind.is_projectile() {
        for (id, kind) in [(first_id, first_kind), (second_id, second_kind)] {
            let _ = world.arena.mark_dead(id);
            let cause = if kind.is_projectile() {
                DestructionCause::Impact
            } else {
                DestructionCause::ProjectileHit
            };
            out_events.push(Event::MobDestroyed { mob: id, kind, cause });
        }
        return false;
    }

    if first_kind == second_kind {
        for id in [first_id, second_id] {
            if let Some(record) = world.arena.record_mut(id) {
                record.tempo = -record.tempo;
                let tempo = record.tempo;
                out_events.push(Event::MobReversed { mob: id, tempo });
            }
        }
    }
    false
}

/// Presses a switch: captures nearby bricks, remembers their positions, and
/// opens the restoration window. A pending effect suppresses the press.
fn press_switch(
    world: &mut World,
    switch_id: EntityId,
    center: WorldPoint,
    out_events: &mut Vec<Event>,
) {
    let ready = world
        .player
        .as_ref()
        .map_or(false, |player| matches!(player.switch, SwitchEffect::Ready));
    if !ready {
        return;
    }

    let mut bricks = Vec::new();
    for id in world.arena.within_radius(center, SWITCH_RADIUS) {
        let Some(record) = world.arena.record(id) else {
            continue;
        };
        if let EntityKind::Block(kind) = record.kind {
            if kind.is_brick() {
                bricks.push((id, record.position));
            }
        }
    }
    for (id, _) in &bricks {
        let _ = world.arena.mark_dead(*id);
    }
    if let Some(record) = world.arena.record_mut(switch_id) {
        record.active = false;
    }

    let expires_at = world.clock.saturating_add(SWITCH_WINDOW);
    let positions: Vec<WorldPoint> = bricks.iter().map(|(_, position)| *position).collect();
    let bricks_removed = positions.len() as u32;
    if let Some(player) = world.player.as_mut() {
        player.switch = SwitchEffect::Pending {
            switch: switch_id,
            expires_at,
            bricks: positions,
        };
    }
    out_events.push(Event::SwitchPressed {
        switch: switch_id,
        bricks_removed,
    });
}

/// Opens a container block from below, spawning its configured drops.
fn open_mystery(
    world: &mut World,
    block_id: EntityId,
    center: WorldPoint,
    drop: Option<ItemKind>,
    out_events: &mut Vec<Event>,
) {
    if let Some(record) = world.arena.record_mut(block_id) {
        record.active = false;
    }
    let drops = match drop {
        Some(kind) => {
            let count = MYSTERY_DROP_MIN + world.roll(4) as u32;
            let position = WorldPoint::new(center.x(), center.y() - CELL_LENGTH);
            for _ in 0..count {
                let item = world
                    .arena
                    .allocate(EntityKind::Item(kind), position, world.clock);
                out_events.push(Event::ItemSpawned {
                    item,
                    kind,
                    position,
                });
            }
            count
        }
        None => 0,
    };
    out_events.push(Event::MysteryOpened {
        block: block_id,
        drops,
    });
}

#[cfg(test)]
mod tests {
    use super::{BeginHandler, CollisionRouter, ContactBinding, SeparateHandler};
    use switchback_core::Category;

    #[test]
    fn default_table_binds_every_interaction_pair() {
        let router = CollisionRouter::with_default_bindings();
        let pairs = [
            (Category::Player, Category::Item),
            (Category::Player, Category::Block),
            (Category::Player, Category::Mob),
            (Category::Mob, Category::Block),
            (Category::Mob, Category::Mob),
            (Category::Mob, Category::Item),
        ];
        for (a, b) in pairs {
            assert!(router.binding(a, b).is_some(), "missing binding {a:?}/{b:?}");
        }
    }

    #[test]
    fn lookups_are_order_insensitive() {
        let router = CollisionRouter::with_default_bindings();
        assert_eq!(
            router.binding(Category::Block, Category::Player),
            router.binding(Category::Player, Category::Block),
        );
    }

    #[test]
    fn rebinding_replaces_the_previous_entry() {
        let mut router = CollisionRouter::empty();
        router.bind(
            Category::Player,
            Category::Block,
            ContactBinding {
                on_begin: BeginHandler::PlayerBlock,
                on_separate: Some(SeparateHandler::PlayerBlock),
            },
        );
        router.bind(
            Category::Block,
            Category::Player,
            ContactBinding {
                on_begin: BeginHandler::PlayerBlock,
                on_separate: None,
            },
        );
        let binding = router
            .binding(Category::Player, Category::Block)
            .expect("binding");
        assert_eq!(binding.on_separate, None);
    }
}
