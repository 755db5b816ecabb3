//! Axis-aligned movement integration and overlap bookkeeping.

use std::time::Duration;

use switchback_core::{ContactSide, EntityId, Event, MobKind, WorldExtent, WorldPoint, WorldVector};

use crate::entities::{Arena, EntityKind, EntityRecord};

/// Fastest downward speed gravity may accelerate an entity to.
pub(crate) const MAX_FALL_SPEED: f32 = 400.0;
/// Constant fall speed of fireballs, which ignore gravity.
pub(crate) const FIREBALL_FALL_SPEED: f32 = 120.0;
/// Gap tolerance below which an established contact is still considered held.
///
/// Resolution leaves touching entities at exactly zero overlap; without the
/// tolerance every resting contact would separate and re-begin on alternating
/// ticks as gravity sinks the body back in.
const CONTACT_SLOP: f32 = 0.1;

/// Advances every live entity by `dt` under its kind's movement rule.
///
/// Patrol mobs cruise at their tempo and reverse when they reach the level
/// bounds; the reversal is reported so observers see the turn. Fireballs that
/// fall out of the level are destroyed here rather than falling forever.
pub(crate) fn integrate(
    arena: &mut Arena,
    bounds: WorldExtent,
    gravity: f32,
    dt: Duration,
    out_events: &mut Vec<Event>,
) {
    let seconds = dt.as_secs_f32();
    for id in arena.live_ids() {
        let Some(record) = arena.record_mut(id) else {
            continue;
        };
        match record.kind {
            EntityKind::Player => {
                let vy = (record.velocity.y() + gravity * seconds).min(MAX_FALL_SPEED);
                record.velocity = WorldVector::new(record.velocity.x(), vy);
                advance(record, seconds);
                let _ = clamp_to_bounds(record, bounds);
            }
            EntityKind::Mob(MobKind::Mushroom) => {
                let vy = (record.velocity.y() + gravity * seconds).min(MAX_FALL_SPEED);
                record.velocity = WorldVector::new(record.tempo, vy);
                advance(record, seconds);
                if clamp_to_bounds(record, bounds) {
                    record.tempo = -record.tempo;
                    out_events.push(Event::MobReversed {
                        mob: id,
                        tempo: record.tempo,
                    });
                }
            }
            EntityKind::Mob(MobKind::Cloud) => {
                record.velocity = WorldVector::new(record.tempo, 0.0);
                advance(record, seconds);
                if clamp_to_bounds(record, bounds) {
                    record.tempo = -record.tempo;
                    out_events.push(Event::MobReversed {
                        mob: id,
                        tempo: record.tempo,
                    });
                }
            }
            EntityKind::Mob(MobKind::Fireball) => {
                record.velocity = WorldVector::new(0.0, FIREBALL_FALL_SPEED);
                advance(record, seconds);
                if record.position.y() - record.size.height() / 2.0 >= bounds.height() {
                    let _ = arena.mark_dead(id);
                    out_events.push(Event::MobDestroyed {
                        mob: id,
                        kind: MobKind::Fireball,
                        cause: switchback_core::DestructionCause::Impact,
                    });
                }
            }
            EntityKind::Block(_) | EntityKind::Item(_) => {}
        }
    }
}

fn advance(record: &mut EntityRecord, seconds: f32) {
    record.position = WorldPoint::new(
        record.position.x() + record.velocity.x() * seconds,
        record.position.y() + record.velocity.y() * seconds,
    );
}

/// Keeps a record inside the level rectangle, treating the edges as walls.
///
/// Returns true when a horizontal edge was hit, which is the patrol reversal
/// trigger. Velocity components pointing out of the level are zeroed.
fn clamp_to_bounds(record: &mut EntityRecord, bounds: WorldExtent) -> bool {
    let half_w = record.size.width() / 2.0;
    let half_h = record.size.height() / 2.0;
    let mut x = record.position.x();
    let mut y = record.position.y();
    let mut vx = record.velocity.x();
    let mut vy = record.velocity.y();
    let mut hit_side = false;

    if x - half_w < 0.0 {
        x = half_w;
        vx = vx.max(0.0);
        hit_side = true;
    } else if x + half_w > bounds.width() {
        x = bounds.width() - half_w;
        vx = vx.min(0.0);
        hit_side = true;
    }
    if y - half_h < 0.0 {
        y = half_h;
        vy = vy.max(0.0);
    } else if y + half_h > bounds.height() {
        y = bounds.height() - half_h;
        vy = vy.min(0.0);
    }

    record.position = WorldPoint::new(x, y);
    record.velocity = WorldVector::new(vx, vy);
    hit_side
}

/// Signed overlap of two records on each axis; positive means interpenetration.
fn axis_overlaps(a: &EntityRecord, b: &EntityRecord) -> (f32, f32) {
    let overlap_x = (a.size.width() + b.size.width()) / 2.0 - (a.position.x() - b.position.x()).abs();
    let overlap_y =
        (a.size.height() + b.size.height()) / 2.0 - (a.position.y() - b.position.y()).abs();
    (overlap_x, overlap_y)
}

/// Whether an established contact still holds within the slop tolerance.
pub(crate) fn still_touching(arena: &Arena, a: EntityId, b: EntityId) -> bool {
    match (arena.record(a), arena.record(b)) {
        (Some(first), Some(second)) => {
            let (overlap_x, overlap_y) = axis_overlaps(first, second);
            overlap_x > -CONTACT_SLOP && overlap_y > -CONTACT_SLOP
        }
        _ => false,
    }
}

/// All interpenetrating pairs of live records, keyed smaller identifier first.
///
/// Pairs of two immobile entities are skipped; nothing can begin a contact
/// between bodies that never move.
pub(crate) fn overlapping_pairs(arena: &Arena) -> Vec<(EntityId, EntityId)> {
    let records: Vec<&EntityRecord> = arena.iter().collect();
    let mut pairs = Vec::new();
    for (index, first) in records.iter().enumerate() {
        for second in &records[index + 1..] {
            if first.is_static() && second.is_static() {
                continue;
            }
            let (overlap_x, overlap_y) = axis_overlaps(first, second);
            if overlap_x > 0.0 && overlap_y > 0.0 {
                pairs.push((first.id, second.id));
            }
        }
    }
    pairs
}

/// Side of `other` that `agent` struck, judged from the overlap geometry.
///
/// The shallower axis is the axis of approach: a body landing on a surface
/// penetrates less vertically than it overlaps horizontally. Equal overlaps
/// classify vertically, which favors landings.
pub(crate) fn contact_side(agent: &EntityRecord, other: &EntityRecord) -> ContactSide {
    let (overlap_x, overlap_y) = axis_overlaps(agent, other);
    if overlap_y <= overlap_x {
        if agent.position.y() <= other.position.y() {
            ContactSide::Above
        } else {
            ContactSide::Below
        }
    } else if agent.position.x() <= other.position.x() {
        ContactSide::Left
    } else {
        ContactSide::Right
    }
}

/// Pushes `agent` out of `other` along the shallower axis and cancels the
/// velocity component that points into the struck face.
pub(crate) fn resolve_penetration(arena: &mut Arena, agent: EntityId, other: EntityId) {
    let (side, depth) = {
        let (Some(first), Some(second)) = (arena.record(agent), arena.record(other)) else {
            return;
        };
        let (overlap_x, overlap_y) = axis_overlaps(first, second);
        if overlap_x <= 0.0 || overlap_y <= 0.0 {
            return;
        }
        (contact_side(first, second), overlap_x.min(overlap_y))
    };
    let Some(record) = arena.record_mut(agent) else {
        return;
    };
    let (x, y) = (record.position.x(), record.position.y());
    let (vx, vy) = (record.velocity.x(), record.velocity.y());
    match side {
        ContactSide::Above => {
            record.position = WorldPoint::new(x, y - depth);
            record.velocity = WorldVector::new(vx, vy.min(0.0));
        }
        ContactSide::Below => {
            record.position = WorldPoint::new(x, y + depth);
            record.velocity = WorldVector::new(vx, vy.max(0.0));
        }
        ContactSide::Left => {
            record.position = WorldPoint::new(x - depth, y);
            record.velocity = WorldVector::new(vx.min(0.0), vy);
        }
        ContactSide::Right => {
            record.position = WorldPoint::new(x + depth, y);
            record.velocity = WorldVector::new(vx.max(0.0), vy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{contact_side, integrate, overlapping_pairs, resolve_penetration};
    use crate::entities::{Arena, EntityKind};
    use std::time::Duration;
    use switchback_core::{
        BlockKind, ContactSide, Event, MobKind, WorldExtent, WorldPoint, WorldVector,
    };

    fn arena_with(entries: &[(EntityKind, WorldPoint)]) -> (Arena, Vec<switchback_core::EntityId>) {
        let mut arena = Arena::default();
        let ids = entries
            .iter()
            .map(|(kind, position)| arena.allocate(*kind, *position, Duration::ZERO))
            .collect();
        (arena, ids)
    }

    #[test]
    fn shallower_axis_names_the_struck_face() {
        let (arena, ids) = arena_with(&[
            (EntityKind::Player, WorldPoint::new(24.0, 10.0)),
            (EntityKind::Block(BlockKind::Brick), WorldPoint::new(24.0, 24.0)),
        ]);
        let player = arena.record(ids[0]).expect("player");
        let block = arena.record(ids[1]).expect("block");
        assert_eq!(contact_side(player, block), ContactSide::Above);

        let (arena, ids) = arena_with(&[
            (EntityKind::Player, WorldPoint::new(38.0, 24.0)),
            (EntityKind::Block(BlockKind::Brick), WorldPoint::new(24.0, 24.0)),
        ]);
        let player = arena.record(ids[0]).expect("player");
        let block = arena.record(ids[1]).expect("block");
        assert_eq!(contact_side(player, block), ContactSide::Right);
    }

    #[test]
    fn equal_overlaps_classify_vertically() {
        let (arena, ids) = arena_with(&[
            (EntityKind::Player, WorldPoint::new(34.0, 34.0)),
            (EntityKind::Block(BlockKind::Brick), WorldPoint::new(24.0, 24.0)),
        ]);
        let player = arena.record(ids[0]).expect("player");
        let block = arena.record(ids[1]).expect("block");
        assert_eq!(contact_side(player, block), ContactSide::Below);
    }

    #[test]
    fn static_pairs_are_never_reported() {
        let (arena, _) = arena_with(&[
            (EntityKind::Block(BlockKind::Brick), WorldPoint::new(24.0, 24.0)),
            (EntityKind::Block(BlockKind::Cube), WorldPoint::new(28.0, 24.0)),
        ]);
        assert!(overlapping_pairs(&arena).is_empty());
    }

    #[test]
    fn resolution_restores_contact_to_a_touch() {
        let (mut arena, ids) = arena_with(&[
            (EntityKind::Player, WorldPoint::new(24.0, 12.0)),
            (EntityKind::Block(BlockKind::Brick), WorldPoint::new(24.0, 24.0)),
        ]);
        {
            let record = arena.record_mut(ids[0]).expect("player");
            record.velocity = WorldVector::new(0.0, 40.0);
        }
        resolve_penetration(&mut arena, ids[0], ids[1]);
        let record = arena.record(ids[0]).expect("player");
        assert!((record.position.y() - 8.0).abs() < 1e-4);
        assert_eq!(record.velocity.y(), 0.0);
    }

    #[test]
    fn patrol_mobs_reverse_at_the_level_edge() {
        let (mut arena, ids) = arena_with(&[(
            EntityKind::Mob(MobKind::Cloud),
            WorldPoint::new(152.0, 24.0),
        )]);
        let mut events = Vec::new();
        integrate(
            &mut arena,
            WorldExtent::new(160.0, 160.0),
            0.0,
            Duration::from_secs(1),
            &mut events,
        );
        let record = arena.record(ids[0]).expect("cloud");
        assert!(record.tempo < 0.0);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::MobReversed { mob, .. } if *mob == ids[0])));
    }

    #[test]
    fn fireballs_leaving_the_level_are_destroyed() {
        let (mut arena, ids) = arena_with(&[(
            EntityKind::Mob(MobKind::Fireball),
            WorldPoint::new(24.0, 156.0),
        )]);
        let mut events = Vec::new();
        integrate(
            &mut arena,
            WorldExtent::new(160.0, 160.0),
            0.0,
            Duration::from_secs(1),
            &mut events,
        );
        assert!(!arena.is_alive(ids[0]));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::MobDestroyed { mob, .. } if *mob == ids[0])));
    }
}
