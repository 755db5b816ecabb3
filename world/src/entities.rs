//! Entity arena keyed by stable identifiers with explicit liveness flags.

use std::collections::BTreeMap;
use std::time::Duration;

use switchback_core::{
    BlockKind, Category, EntityId, ItemKind, MobKind, WorldExtent, WorldPoint, WorldVector,
    CELL_LENGTH,
};

/// Signed cruise speed mushrooms patrol with, in world units per second.
pub(crate) const MUSHROOM_TEMPO: f32 = 30.0;
/// Signed cruise speed clouds drift with, in world units per second.
pub(crate) const CLOUD_TEMPO: f32 = 20.0;
/// Simulated time between consecutive fireball drops from one cloud.
pub(crate) const FIREBALL_INTERVAL: Duration = Duration::from_secs(4);

/// Concrete kind tag carried by every arena record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum EntityKind {
    Player,
    Mob(MobKind),
    Block(BlockKind),
    Item(ItemKind),
}

impl EntityKind {
    pub(crate) const fn category(self) -> Category {
        match self {
            Self::Player => Category::Player,
            Self::Mob(_) => Category::Mob,
            Self::Block(_) => Category::Block,
            Self::Item(_) => Category::Item,
        }
    }
}

/// Mutable state of a single entity stored in the arena.
///
/// Records are never removed mid-tick; handlers flip `alive` and the world
/// sweeps dead records once dispatch has finished, so late contact events for
/// a removed entity observe the flag instead of dangling state.
#[derive(Clone, Debug)]
pub(crate) struct EntityRecord {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) position: WorldPoint,
    pub(crate) size: WorldExtent,
    pub(crate) velocity: WorldVector,
    /// Signed horizontal cruise speed; meaningful for patrol mobs only.
    pub(crate) tempo: f32,
    /// Ready state for interactive blocks: unpressed switch, unopened container.
    pub(crate) active: bool,
    pub(crate) alive: bool,
    /// Clock reading at which a cloud releases its next fireball.
    pub(crate) next_drop_at: Option<Duration>,
}

impl EntityRecord {
    pub(crate) const fn category(&self) -> Category {
        self.kind.category()
    }

    pub(crate) const fn is_static(&self) -> bool {
        matches!(self.kind, EntityKind::Block(_) | EntityKind::Item(_))
    }
}

/// Arena of all entities in the loaded level, ordered by identifier.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    records: BTreeMap<EntityId, EntityRecord>,
    next_id: u32,
}

impl Arena {
    /// Inserts a new record, allocating the next identifier.
    ///
    /// Identifiers grow monotonically for the lifetime of the world; clearing
    /// the arena between levels never recycles them.
    pub(crate) fn allocate(
        &mut self,
        kind: EntityKind,
        position: WorldPoint,
        now: Duration,
    ) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        let record = EntityRecord {
            id,
            kind,
            position,
            size: extent_for(kind),
            velocity: WorldVector::new(0.0, 0.0),
            tempo: initial_tempo(kind),
            active: true,
            alive: true,
            next_drop_at: match kind {
                EntityKind::Mob(MobKind::Cloud) => Some(now.saturating_add(FIREBALL_INTERVAL)),
                _ => None,
            },
        };
        let _ = self.records.insert(id, record);
        id
    }

    pub(crate) fn record(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id).filter(|record| record.alive)
    }

    pub(crate) fn record_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(&id).filter(|record| record.alive)
    }

    pub(crate) fn is_alive(&self, id: EntityId) -> bool {
        self.records
            .get(&id)
            .map_or(false, |record| record.alive)
    }

    /// Flags a record dead without removing it; returns whether it was alive.
    pub(crate) fn mark_dead(&mut self, id: EntityId) -> bool {
        match self.records.get_mut(&id) {
            Some(record) if record.alive => {
                record.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Iterates live records in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values().filter(|record| record.alive)
    }

    /// Identifiers of live records, in order, for mutation loops.
    pub(crate) fn live_ids(&self) -> Vec<EntityId> {
        self.iter().map(|record| record.id).collect()
    }

    /// Live entities whose centers lie within `radius` of `center`.
    pub(crate) fn within_radius(&self, center: WorldPoint, radius: f32) -> Vec<EntityId> {
        self.iter()
            .filter(|record| record.position.distance(center) <= radius)
            .map(|record| record.id)
            .collect()
    }

    /// Drops dead records accumulated during the tick.
    pub(crate) fn sweep(&mut self) {
        self.records.retain(|_, record| record.alive);
    }

    /// Removes every record while preserving the identifier counter.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}

/// Bounding size assigned to each entity kind.
pub(crate) fn extent_for(kind: EntityKind) -> WorldExtent {
    match kind {
        EntityKind::Player => WorldExtent::new(CELL_LENGTH, CELL_LENGTH),
        EntityKind::Mob(MobKind::Fireball) => WorldExtent::new(8.0, 8.0),
        EntityKind::Mob(_) => WorldExtent::new(CELL_LENGTH, CELL_LENGTH),
        EntityKind::Block(BlockKind::Flag) => WorldExtent::new(3.2, 144.0),
        EntityKind::Block(BlockKind::Tunnel) => WorldExtent::new(2.0 * CELL_LENGTH, 2.0 * CELL_LENGTH),
        EntityKind::Block(_) => WorldExtent::new(CELL_LENGTH, CELL_LENGTH),
        EntityKind::Item(_) => WorldExtent::new(CELL_LENGTH, CELL_LENGTH),
    }
}

/// World position for an entity spawned from the given map cell.
///
/// Entities anchor their top-left corner to the cell, except flags, whose tall
/// pole is anchored so its base rests on the cell's bottom edge.
pub(crate) fn spawn_position(kind: EntityKind, column: u32, row: u32) -> WorldPoint {
    let size = extent_for(kind);
    let x = column as f32 * CELL_LENGTH + size.width() / 2.0;
    let y = match kind {
        EntityKind::Block(BlockKind::Flag) => {
            (row as f32 + 1.0) * CELL_LENGTH - size.height() / 2.0
        }
        _ => row as f32 * CELL_LENGTH + size.height() / 2.0,
    };
    WorldPoint::new(x, y)
}

fn initial_tempo(kind: EntityKind) -> f32 {
    match kind {
        EntityKind::Mob(MobKind::Mushroom) => MUSHROOM_TEMPO,
        EntityKind::Mob(MobKind::Cloud) => CLOUD_TEMPO,
        _ => 0.0,
    }
}
