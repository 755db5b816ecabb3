#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Switchback engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Switchback.";

/// Side length of a single level-map cell measured in world units.
pub const CELL_LENGTH: f32 = 16.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs the session rules and creates the player before any level loads.
    ConfigureWorld {
        /// Validated configuration describing the world and player.
        config: GameConfig,
        /// Seed for the world's deterministic random stream.
        rng_seed: u64,
    },
    /// Replaces every entity in the world with the provided level layout.
    LoadLevel {
        /// Identifier of the level being loaded.
        level: LevelId,
        /// Parsed spawn grid describing the level contents.
        layout: LevelLayout,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Sets the player's horizontal velocity, clamped to the configured maximum.
    MovePlayer {
        /// Requested horizontal velocity in world units per second.
        velocity_x: f32,
    },
    /// Launches the player upward when vertically at rest.
    Jump,
    /// Pushes the player downward, consuming a standing-on-tunnel flag if set.
    Duck,
    /// Restores the player's health to maximum and the score to zero.
    ResetPlayerStats,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the session rules were installed.
    WorldConfigured {
        /// Display name assigned to the player.
        player_name: String,
        /// Maximum health the player starts with.
        max_health: u32,
    },
    /// Confirms that a level layout replaced the world contents.
    LevelLoaded {
        /// Identifier of the level that was loaded.
        level: LevelId,
        /// Number of blocks spawned from the layout.
        blocks: u32,
        /// Number of mobs spawned from the layout.
        mobs: u32,
        /// Number of items spawned from the layout.
        items: u32,
    },
    /// Reports that a level load request was rejected.
    LevelLoadRejected {
        /// Identifier of the level that failed to load.
        level: LevelId,
        /// Specific reason the load failed.
        reason: LoadRejection,
    },
    /// Confirms that the player collected an item.
    ItemCollected {
        /// Identifier of the collected item.
        item: EntityId,
        /// Kind of item that was collected.
        kind: ItemKind,
        /// Score value granted by the item.
        value: u32,
        /// Player score after the pickup.
        score: u32,
    },
    /// Confirms that an item entered the world outside a level load.
    ItemSpawned {
        /// Identifier assigned to the new item.
        item: EntityId,
        /// Kind of item that spawned.
        kind: ItemKind,
        /// World position the item occupies.
        position: WorldPoint,
    },
    /// Confirms that a container block opened and released its contents.
    MysteryOpened {
        /// Identifier of the container block.
        block: EntityId,
        /// Number of items the container released.
        drops: u32,
    },
    /// Announces that the player's invincibility window opened or restarted.
    InvincibilityStarted {
        /// Clock reading at which the window closes.
        expires_at: Duration,
    },
    /// Announces that the player's invincibility window elapsed.
    InvincibilityEnded {
        /// Clock reading when the window was observed closed.
        at: Duration,
    },
    /// Reports that the player lost health to a contact.
    PlayerDamaged {
        /// Entity responsible for the damage.
        by: EntityId,
        /// Player health after the damage was applied.
        health: u32,
    },
    /// Reports that the player's health reached zero.
    PlayerDied {
        /// Final score at the moment of death.
        score: u32,
    },
    /// Confirms that the player's health and score were restored to defaults.
    PlayerStatsReset {
        /// Health value after the reset.
        health: u32,
    },
    /// Announces a permanent increase of the player's maximum health.
    MaxHealthRaised {
        /// Maximum health after the increase.
        max_health: u32,
    },
    /// Reports that a bounce or stomp launched the player straight up.
    PlayerBounced {
        /// Block or mob that caused the launch.
        by: EntityId,
        /// Vertical velocity applied to the player.
        velocity_y: f32,
    },
    /// Reports that a damaging contact pushed the player away horizontally.
    PlayerKnockedBack {
        /// Mob that caused the knockback.
        by: EntityId,
        /// Horizontal velocity applied to the player.
        velocity_x: f32,
    },
    /// Confirms that a mob was removed from the world.
    MobDestroyed {
        /// Identifier of the destroyed mob.
        mob: EntityId,
        /// Kind of the destroyed mob.
        kind: MobKind,
        /// What destroyed the mob.
        cause: DestructionCause,
    },
    /// Reports that a patrol mob reversed its cruise direction.
    MobReversed {
        /// Identifier of the mob that reversed.
        mob: EntityId,
        /// Signed horizontal speed after the reversal.
        tempo: f32,
    },
    /// Confirms that a block was destroyed by a projectile.
    BlockDestroyed {
        /// Identifier of the destroyed block.
        block: EntityId,
        /// Projectile responsible for the destruction.
        by: EntityId,
    },
    /// Confirms that a cloud mob released a falling projectile.
    FireballDropped {
        /// Cloud that released the projectile.
        cloud: EntityId,
        /// Identifier assigned to the projectile.
        fireball: EntityId,
    },
    /// Confirms that the player pressed a switch and bricks were captured.
    SwitchPressed {
        /// Identifier of the pressed switch.
        switch: EntityId,
        /// Number of brick blocks removed by the effect.
        bricks_removed: u32,
    },
    /// Confirms that a switch effect elapsed and its bricks were restored.
    SwitchReleased {
        /// Identifier of the switch whose effect resolved.
        switch: EntityId,
        /// Number of brick blocks restored at their recorded positions.
        bricks_restored: u32,
    },
    /// Reports that the player touched a flag goal.
    GoalReached {
        /// Identifier of the flag block.
        goal: EntityId,
        /// Whether the contact came from above the flag.
        from_above: bool,
    },
    /// Reports that the player began standing on a tunnel goal.
    SteppedOntoTunnel {
        /// Identifier of the tunnel block.
        tunnel: EntityId,
    },
    /// Reports that the player separated from a tunnel goal.
    SteppedOffTunnel {
        /// Identifier of the tunnel block.
        tunnel: EntityId,
    },
    /// Reports that the player ducked into a tunnel goal.
    TunnelDescended {
        /// Identifier of the tunnel block.
        tunnel: EntityId,
    },
}

/// Reasons a level load request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadRejection {
    /// No configuration was installed before the load was requested.
    WorldNotConfigured,
}

/// What removed a mob from the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DestructionCause {
    /// The player landed on the mob from above.
    Stomped,
    /// An invincible player touched the mob.
    InvincibleContact,
    /// A projectile mob struck the entity.
    ProjectileHit,
    /// The projectile spent itself against whatever it touched.
    Impact,
}

/// Unique identifier assigned to an entity for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier naming a level, matching its map file name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(String);

impl LevelId {
    /// Creates a new level identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Broad entity classification used to key collision dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// The single player-controlled entity.
    Player,
    /// Autonomous hostile entities.
    Mob,
    /// Static terrain and interactive blocks.
    Block,
    /// Collectible pickups.
    Item,
}

/// Kinds of autonomous mobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MobKind {
    /// Ground patroller subject to gravity; damages the player on side contact.
    Mushroom,
    /// Flying patroller that periodically drops fireballs.
    Cloud,
    /// Falling projectile that destroys itself, and bricks, on contact.
    Fireball,
}

impl MobKind {
    /// Reports whether the mob patrols (as opposed to flying ballistically).
    #[must_use]
    pub const fn is_patrol(self) -> bool {
        matches!(self, Self::Mushroom | Self::Cloud)
    }

    /// Reports whether the mob is a projectile.
    #[must_use]
    pub const fn is_projectile(self) -> bool {
        matches!(self, Self::Fireball)
    }
}

/// Kinds of blocks that can occupy level cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Plain destructible terrain; removable by switches and projectiles.
    Brick,
    /// Ground terrain with no contact effect.
    BrickBase,
    /// Decorative solid terrain with no contact effect.
    Cube,
    /// Launches the player straight up on a top contact.
    Bounce,
    /// Removes nearby bricks for a fixed window when pressed from above.
    Switch,
    /// Goal that ends the level on player contact.
    Flag,
    /// Goal the player can descend into by ducking while standing on it.
    Tunnel,
    /// Container that releases items when struck from below.
    Mystery {
        /// Item the container releases, if any.
        drop: Option<ItemKind>,
    },
}

impl BlockKind {
    /// Reports whether the block is plain brick, the only kind switches remove.
    #[must_use]
    pub const fn is_brick(self) -> bool {
        matches!(self, Self::Brick)
    }
}

/// Kinds of collectible items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Currency pickup worth a fixed score value.
    Coin,
    /// Power-up that opens the player's invincibility window.
    Star,
}

impl ItemKind {
    /// Score granted to the player when the item is collected.
    #[must_use]
    pub const fn score_value(self) -> u32 {
        match self {
            Self::Coin => 1,
            Self::Star => 0,
        }
    }
}

/// Face of the second entity struck by the first during a contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContactSide {
    /// The first entity struck from above the second.
    Above,
    /// The first entity struck from below the second.
    Below,
    /// The first entity struck the left face of the second.
    Left,
    /// The first entity struck the right face of the second.
    Right,
}

impl ContactSide {
    /// Reports whether the contact landed on a vertical face.
    #[must_use]
    pub const fn is_lateral(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// Location in continuous world coordinates; `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldPoint {
    x: f32,
    y: f32,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate in world units.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate in world units, growing downward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Computes the Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Velocity expressed in world units per second; `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldVector {
    x: f32,
    y: f32,
}

impl WorldVector {
    /// Creates a new velocity vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal component in world units per second.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical component in world units per second, growing downward.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }
}

/// Axis-aligned bounding size of an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldExtent {
    width: f32,
    height: f32,
}

impl WorldExtent {
    /// Creates a new extent with explicit dimensions.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width of the bounding box in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the bounding box in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }
}

/// Parsed level contents: grid dimensions plus the entities to spawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    columns: u32,
    rows: u32,
    spawns: Vec<Spawn>,
}

impl LevelLayout {
    /// Creates a layout from grid dimensions and spawn entries.
    #[must_use]
    pub fn new(columns: u32, rows: u32, spawns: Vec<Spawn>) -> Self {
        Self {
            columns,
            rows,
            spawns,
        }
    }

    /// Number of cell columns in the level grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cell rows in the level grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Entities the level places, in map order.
    #[must_use]
    pub fn spawns(&self) -> &[Spawn] {
        &self.spawns
    }

    /// Total width of the level measured in world units.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * CELL_LENGTH
    }

    /// Total height of the level measured in world units.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * CELL_LENGTH
    }
}

/// Single entity placement within a level grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    kind: SpawnKind,
    column: u32,
    row: u32,
}

impl Spawn {
    /// Creates a new spawn entry at the provided cell.
    #[must_use]
    pub const fn new(kind: SpawnKind, column: u32, row: u32) -> Self {
        Self { kind, column, row }
    }

    /// Kind of entity the entry places.
    #[must_use]
    pub const fn kind(&self) -> SpawnKind {
        self.kind
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, counted from the top.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Kind of entity a level spawn places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    /// Places a block of the given kind.
    Block(BlockKind),
    /// Places an item of the given kind.
    Item(ItemKind),
    /// Places a mob of the given kind.
    Mob(MobKind),
}

impl SpawnKind {
    /// Collision category the spawned entity belongs to.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Block(_) => Category::Block,
            Self::Item(_) => Category::Item,
            Self::Mob(_) => Category::Mob,
        }
    }
}

/// Validated session configuration installed once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    world: WorldConfig,
    player: PlayerConfig,
    levels: BTreeMap<LevelId, LevelPlan>,
}

impl GameConfig {
    /// Assembles a configuration from its validated parts.
    #[must_use]
    pub fn new(
        world: WorldConfig,
        player: PlayerConfig,
        levels: BTreeMap<LevelId, LevelPlan>,
    ) -> Self {
        Self {
            world,
            player,
            levels,
        }
    }

    /// World-level rules.
    #[must_use]
    pub const fn world(&self) -> &WorldConfig {
        &self.world
    }

    /// Player construction parameters.
    #[must_use]
    pub const fn player(&self) -> &PlayerConfig {
        &self.player
    }

    /// Goal and tunnel plan for the named level, if one was configured.
    #[must_use]
    pub fn plan(&self, level: &LevelId) -> Option<&LevelPlan> {
        self.levels.get(level)
    }
}

/// World-level configuration values.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    start: LevelId,
    gravity: f32,
}

impl WorldConfig {
    /// Downward acceleration applied when the configuration omits gravity.
    pub const DEFAULT_GRAVITY: f32 = 300.0;

    /// Creates world rules from a start level and gravity.
    #[must_use]
    pub const fn new(start: LevelId, gravity: f32) -> Self {
        Self { start, gravity }
    }

    /// Level the session begins on.
    #[must_use]
    pub const fn start(&self) -> &LevelId {
        &self.start
    }

    /// Downward acceleration in world units per second squared.
    #[must_use]
    pub const fn gravity(&self) -> f32 {
        self.gravity
    }
}

/// Player construction parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerConfig {
    name: String,
    max_health: u32,
    spawn: WorldPoint,
    mass: f32,
    max_velocity: f32,
}

impl PlayerConfig {
    /// Display name used when the configuration omits one.
    pub const DEFAULT_NAME: &'static str = "Scout";
    /// Maximum health used when the configuration omits one.
    pub const DEFAULT_MAX_HEALTH: u32 = 5;
    /// Spawn point used when the configuration omits coordinates.
    pub const DEFAULT_SPAWN: WorldPoint = WorldPoint::new(16.0, 16.0);
    /// Body mass used when the configuration omits one.
    pub const DEFAULT_MASS: f32 = 1.0;
    /// Horizontal speed cap used when the configuration omits one.
    pub const DEFAULT_MAX_VELOCITY: f32 = 150.0;

    /// Creates player parameters from validated values.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        max_health: u32,
        spawn: WorldPoint,
        mass: f32,
        max_velocity: f32,
    ) -> Self {
        Self {
            name: name.into(),
            max_health,
            spawn,
            mass,
            max_velocity,
        }
    }

    /// Display name shown in prompts and logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Health ceiling the player starts with.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Fixed spawn point the player returns to on every level load.
    #[must_use]
    pub const fn spawn(&self) -> WorldPoint {
        self.spawn
    }

    /// Body mass, which scales knockback impulses.
    #[must_use]
    pub const fn mass(&self) -> f32 {
        self.mass
    }

    /// Cap applied to the player's commanded horizontal speed.
    #[must_use]
    pub const fn max_velocity(&self) -> f32 {
        self.max_velocity
    }
}

/// Goal and tunnel targets configured for one level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelPlan {
    goal: Option<GoalTarget>,
    tunnel: Option<LevelId>,
}

impl LevelPlan {
    /// Creates a plan from optional goal and tunnel targets.
    #[must_use]
    pub const fn new(goal: Option<GoalTarget>, tunnel: Option<LevelId>) -> Self {
        Self { goal, tunnel }
    }

    /// Where the level's flag goal leads.
    #[must_use]
    pub const fn goal(&self) -> Option<&GoalTarget> {
        self.goal.as_ref()
    }

    /// Level the tunnel descends into, if the level has one.
    #[must_use]
    pub const fn tunnel(&self) -> Option<&LevelId> {
        self.tunnel.as_ref()
    }
}

/// Destination of a flag goal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GoalTarget {
    /// Load the named level next.
    Next(LevelId),
    /// The flag completes the whole session.
    EndOfSession,
}

/// Persisted high-score entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    score: u32,
    name: String,
}

impl ScoreEntry {
    /// Creates a new score entry.
    #[must_use]
    pub fn new(score: u32, name: impl Into<String>) -> Self {
        Self {
            score,
            name: name.into(),
        }
    }

    /// Score the entry records.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Name the score was recorded under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Identifier of the player's current body.
    pub id: EntityId,
    /// Display name from the configuration.
    pub name: String,
    /// Current health, never above `max_health`.
    pub health: u32,
    /// Current health ceiling.
    pub max_health: u32,
    /// Accumulated score.
    pub score: u32,
    /// Center of the player's bounding box.
    pub position: WorldPoint,
    /// Current velocity.
    pub velocity: WorldVector,
    /// Clock reading at which invincibility lapses, if active.
    pub invincible_until: Option<Duration>,
    /// Whether a switch effect is currently pending.
    pub switch_pending: bool,
    /// Tunnel the player is standing on, if any.
    pub standing_on_tunnel: Option<EntityId>,
}

/// Immutable representation of a single block used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockSnapshot {
    /// Identifier of the block.
    pub id: EntityId,
    /// Kind of the block.
    pub kind: BlockKind,
    /// Center of the block's bounding box.
    pub position: WorldPoint,
    /// Bounding size of the block.
    pub size: WorldExtent,
    /// Whether the block is in its ready state (unpressed, unopened).
    pub active: bool,
}

/// Immutable representation of a single mob used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MobSnapshot {
    /// Identifier of the mob.
    pub id: EntityId,
    /// Kind of the mob.
    pub kind: MobKind,
    /// Center of the mob's bounding box.
    pub position: WorldPoint,
    /// Bounding size of the mob.
    pub size: WorldExtent,
    /// Signed horizontal cruise speed.
    pub tempo: f32,
}

/// Immutable representation of a single item used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemSnapshot {
    /// Identifier of the item.
    pub id: EntityId,
    /// Kind of the item.
    pub kind: ItemKind,
    /// Center of the item's bounding box.
    pub position: WorldPoint,
    /// Bounding size of the item.
    pub size: WorldExtent,
}

/// Read-only snapshot describing all blocks within the level.
#[derive(Clone, Debug, Default)]
pub struct BlockView {
    snapshots: Vec<BlockSnapshot>,
}

impl BlockView {
    /// Creates a new block view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BlockSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured block snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &BlockSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BlockSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all mobs within the level.
#[derive(Clone, Debug, Default)]
pub struct MobView {
    snapshots: Vec<MobSnapshot>,
}

impl MobView {
    /// Creates a new mob view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MobSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mob snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &MobSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MobSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all items within the level.
#[derive(Clone, Debug, Default)]
pub struct ItemView {
    snapshots: Vec<ItemSnapshot>,
}

impl ItemView {
    /// Creates a new item view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ItemSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured item snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ItemSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ItemSnapshot> {
        self.snapshots
    }
}
