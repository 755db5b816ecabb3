//! Fixed-timestep session runner pumping world events through the controller.

use std::time::Duration;

use anyhow::Result;
use log::{debug, info, trace, warn};
use serde::Serialize;
use switchback_core::{Command, Event, GameConfig, ItemKind};
use switchback_system_level_flow::{LevelFlow, LevelSource, PromptProvider, SessionStatus};
use switchback_world::{self as world, query, World};

use crate::tape::Tape;

/// Simulated time each tick advances the world by.
pub(crate) const TICK: Duration = Duration::from_millis(10);

/// End-of-run report the CLI can print as JSON.
#[derive(Debug, Serialize)]
pub(crate) struct SessionSummary {
    /// Player display name from the configuration.
    pub(crate) player: String,
    /// How the session ended: `completed`, `game-over`, or `tick-limit`.
    pub(crate) outcome: String,
    /// Number of ticks the runner simulated.
    pub(crate) ticks: u64,
    /// Final score.
    pub(crate) score: u32,
    /// Final health.
    pub(crate) health: u32,
    /// Final health ceiling.
    pub(crate) max_health: u32,
    /// Levels loaded over the run, in order, repeats included.
    pub(crate) levels_visited: Vec<String>,
    /// Coins collected over the run.
    pub(crate) coins_collected: u32,
}

/// Runs a scripted session until completion, game over, or the tick limit.
///
/// Each tick applies the tape's actions for that tick, advances the clock by
/// [`TICK`], and feeds the emitted events to the level controller until it
/// stops issuing commands.
pub(crate) fn run<S: LevelSource, P: PromptProvider>(
    config: &GameConfig,
    rng_seed: u64,
    tape: &Tape,
    max_ticks: u64,
    flow: &mut LevelFlow<S, P>,
) -> Result<SessionSummary> {
    let mut world = World::new();
    println!("{}", query::welcome_banner(&world));

    let mut tally = Tally::default();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureWorld {
            config: config.clone(),
            rng_seed,
        },
        &mut events,
    );

    let mut boot = Vec::new();
    flow.boot(&mut boot)?;
    for command in boot {
        world::apply(&mut world, command, &mut events);
    }
    tally.observe(&events);
    settle(flow, &mut world, &mut events, &mut tally)?;

    let max_velocity = config.player().max_velocity();
    let mut ticks = 0;
    for tick in 0..max_ticks {
        if flow.status() != SessionStatus::Running {
            break;
        }
        events.clear();
        for action in tape.actions_at(tick) {
            world::apply(&mut world, action.command(max_velocity), &mut events);
        }
        world::apply(&mut world, Command::Tick { dt: TICK }, &mut events);
        tally.observe(&events);
        settle(flow, &mut world, &mut events, &mut tally)?;
        ticks += 1;
    }

    let outcome = match flow.status() {
        SessionStatus::Running => "tick-limit",
        SessionStatus::Completed => "completed",
        SessionStatus::GameOver => "game-over",
    };
    let snapshot = query::player(&world);
    Ok(SessionSummary {
        player: config.player().name().to_string(),
        outcome: outcome.to_string(),
        ticks,
        score: snapshot.as_ref().map_or(0, |player| player.score),
        health: snapshot.as_ref().map_or(0, |player| player.health),
        max_health: snapshot.as_ref().map_or(0, |player| player.max_health),
        levels_visited: tally.levels_visited,
        coins_collected: tally.coins_collected,
    })
}

/// Feeds pending events to the controller until it stops issuing commands.
///
/// Commands the controller issues are applied to the world, and only the
/// events those applications emit are fed back, so every event is handled
/// exactly once.
fn settle<S: LevelSource, P: PromptProvider>(
    flow: &mut LevelFlow<S, P>,
    world: &mut World,
    events: &mut Vec<Event>,
    tally: &mut Tally,
) -> Result<()> {
    let mut commands = Vec::new();
    loop {
        let score = query::player(world).map_or(0, |player| player.score);
        let _ = flow.handle(events, score, &mut commands)?;
        if commands.is_empty() {
            return Ok(());
        }
        events.clear();
        for command in commands.drain(..) {
            world::apply(world, command, events);
        }
        tally.observe(events);
    }
}

/// Running totals the summary reports.
#[derive(Debug, Default)]
struct Tally {
    levels_visited: Vec<String>,
    coins_collected: u32,
}

impl Tally {
    /// Logs a batch of events and folds them into the totals.
    fn observe(&mut self, events: &[Event]) {
        for event in events {
            log_event(event);
            match event {
                Event::LevelLoaded { level, .. } => {
                    self.levels_visited.push(level.as_str().to_string());
                }
                Event::ItemCollected {
                    kind: ItemKind::Coin,
                    ..
                } => self.coins_collected += 1,
                _ => {}
            }
        }
    }
}

/// Emits one log line per world event.
fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { dt } => trace!("clock advanced by {dt:?}"),
        Event::WorldConfigured {
            player_name,
            max_health,
        } => info!("world configured for {player_name} with {max_health} health"),
        Event::LevelLoaded {
            level,
            blocks,
            mobs,
            items,
        } => info!("loaded {level}: {blocks} blocks, {mobs} mobs, {items} items"),
        Event::LevelLoadRejected { level, reason } => {
            warn!("rejected a load of {level}: {reason:?}");
        }
        Event::ItemCollected {
            kind, value, score, ..
        } => debug!("collected a {kind:?} worth {value}, score now {score}"),
        Event::ItemSpawned { kind, position, .. } => {
            debug!("a {kind:?} spawned at {position:?}");
        }
        Event::MysteryOpened { drops, .. } => info!("a mystery block opened with {drops} drops"),
        Event::InvincibilityStarted { expires_at } => {
            info!("invincibility opened until {expires_at:?}");
        }
        Event::InvincibilityEnded { at } => info!("invincibility ended at {at:?}"),
        Event::PlayerDamaged { health, .. } => debug!("player damaged, {health} health left"),
        Event::PlayerDied { score } => info!("player died with score {score}"),
        Event::PlayerStatsReset { health } => info!("player stats reset to {health} health"),
        Event::MaxHealthRaised { max_health } => info!("max health raised to {max_health}"),
        Event::PlayerBounced { velocity_y, .. } => debug!("player launched at {velocity_y}"),
        Event::PlayerKnockedBack { velocity_x, .. } => {
            debug!("player knocked back at {velocity_x}");
        }
        Event::MobDestroyed { kind, cause, .. } => debug!("a {kind:?} was destroyed by {cause:?}"),
        Event::MobReversed { tempo, .. } => debug!("a mob reversed to tempo {tempo}"),
        Event::BlockDestroyed { block, .. } => debug!("block {block:?} was destroyed"),
        Event::FireballDropped { cloud, .. } => debug!("cloud {cloud:?} dropped a fireball"),
        Event::SwitchPressed { bricks_removed, .. } => {
            info!("switch pressed, {bricks_removed} bricks removed");
        }
        Event::SwitchReleased {
            bricks_restored, ..
        } => info!("switch released, {bricks_restored} bricks restored"),
        Event::GoalReached { from_above, .. } => info!("goal reached (from above: {from_above})"),
        Event::SteppedOntoTunnel { .. } => debug!("player stepped onto a tunnel"),
        Event::SteppedOffTunnel { .. } => debug!("player stepped off a tunnel"),
        Event::TunnelDescended { .. } => info!("player descended a tunnel"),
    }
}
