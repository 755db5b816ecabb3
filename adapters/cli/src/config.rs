//! Parser for the `==Section==` / `key : value` session configuration format.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use switchback_core::{
    GameConfig, GoalTarget, LevelId, LevelPlan, PlayerConfig, WorldConfig, WorldPoint,
};

/// Goal value marking the terminal flag of the session.
const END_MARKER: &str = "END";

/// Parses a configuration file into validated session rules.
///
/// `World` and `Player` accept exactly the keys they document; every other
/// section names a level and accepts `goal` and `tunnel`. Omitted player and
/// world keys fall back to their defaults, but `World.start` is required.
pub(crate) fn parse(text: &str) -> Result<GameConfig> {
    let mut world = WorldSection::default();
    let mut player = PlayerSection::default();
    let mut levels: BTreeMap<LevelId, LevelSection> = BTreeMap::new();
    let mut section = None;

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = header(line) {
            section = Some(match name {
                "World" => Section::World,
                "Player" => Section::Player,
                _ => Section::Level(LevelId::new(name)),
            });
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .with_context(|| format!("line {number}: expected 'key : value'"))?;
        let key = key.trim();
        let value = value.trim();
        match &section {
            None => bail!("line {number}: entry before any section header"),
            Some(Section::World) => match key {
                "start" => world.start = Some(LevelId::new(value)),
                "gravity" => world.gravity = Some(positive_f32(number, key, value)?),
                _ => bail!("line {number}: unknown World key '{key}'"),
            },
            Some(Section::Player) => match key {
                "character" => player.name = Some(value.to_string()),
                "health" => player.max_health = Some(positive_u32(number, key, value)?),
                "x" => player.x = Some(finite_f32(number, key, value)?),
                "y" => player.y = Some(finite_f32(number, key, value)?),
                "mass" => player.mass = Some(positive_f32(number, key, value)?),
                "max_velocity" => player.max_velocity = Some(positive_f32(number, key, value)?),
                _ => bail!("line {number}: unknown Player key '{key}'"),
            },
            Some(Section::Level(level)) => {
                let plan = levels.entry(level.clone()).or_default();
                match key {
                    "goal" if value == END_MARKER => plan.goal = Some(GoalTarget::EndOfSession),
                    "goal" => plan.goal = Some(GoalTarget::Next(LevelId::new(value))),
                    "tunnel" => plan.tunnel = Some(LevelId::new(value)),
                    _ => bail!("line {number}: unknown key '{key}' in level section '{level}'"),
                }
            }
        }
    }

    let start = world.start.context("configuration is missing World.start")?;
    let plans = levels
        .into_iter()
        .map(|(level, section)| (level, LevelPlan::new(section.goal, section.tunnel)))
        .collect();
    Ok(GameConfig::new(
        WorldConfig::new(start, world.gravity.unwrap_or(WorldConfig::DEFAULT_GRAVITY)),
        PlayerConfig::new(
            player
                .name
                .unwrap_or_else(|| PlayerConfig::DEFAULT_NAME.to_string()),
            player.max_health.unwrap_or(PlayerConfig::DEFAULT_MAX_HEALTH),
            WorldPoint::new(
                player.x.unwrap_or(PlayerConfig::DEFAULT_SPAWN.x()),
                player.y.unwrap_or(PlayerConfig::DEFAULT_SPAWN.y()),
            ),
            player.mass.unwrap_or(PlayerConfig::DEFAULT_MASS),
            player
                .max_velocity
                .unwrap_or(PlayerConfig::DEFAULT_MAX_VELOCITY),
        ),
        plans,
    ))
}

/// Extracts the section name from a `==Name==` header line.
fn header(line: &str) -> Option<&str> {
    let name = line.strip_prefix("==")?.strip_suffix("==")?.trim();
    (!name.is_empty()).then_some(name)
}

fn positive_f32(line: usize, key: &str, value: &str) -> Result<f32> {
    let parsed = finite_f32(line, key, value)?;
    if parsed <= 0.0 {
        bail!("line {line}: {key} must be positive, got '{value}'");
    }
    Ok(parsed)
}

fn finite_f32(line: usize, key: &str, value: &str) -> Result<f32> {
    let parsed: f32 = value
        .parse()
        .with_context(|| format!("line {line}: {key} must be a number, got '{value}'"))?;
    if !parsed.is_finite() {
        bail!("line {line}: {key} must be finite, got '{value}'");
    }
    Ok(parsed)
}

fn positive_u32(line: usize, key: &str, value: &str) -> Result<u32> {
    let parsed: u32 = value
        .parse()
        .with_context(|| format!("line {line}: {key} must be a whole number, got '{value}'"))?;
    if parsed == 0 {
        bail!("line {line}: {key} must be positive, got '{value}'");
    }
    Ok(parsed)
}

/// Which section the parser is currently inside.
enum Section {
    World,
    Player,
    Level(LevelId),
}

#[derive(Default)]
struct WorldSection {
    start: Option<LevelId>,
    gravity: Option<f32>,
}

#[derive(Default)]
struct PlayerSection {
    name: Option<String>,
    max_health: Option<u32>,
    x: Option<f32>,
    y: Option<f32>,
    mass: Option<f32>,
    max_velocity: Option<f32>,
}

#[derive(Default)]
struct LevelSection {
    goal: Option<GoalTarget>,
    tunnel: Option<LevelId>,
}
