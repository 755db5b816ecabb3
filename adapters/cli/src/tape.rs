//! Command tapes scripting player actions at fixed ticks.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use switchback_core::Command;

/// Horizontal speed commanded by the `left` and `right` directives.
pub(crate) const WALK_SPEED: f32 = 120.0;

/// Widest gap the random-walk generator leaves between directives.
const RANDOM_WALK_MAX_GAP: u64 = 50;

/// Scripted player action applied at a fixed tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Walk left at the fixed walking speed.
    Left,
    /// Walk right at the fixed walking speed.
    Right,
    /// Stop horizontal movement.
    Halt,
    /// Jump, if vertically at rest.
    Jump,
    /// Duck, descending a tunnel when standing on one.
    Duck,
    /// Dash left at the configured speed cap.
    DashLeft,
    /// Dash right at the configured speed cap.
    DashRight,
}

impl Action {
    const ALL: [Self; 7] = [
        Self::Left,
        Self::Right,
        Self::Halt,
        Self::Jump,
        Self::Duck,
        Self::DashLeft,
        Self::DashRight,
    ];

    /// Parses one directive word.
    fn parse(word: &str) -> Option<Self> {
        match word {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "halt" => Some(Self::Halt),
            "jump" => Some(Self::Jump),
            "duck" => Some(Self::Duck),
            "dash-left" => Some(Self::DashLeft),
            "dash-right" => Some(Self::DashRight),
            _ => None,
        }
    }

    /// Player command the action issues, given the configured speed cap.
    pub(crate) fn command(self, max_velocity: f32) -> Command {
        match self {
            Self::Left => Command::MovePlayer {
                velocity_x: -WALK_SPEED,
            },
            Self::Right => Command::MovePlayer {
                velocity_x: WALK_SPEED,
            },
            Self::Halt => Command::MovePlayer { velocity_x: 0.0 },
            Self::Jump => Command::Jump,
            Self::Duck => Command::Duck,
            Self::DashLeft => Command::MovePlayer {
                velocity_x: -max_velocity,
            },
            Self::DashRight => Command::MovePlayer {
                velocity_x: max_velocity,
            },
        }
    }
}

/// Tick-indexed schedule of player actions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tape {
    directives: BTreeMap<u64, Vec<Action>>,
}

impl Tape {
    /// Actions scheduled for the given tick, in file order.
    pub(crate) fn actions_at(&self, tick: u64) -> &[Action] {
        self.directives.get(&tick).map_or(&[], Vec::as_slice)
    }

    /// Total number of scheduled directives.
    pub(crate) fn len(&self) -> usize {
        self.directives.values().map(Vec::len).sum()
    }

    /// Generates a tape of random directives from a seeded stream.
    ///
    /// Directive ticks increase strictly, so two generated tapes with the
    /// same seed and length are identical.
    pub(crate) fn random_walk(directives: u32, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut tape = Self::default();
        let mut tick = 0u64;
        for _ in 0..directives {
            tick += rng.gen_range(1..=RANDOM_WALK_MAX_GAP);
            let action = Action::ALL[rng.gen_range(0..Action::ALL.len())];
            tape.directives.entry(tick).or_default().push(action);
        }
        tape
    }
}

/// Parses a tape file: one `<tick> <action>` directive per line.
///
/// Blank lines and `#` comments are ignored.
pub(crate) fn parse(text: &str) -> Result<Tape> {
    let mut tape = Tape::default();
    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut words = line.split_whitespace();
        let tick_word = words.next().unwrap_or_default();
        let tick: u64 = tick_word
            .parse()
            .with_context(|| format!("tape line {number}: invalid tick '{tick_word}'"))?;
        let action_word = words
            .next()
            .with_context(|| format!("tape line {number}: missing action"))?;
        let action = Action::parse(action_word)
            .with_context(|| format!("tape line {number}: unknown action '{action_word}'"))?;
        if words.next().is_some() {
            bail!("tape line {number}: trailing input after the action");
        }
        tape.directives.entry(tick).or_default().push(action);
    }
    Ok(tape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_comments_and_blanks_parse() {
        let tape = parse("0 right\n\n# speed up\n40 dash-right\n40 jump\n90 halt\n")
            .expect("tape should parse");

        assert_eq!(tape.len(), 4);
        assert_eq!(tape.actions_at(0), &[Action::Right]);
        assert_eq!(tape.actions_at(40), &[Action::DashRight, Action::Jump]);
        assert_eq!(tape.actions_at(90), &[Action::Halt]);
        assert!(tape.actions_at(1).is_empty());
    }

    #[test]
    fn malformed_directives_name_their_line() {
        let error = parse("0 right\nten jump\n").expect_err("a bad tick should fail");
        assert!(error.to_string().contains("tape line 2: invalid tick 'ten'"));

        let error = parse("5 moonwalk\n").expect_err("an unknown action should fail");
        assert!(error
            .to_string()
            .contains("tape line 1: unknown action 'moonwalk'"));

        let error = parse("5\n").expect_err("a lone tick should fail");
        assert!(error.to_string().contains("tape line 1: missing action"));

        let error = parse("5 jump now\n").expect_err("trailing words should fail");
        assert!(error.to_string().contains("trailing input"));
    }

    #[test]
    fn actions_map_to_player_commands() {
        assert_eq!(
            Action::Right.command(150.0),
            Command::MovePlayer {
                velocity_x: WALK_SPEED
            }
        );
        assert_eq!(
            Action::DashLeft.command(150.0),
            Command::MovePlayer { velocity_x: -150.0 }
        );
        assert_eq!(Action::Halt.command(150.0), Command::MovePlayer { velocity_x: 0.0 });
        assert_eq!(Action::Jump.command(150.0), Command::Jump);
        assert_eq!(Action::Duck.command(150.0), Command::Duck);
    }

    #[test]
    fn random_walks_are_reproducible() {
        let first = Tape::random_walk(64, 1234);
        let second = Tape::random_walk(64, 1234);

        assert_eq!(first, second);
        assert_eq!(first.len(), 64, "ticks increase strictly, so none collide");
        assert!(first.actions_at(0).is_empty(), "the first gap is at least one tick");
    }
}
