#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level progression controller reacting to goal, tunnel, and death events.

use log::info;
use switchback_core::{
    Command, Event, GameConfig, GoalTarget, LevelId, LevelLayout, LevelPlan, ScoreEntry,
};
use switchback_system_scoring::{self as scoring, LedgerError, ScoreLedger};
use thiserror::Error;

/// Errors surfaced by level transitions and score persistence.
#[derive(Debug, Error)]
pub enum LevelFlowError {
    /// The level source has no layout for the requested identifier.
    #[error("level {level} not found")]
    LevelNotFound {
        /// Level that was requested.
        level: LevelId,
    },
    /// The level source failed to read or parse the requested layout.
    #[error("level {level} could not be loaded: {reason}")]
    LevelUnavailable {
        /// Level that was requested.
        level: LevelId,
        /// Human-readable cause.
        reason: String,
    },
    /// The configuration names no goal for the finished level.
    #[error("no goal is configured for {level}")]
    MissingGoal {
        /// Level whose plan lacks a goal.
        level: LevelId,
    },
    /// The configuration names no tunnel target for the level.
    #[error("no tunnel is configured for {level}")]
    MissingTunnel {
        /// Level whose plan lacks a tunnel.
        level: LevelId,
    },
    /// Score persistence failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Provides level layouts by identifier.
pub trait LevelSource {
    /// Loads the layout for a level.
    fn load(&mut self, level: &LevelId) -> Result<LevelLayout, LevelFlowError>;
}

/// Supplies the synchronous answers the controller pauses on.
pub trait PromptProvider {
    /// Asks for a name to record a qualifying score under; `None` skips the
    /// record.
    fn request_name(&mut self, score: u32) -> Option<String>;
    /// Asks whether a dead player restarts the level.
    fn confirm_restart(&mut self) -> bool;
}

/// Overall session verdict after an event batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// The session continues.
    Running,
    /// A terminal goal was reached.
    Completed,
    /// The player died and declined a restart.
    GameOver,
}

/// Orchestrates level loads and score recording from world events.
///
/// The controller is fed every event batch the world emits. Goal contacts
/// and deaths consult the ledger before any level transition, so a
/// qualifying score is always persisted even when the follow-up load fails.
#[derive(Debug)]
pub struct LevelFlow<S, P> {
    config: GameConfig,
    source: S,
    prompts: P,
    ledger: ScoreLedger,
    current: Option<LevelId>,
    status: SessionStatus,
}

impl<S: LevelSource, P: PromptProvider> LevelFlow<S, P> {
    /// Creates a controller over a level source, prompt provider, and score
    /// ledger.
    #[must_use]
    pub fn new(config: GameConfig, source: S, prompts: P, ledger: ScoreLedger) -> Self {
        Self {
            config,
            source,
            prompts,
            ledger,
            current: None,
            status: SessionStatus::Running,
        }
    }

    /// Session verdict as of the last handled batch.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Level the controller considers active.
    #[must_use]
    pub const fn current_level(&self) -> Option<&LevelId> {
        self.current.as_ref()
    }

    /// Emits the load command for the configured start level.
    pub fn boot(&mut self, out: &mut Vec<Command>) -> Result<(), LevelFlowError> {
        let start = self.config.world().start().clone();
        self.enter(start, out)
    }

    /// Reacts to one tick's events with the player's score at batch time.
    ///
    /// Returns the session verdict; once `Completed` or `GameOver` is
    /// reached, later batches are ignored.
    pub fn handle(
        &mut self,
        events: &[Event],
        score: u32,
        out: &mut Vec<Command>,
    ) -> Result<SessionStatus, LevelFlowError> {
        for event in events {
            if self.status != SessionStatus::Running {
                break;
            }
            match event {
                Event::GoalReached { .. } => self.finish_level(score, out)?,
                Event::TunnelDescended { .. } => self.descend_tunnel(out)?,
                Event::PlayerDied { score } => self.handle_death(*score, out)?,
                _ => {}
            }
        }
        Ok(self.status)
    }

    fn finish_level(
        &mut self,
        score: u32,
        out: &mut Vec<Command>,
    ) -> Result<(), LevelFlowError> {
        let Some(level) = self.current.clone() else {
            return Ok(());
        };
        self.record_if_qualifying(&level, score)?;
        let target = self
            .config
            .plan(&level)
            .and_then(LevelPlan::goal)
            .cloned()
            .ok_or_else(|| LevelFlowError::MissingGoal {
                level: level.clone(),
            })?;
        match target {
            GoalTarget::Next(next) => self.enter(next, out),
            GoalTarget::EndOfSession => {
                info!("session completed at {level} with score {score}");
                self.status = SessionStatus::Completed;
                Ok(())
            }
        }
    }

    fn descend_tunnel(&mut self, out: &mut Vec<Command>) -> Result<(), LevelFlowError> {
        let Some(level) = self.current.clone() else {
            return Ok(());
        };
        let target = self
            .config
            .plan(&level)
            .and_then(LevelPlan::tunnel)
            .cloned()
            .ok_or(LevelFlowError::MissingTunnel { level })?;
        self.enter(target, out)
    }

    fn handle_death(&mut self, score: u32, out: &mut Vec<Command>) -> Result<(), LevelFlowError> {
        let Some(level) = self.current.clone() else {
            return Ok(());
        };
        self.record_if_qualifying(&level, score)?;
        if self.prompts.confirm_restart() {
            out.push(Command::ResetPlayerStats);
            self.enter(level, out)
        } else {
            info!("game over on {level} with score {score}");
            self.status = SessionStatus::GameOver;
            Ok(())
        }
    }

    fn enter(&mut self, level: LevelId, out: &mut Vec<Command>) -> Result<(), LevelFlowError> {
        let layout = self.source.load(&level)?;
        info!("entering {level}");
        out.push(Command::LoadLevel {
            level: level.clone(),
            layout,
        });
        self.current = Some(level);
        Ok(())
    }

    fn record_if_qualifying(
        &mut self,
        level: &LevelId,
        score: u32,
    ) -> Result<(), LevelFlowError> {
        let mut entries = self.ledger.load(level)?;
        let slot = scoring::rank(score, &entries);
        if slot >= scoring::MAX_ENTRIES {
            return Ok(());
        }
        let Some(name) = self.prompts.request_name(score) else {
            info!("qualifying score {score} on {level} left unrecorded");
            return Ok(());
        };
        self.ledger
            .record(level, &mut entries, slot, ScoreEntry::new(score, name))?;
        Ok(())
    }
}
