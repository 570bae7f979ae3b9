//! Headless fixed-step simulation built around the autopilot.
//! This module exists to drive avatars, hazards, rewards, and scoring tick by tick so the
//! navigation engine can run end to end. It does not render or read player input.

mod advance;
mod hash;
mod hazards;
mod rewards;


use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;
use serde::Serialize;

use crate::autopilot::Autopilot;
use crate::config::GameConfig;
use crate::mapgen::MazeGenerator;
use crate::state::WorldState;
use crate::types::*;

pub struct Game {
    seed: u64,
    tick: u64,
    rng: ChaCha8Rng,
    config: GameConfig,
    world: WorldState,
    autopilot: Autopilot,
    log: Vec<LogEvent>,
    score: u64,
    multiplier: u64,
    /// Avatar whose upgrade currently keeps everyone else paused.
    pause_owner: Option<AvatarId>,
    finished_outcome: Option<RunOutcome>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u64,
    pub outcome: Option<RunOutcome>,
    pub score: u64,
    pub multiplier: u64,
    pub final_score: u64,
    pub avatars_remaining: usize,
    pub snapshot_hash: u64,
}

impl Game {
    /// Generates a maze for `config.difficulty` from `seed` and wraps it in a new run.
    pub fn new(seed: u64, config: &GameConfig) -> Result<Self, GameError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let world = MazeGenerator::new(config.difficulty).generate(&mut rng)?.into_world()?;
        Ok(Self::with_rng(seed, rng, world, config))
    }

    /// Runs a caller-built world. Hazard patrol randomness is still seeded from `seed`.
    pub fn from_world(seed: u64, world: WorldState, config: &GameConfig) -> Self {
        Self::with_rng(seed, ChaCha8Rng::seed_from_u64(seed), world, config)
    }

    fn with_rng(seed: u64, rng: ChaCha8Rng, world: WorldState, config: &GameConfig) -> Self {
        Self {
            seed,
            tick: 0,
            rng,
            config: *config,
            world,
            autopilot: Autopilot::new(config.autopilot),
            log: Vec::new(),
            score: 0,
            multiplier: 0,
            pause_owner: None,
            finished_outcome: None,
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn focus(&self) -> Option<AvatarId> {
        self.autopilot.focus()
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    pub fn final_score(&self) -> u64 {
        self.score * self.multiplier
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.finished_outcome
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            seed: self.seed,
            ticks: self.tick,
            outcome: self.finished_outcome,
            score: self.score,
            multiplier: self.multiplier,
            final_score: self.final_score(),
            avatars_remaining: self.world.avatars.len(),
            snapshot_hash: self.snapshot_hash(),
        }
    }
}
