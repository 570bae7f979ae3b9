//! Tunable settings for the autopilot, the simulation loop, and maze presets.
//! This module exists so every tuning constant has one serde-backed home that callers can load
//! from a file. It does not read files itself; front-ends own persistence.

use serde::{Deserialize, Serialize};

use crate::nav::CostModel;
use crate::types::GameError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerPolicy {
    /// Withhold the whole broadcast for the tick and retry on the next one.
    #[default]
    Hold,
    /// Route the focused avatar through the best alternative neighbour that endangers nobody.
    Sidestep,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    pub cost: CostModel,
    pub danger_policy: DangerPolicy,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MazePreset {
    pub width: usize,
    pub height: usize,
    pub hazard_count: usize,
    pub reward_count: usize,
}

impl Difficulty {
    /// Maps the persisted integer selector (0, 1, 2) onto a difficulty.
    pub fn from_selector(selector: u8) -> Result<Self, GameError> {
        match selector {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            other => Err(GameError::UnknownDifficulty(other)),
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    pub fn preset(self) -> MazePreset {
        match self {
            Difficulty::Easy => {
                MazePreset { width: 5, height: 5, hazard_count: 0, reward_count: 8 }
            }
            Difficulty::Medium => {
                MazePreset { width: 10, height: 10, hazard_count: 0, reward_count: 15 }
            }
            Difficulty::Hard => {
                MazePreset { width: 15, height: 15, hazard_count: 6, reward_count: 10 }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub difficulty: Difficulty,
    pub max_ticks: u64,
    /// Cells per tick, accumulated in each avatar's move buffer.
    pub avatar_speed: f32,
    pub boosted_speed: f32,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    /// Straight-corridor distance at which a hazard notices an avatar.
    pub detection_range: u32,
    /// Lifetime of upgrades and of the pause they impose on other avatars.
    pub upgrade_ticks: u32,
    pub score_reward_bonus: u64,
    pub autopilot: AutopilotConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            max_ticks: 2_000,
            avatar_speed: 0.75,
            boosted_speed: 1.0,
            patrol_speed: 0.1,
            chase_speed: 0.4,
            detection_range: 4,
            upgrade_ticks: 6,
            score_reward_bonus: 2,
            autopilot: AutopilotConfig::default(),
        }
    }
}
