pub mod autopilot;
pub mod config;
pub mod game;
pub mod mapgen;
pub mod nav;
mod rng;
pub mod state;
pub mod types;

#[cfg(test)]
mod test_support;

pub use autopilot::Autopilot;
pub use config::{AutopilotConfig, DangerPolicy, Difficulty, GameConfig, MazePreset};
pub use game::{Game, RunSummary};
pub use mapgen::{GeneratedMaze, MazeGenerator, generate_maze};
pub use nav::{CostModel, HazardOracle, solve};
pub use state::{Avatar, Cell, Grid, Hazard, Reward, RewardSpawn, WorldState};
pub use types::*;
