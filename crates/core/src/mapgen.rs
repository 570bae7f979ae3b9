//! Procedural maze generation split into carving and spawn placement.

mod carve;
mod model;
mod spawns;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use crate::config::{Difficulty, MazePreset};
use crate::state::Grid;
use crate::types::GameError;

pub use model::GeneratedMaze;

pub struct MazeGenerator {
    preset: MazePreset,
}

impl MazeGenerator {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { preset: difficulty.preset() }
    }

    pub fn generate(&self, rng: &mut ChaCha8Rng) -> Result<GeneratedMaze, GameError> {
        let MazePreset { width, height, hazard_count, reward_count } = self.preset;
        let mut grid = Grid::new(width, height)?;
        carve::carve_passages(&mut grid, rng)?;
        carve::add_loops(&mut grid, rng, loop_count(width))?;

        let avatar_starts = spawns::corner_spawns(&grid);
        let safe_zone = spawns::safe_zone(&grid, &avatar_starts);
        let goal = spawns::pick_goal(rng, &grid, &avatar_starts);
        let rewards = spawns::place_rewards(rng, &grid, reward_count, &avatar_starts, goal);
        let rules = spawns::HazardRules {
            count: hazard_count,
            safe_zone: &safe_zone,
            goal,
            rewards: &rewards,
        };
        let hazards = spawns::place_hazards(rng, &grid, &rules);

        Ok(GeneratedMaze { grid, avatar_starts, goal, safe_zone, rewards, hazards })
    }
}

/// Extra walls knocked down after carving so the maze has alternative routes.
fn loop_count(width: usize) -> usize {
    width * 2 - width / 2
}

pub fn generate_maze(seed: u64, difficulty: Difficulty) -> Result<GeneratedMaze, GameError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    MazeGenerator::new(difficulty).generate(&mut rng)
}
