//! Public data model for a generated maze.

use std::collections::BTreeSet;

use crate::state::{Grid, RewardSpawn, WorldState};
use crate::types::{GameError, Pos};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedMaze {
    pub grid: Grid,
    pub avatar_starts: Vec<Pos>,
    pub goal: Pos,
    pub safe_zone: BTreeSet<Pos>,
    pub rewards: Vec<RewardSpawn>,
    pub hazards: Vec<Pos>,
}

impl GeneratedMaze {
    pub fn into_world(self) -> Result<WorldState, GameError> {
        let world = WorldState::initialize(
            self.grid,
            &self.avatar_starts,
            &self.hazards,
            &self.rewards,
            self.goal,
        )?;
        world.with_safe_zone(self.safe_zone)
    }
}
