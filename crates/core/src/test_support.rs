//! Shared world fixtures for unit tests across modules.
//! This module exists to avoid repeating grid and world setup in every test suite.
//! It does not own production gameplay logic.

use crate::state::{Grid, RewardSpawn, WorldState};
use crate::types::*;

pub(crate) fn open_world(width: usize, height: usize, avatars: &[Pos], goal: Pos) -> WorldState {
    let grid = Grid::open(width, height).expect("fixture grid dimensions are valid");
    WorldState::initialize(grid, avatars, &[], &[], goal).expect("fixture world is valid")
}

pub(crate) fn world_with(
    grid: Grid,
    avatars: &[Pos],
    hazards: &[Pos],
    rewards: &[RewardSpawn],
    goal: Pos,
) -> WorldState {
    WorldState::initialize(grid, avatars, hazards, rewards, goal).expect("fixture world is valid")
}

pub(crate) fn avatar_at(world: &WorldState, pos: Pos) -> AvatarId {
    world
        .avatars
        .iter()
        .find_map(|(id, avatar)| (avatar.pos == pos).then_some(id))
        .expect("fixture avatar should exist at position")
}
