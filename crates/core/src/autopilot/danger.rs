//! Danger check for a broadcast step and the sidestep fallback.

use crate::nav::{CostModel, HazardOracle, solve};
use crate::state::WorldState;
use crate::types::{AvatarId, Direction, Pos};

/// First destination cell, in avatar order, that the step would move an exposed avatar into.
/// Paused and invulnerable avatars are skipped; a wall-blocked avatar stays put and is not
/// endangered by the move; the safe zone overrides any threat.
pub(super) fn endangered(
    world: &WorldState,
    oracle: &HazardOracle,
    direction: Direction,
) -> Option<Pos> {
    world.avatars.values().find_map(|avatar| {
        if avatar.is_paused() || avatar.is_invulnerable() {
            return None;
        }
        let destination = world.grid.step(avatar.pos, direction)?;
        (!world.is_safe(destination) && oracle.threatens(destination)).then_some(destination)
    })
}

/// Alternative direction for the focused avatar, ranked by the remaining path length from the
/// destination, that endangers nobody.
pub(super) fn sidestep(
    world: &WorldState,
    oracle: &HazardOracle,
    cost_model: &CostModel,
    focus: AvatarId,
    rejected: Direction,
) -> Option<Direction> {
    let origin = world.avatars.get(focus)?.pos;
    let mut candidates: Vec<(usize, Direction)> = Direction::ALL
        .into_iter()
        .filter(|direction| *direction != rejected)
        .filter_map(|direction| {
            let destination = world.grid.step(origin, direction)?;
            let path = solve(&world.grid, oracle, cost_model, destination, world.goal);
            (!path.is_empty()).then_some((path.len(), direction))
        })
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .map(|(_, direction)| direction)
        .find(|direction| endangered(world, oracle, *direction).is_none())
}
