//! Placement of avatars, goal, rewards, and hazards on a carved maze.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;

use crate::rng::random_below;
use crate::state::{Grid, RewardSpawn};
use crate::types::{Direction, Pos, RewardEffect};

pub(super) struct HazardRules<'a> {
    pub count: usize,
    pub safe_zone: &'a BTreeSet<Pos>,
    pub goal: Pos,
    pub rewards: &'a [RewardSpawn],
}

/// Avatars start in the corners. Degenerate grids collapse duplicate corners.
pub(super) fn corner_spawns(grid: &Grid) -> Vec<Pos> {
    let max_x = grid.width() as i32 - 1;
    let max_z = grid.height() as i32 - 1;
    let mut corners = Vec::with_capacity(4);
    for corner in [Pos::new(0, 0), Pos::new(max_x, 0), Pos::new(0, max_z), Pos::new(max_x, max_z)] {
        if !corners.contains(&corner) {
            corners.push(corner);
        }
    }
    corners
}

/// Spawn cells plus their in-bounds orthogonal neighbours. Hazards never enter these cells.
pub(super) fn safe_zone(grid: &Grid, spawns: &[Pos]) -> BTreeSet<Pos> {
    let mut zone = BTreeSet::new();
    for &spawn in spawns {
        zone.insert(spawn);
        zone.extend(Direction::ALL.into_iter().filter_map(|d| grid.neighbor(spawn, d)));
    }
    zone
}

pub(super) fn pick_goal(rng: &mut ChaCha8Rng, grid: &Grid, corners: &[Pos]) -> Pos {
    let candidates: Vec<Pos> = grid.positions().filter(|pos| !corners.contains(pos)).collect();
    if candidates.is_empty() {
        return corners.last().copied().unwrap_or(Pos::new(0, 0));
    }
    candidates[random_below(rng, candidates.len())]
}

pub(super) fn place_rewards(
    rng: &mut ChaCha8Rng,
    grid: &Grid,
    count: usize,
    corners: &[Pos],
    goal: Pos,
) -> Vec<RewardSpawn> {
    let mut candidates: Vec<Pos> =
        grid.positions().filter(|pos| *pos != goal && !corners.contains(pos)).collect();
    let mut rewards = Vec::with_capacity(count);
    while rewards.len() < count && !candidates.is_empty() {
        let pos = candidates.swap_remove(random_below(rng, candidates.len()));
        let effect = RewardEffect::ALL[random_below(rng, RewardEffect::ALL.len())];
        rewards.push(RewardSpawn { pos, effect });
    }
    rewards
}

/// Hazards spawn away from the first row and column, outside the safe zone, off the goal and
/// reward cells, and never in the eight cells around another hazard. A cell whose every open
/// exit leads into the safe zone is skipped since a hazard there could never move.
pub(super) fn place_hazards(
    rng: &mut ChaCha8Rng,
    grid: &Grid,
    rules: &HazardRules<'_>,
) -> Vec<Pos> {
    let mut candidates: Vec<Pos> = grid
        .positions()
        .filter(|pos| {
            pos.x >= 1
                && pos.z >= 1
                && *pos != rules.goal
                && !rules.safe_zone.contains(pos)
                && !rules.rewards.iter().any(|reward| reward.pos == *pos)
                && has_exit_outside(grid, rules.safe_zone, *pos)
        })
        .collect();
    let mut hazards: Vec<Pos> = Vec::with_capacity(rules.count);
    while hazards.len() < rules.count && !candidates.is_empty() {
        let pos = candidates.swap_remove(random_below(rng, candidates.len()));
        let crowded = hazards
            .iter()
            .any(|other| other.x.abs_diff(pos.x) <= 1 && other.z.abs_diff(pos.z) <= 1);
        if !crowded {
            hazards.push(pos);
        }
    }
    hazards
}

fn has_exit_outside(grid: &Grid, safe_zone: &BTreeSet<Pos>, pos: Pos) -> bool {
    Direction::ALL
        .into_iter()
        .filter_map(|direction| grid.step(pos, direction))
        .any(|next| !safe_zone.contains(&next))
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    #[test]
    fn corners_deduplicate_on_single_row_grids() {
        let grid = Grid::new(4, 1).expect("4x1 grid");
        assert_eq!(corner_spawns(&grid), vec![Pos::new(0, 0), Pos::new(3, 0)]);
    }

    #[test]
    fn safe_zone_covers_spawn_and_neighbours() {
        let grid = Grid::new(5, 5).expect("5x5 grid");
        let zone = safe_zone(&grid, &[Pos::new(0, 0)]);
        assert_eq!(zone, BTreeSet::from([Pos::new(0, 0), Pos::new(0, 1), Pos::new(1, 0)]));
    }

    #[test]
    fn rewards_avoid_corners_goal_and_each_other() {
        let grid = Grid::new(5, 5).expect("5x5 grid");
        let corners = corner_spawns(&grid);
        let goal = Pos::new(2, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(17);

        let rewards = place_rewards(&mut rng, &grid, 8, &corners, goal);

        assert_eq!(rewards.len(), 8);
        let cells: BTreeSet<Pos> = rewards.iter().map(|reward| reward.pos).collect();
        assert_eq!(cells.len(), 8);
        assert!(!cells.contains(&goal));
        assert!(corners.iter().all(|corner| !cells.contains(corner)));
    }

    #[test]
    fn hazards_skip_cells_that_only_open_into_the_safe_zone() {
        let mut grid = Grid::new(4, 4).expect("4x4 grid");
        let pocket = Pos::new(1, 1);
        grid.open_between(pocket, Direction::Left).expect("in bounds");
        grid.open_between(pocket, Direction::Back).expect("in bounds");
        grid.open_between(Pos::new(2, 2), Direction::Right).expect("in bounds");
        let zone = BTreeSet::from([Pos::new(0, 1), Pos::new(1, 0)]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let rules = HazardRules { count: 1, safe_zone: &zone, goal: Pos::new(3, 3), rewards: &[] };

        let hazards = place_hazards(&mut rng, &grid, &rules);

        assert_eq!(hazards.len(), 1);
        assert!(!hazards.contains(&pocket));
    }

    #[test]
    fn hazards_keep_their_distance() {
        let grid = Grid::new(15, 15).expect("15x15 grid");
        let corners = corner_spawns(&grid);
        let zone = safe_zone(&grid, &corners);
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let rules = HazardRules { count: 6, safe_zone: &zone, goal: Pos::new(7, 7), rewards: &[] };

        let hazards = place_hazards(&mut rng, &grid, &rules);

        assert_eq!(hazards.len(), 6);
        for (i, a) in hazards.iter().enumerate() {
            assert!(a.x >= 1 && a.z >= 1 && !zone.contains(a) && *a != Pos::new(7, 7));
            for b in &hazards[i + 1..] {
                assert!(a.x.abs_diff(b.x) > 1 || a.z.abs_diff(b.z) > 1, "{a} crowds {b}");
            }
        }
    }
}
