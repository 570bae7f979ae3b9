//! Bellman-Ford relaxation over the maze with reward discounts and hazard exclusion.
//! This module exists because negative reward costs rule out a plain Dijkstra or A* search.
//! It does not own hazard prediction or the cost rules themselves.

use std::collections::BTreeMap;

use tracing::warn;

use super::cost::CostModel;
use super::oracle::HazardOracle;
use crate::state::Grid;
use crate::types::{Direction, Pos};

#[derive(Clone, Copy, Debug, PartialEq)]
struct PathNode {
    cost: f32,
    parent: Option<Pos>,
    steps_since_reward: u32,
}

/// Minimum-cost walk from `start` to `goal`, both inclusive. Empty when no finite path exists.
pub fn solve(
    grid: &Grid,
    oracle: &HazardOracle,
    cost_model: &CostModel,
    start: Pos,
    goal: Pos,
) -> Vec<Pos> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return Vec::new();
    }
    if start == goal {
        return vec![start];
    }

    let mut nodes = BTreeMap::new();
    nodes.insert(
        start,
        PathNode {
            cost: 0.0,
            parent: None,
            steps_since_reward: cost_model.reward_cooldown_steps,
        },
    );

    let max_rounds = grid.cell_count().saturating_sub(1);
    for _ in 0..max_rounds {
        if !relax_round(grid, oracle, cost_model, start, &mut nodes) {
            break;
        }
    }

    match nodes.get(&goal) {
        Some(node) if node.cost.is_finite() => reconstruct_path(&nodes, start, goal),
        _ => Vec::new(),
    }
}

fn relax_round(
    grid: &Grid,
    oracle: &HazardOracle,
    cost_model: &CostModel,
    start: Pos,
    nodes: &mut BTreeMap<Pos, PathNode>,
) -> bool {
    let mut updated = false;
    let known: Vec<Pos> = nodes.keys().copied().collect();
    for pos in known {
        let node = nodes[&pos];
        for direction in Direction::ALL {
            let Some(next) = grid.step(pos, direction) else {
                continue;
            };
            if next == start || is_ancestor(nodes, next, pos) {
                continue;
            }
            let step = cost_model.step(grid, oracle, pos, next, node.steps_since_reward);
            let candidate = node.cost + step.cost;
            let improves = nodes.get(&next).is_none_or(|existing| candidate < existing.cost);
            if improves {
                nodes.insert(
                    next,
                    PathNode {
                        cost: candidate,
                        parent: Some(pos),
                        steps_since_reward: step.steps_since_reward,
                    },
                );
                updated = true;
            }
        }
    }
    updated
}

/// Re-parenting `candidate` under one of its own descendants would close a loop in the tree.
fn is_ancestor(nodes: &BTreeMap<Pos, PathNode>, candidate: Pos, of: Pos) -> bool {
    let mut current = nodes.get(&of).and_then(|node| node.parent);
    while let Some(pos) = current {
        if pos == candidate {
            return true;
        }
        current = nodes.get(&pos).and_then(|node| node.parent);
    }
    false
}

fn reconstruct_path(nodes: &BTreeMap<Pos, PathNode>, start: Pos, goal: Pos) -> Vec<Pos> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        let Some(parent) = nodes.get(&current).and_then(|node| node.parent) else {
            return Vec::new();
        };
        path.push(parent);
        current = parent;
        if path.len() > nodes.len() {
            warn!(?start, ?goal, "parent chain loops; discarding path");
            return Vec::new();
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Hazard, RewardSpawn, WorldState};
    use crate::types::RewardEffect;

    fn solve_default(grid: &Grid, oracle: &HazardOracle, start: Pos, goal: Pos) -> Vec<Pos> {
        solve(grid, oracle, &CostModel::default(), start, goal)
    }

    fn assert_walkable(grid: &Grid, path: &[Pos]) {
        for pair in path.windows(2) {
            let direction = pair[0].direction_to(pair[1]).expect("path steps are adjacent");
            assert!(grid.can_walk(pair[0], direction), "path crosses a wall at {}", pair[0]);
        }
    }

    #[test]
    fn start_equal_to_goal_yields_single_cell_path() {
        let grid = Grid::open(3, 3).expect("3x3 grid");
        let path = solve_default(&grid, &HazardOracle::default(), Pos::new(1, 1), Pos::new(1, 1));
        assert_eq!(path, vec![Pos::new(1, 1)]);
    }

    #[test]
    fn enclosed_goal_yields_empty_path() {
        let mut grid = Grid::open(3, 3).expect("3x3 grid");
        let goal = Pos::new(2, 2);
        grid.close_between(goal, Direction::Left).expect("in bounds");
        grid.close_between(goal, Direction::Back).expect("in bounds");

        let path = solve_default(&grid, &HazardOracle::default(), Pos::new(0, 0), goal);
        assert!(path.is_empty());
    }

    #[test]
    fn out_of_bounds_endpoints_yield_empty_path() {
        let grid = Grid::open(3, 3).expect("3x3 grid");
        let oracle = HazardOracle::default();
        assert!(solve_default(&grid, &oracle, Pos::new(-1, 0), Pos::new(2, 2)).is_empty());
        assert!(solve_default(&grid, &oracle, Pos::new(0, 0), Pos::new(3, 2)).is_empty());
    }

    #[test]
    fn corridor_path_collects_reward_on_the_way() {
        let grid = Grid::open(5, 1).expect("5x1 grid");
        let reward = RewardSpawn { pos: Pos::new(1, 0), effect: RewardEffect::SpeedBoost };
        let world =
            WorldState::initialize(grid, &[Pos::new(0, 0)], &[], &[reward], Pos::new(4, 0))
                .expect("valid world");

        let path = solve_default(&world.grid, &HazardOracle::default(), Pos::new(0, 0), world.goal);
        assert_eq!(path.len(), 5);
        assert!(path.contains(&Pos::new(1, 0)));
    }

    #[test]
    fn reward_pulls_path_into_a_short_detour() {
        // Straight line along z = 0 versus a one-row detour through a reward at (2, 1).
        let grid = Grid::open(5, 2).expect("5x2 grid");
        let reward = RewardSpawn { pos: Pos::new(2, 1), effect: RewardEffect::Score };
        let world =
            WorldState::initialize(grid, &[Pos::new(0, 0)], &[], &[reward], Pos::new(4, 0))
                .expect("valid world");

        let path = solve_default(&world.grid, &HazardOracle::default(), Pos::new(0, 0), world.goal);
        assert!(path.contains(&Pos::new(2, 1)), "reward detour should be cheaper: {path:?}");
        assert_walkable(&world.grid, &path);
    }

    #[test]
    fn open_grid_path_routes_around_hazard() {
        let grid = Grid::open(5, 5).expect("5x5 grid");
        let hazard = Hazard::new(Pos::new(2, 2));
        let oracle = HazardOracle::from_hazards(&grid, [&hazard]);

        let path = solve_default(&grid, &oracle, Pos::new(0, 0), Pos::new(4, 4));
        assert_eq!(path.len(), 9);
        assert_eq!(path.first(), Some(&Pos::new(0, 0)));
        assert_eq!(path.last(), Some(&Pos::new(4, 4)));
        assert!(!path.contains(&Pos::new(2, 2)));
        assert_walkable(&grid, &path);
    }

    #[test]
    fn hazard_on_only_corridor_blocks_the_goal() {
        let grid = Grid::open(4, 1).expect("4x1 grid");
        let hazard = Hazard::new(Pos::new(2, 0));
        let oracle = HazardOracle::from_hazards(&grid, [&hazard]);

        assert!(solve_default(&grid, &oracle, Pos::new(0, 0), Pos::new(3, 0)).is_empty());
    }

    #[test]
    fn predicted_hazard_step_is_avoided() {
        let grid = Grid::open(3, 3).expect("3x3 grid");
        let mut hazard = Hazard::new(Pos::new(2, 0));
        hazard.heading = Some(Direction::Left);
        let oracle = HazardOracle::from_hazards(&grid, [&hazard]);

        let path = solve_default(&grid, &oracle, Pos::new(0, 0), Pos::new(2, 2));
        assert!(!path.is_empty());
        assert!(!path.contains(&Pos::new(1, 0)), "predicted cell must be avoided: {path:?}");
    }

    #[test]
    fn repeated_solves_on_same_snapshot_agree() {
        let grid = Grid::open(6, 6).expect("6x6 grid");
        let hazard = Hazard::new(Pos::new(3, 2));
        let oracle = HazardOracle::from_hazards(&grid, [&hazard]);

        let first = solve_default(&grid, &oracle, Pos::new(0, 0), Pos::new(5, 5));
        let second = solve_default(&grid, &oracle, Pos::new(0, 0), Pos::new(5, 5));
        assert_eq!(first, second);
    }
}
