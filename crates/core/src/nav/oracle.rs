//! Per-tick hazard snapshot queried by the cost model and the danger check.
//! This module exists so every query in a tick sees the same hazard positions.
//! It does not move hazards or decide how the autopilot reacts to danger.

use std::collections::BTreeSet;

use crate::state::{Grid, Hazard, WorldState};
use crate::types::{Direction, Pos};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HazardOracle {
    occupied: BTreeSet<Pos>,
    predicted: BTreeSet<Pos>,
    striking: BTreeSet<Pos>,
}

impl HazardOracle {
    pub fn from_world(world: &WorldState) -> Self {
        Self::from_hazards(&world.grid, world.hazards.values())
    }

    pub fn from_hazards<'a>(grid: &Grid, hazards: impl IntoIterator<Item = &'a Hazard>) -> Self {
        let mut oracle = Self::default();
        for hazard in hazards {
            oracle.occupied.insert(hazard.pos);
            if let Some(next) = predicted_next(grid, hazard) {
                oracle.predicted.insert(next);
            }
            if hazard.chasing.is_some() {
                for direction in Direction::ALL {
                    if let Some(next) = grid.step(hazard.pos, direction) {
                        oracle.striking.insert(next);
                    }
                }
            }
        }
        oracle
    }

    pub fn occupied(&self, pos: Pos) -> bool {
        self.occupied.contains(&pos)
    }

    /// A hazard is expected to step into `pos` on its next move.
    pub fn predicted(&self, pos: Pos) -> bool {
        self.predicted.contains(&pos)
    }

    /// In, about to step into, or within striking distance of a chasing hazard.
    pub fn threatens(&self, pos: Pos) -> bool {
        self.occupied(pos) || self.predicted(pos) || self.striking.contains(&pos)
    }
}

/// Next cell along the hazard's heading, if the wall ahead is open.
pub fn predicted_next(grid: &Grid, hazard: &Hazard) -> Option<Pos> {
    hazard.heading.and_then(|heading| grid.step(hazard.pos, heading))
}

/// Straight-corridor line of sight of at most `range` cells with no wall in between.
pub fn can_see(grid: &Grid, from: Pos, to: Pos, range: u32) -> bool {
    if from == to {
        return true;
    }
    if from.x != to.x && from.z != to.z {
        return false;
    }
    let Some(direction) = Direction::ALL.into_iter().find(|direction| {
        let (dx, dz) = direction.delta();
        (to.x - from.x).signum() == dx && (to.z - from.z).signum() == dz
    }) else {
        return false;
    };
    let mut current = from;
    for _ in 0..range {
        let Some(next) = grid.step(current, direction) else {
            return false;
        };
        if next == to {
            return true;
        }
        current = next;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_predicts_next_cell_only_through_open_walls() {
        let mut grid = Grid::open(4, 1).expect("4x1 grid");
        let mut hazard = Hazard::new(Pos::new(1, 0));
        hazard.heading = Some(Direction::Right);

        let oracle = HazardOracle::from_hazards(&grid, [&hazard]);
        assert!(oracle.occupied(Pos::new(1, 0)));
        assert!(oracle.predicted(Pos::new(2, 0)));
        assert!(!oracle.threatens(Pos::new(0, 0)));

        grid.close_between(Pos::new(1, 0), Direction::Right).expect("in bounds");
        let walled = HazardOracle::from_hazards(&grid, [&hazard]);
        assert!(!walled.predicted(Pos::new(2, 0)));
    }

    #[test]
    fn chasing_hazard_threatens_connected_neighbours() {
        let mut grid = Grid::open(3, 3).expect("3x3 grid");
        grid.close_between(Pos::new(1, 1), Direction::Front).expect("in bounds");
        let mut hazard = Hazard::new(Pos::new(1, 1));
        hazard.chasing = Some(Default::default());

        let oracle = HazardOracle::from_hazards(&grid, [&hazard]);
        assert!(oracle.threatens(Pos::new(0, 1)));
        assert!(oracle.threatens(Pos::new(1, 0)));
        assert!(!oracle.threatens(Pos::new(1, 2)), "wall blocks the strike");
        assert!(!oracle.threatens(Pos::new(0, 0)));
    }

    #[test]
    fn line_of_sight_stops_at_walls_and_range() {
        let mut grid = Grid::open(6, 2).expect("6x2 grid");
        assert!(can_see(&grid, Pos::new(0, 0), Pos::new(4, 0), 4));
        assert!(!can_see(&grid, Pos::new(0, 0), Pos::new(5, 0), 4));
        assert!(!can_see(&grid, Pos::new(0, 0), Pos::new(1, 1), 4));

        grid.close_between(Pos::new(2, 0), Direction::Right).expect("in bounds");
        assert!(!can_see(&grid, Pos::new(0, 0), Pos::new(4, 0), 4));
        assert!(can_see(&grid, Pos::new(4, 0), Pos::new(3, 0), 4));
    }
}
