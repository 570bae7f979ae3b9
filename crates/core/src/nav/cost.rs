//! Per-step traversal costs for the path solver.

use serde::{Deserialize, Serialize};

use super::oracle::HazardOracle;
use crate::state::Grid;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub default_cost: f32,
    /// Cost of entering a reward cell once the cooldown has elapsed. Negative to attract detours.
    pub reward_cost: f32,
    pub reward_cooldown_steps: u32,
}

impl Default for CostModel {
    fn default() -> Self {
        Self { default_cost: 1.0, reward_cost: -3.0, reward_cooldown_steps: 3 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepCost {
    pub cost: f32,
    /// Counter carried into the destination node.
    pub steps_since_reward: u32,
}

impl CostModel {
    /// Cost of stepping `from` -> `to` given the steps walked since the last discounted reward.
    pub fn step(
        &self,
        grid: &Grid,
        oracle: &HazardOracle,
        from: Pos,
        to: Pos,
        steps_since_reward: u32,
    ) -> StepCost {
        let carried = steps_since_reward.saturating_add(1);
        if oracle.occupied(to) || oracle.predicted(to) {
            return StepCost { cost: f32::INFINITY, steps_since_reward: carried };
        }
        if grid.reward_at(to).is_some()
            && grid.reward_at(from).is_none()
            && steps_since_reward >= self.reward_cooldown_steps
        {
            return StepCost { cost: self.reward_cost, steps_since_reward: 0 };
        }
        StepCost { cost: self.default_cost, steps_since_reward: carried }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Hazard, RewardSpawn, WorldState};
    use crate::types::RewardEffect;

    fn corridor_with_reward() -> WorldState {
        let grid = Grid::open(5, 1).expect("5x1 grid");
        let reward = RewardSpawn { pos: Pos::new(1, 0), effect: RewardEffect::Score };
        WorldState::initialize(grid, &[Pos::new(0, 0)], &[], &[reward], Pos::new(4, 0))
            .expect("valid world")
    }

    #[test]
    fn reward_is_discounted_once_cooldown_elapsed() {
        let world = corridor_with_reward();
        let model = CostModel::default();
        let oracle = HazardOracle::default();

        let fresh = model.step(&world.grid, &oracle, Pos::new(0, 0), Pos::new(1, 0), 3);
        assert_eq!(fresh, StepCost { cost: -3.0, steps_since_reward: 0 });

        let recent = model.step(&world.grid, &oracle, Pos::new(0, 0), Pos::new(1, 0), 2);
        assert_eq!(recent, StepCost { cost: 1.0, steps_since_reward: 3 });
    }

    #[test]
    fn plain_cells_cost_default_and_advance_counter() {
        let world = corridor_with_reward();
        let model = CostModel::default();
        let oracle = HazardOracle::default();

        let step = model.step(&world.grid, &oracle, Pos::new(2, 0), Pos::new(3, 0), 0);
        assert_eq!(step, StepCost { cost: 1.0, steps_since_reward: 1 });
    }

    #[test]
    fn hazard_cells_are_impassable_even_with_a_reward() {
        let world = corridor_with_reward();
        let hazard = Hazard::new(Pos::new(1, 0));
        let oracle = HazardOracle::from_hazards(&world.grid, [&hazard]);

        let step =
            CostModel::default().step(&world.grid, &oracle, Pos::new(0, 0), Pos::new(1, 0), 3);
        assert!(step.cost.is_infinite());
    }
}
