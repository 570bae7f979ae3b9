//! Deterministic navigation over the maze grid.
//! This module exists so path costs, hazard prediction, and path solving are reusable by the
//! autopilot and by tests. It does not own focus selection or per-tick movement.

mod cost;
mod oracle;
mod solver;

pub use cost::{CostModel, StepCost};
pub use oracle::{HazardOracle, can_see};
pub use solver::solve;

use crate::types::Pos;

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.z.abs_diff(b.z)
}
