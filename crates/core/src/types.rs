use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use thiserror::Error;

new_key_type! {
    pub struct AvatarId;
    pub struct HazardId;
    pub struct RewardId;
}

/// Grid coordinate. `x` grows to the right, `z` grows toward the front.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub z: i32,
}

impl Pos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Unit step in `direction`, or `None` when the coordinate would leave the `i32` range.
    pub fn offset(self, direction: Direction) -> Option<Self> {
        let (dx, dz) = direction.delta();
        Some(Self { x: self.x.checked_add(dx)?, z: self.z.checked_add(dz)? })
    }

    /// Direction of a unit step from `self` to `other`, if they are orthogonally adjacent.
    pub fn direction_to(self, other: Pos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|direction| self.offset(*direction) == Some(other))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
}

impl Direction {
    /// Fixed iteration order used everywhere a deterministic neighbour walk is needed.
    pub const ALL: [Direction; 4] =
        [Direction::Front, Direction::Back, Direction::Left, Direction::Right];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Front => (0, 1),
            Direction::Back => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Front => Direction::Back,
            Direction::Back => Direction::Front,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn wall(self) -> WallSide {
        match self {
            Direction::Front => WallSide::FrontWall,
            Direction::Back => WallSide::BackWall,
            Direction::Left => WallSide::LeftWall,
            Direction::Right => WallSide::RightWall,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WallSide {
    FrontWall,
    BackWall,
    LeftWall,
    RightWall,
}

impl WallSide {
    pub fn direction(self) -> Direction {
        match self {
            WallSide::FrontWall => Direction::Front,
            WallSide::BackWall => Direction::Back,
            WallSide::LeftWall => Direction::Left,
            WallSide::RightWall => Direction::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardEffect {
    SpeedBoost,
    Invulnerability,
    Score,
}

impl RewardEffect {
    pub const ALL: [RewardEffect; 3] =
        [RewardEffect::SpeedBoost, RewardEffect::Invulnerability, RewardEffect::Score];

    /// Effects that grant the picker a timed upgrade and freeze everyone else.
    pub fn is_upgrade(self) -> bool {
        matches!(self, RewardEffect::SpeedBoost | RewardEffect::Invulnerability)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepCommand {
    Move(Direction),
    Hold,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Victory,
    Defeat,
    TimedOut,
}

#[derive(Clone, Debug)]
pub enum AdvanceStopReason {
    Finished(RunOutcome),
    BudgetExhausted,
}

#[derive(Clone, Debug)]
pub struct AdvanceResult {
    pub simulated_ticks: u32,
    pub stop_reason: AdvanceStopReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("grid dimensions {width}x{height} are invalid")]
    InvalidDimensions { width: usize, height: usize },
    #[error("position {0} is outside the grid")]
    OutOfBounds(Pos),
    #[error("wall between {0} and its {1:?} neighbour is not symmetric")]
    AsymmetricWall(Pos, Direction),
    #[error("at least one avatar is required")]
    NoAvatars,
    #[error("cell {0} is already occupied")]
    OccupiedCell(Pos),
    #[error("unknown difficulty selector {0}")]
    UnknownDifficulty(u8),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    FocusElected { avatar: AvatarId, path_len: usize },
    FocusHandoff { from: Option<AvatarId>, to: AvatarId, path_len: usize },
    FocusCleared { avatar: AvatarId },
    Stalled { avatar: AvatarId },
    DangerHeld { avatar: AvatarId, cell: Pos },
    Sidestepped { avatar: AvatarId, direction: Direction },
    RewardCollected { avatar: AvatarId, effect: RewardEffect },
    HazardChasing { hazard: HazardId, target: AvatarId },
    HazardLostTarget { hazard: HazardId },
    AvatarDestroyed { avatar: AvatarId, hazard: HazardId },
    AvatarReachedGoal { avatar: AvatarId },
}

pub type TickCommands = BTreeMap<AvatarId, StepCommand>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_wall_side_mapping_is_bijective() {
        for direction in Direction::ALL {
            assert_eq!(direction.wall().direction(), direction);
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }

    #[test]
    fn direction_to_only_matches_orthogonal_neighbours() {
        let origin = Pos::new(2, 2);
        assert_eq!(origin.direction_to(Pos::new(2, 3)), Some(Direction::Front));
        assert_eq!(origin.direction_to(Pos::new(1, 2)), Some(Direction::Left));
        assert_eq!(origin.direction_to(Pos::new(3, 3)), None);
        assert_eq!(origin.direction_to(origin), None);
    }

    #[test]
    fn offset_at_the_coordinate_limit_is_none() {
        assert_eq!(Pos::new(i32::MAX, 0).offset(Direction::Right), None);
        assert_eq!(Pos::new(0, i32::MIN).offset(Direction::Back), None);
        assert_eq!(Pos::new(i32::MAX, 0).direction_to(Pos::new(i32::MIN, 0)), None);
    }
}
