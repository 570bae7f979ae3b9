use std::collections::{BTreeSet, VecDeque};

use slotmap::SlotMap;

use crate::types::*;

/// Bounded length of the hazard movement and position histories.
pub const HAZARD_HISTORY_LEN: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    open: [bool; 4],
    pub reward: Option<RewardId>,
    pub hazard: Option<HazardId>,
    pub goal: bool,
    pub visited: bool,
}

impl Cell {
    pub fn can_walk(&self, direction: Direction) -> bool {
        self.open[direction.index()]
    }

    pub fn has_wall(&self, side: WallSide) -> bool {
        !self.can_walk(side.direction())
    }
}

/// Arena of maze cells indexed by coordinate. Every cell starts fully walled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Result<Self, GameError> {
        if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(GameError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height, cells: vec![Cell::default(); width * height] })
    }

    /// Grid with every interior wall removed. The outer border stays closed.
    pub fn open(width: usize, height: usize) -> Result<Self, GameError> {
        let mut grid = Self::new(width, height)?;
        for pos in grid.positions() {
            for direction in [Direction::Front, Direction::Right] {
                if grid.neighbor(pos, direction).is_some() {
                    grid.open_between(pos, direction)?;
                }
            }
        }
        Ok(grid)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.z >= 0 && (pos.x as usize) < self.width && (pos.z as usize) < self.height
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(&self.cells[self.index(pos)])
    }

    pub fn cell_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        if !self.in_bounds(pos) {
            return None;
        }
        let idx = self.index(pos);
        Some(&mut self.cells[idx])
    }

    /// In-bounds neighbour in `direction`, ignoring walls.
    pub fn neighbor(&self, pos: Pos, direction: Direction) -> Option<Pos> {
        if !self.in_bounds(pos) {
            return None;
        }
        pos.offset(direction).filter(|next| self.in_bounds(*next))
    }

    pub fn can_walk(&self, pos: Pos, direction: Direction) -> bool {
        self.cell(pos).is_some_and(|cell| cell.can_walk(direction))
    }

    /// Neighbour reachable through an open wall.
    pub fn step(&self, pos: Pos, direction: Direction) -> Option<Pos> {
        if !self.can_walk(pos, direction) {
            return None;
        }
        self.neighbor(pos, direction)
    }

    /// Opens the wall on both sides so passability stays symmetric.
    pub fn open_between(&mut self, pos: Pos, direction: Direction) -> Result<Pos, GameError> {
        self.set_passage(pos, direction, true)
    }

    pub fn close_between(&mut self, pos: Pos, direction: Direction) -> Result<Pos, GameError> {
        self.set_passage(pos, direction, false)
    }

    fn set_passage(
        &mut self,
        pos: Pos,
        direction: Direction,
        open: bool,
    ) -> Result<Pos, GameError> {
        let Some(next) = self.neighbor(pos, direction) else {
            let outside = if self.in_bounds(pos) { pos.offset(direction) } else { None };
            return Err(GameError::OutOfBounds(outside.unwrap_or(pos)));
        };
        let here = self.index(pos);
        let there = self.index(next);
        self.cells[here].open[direction.index()] = open;
        self.cells[there].open[direction.opposite().index()] = open;
        Ok(next)
    }

    pub fn validate_symmetry(&self) -> Result<(), GameError> {
        for pos in self.positions() {
            for direction in Direction::ALL {
                let here = self.can_walk(pos, direction);
                match self.neighbor(pos, direction) {
                    Some(next) if here != self.can_walk(next, direction.opposite()) => {
                        return Err(GameError::AsymmetricWall(pos, direction));
                    }
                    None if here => return Err(GameError::AsymmetricWall(pos, direction)),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |z| (0..width).map(move |x| Pos { x, z }))
    }

    pub fn is_goal(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(|cell| cell.goal)
    }

    pub fn reward_at(&self, pos: Pos) -> Option<RewardId> {
        self.cell(pos).and_then(|cell| cell.reward)
    }

    pub fn hazard_at(&self, pos: Pos) -> Option<HazardId> {
        self.cell(pos).and_then(|cell| cell.hazard)
    }

    pub fn clear_visited(&mut self) {
        for cell in &mut self.cells {
            cell.visited = false;
        }
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.z as usize) * self.width + (pos.x as usize)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Avatar {
    pub pos: Pos,
    /// Last path solved for this avatar. Written only by the autopilot.
    pub path_to_goal: Vec<Pos>,
    pub paused_ticks: u32,
    pub boosted_ticks: u32,
    pub invulnerable_ticks: u32,
    pub move_buffer: f32,
}

impl Avatar {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            path_to_goal: Vec::new(),
            paused_ticks: 0,
            boosted_ticks: 0,
            invulnerable_ticks: 0,
            move_buffer: 0.0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_ticks > 0
    }

    pub fn is_boosted(&self) -> bool {
        self.boosted_ticks > 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ticks > 0
    }

    pub fn is_upgraded(&self) -> bool {
        self.is_boosted() || self.is_invulnerable()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hazard {
    pub pos: Pos,
    pub heading: Option<Direction>,
    pub chasing: Option<AvatarId>,
    pub move_history: VecDeque<Direction>,
    pub position_history: VecDeque<Pos>,
    pub move_buffer: f32,
}

impl Hazard {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            heading: None,
            chasing: None,
            move_history: VecDeque::with_capacity(HAZARD_HISTORY_LEN),
            position_history: VecDeque::with_capacity(HAZARD_HISTORY_LEN),
            move_buffer: 0.0,
        }
    }

    pub fn record_move(&mut self, direction: Direction, from: Pos) {
        self.move_history.push_back(direction);
        if self.move_history.len() > HAZARD_HISTORY_LEN {
            self.move_history.pop_front();
        }
        self.position_history.push_back(from);
        if self.position_history.len() > HAZARD_HISTORY_LEN {
            self.position_history.pop_front();
        }
        self.heading = Some(direction);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reward {
    pub pos: Pos,
    pub effect: RewardEffect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RewardSpawn {
    pub pos: Pos,
    pub effect: RewardEffect,
}

/// Everything the navigation engine reads and the game loop mutates.
/// Passed explicitly by reference; there is no global instance.
#[derive(Clone, Debug)]
pub struct WorldState {
    pub grid: Grid,
    pub avatars: SlotMap<AvatarId, Avatar>,
    pub hazards: SlotMap<HazardId, Hazard>,
    pub rewards: SlotMap<RewardId, Reward>,
    pub goal: Pos,
    pub safe_zone: BTreeSet<Pos>,
}

impl WorldState {
    pub fn initialize(
        mut grid: Grid,
        avatar_starts: &[Pos],
        hazard_starts: &[Pos],
        rewards: &[RewardSpawn],
        goal: Pos,
    ) -> Result<Self, GameError> {
        if avatar_starts.is_empty() {
            return Err(GameError::NoAvatars);
        }
        grid.validate_symmetry()?;
        let Some(goal_cell) = grid.cell_mut(goal) else {
            return Err(GameError::OutOfBounds(goal));
        };
        goal_cell.goal = true;

        let mut avatar_map = SlotMap::with_key();
        for &pos in avatar_starts {
            if !grid.in_bounds(pos) {
                return Err(GameError::OutOfBounds(pos));
            }
            avatar_map.insert(Avatar::new(pos));
        }

        let mut hazard_map = SlotMap::with_key();
        for &pos in hazard_starts {
            let Some(cell) = grid.cell_mut(pos) else {
                return Err(GameError::OutOfBounds(pos));
            };
            if cell.hazard.is_some() || avatar_starts.contains(&pos) {
                return Err(GameError::OccupiedCell(pos));
            }
            cell.hazard = Some(hazard_map.insert(Hazard::new(pos)));
        }

        let mut reward_map = SlotMap::with_key();
        for spawn in rewards {
            let Some(cell) = grid.cell_mut(spawn.pos) else {
                return Err(GameError::OutOfBounds(spawn.pos));
            };
            if cell.reward.is_some() {
                return Err(GameError::OccupiedCell(spawn.pos));
            }
            cell.reward = Some(reward_map.insert(Reward { pos: spawn.pos, effect: spawn.effect }));
        }

        Ok(Self {
            grid,
            avatars: avatar_map,
            hazards: hazard_map,
            rewards: reward_map,
            goal,
            safe_zone: BTreeSet::new(),
        })
    }

    pub fn with_safe_zone(
        mut self,
        cells: impl IntoIterator<Item = Pos>,
    ) -> Result<Self, GameError> {
        for pos in cells {
            if !self.grid.in_bounds(pos) {
                return Err(GameError::OutOfBounds(pos));
            }
            self.safe_zone.insert(pos);
        }
        Ok(self)
    }

    pub fn is_safe(&self, pos: Pos) -> bool {
        self.safe_zone.contains(&pos)
    }

    pub fn avatar_ids(&self) -> Vec<AvatarId> {
        self.avatars.keys().collect()
    }

    pub fn remove_avatar(&mut self, avatar: AvatarId) -> Option<Avatar> {
        self.avatars.remove(avatar)
    }

    pub fn take_reward_at(&mut self, pos: Pos) -> Option<Reward> {
        let id = self.grid.cell_mut(pos)?.reward.take()?;
        self.rewards.remove(id)
    }

    /// Rewrites per-cell hazard occupancy from the hazard arena after hazards move.
    pub fn sync_hazard_occupancy(&mut self) {
        for pos in self.grid.positions() {
            if let Some(cell) = self.grid.cell_mut(pos) {
                cell.hazard = None;
            }
        }
        for (id, hazard) in &self.hazards {
            if let Some(cell) = self.grid.cell_mut(hazard.pos) {
                cell.hazard.get_or_insert(id);
            }
        }
    }
}
