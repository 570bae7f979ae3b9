//! Focus election, per-tick re-planning, and shared-fate step broadcast for all avatars.
//! This module exists to keep routing policy separate from the path solver and from movement.
//! It does not move avatars or hazards; it only returns the commands for a tick.

mod danger;


use std::mem;

use tracing::{debug, trace};

use crate::config::{AutopilotConfig, DangerPolicy};
use crate::nav::{HazardOracle, solve};
use crate::state::WorldState;
use crate::types::*;

#[derive(Clone, Debug)]
pub struct Autopilot {
    config: AutopilotConfig,
    focus: Option<AvatarId>,
    stalled: bool,
    log: Vec<LogEvent>,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Self {
        Self { config, focus: None, stalled: false, log: Vec::new() }
    }

    pub fn focus(&self) -> Option<AvatarId> {
        self.focus
    }

    /// Events recorded since the last call, in emission order.
    pub fn take_log(&mut self) -> Vec<LogEvent> {
        mem::take(&mut self.log)
    }

    /// Re-plans for the focused avatar and returns one command per live avatar.
    /// An empty avatar set yields no commands.
    pub fn on_tick(&mut self, world: &mut WorldState) -> TickCommands {
        if world.avatars.is_empty() {
            self.focus = None;
            return TickCommands::new();
        }
        if let Some(focus) = self.focus
            && !world.avatars.contains_key(focus)
        {
            debug!(?focus, "focused avatar vanished; re-electing");
            self.clear_focus(focus);
        }

        let oracle = HazardOracle::from_world(world);
        let (focus, path) = match self.focus {
            Some(focus) => {
                let path = self.solve_for(world, &oracle, focus);
                (focus, path)
            }
            None => match self.elect(world, &oracle) {
                Some(elected) => elected,
                None => return TickCommands::new(),
            },
        };

        let Some(next) = path.get(1).copied() else {
            if path.is_empty() && !self.stalled {
                debug!(?focus, "no path to goal; holding");
                self.log.push(LogEvent::Stalled { avatar: focus });
            }
            self.stalled = path.is_empty();
            return hold_all(world);
        };
        self.stalled = false;
        let Some(direction) = path[0].direction_to(next) else {
            return hold_all(world);
        };

        let direction = match danger::endangered(world, &oracle, direction) {
            None => direction,
            Some(cell) => match self.config.danger_policy {
                DangerPolicy::Hold => {
                    debug!(?focus, ?cell, "step endangers an avatar; holding this tick");
                    self.log.push(LogEvent::DangerHeld { avatar: focus, cell });
                    return hold_all(world);
                }
                DangerPolicy::Sidestep => {
                    match danger::sidestep(world, &oracle, &self.config.cost, focus, direction) {
                        Some(alternative) => {
                            self.log.push(LogEvent::Sidestepped {
                                avatar: focus,
                                direction: alternative,
                            });
                            alternative
                        }
                        None => {
                            self.log.push(LogEvent::DangerHeld { avatar: focus, cell });
                            return hold_all(world);
                        }
                    }
                }
            },
        };

        trace!(?focus, ?direction, "broadcasting step");
        broadcast(world, direction)
    }

    /// Hands focus to `avatar` with a freshly solved path. Returns `false` when the handoff is
    /// ignored because the avatar is gone or already focused.
    pub fn on_focus_candidate(&mut self, world: &mut WorldState, avatar: AvatarId) -> bool {
        if self.focus == Some(avatar) || !world.avatars.contains_key(avatar) {
            return false;
        }
        let oracle = HazardOracle::from_world(world);
        let previous = self.focus;
        if let Some(previous) = previous
            && let Some(stale) = world.avatars.get_mut(previous)
        {
            stale.path_to_goal.clear();
        }
        let path = self.solve_for(world, &oracle, avatar);
        debug!(?previous, ?avatar, path_len = path.len(), "focus handed off");
        self.log.push(LogEvent::FocusHandoff { from: previous, to: avatar, path_len: path.len() });
        self.focus = Some(avatar);
        self.stalled = false;
        true
    }

    pub fn on_avatar_removed(&mut self, avatar: AvatarId) {
        if self.focus == Some(avatar) {
            self.clear_focus(avatar);
        }
    }

    fn clear_focus(&mut self, avatar: AvatarId) {
        self.focus = None;
        self.stalled = false;
        self.log.push(LogEvent::FocusCleared { avatar });
    }

    /// Solves for every avatar, stores each path, and focuses the shortest non-empty one.
    /// Falls back to the first avatar when nobody can reach the goal.
    fn elect(
        &mut self,
        world: &mut WorldState,
        oracle: &HazardOracle,
    ) -> Option<(AvatarId, Vec<Pos>)> {
        let ids = world.avatar_ids();
        let first = ids.first().copied()?;
        let mut best: Option<(AvatarId, Vec<Pos>)> = None;
        for id in ids {
            let path = self.solve_for(world, oracle, id);
            if path.is_empty() {
                continue;
            }
            let is_better = match &best {
                None => true,
                Some((_, best_path)) => path.len() < best_path.len(),
            };
            if is_better {
                best = Some((id, path));
            }
        }
        let (focus, path) = best.unwrap_or((first, Vec::new()));
        debug!(?focus, path_len = path.len(), "focus elected");
        self.log.push(LogEvent::FocusElected { avatar: focus, path_len: path.len() });
        self.focus = Some(focus);
        Some((focus, path))
    }

    fn solve_for(
        &self,
        world: &mut WorldState,
        oracle: &HazardOracle,
        avatar: AvatarId,
    ) -> Vec<Pos> {
        let Some(pos) = world.avatars.get(avatar).map(|avatar| avatar.pos) else {
            return Vec::new();
        };
        let path = solve(&world.grid, oracle, &self.config.cost, pos, world.goal);
        if let Some(state) = world.avatars.get_mut(avatar) {
            state.path_to_goal.clone_from(&path);
        }
        path
    }
}

fn hold_all(world: &WorldState) -> TickCommands {
    world.avatars.keys().map(|id| (id, StepCommand::Hold)).collect()
}

/// Shared-fate movement: every avatar that is not paused receives the same direction.
fn broadcast(world: &WorldState, direction: Direction) -> TickCommands {
    world
        .avatars
        .iter()
        .map(|(id, avatar)| {
            let command =
                if avatar.is_paused() { StepCommand::Hold } else { StepCommand::Move(direction) };
            (id, command)
        })
        .collect()
}
