//! Hazard patrol and chase movement.
//! This module exists to keep hazard steering separate from avatar movement and collisions.
//! It does not decide whether a collision destroys an avatar.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::*;
use crate::nav::{can_see, manhattan};
use crate::rng::random_unit;
use crate::state::{Grid, Hazard};

impl Game {
    pub(super) fn move_hazards(&mut self) {
        let ids: Vec<HazardId> = self.world.hazards.keys().collect();
        for id in ids {
            self.update_chase_target(id);
            self.step_hazard(id);
        }
        self.world.sync_hazard_occupancy();
    }

    /// Chases the nearest avatar in straight-corridor sight that is exposed: outside the safe
    /// zone and not invulnerable.
    fn update_chase_target(&mut self, id: HazardId) {
        let Some(hazard_pos) = self.world.hazards.get(id).map(|hazard| hazard.pos) else {
            return;
        };
        let target = self
            .world
            .avatars
            .iter()
            .filter(|(_, avatar)| {
                !avatar.is_invulnerable()
                    && !self.world.is_safe(avatar.pos)
                    && can_see(
                        &self.world.grid,
                        hazard_pos,
                        avatar.pos,
                        self.config.detection_range,
                    )
            })
            .min_by_key(|(avatar_id, avatar)| (manhattan(hazard_pos, avatar.pos), *avatar_id))
            .map(|(avatar_id, _)| avatar_id);

        let hazard = &mut self.world.hazards[id];
        if hazard.chasing == target {
            return;
        }
        match target {
            Some(target) => {
                debug!(?id, ?target, "hazard started chasing");
                self.log.push(LogEvent::HazardChasing { hazard: id, target });
            }
            None => self.log.push(LogEvent::HazardLostTarget { hazard: id }),
        }
        hazard.chasing = target;
    }

    fn step_hazard(&mut self, id: HazardId) {
        let Some(hazard) = self.world.hazards.get_mut(id) else {
            return;
        };
        let speed = match hazard.chasing {
            Some(_) => self.config.chase_speed,
            None => self.config.patrol_speed,
        };
        hazard.move_buffer += speed;
        if hazard.move_buffer < 1.0 {
            return;
        }
        hazard.move_buffer -= 1.0;

        let grid = &self.world.grid;
        let safe_zone = &self.world.safe_zone;
        let target = hazard.chasing.and_then(|target| self.world.avatars.get(target));
        let direction = match target {
            Some(target) => chase_direction(grid, safe_zone, hazard.pos, target.pos),
            None => patrol_direction(&mut self.rng, grid, safe_zone, hazard),
        };
        let Some(direction) = direction else {
            return;
        };
        let from = hazard.pos;
        if let Some(next) = grid.step(from, direction) {
            hazard.pos = next;
            hazard.record_move(direction, from);
        }
    }
}

fn chase_direction(
    grid: &Grid,
    safe_zone: &BTreeSet<Pos>,
    from: Pos,
    target: Pos,
) -> Option<Direction> {
    Direction::ALL
        .into_iter()
        .filter_map(|direction| {
            let next = grid.step(from, direction)?;
            (!safe_zone.contains(&next)).then_some((manhattan(next, target), direction))
        })
        .min()
        .filter(|(distance, _)| *distance < manhattan(from, target))
        .map(|(_, direction)| direction)
}

/// History-weighted wandering: each open direction starts at weight 1, halves for every recent
/// use, gains 1 when it leads somewhere not recently visited and drops to a fifth otherwise.
/// Reversal is only chosen when it is the sole way out.
fn patrol_direction(
    rng: &mut ChaCha8Rng,
    grid: &Grid,
    safe_zone: &BTreeSet<Pos>,
    hazard: &Hazard,
) -> Option<Direction> {
    let reverse = hazard.heading.map(Direction::opposite);
    let open: Vec<(Direction, Pos)> = Direction::ALL
        .into_iter()
        .filter_map(|direction| {
            let next = grid.step(hazard.pos, direction)?;
            (!safe_zone.contains(&next)).then_some((direction, next))
        })
        .collect();
    let forward: Vec<(Direction, Pos)> =
        open.iter().copied().filter(|(direction, _)| Some(*direction) != reverse).collect();
    let choices = if forward.is_empty() { open } else { forward };

    let weighted: Vec<(Direction, f32)> = choices
        .into_iter()
        .map(|(direction, next)| {
            let mut weight = 1.0_f32;
            for _ in hazard.move_history.iter().filter(|past| **past == direction) {
                weight *= 0.5;
            }
            if hazard.position_history.contains(&next) {
                weight *= 0.2;
            } else {
                weight += 1.0;
            }
            (direction, weight)
        })
        .collect();

    let total: f32 = weighted.iter().map(|(_, weight)| weight).sum();
    let mut roll = random_unit(rng) * total;
    for &(direction, weight) in &weighted {
        if roll < weight {
            return Some(direction);
        }
        roll -= weight;
    }
    weighted.last().map(|(direction, _)| *direction)
}
