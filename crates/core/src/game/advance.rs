//! Per-tick simulation loop and stop-reason handling.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::*;

impl Game {
    pub fn advance(&mut self, max_steps: u32) -> AdvanceResult {
        if let Some(outcome) = self.finished_outcome {
            return AdvanceResult {
                simulated_ticks: 0,
                stop_reason: AdvanceStopReason::Finished(outcome),
            };
        }

        let mut steps = 0;
        while steps < max_steps {
            self.step_tick();
            steps += 1;

            if let Some(outcome) = self.check_finished() {
                info!(tick = self.tick, ?outcome, final_score = self.final_score(), "run finished");
                self.finished_outcome = Some(outcome);
                return AdvanceResult {
                    simulated_ticks: steps,
                    stop_reason: AdvanceStopReason::Finished(outcome),
                };
            }
        }
        AdvanceResult { simulated_ticks: steps, stop_reason: AdvanceStopReason::BudgetExhausted }
    }

    fn step_tick(&mut self) {
        let avatars_before: BTreeMap<AvatarId, Pos> =
            self.world.avatars.iter().map(|(id, avatar)| (id, avatar.pos)).collect();
        let hazards_before: BTreeMap<HazardId, Pos> =
            self.world.hazards.iter().map(|(id, hazard)| (id, hazard.pos)).collect();

        let commands = self.autopilot.on_tick(&mut self.world);
        self.log.extend(self.autopilot.take_log());
        self.move_avatars(&commands);
        self.move_hazards();

        let mut removed = self.resolve_collisions(&avatars_before, &hazards_before);
        removed.extend(self.resolve_goal_arrivals(&removed));
        self.expire_counters();
        let handoffs = self.collect_rewards(&removed);
        self.apply_removals_then_handoffs(&removed, &handoffs);

        self.tick += 1;
    }

    fn move_avatars(&mut self, commands: &TickCommands) {
        for (&id, &command) in commands {
            let Some(avatar) = self.world.avatars.get_mut(id) else {
                continue;
            };
            let direction = match command {
                StepCommand::Hold => {
                    avatar.move_buffer = 0.0;
                    continue;
                }
                StepCommand::Move(direction) => direction,
            };
            avatar.move_buffer += if avatar.is_boosted() {
                self.config.boosted_speed
            } else {
                self.config.avatar_speed
            };
            if avatar.move_buffer < 1.0 {
                continue;
            }
            avatar.move_buffer -= 1.0;
            if let Some(next) = self.world.grid.step(avatar.pos, direction) {
                avatar.pos = next;
            }
        }
    }

    /// Avatars sharing a cell with a hazard, or trading cells with one, are destroyed unless
    /// invulnerable.
    pub(super) fn resolve_collisions(
        &mut self,
        avatars_before: &BTreeMap<AvatarId, Pos>,
        hazards_before: &BTreeMap<HazardId, Pos>,
    ) -> Vec<AvatarId> {
        let mut destroyed = Vec::new();
        for (id, avatar) in &self.world.avatars {
            if avatar.is_invulnerable() {
                continue;
            }
            let previous = avatars_before.get(&id).copied().unwrap_or(avatar.pos);
            let hit = self.world.hazards.iter().find_map(|(hazard_id, hazard)| {
                let swapped = hazard.pos == previous
                    && hazards_before.get(&hazard_id) == Some(&avatar.pos)
                    && previous != avatar.pos;
                (hazard.pos == avatar.pos || swapped).then_some(hazard_id)
            });
            if let Some(hazard) = hit {
                debug!(?id, ?hazard, pos = ?avatar.pos, "avatar destroyed");
                self.log.push(LogEvent::AvatarDestroyed { avatar: id, hazard });
                destroyed.push(id);
            }
        }
        destroyed
    }

    fn resolve_goal_arrivals(&mut self, already_removed: &[AvatarId]) -> Vec<AvatarId> {
        let mut arrived = Vec::new();
        for (id, avatar) in &self.world.avatars {
            if avatar.pos == self.world.goal && !already_removed.contains(&id) {
                self.multiplier += 1;
                self.log.push(LogEvent::AvatarReachedGoal { avatar: id });
                arrived.push(id);
            }
        }
        arrived
    }

    fn expire_counters(&mut self) {
        for avatar in self.world.avatars.values_mut() {
            avatar.paused_ticks = avatar.paused_ticks.saturating_sub(1);
            avatar.boosted_ticks = avatar.boosted_ticks.saturating_sub(1);
            avatar.invulnerable_ticks = avatar.invulnerable_ticks.saturating_sub(1);
        }
        if let Some(owner) = self.pause_owner
            && !self.world.avatars.get(owner).is_some_and(|avatar| avatar.is_upgraded())
        {
            self.pause_owner = None;
        }
    }

    /// Removals are applied first so a handoff naming an avatar removed in the same tick is
    /// dropped instead of resurrecting a stale focus.
    pub(super) fn apply_removals_then_handoffs(
        &mut self,
        removed: &[AvatarId],
        handoffs: &[AvatarId],
    ) {
        for &id in removed {
            if self.world.remove_avatar(id).is_none() {
                continue;
            }
            if self.pause_owner == Some(id) {
                self.pause_owner = None;
                for avatar in self.world.avatars.values_mut() {
                    avatar.paused_ticks = 0;
                }
            }
            self.autopilot.on_avatar_removed(id);
        }
        for &id in handoffs {
            if !self.autopilot.on_focus_candidate(&mut self.world, id) {
                debug!(?id, "handoff ignored");
            }
        }
        self.log.extend(self.autopilot.take_log());
    }

    fn check_finished(&self) -> Option<RunOutcome> {
        if self.world.avatars.is_empty() {
            return Some(if self.multiplier > 0 { RunOutcome::Victory } else { RunOutcome::Defeat });
        }
        (self.tick >= self.config.max_ticks).then_some(RunOutcome::TimedOut)
    }
}
