//! Reward pickup and effect dispatch.

use tracing::debug;

use super::*;

impl Game {
    /// Collects rewards under surviving avatars and returns the avatars that earned a focus
    /// handoff, in pickup order.
    pub(super) fn collect_rewards(&mut self, removed: &[AvatarId]) -> Vec<AvatarId> {
        let mut handoffs = Vec::new();
        for id in self.world.avatar_ids() {
            if removed.contains(&id) {
                continue;
            }
            let pos = self.world.avatars[id].pos;
            let Some(reward) = self.world.take_reward_at(pos) else {
                continue;
            };
            self.score += 1;
            self.log.push(LogEvent::RewardCollected { avatar: id, effect: reward.effect });
            debug!(?id, effect = ?reward.effect, "reward collected");
            if self.apply_reward_effect(id, reward.effect) {
                handoffs.push(id);
            }
        }
        handoffs
    }

    /// Returns `true` when the effect froze the other avatars and focus should move to `picker`.
    fn apply_reward_effect(&mut self, picker: AvatarId, effect: RewardEffect) -> bool {
        let ticks = self.config.upgrade_ticks;
        let Some(avatar) = self.world.avatars.get_mut(picker) else {
            return false;
        };
        match effect {
            RewardEffect::Score => {
                self.score += self.config.score_reward_bonus;
                return false;
            }
            RewardEffect::SpeedBoost => avatar.boosted_ticks = ticks,
            RewardEffect::Invulnerability => avatar.invulnerable_ticks = ticks,
        }
        avatar.paused_ticks = 0;
        for (id, other) in self.world.avatars.iter_mut() {
            if id != picker {
                other.paused_ticks = ticks;
                other.move_buffer = 0.0;
            }
        }
        self.pause_owner = Some(picker);
        true
    }
}
