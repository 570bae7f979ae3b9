//! Stable snapshot hashing for deterministic verification.
//! This module exists to keep hashing concerns separate from simulation control code.
//! It does not own run summaries or their persistence.

use std::hash::Hasher;

use slotmap::Key;
use xxhash_rust::xxh3::Xxh3;

use super::*;

impl Game {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.tick);
        hasher.write_u64(self.score);
        hasher.write_u64(self.multiplier);
        hasher.write_u64(self.autopilot.focus().map_or(0, |focus| focus.data().as_ffi()));
        for (id, avatar) in &self.world.avatars {
            hasher.write_u64(id.data().as_ffi());
            hasher.write_i32(avatar.pos.x);
            hasher.write_i32(avatar.pos.z);
            hasher.write_u32(avatar.paused_ticks);
            hasher.write_u32(avatar.boosted_ticks);
            hasher.write_u32(avatar.invulnerable_ticks);
        }
        for hazard in self.world.hazards.values() {
            hasher.write_i32(hazard.pos.x);
            hasher.write_i32(hazard.pos.z);
            hasher.write_u8(hazard.heading.map_or(0, |heading| heading as u8 + 1));
        }
        hasher.write_usize(self.world.rewards.len());
        hasher.finish()
    }
}
