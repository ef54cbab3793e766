#![allow(dead_code)]

use std::collections::VecDeque;

use rand::RngCore;

/// Raw draws that make `gen_range(0..3)` land on each power-up kind.
pub const PICK_SLOW: u64 = 0;
pub const PICK_SHRINK: u64 = u64::MAX / 3 + 1;
pub const PICK_GHOST: u64 = (u64::MAX / 3) * 2 + 2;

/// A spawn roll that always succeeds.
pub const ROLL_HIT: u64 = 0;
/// A spawn roll that always fails.
pub const ROLL_MISS: u64 = u64::MAX;

/// Replays a fixed list of raw draws, then repeats `fallback` forever.
pub struct ScriptedRng {
    draws: VecDeque<u64>,
    fallback: u64,
}

impl ScriptedRng {
    pub fn new(draws: &[u64], fallback: u64) -> Box<Self> {
        Box::new(Self {
            draws: draws.iter().copied().collect(),
            fallback,
        })
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
