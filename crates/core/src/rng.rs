//! RNG module - deterministic color generation
//!
//! Every random decision in the simulation (initial fill, refill colors,
//! board-disrupting enemy swaps, gauntlet spawns) goes through a seeded
//! [`SimpleRng`], so the same seed replays the same battle.
//!
//! Board code does not depend on the generator directly: it asks a
//! [`ColorSource`] for colors. Tests substitute [`ScriptedColors`] to control
//! exactly which tokens fall into a cascade.

use std::collections::VecDeque;

use crate::types::Color;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    ///
    /// Uses the high half of the state; the low bits of a power-of-two LCG
    /// cycle with very short periods.
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        (self.next_u32() >> 16) % max
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Supplier of token colors for fills and refills
pub trait ColorSource {
    /// Next color in `0..color_count`
    fn next_color(&mut self, color_count: u8) -> Color;
}

impl ColorSource for SimpleRng {
    fn next_color(&mut self, color_count: u8) -> Color {
        Color(self.next_range(color_count as u32) as u8)
    }
}

/// Replays a fixed list of colors, then falls back to a seeded RNG
///
/// Scripted values are reduced modulo `color_count`.
#[derive(Debug, Clone)]
pub struct ScriptedColors {
    script: VecDeque<u8>,
    fallback: SimpleRng,
}

impl ScriptedColors {
    pub fn new(script: impl IntoIterator<Item = u8>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: SimpleRng::new(7),
        }
    }

    /// Colors not yet handed out
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ColorSource for ScriptedColors {
    fn next_color(&mut self, color_count: u8) -> Color {
        match self.script.pop_front() {
            Some(c) => Color(c % color_count.max(1)),
            None => self.fallback.next_color(color_count),
        }
    }
}
