//! Injectable randomness for tick draws.
//!
//! Every tick makes three uniform draws in a fixed order: the region index,
//! the action index, then the synthetic user id. The engine never touches a
//! global RNG; it asks a [`RandomSource`] instead, so production runs use
//! [`RngSource`] and tests script exact outcomes with [`ScriptedSource`].

use std::collections::VecDeque;

use flashsale_types::ActionKind;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A uniform integer generator.
pub trait RandomSource {
    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform integer in `low..=high`. Returns `low` when `high <= low`.
    fn between(&mut self, low: u32, high: u32) -> u32;
}

/// Production source backed by any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<SmallRng> {
    /// Deterministic source: the same seed yields the same tick sequence.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Non-deterministic source seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(SmallRng::from_os_rng())
    }

    /// Seeded when `seed` is set, OS-seeded otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_os_rng, Self::seeded)
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn between(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}

/// Replays a fixed script of draws.
///
/// Build it tick by tick with [`then`](Self::then); each scripted tick
/// supplies the region index, action, and user id in the order the engine
/// draws them. Once the script runs out every draw returns its lowest
/// value (index 0, `low`).
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    draws: VecDeque<u64>,
}

impl ScriptedSource {
    /// Create an empty script.
    pub const fn new() -> Self {
        Self {
            draws: VecDeque::new(),
        }
    }

    /// Append one tick's worth of draws.
    #[must_use]
    pub fn then(mut self, region_index: usize, action: ActionKind, user_id: u32) -> Self {
        self.push_tick(region_index, action, user_id);
        self
    }

    /// Append one tick's worth of draws in place.
    pub fn push_tick(&mut self, region_index: usize, action: ActionKind, user_id: u32) {
        let action_index = ActionKind::ALL
            .iter()
            .position(|candidate| *candidate == action)
            .unwrap_or(0);
        self.draws
            .push_back(u64::try_from(region_index).unwrap_or(u64::MAX));
        self.draws
            .push_back(u64::try_from(action_index).unwrap_or(0));
        self.draws.push_back(u64::from(user_id));
    }

    /// Number of scripted draws not yet consumed.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedSource {
    fn index(&mut self, len: usize) -> usize {
        let raw = self.draws.pop_front().unwrap_or(0);
        usize::try_from(raw)
            .unwrap_or(usize::MAX)
            .min(len.saturating_sub(1))
    }

    fn between(&mut self, low: u32, high: u32) -> u32 {
        let raw = self.draws.pop_front().unwrap_or(0);
        let value = u32::try_from(raw).unwrap_or(u32::MAX);
        if high <= low {
            return low;
        }
        value.clamp(low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_sources_repeat() {
        let mut a = RngSource::seeded(7);
        let mut b = RngSource::seeded(7);
        for _ in 0..50 {
            assert_eq!(a.index(4), b.index(4));
            assert_eq!(a.between(100, 999), b.between(100, 999));
        }
    }

    #[test]
    fn rng_source_stays_in_range() {
        let mut source = RngSource::seeded(1234);
        for _ in 0..1000 {
            assert!(source.index(4) < 4);
            let user = source.between(100, 999);
            assert!((100..=999).contains(&user));
        }
    }

    #[test]
    fn rng_source_covers_every_index() {
        let mut source = RngSource::seeded(5);
        let mut seen = [false; 3];
        for _ in 0..200 {
            if let Some(slot) = seen.get_mut(source.index(3)) {
                *slot = true;
            }
        }
        assert!(seen.iter().all(|hit| *hit));
    }

    #[test]
    fn degenerate_ranges() {
        let mut source = RngSource::seeded(0);
        assert_eq!(source.index(0), 0);
        assert_eq!(source.between(5, 5), 5);
        assert_eq!(source.between(9, 3), 9);
    }

    #[test]
    fn scripted_source_replays_in_draw_order() {
        let mut source = ScriptedSource::new()
            .then(2, ActionKind::Purchase, 512)
            .then(0, ActionKind::View, 100);
        assert_eq!(source.remaining(), 6);

        assert_eq!(source.index(4), 2);
        assert_eq!(source.index(ActionKind::ALL.len()), 2);
        assert_eq!(source.between(100, 999), 512);

        assert_eq!(source.index(4), 0);
        assert_eq!(source.index(ActionKind::ALL.len()), 0);
        assert_eq!(source.between(100, 999), 100);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn scripted_source_clamps_and_falls_back() {
        let mut source = ScriptedSource::new().then(9, ActionKind::AddToCart, 5000);
        assert_eq!(source.index(4), 3);
        assert_eq!(source.index(3), 1);
        assert_eq!(source.between(100, 999), 999);

        // Exhausted
        assert_eq!(source.index(4), 0);
        assert_eq!(source.between(100, 999), 100);
    }
}
