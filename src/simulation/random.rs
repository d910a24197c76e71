// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Injectable randomness for the tick engine.
//!
//! The engine only ever asks for uniform draws in `[0, 1)`; everything else
//! (symmetric perturbations, coin flips) is derived from those. Production
//! code uses [`StdRandom`]; tests pin behaviour with [`SequenceRandom`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random numbers.
pub trait RandomSource: Send {
    /// Returns a uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Returns a uniform draw in `[-bound, bound)`. A unit draw of 0.5 maps
    /// to exactly zero.
    fn symmetric(&mut self, bound: f64) -> f64 {
        (self.unit() * 2.0 - 1.0) * bound
    }

    /// Returns `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }
}

/// [`RandomSource`] backed by `rand`'s standard generator.
#[derive(Debug, Clone)]
pub struct StdRandom(StdRng);

impl StdRandom {
    /// Seeds from operating system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    /// Seeds deterministically.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn unit(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

/// [`RandomSource`] replaying a fixed list of draws, cycling at the end.
///
/// # Examples
///
/// ```
/// use cleaner_sim::simulation::{RandomSource, SequenceRandom};
///
/// // 0.5 means "no perturbation" and never passes a small chance check.
/// let mut still = SequenceRandom::constant(0.5);
/// assert_eq!(still.symmetric(3.0), 0.0);
/// assert!(!still.chance(0.05));
/// ```
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    next: usize,
}

impl SequenceRandom {
    /// Replays `values` in order, forever. An empty list behaves like
    /// [`constant(0.5)`](Self::constant).
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }

    /// Always returns `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.next % self.values.len()];
        self.next = self.next.wrapping_add(1);
        value
    }
}
