//! Fixed-point driver shared by every DMFT self-consistency loop.
//!
//! Each solver supplies one iteration `state -> state`; the driver mixes
//! successive iterates, checks `np.allclose`-style convergence and enforces
//! the loop budget.

use greens::helper::{all_close, max_distance};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Loop parameters of a self-consistency cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopControl {
    /// Absolute tolerance between two successive iterates.
    pub conv: f64,
    /// Iteration budget; reaching it is reported, not treated as an error.
    pub max_loops: usize,
    /// Weight of the new iterate in linear mixing (1 disables mixing).
    pub mixing: f64,
    /// Set by [`LoopControl::once`]: the budget is not expected to converge.
    #[serde(default)]
    pub single_pass: bool,
}

impl Default for LoopControl {
    fn default() -> Self {
        LoopControl {
            conv: 1e-5,
            max_loops: 3000,
            mixing: 1.0,
            single_pass: false,
        }
    }
}

impl LoopControl {
    pub fn new(conv: f64, max_loops: usize) -> Self {
        LoopControl {
            conv,
            max_loops,
            ..LoopControl::default()
        }
    }

    /// A single pass through the loop, whatever the distance.
    pub fn once() -> Self {
        LoopControl {
            single_pass: true,
            ..LoopControl::new(0.0, 1)
        }
    }

    pub fn with_mixing(mut self, mixing: f64) -> Self {
        self.mixing = mixing;
        self
    }
}

/// Outcome of a self-consistency cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopReport {
    pub loops: usize,
    pub converged: bool,
    /// Largest point-wise change in the last iteration.
    pub distance: f64,
}

/// A quantity that can be iterated to self-consistency.
pub trait FixedPoint: Sized {
    /// Convergence test against the previous iterate.
    fn is_close(&self, previous: &Self, atol: f64) -> bool;

    fn distance(&self, previous: &Self) -> f64;

    /// `self <- mixing * self + (1 - mixing) * previous`.
    fn mix(&mut self, previous: &Self, mixing: f64);
}

impl FixedPoint for Vec<Complex64> {
    fn is_close(&self, previous: &Self, atol: f64) -> bool {
        all_close(self, previous, atol)
    }

    fn distance(&self, previous: &Self) -> f64 {
        max_distance(self, previous)
    }

    fn mix(&mut self, previous: &Self, mixing: f64) {
        for (new, old) in self.iter_mut().zip(previous) {
            *new = *new * mixing + *old * (1.0 - mixing);
        }
    }
}

/// Scalars converge on the absolute distance alone.
impl FixedPoint for f64 {
    fn is_close(&self, previous: &Self, atol: f64) -> bool {
        (self - previous).abs() <= atol
    }

    fn distance(&self, previous: &Self) -> f64 {
        (self - previous).abs()
    }

    fn mix(&mut self, previous: &Self, mixing: f64) {
        *self = mixing * *self + (1.0 - mixing) * previous;
    }
}

impl<A: FixedPoint, B: FixedPoint> FixedPoint for (A, B) {
    fn is_close(&self, previous: &Self, atol: f64) -> bool {
        self.0.is_close(&previous.0, atol) && self.1.is_close(&previous.1, atol)
    }

    fn distance(&self, previous: &Self) -> f64 {
        self.0.distance(&previous.0).max(self.1.distance(&previous.1))
    }

    fn mix(&mut self, previous: &Self, mixing: f64) {
        self.0.mix(&previous.0, mixing);
        self.1.mix(&previous.1, mixing);
    }
}

/// Iterates `step` from `state` until two successive iterates are close or
/// the budget of `control` is exhausted. Returns the last iterate.
pub fn iterate<S, F>(mut state: S, control: &LoopControl, mut step: F) -> (S, LoopReport)
where
    S: FixedPoint,
    F: FnMut(&S) -> S,
{
    let mut distance = f64::INFINITY;
    for loops in 1..=control.max_loops {
        let mut next = step(&state);
        if control.mixing < 1.0 {
            next.mix(&state, control.mixing);
        }
        distance = next.distance(&state);
        let converged = next.is_close(&state, control.conv);
        debug!("loop {}: distance {:.3e}", loops, distance);
        state = next;

        if converged {
            info!("Converged in {} loops (distance {:.3e})", loops, distance);
            return (
                state,
                LoopReport {
                    loops,
                    converged: true,
                    distance,
                },
            );
        }
    }

    if !control.single_pass {
        warn!(
            "Failed to converge in less than {} iterations (distance {:.3e})",
            control.max_loops, distance
        );
    }
    (
        state,
        LoopReport {
            loops: control.max_loops,
            converged: false,
            distance,
        },
    )
}
