//! Newton-Raphson solver for the spiral angle.
//!
//! The arc length of the spiral `r = k·φ` grows with `φ²`, so the angle for a
//! given accumulated arc length is the root of `f(t) = t² − L·k`. The closed
//! form is `√(L·k)`; the iteration is kept so placements match the reference
//! renderer, and the warm start (previous angle) keeps it to a few steps.

use crate::error::LayoutError;

/// Absolute tolerance on `|f(t)|`.
pub const TOLERANCE: f64 = 1e-6;
/// Iteration cap before reporting divergence.
pub const MAX_ITERATIONS: usize = 1000;

/// Solve `t² = arc_distance · growth` for `t ≥ 0`, starting from `initial_guess`.
///
/// A non-finite or non-positive guess is replaced by 1.0 (the derivative
/// `2t` vanishes at 0). Negative or non-finite inputs have no real root and
/// end in [`LayoutError::Diverged`].
pub fn solve(arc_distance: f64, growth: f64, initial_guess: f64) -> Result<f64, LayoutError> {
    let target = arc_distance * growth;
    let mut t = if initial_guess.is_finite() && initial_guess > 0.0 {
        initial_guess
    } else {
        1.0
    };

    for _ in 0..MAX_ITERATIONS {
        let f_t = t * t - target;
        if f_t.abs() < TOLERANCE {
            return Ok(t);
        }
        t -= f_t / (2.0 * t);
    }

    Err(LayoutError::Diverged {
        arc_distance,
        growth,
        iterations: MAX_ITERATIONS,
    })
}
