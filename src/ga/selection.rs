//! Constrained tournament selection.
//!
//! Pairwise rule, in priority order:
//! 1. If either individual violates constraints, the smaller violation wins.
//! 2. Otherwise, if either has a non-zero objective, the smaller objective wins.
//! 3. Otherwise (both zero), either may win.
//!
//! Exact ties at any level are broken uniformly at random, so neither
//! criterion biases selection on ties.
//!
//! # Reference
//! Deb (2000), "An efficient constraint handling method for genetic algorithms"

use rand::Rng;

use crate::cost::Evaluation;

/// Returns whichever of `a` and `b` should advance.
///
/// `a` and `b` are individual indices; `ea` and `eb` their evaluations.
pub fn tie_break<R: Rng>(
    a: usize,
    ea: &Evaluation,
    b: usize,
    eb: &Evaluation,
    rng: &mut R,
) -> usize {
    if ea.violation != 0.0 || eb.violation != 0.0 {
        return pick_smaller(a, ea.violation, b, eb.violation, rng);
    }
    if ea.cost != 0.0 || eb.cost != 0.0 {
        return pick_smaller(a, ea.cost, b, eb.cost, rng);
    }
    if rng.random_bool(0.5) { a } else { b }
}

fn pick_smaller<R: Rng>(a: usize, va: f64, b: usize, vb: f64, rng: &mut R) -> usize {
    if va < vb {
        a
    } else if vb < va {
        b
    } else if rng.random_bool(0.5) {
        a
    } else {
        b
    }
}

/// Picks one individual by a tournament of `size` random entrants.
///
/// Entrants are drawn with replacement and reduced with [`tie_break`].
///
/// # Panics
/// Panics if `evaluations` is empty.
pub fn tournament<R: Rng>(evaluations: &[Evaluation], size: usize, rng: &mut R) -> usize {
    let n = evaluations.len();
    let mut winner = rng.random_range(0..n);
    for _ in 1..size.max(1) {
        let challenger = rng.random_range(0..n);
        winner = tie_break(
            winner,
            &evaluations[winner],
            challenger,
            &evaluations[challenger],
            rng,
        );
    }
    winner
}
