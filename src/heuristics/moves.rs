//! In-place tour mutators shared by every heuristic.
//!
//! These work on positions only and never look at coordinates, except for
//! [`two_opt_delta`] which prices a 2-opt move without applying it.

use log::warn;
use rand::prelude::*;

use crate::instance::Graph;

/// Smallest length decrease treated as an improvement by the deterministic
/// descents.
pub const IMPROVEMENT_EPSILON: f64 = 1e-9;

/// Reverse the closed range `[i, j]` of the tour.
///
/// Returns `false` and leaves the tour untouched when `i >= j` or `j` is
/// outside the tour.
pub fn reverse_segment(tour: &mut [usize], i: usize, j: usize) -> bool {
    if i >= j || j >= tour.len() {
        warn!(
            "reverse_segment: invalid indices i={}, j={} for tour of {} nodes",
            i,
            j,
            tour.len()
        );
        return false;
    }
    tour[i..=j].reverse();
    true
}

/// Exchange the entries at positions `i` and `j`.
pub fn swap_positions(tour: &mut [usize], i: usize, j: usize) -> bool {
    if i >= tour.len() || j >= tour.len() {
        warn!(
            "swap_positions: invalid indices i={}, j={} for tour of {} nodes",
            i,
            j,
            tour.len()
        );
        return false;
    }
    tour.swap(i, j);
    true
}

/// Randomly permute the `k` consecutive entries starting at `start`,
/// wrapping past the end of the tour, and write them back in place.
///
/// Blocks of fewer than two entries, or covering the whole tour, are left
/// alone and `false` is returned.
pub fn scramble_window<R: Rng + ?Sized>(
    tour: &mut [usize],
    start: usize,
    k: usize,
    rng: &mut R,
) -> bool {
    let n = tour.len();
    if k <= 1 || k >= n {
        return false;
    }

    let mut block: Vec<usize> = (0..k).map(|i| tour[(start + i) % n]).collect();
    for i in 0..k - 1 {
        let j = rng.gen_range(i..k);
        swap_positions(&mut block, i, j);
    }
    for (i, node) in block.into_iter().enumerate() {
        tour[(start + i) % n] = node;
    }
    true
}

/// Change in tour length from replacing edges `(tour[i], tour[i+1])` and
/// `(tour[k], tour[k+1])` by `(tour[i], tour[k])` and `(tour[i+1], tour[k+1])`.
///
/// Successor positions wrap, so `k = n - 1` pairs with position `0`.
#[inline]
pub fn two_opt_delta(graph: &Graph, tour: &[usize], i: usize, k: usize) -> f64 {
    let n = tour.len();
    let a = tour[i];
    let b = tour[(i + 1) % n];
    let c = tour[k];
    let d = tour[(k + 1) % n];

    (graph.distance(a, c) + graph.distance(b, d)) - (graph.distance(a, b) + graph.distance(c, d))
}

/// Apply the 2-opt move priced by [`two_opt_delta`] for `i < k`: the segment
/// strictly after `i` up to and including `k` is reversed.
#[inline]
pub fn apply_two_opt(tour: &mut [usize], i: usize, k: usize) {
    if i + 1 < k {
        reverse_segment(tour, i + 1, k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::is_permutation;
    use proptest::prelude::*;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pentagon() -> Graph {
        Graph::from_coordinates(&[(0.0, 0.0), (4.0, 1.0), (1.0, 3.0), (5.0, 5.0), (2.0, 6.0)])
    }

    #[test]
    fn test_reverse_segment() {
        let mut tour = vec![0, 1, 2, 3, 4];
        assert!(reverse_segment(&mut tour, 1, 3));
        assert_eq!(tour, vec![0, 3, 2, 1, 4]);
    }

    #[test]
    fn test_reverse_segment_invalid_is_noop() {
        let mut tour = vec![0, 1, 2, 3];
        assert!(!reverse_segment(&mut tour, 2, 2));
        assert!(!reverse_segment(&mut tour, 3, 1));
        assert!(!reverse_segment(&mut tour, 1, 4));
        assert_eq!(tour, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_swap_positions() {
        let mut tour = vec![0, 1, 2];
        assert!(swap_positions(&mut tour, 0, 2));
        assert_eq!(tour, vec![2, 1, 0]);
        assert!(!swap_positions(&mut tour, 0, 3));
    }

    #[test]
    fn test_scramble_window_wraps() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut tour: Vec<usize> = (0..8).collect();
        assert!(scramble_window(&mut tour, 6, 4, &mut rng));
        assert!(is_permutation(&tour, 8));
        // positions outside the window 6,7,0,1 are untouched
        assert_eq!(&tour[2..6], &[2, 3, 4, 5]);
    }

    #[test]
    fn test_scramble_window_rejects_degenerate_sizes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut tour = vec![0, 1, 2, 3];
        assert!(!scramble_window(&mut tour, 0, 1, &mut rng));
        assert!(!scramble_window(&mut tour, 0, 4, &mut rng));
        assert_eq!(tour, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_two_opt_uncrosses_square() {
        let graph = Graph::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let mut tour = vec![0, 2, 1, 3];
        let delta = two_opt_delta(&graph, &tour, 0, 2);
        assert!(delta < 0.0);
        apply_two_opt(&mut tour, 0, 2);
        assert!((graph.tour_length(&tour) - 4.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn prop_reversal_is_involution(n in 2usize..40, a in 0usize..40, b in 0usize..40) {
            let i = a % n;
            let j = b % n;
            prop_assume!(i < j);
            let original: Vec<usize> = (0..n).rev().collect();
            let mut tour = original.clone();
            reverse_segment(&mut tour, i, j);
            reverse_segment(&mut tour, i, j);
            prop_assert_eq!(tour, original);
        }

        #[test]
        fn prop_two_opt_delta_matches_length_change(seed in any::<u64>(), a in 0usize..5, b in 0usize..5) {
            let graph = pentagon();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut tour: Vec<usize> = (0..5).collect();
            tour.shuffle(&mut rng);
            let (i, k) = (a.min(b), a.max(b));
            prop_assume!(i < k);

            let before = graph.tour_length(&tour);
            let delta = two_opt_delta(&graph, &tour, i, k);
            apply_two_opt(&mut tour, i, k);
            let after = graph.tour_length(&tour);
            prop_assert!((after - before - delta).abs() < 1e-9);
        }

        #[test]
        fn prop_scramble_keeps_permutation(seed in any::<u64>(), n in 3usize..30, start in 0usize..30, k in 2usize..30) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut tour: Vec<usize> = (0..n).collect();
            scramble_window(&mut tour, start % n, k, &mut rng);
            prop_assert!(is_permutation(&tour, n));
        }
    }
}
