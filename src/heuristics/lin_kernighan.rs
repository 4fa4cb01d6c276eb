//! Restricted Lin-Kernighan edge exchange.
//!
//! A single chain is grown from the anchor position `t1 = 1`:
//!
//! 1. `t2 = t1 + 1` closes the removed edge `x1 = (t1, t2)`.
//! 2. Among all `t3` other than `t1`, `t2` and `t2 + 1`, the one maximizing
//!    `G1 = d(t1,t2) + d(t2,t3) - d(t1,t3) - d(t2+1,t2+2)` is chosen. If the
//!    best `G1` is not positive no improving chain exists and the search ends.
//! 3. The chain is extended to `i = 2`. The link at depth `i` is the edge
//!    starting at `t3 + i - 2`, exchanged against `x1` as a 2-opt move.
//! 4. An improving move is applied by reversing `t2 ..= t2i-1`. Reaching a new
//!    best length restarts the chain from step 2, otherwise the chain keeps
//!    extending.
//! 5. A non-improving link is retracted (`i -= 1`). When `i` reaches 0 the
//!    anchor is exhausted and the search ends.
//!
//! Only one `t3` is ever tried per chain and there is no backtracking over
//! alternatives deeper in the chain. The loop is also bounded by
//! `max_iterations`.
//!
//! With `advance_anchor` set, an exhausted anchor (step 2 or 5) moves the
//! search on to `t1 + 1` instead, and it ends once `n` anchors in a row have
//! been exhausted without a new best.

use log::{debug, info};
use rand::prelude::*;

use super::moves::{apply_two_opt, two_opt_delta, IMPROVEMENT_EPSILON};
use super::{Heuristic, RunStats};
use crate::config::SolverConfig;
use crate::error::TspError;
use crate::instance::Graph;
use crate::solution::check_tour;

/// Pick `t3` for anchor `t1`. Returns the position and its gain `G1`, or
/// `None` when no candidate exists.
fn best_first_link(graph: &Graph, tour: &[usize], t1: usize) -> Option<(usize, f64)> {
    let n = tour.len();
    let t2 = (t1 + 1) % n;
    let t2_next = (t2 + 1) % n;
    let t2_next2 = (t2 + 2) % n;

    let removed_x1 = graph.distance(tour[t1], tour[t2]);
    let closing = graph.distance(tour[t2_next], tour[t2_next2]);

    let mut best: Option<(usize, f64)> = None;
    for t3 in 0..n {
        if t3 == t1 || t3 == t2 || t3 == t2_next {
            continue;
        }
        let g1 = removed_x1 + graph.distance(tour[t2], tour[t3])
            - graph.distance(tour[t1], tour[t3])
            - closing;
        if best.map_or(true, |(_, g)| g1 > g) {
            best = Some((t3, g1));
        }
    }
    best
}

/// Lin-Kernighan style sequential edge exchange
pub struct LinKernighan {
    /// Maximum loop steps
    pub max_iterations: usize,
    /// Move on to the next anchor instead of stopping when one is exhausted
    pub advance_anchor: bool,
}

impl LinKernighan {
    pub fn new() -> Self {
        Self::from_config(&SolverConfig::default())
    }

    pub fn with_params(max_iterations: usize) -> Self {
        LinKernighan {
            max_iterations,
            advance_anchor: false,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        LinKernighan {
            max_iterations: config.max_lk_iterations,
            advance_anchor: config.lk_advance_anchor,
        }
    }

    /// Open a chain at `t1`, returning its `t3`. Without `advance_anchor`
    /// only `t1` is tried; otherwise anchors are advanced until one has a
    /// positive first gain or `n` in a row have failed.
    fn open_chain(
        &self,
        graph: &Graph,
        tour: &[usize],
        t1: &mut usize,
        exhausted: &mut usize,
    ) -> Option<usize> {
        let n = tour.len();
        loop {
            match best_first_link(graph, tour, *t1) {
                Some((t3, g1)) if g1 > 0.0 => return Some(t3),
                _ => debug!("LK: anchor {} has no positive first gain", t1),
            }
            if !self.advance_anchor {
                return None;
            }
            *exhausted += 1;
            if *exhausted >= n {
                return None;
            }
            *t1 = (*t1 + 1) % n;
        }
    }
}

impl Default for LinKernighan {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for LinKernighan {
    fn run(
        &self,
        graph: &Graph,
        tour: &mut [usize],
        rng: &mut dyn RngCore,
    ) -> Result<RunStats, TspError> {
        check_tour(graph, tour)?;

        let n = tour.len();
        let mut stats = RunStats::default();
        if n < 4 {
            return Ok(stats);
        }

        // The search always starts from a fresh random permutation.
        for (pos, node) in tour.iter_mut().enumerate() {
            *node = pos;
        }
        tour.shuffle(rng);

        let mut length = graph.tour_length(tour);
        let mut best_length = length;
        stats.history.push(best_length);

        info!(
            "LK: max_iterations={}, advance_anchor={}, n={}, random start length {:.4}",
            self.max_iterations, self.advance_anchor, n, length
        );

        let mut t1 = 1;
        let mut exhausted_anchors = 0;
        let mut t3 = match self.open_chain(graph, tour, &mut t1, &mut exhausted_anchors) {
            Some(t3) => t3,
            None => {
                info!("LK: no improving chain from the start tour");
                return Ok(stats);
            }
        };
        let mut i = 2;

        while stats.iterations < self.max_iterations {
            stats.iterations += 1;

            let t2i_1 = (t3 + n + i - 2) % n;
            let delta = if t2i_1 == t1 {
                f64::INFINITY
            } else {
                two_opt_delta(graph, tour, t1.min(t2i_1), t1.max(t2i_1))
            };

            if delta < -IMPROVEMENT_EPSILON {
                apply_two_opt(tour, t1.min(t2i_1), t1.max(t2i_1));
                length += delta;
                stats.improvements += 1;

                if length < best_length - IMPROVEMENT_EPSILON {
                    debug!("LK: anchor {} depth {} new best {:.4}", t1, i, length);
                    best_length = length;
                    stats.history.push(best_length);
                    exhausted_anchors = 0;
                    match self.open_chain(graph, tour, &mut t1, &mut exhausted_anchors) {
                        Some(next) => t3 = next,
                        None => break,
                    }
                    i = 2;
                } else {
                    i += 1;
                }
            } else {
                i -= 1;
                if i == 0 {
                    debug!("LK: anchor {} exhausted", t1);
                    if !self.advance_anchor {
                        break;
                    }
                    exhausted_anchors += 1;
                    if exhausted_anchors >= n {
                        break;
                    }
                    t1 = (t1 + 1) % n;
                    match self.open_chain(graph, tour, &mut t1, &mut exhausted_anchors) {
                        Some(next) => t3 = next,
                        None => break,
                    }
                    i = 2;
                }
            }
        }

        info!(
            "LK finished after {} steps ({} improving moves), length {:.4}",
            stats.iterations, stats.improvements, best_length
        );

        Ok(stats)
    }

    fn name(&self) -> &str {
        "LK"
    }
}
