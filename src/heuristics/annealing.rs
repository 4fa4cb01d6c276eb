//! Simulated annealing driving random 2-opt moves.
//!
//! The temperature starts at `initial_temperature` and is multiplied by
//! `cooling_rate` after every `iterations_per_temperature` random moves,
//! until it drops to `min_temperature`. Improving moves are always taken;
//! worsening ones with the Metropolis probability `exp(-delta / T)`.
//!
//! No incumbent is kept: the tour left after the last temperature step is the
//! result, even if an earlier state was shorter.

use log::{debug, info};
use rand::prelude::*;

use super::moves::{apply_two_opt, two_opt_delta};
use super::{Heuristic, RunStats};
use crate::config::{ConfigError, SolverConfig};
use crate::error::TspError;
use crate::instance::Graph;
use crate::solution::check_tour;

/// Metropolis acceptance test. A negative delta is accepted without
/// consulting the random source.
#[inline]
pub fn metropolis_accept<R: Rng + ?Sized>(delta: f64, temperature: f64, rng: &mut R) -> bool {
    delta < 0.0 || rng.gen::<f64>() < (-delta / temperature).exp()
}

/// Simulated Annealing on 2-opt
pub struct TwoOptAnnealing {
    /// Initial temperature
    pub initial_temperature: f64,
    /// Cooling rate, in (0, 1)
    pub cooling_rate: f64,
    /// Temperature at which the schedule ends
    pub min_temperature: f64,
    /// Iterations per temperature
    pub iterations_per_temperature: usize,
}

impl TwoOptAnnealing {
    pub fn new() -> Self {
        Self::from_config(&SolverConfig::default())
    }

    pub fn with_params(
        initial_temperature: f64,
        cooling_rate: f64,
        min_temperature: f64,
        iterations_per_temperature: usize,
    ) -> Self {
        TwoOptAnnealing {
            initial_temperature,
            cooling_rate,
            min_temperature,
            iterations_per_temperature,
        }
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self::with_params(
            config.initial_temperature,
            config.cooling_rate,
            config.min_temperature,
            config.max_anneal_iterations,
        )
    }

    fn check_schedule(&self) -> Result<(), ConfigError> {
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if !(self.min_temperature > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_temperature must be positive, got {}",
                self.min_temperature
            )));
        }
        Ok(())
    }
}

impl Default for TwoOptAnnealing {
    fn default() -> Self {
        Self::new()
    }
}

impl Heuristic for TwoOptAnnealing {
    fn run(
        &self,
        graph: &Graph,
        tour: &mut [usize],
        rng: &mut dyn RngCore,
    ) -> Result<RunStats, TspError> {
        check_tour(graph, tour)?;
        self.check_schedule()?;

        let n = tour.len();
        let mut stats = RunStats::default();
        if n < 4 {
            return Ok(stats);
        }

        info!(
            "SA2OPT: T0={}, cooling={}, Tmin={}, {} moves per temperature",
            self.initial_temperature, self.cooling_rate, self.min_temperature, self.iterations_per_temperature
        );

        let mut length = graph.tour_length(tour);
        let mut temperature = self.initial_temperature;

        while temperature > self.min_temperature {
            for _ in 0..self.iterations_per_temperature {
                let i = rng.gen_range(0..n);
                let mut k = rng.gen_range(0..n - 1);
                if k >= i {
                    k += 1;
                }
                let (i, k) = (i.min(k), i.max(k));

                let delta = two_opt_delta(graph, tour, i, k);
                if metropolis_accept(delta, temperature, rng) {
                    apply_two_opt(tour, i, k);
                    length += delta;
                    if delta < 0.0 {
                        stats.improvements += 1;
                    }
                }
                stats.iterations += 1;
            }

            stats.history.push(length);
            temperature *= self.cooling_rate;
        }

        debug!("SA2OPT: final temperature {:.6}", temperature);
        info!(
            "SA2OPT finished after {} moves, length {:.4}",
            stats.iterations,
            graph.tour_length(tour)
        );

        Ok(stats)
    }

    fn name(&self) -> &str {
        "SA2OPT"
    }
}
