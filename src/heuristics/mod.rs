//! Tour improvement heuristics.
//!
//! Every algorithm implements [`Heuristic`]: it improves a tour buffer in
//! place, drawing randomness only from the generator it is handed.

pub mod moves;
pub mod annealing;
pub mod vns;
pub mod lin_kernighan;
pub mod partition_crossover;

pub use annealing::TwoOptAnnealing;
pub use lin_kernighan::LinKernighan;
pub use partition_crossover::PartitionCrossover;
pub use vns::VariableNeighborhoodSearch;

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::TspError;
use crate::instance::Graph;

/// Bookkeeping returned by a heuristic run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    /// Loop steps performed (moves, passes or generations)
    pub iterations: usize,
    /// Accepted moves that shortened the tour
    pub improvements: usize,
    /// Tour length sampled once per outer step
    pub history: Vec<f64>,
}

/// Trait for tour improvement algorithms
pub trait Heuristic: Send + Sync {
    /// Improve `tour` in place. The buffer must be a permutation of
    /// `0..graph.num_nodes()`.
    fn run(
        &self,
        graph: &Graph,
        tour: &mut [usize],
        rng: &mut dyn RngCore,
    ) -> Result<RunStats, TspError>;

    /// Short name used in logs, reports and file names
    fn name(&self) -> &str;
}

/// The four available algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    LinKernighan,
    Vns,
    PartitionCrossover,
    TwoOptAnnealing,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::LinKernighan,
        Algorithm::Vns,
        Algorithm::PartitionCrossover,
        Algorithm::TwoOptAnnealing,
    ];

    pub fn short_name(&self) -> &'static str {
        match self {
            Algorithm::LinKernighan => "LK",
            Algorithm::Vns => "VNS",
            Algorithm::PartitionCrossover => "GPX",
            Algorithm::TwoOptAnnealing => "SA2OPT",
        }
    }

    /// Instantiate the algorithm with parameters taken from `config`.
    pub fn build(&self, config: &SolverConfig) -> Box<dyn Heuristic> {
        match self {
            Algorithm::LinKernighan => Box::new(LinKernighan::from_config(config)),
            Algorithm::Vns => Box::new(VariableNeighborhoodSearch::from_config(config)),
            Algorithm::PartitionCrossover => Box::new(PartitionCrossover::from_config(config)),
            Algorithm::TwoOptAnnealing => Box::new(TwoOptAnnealing::from_config(config)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lk" | "lin-kernighan" => Ok(Algorithm::LinKernighan),
            "vns" => Ok(Algorithm::Vns),
            "gpx" | "crossover" => Ok(Algorithm::PartitionCrossover),
            "sa2opt" | "sa" | "annealing" => Ok(Algorithm::TwoOptAnnealing),
            other => Err(format!("unknown algorithm '{}' (expected lk, vns, gpx or sa2opt)", other)),
        }
    }
}
