//! Metaheuristics for the Euclidean Traveling Salesman Problem.
//!
//! Four tour improvement algorithms share one tour representation and one set
//! of distance and move primitives:
//!
//! - Lin-Kernighan style sequential edge exchange
//! - Variable Neighborhood Search with 2-opt descent
//! - A genetic search built on a nearest-node partition crossover
//! - Simulated annealing over random 2-opt moves
//!
//! Around them sit an instance loader, a per-run text report, a batch
//! benchmark and SVG rendering.
//!
//! # Example
//!
//! ```no_run
//! use tsp_metaheuristics::config::SolverConfig;
//! use tsp_metaheuristics::heuristics::Algorithm;
//! use tsp_metaheuristics::instance::Graph;
//! use tsp_metaheuristics::solver::{seeded_rng, solve};
//!
//! let graph = Graph::from_file("instance.txt").unwrap();
//! let config = SolverConfig::default();
//! let (mut rng, _seed) = seeded_rng(Some(42));
//!
//! let solution = solve(&graph, Algorithm::Vns, &config, &mut rng).unwrap();
//! println!("Tour length: {:.2}", solution.length);
//! ```

pub mod error;
pub mod config;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod solver;
pub mod report;
pub mod benchmark;
pub mod visualization;

pub use config::SolverConfig;
pub use error::TspError;
pub use heuristics::{Algorithm, Heuristic};
pub use instance::Graph;
pub use solution::Solution;
