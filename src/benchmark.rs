//! Batch experiments over many instances.
//!
//! Every (instance, algorithm, run) combination is solved independently with
//! its own seeded generator, so runs can execute in parallel and still be
//! reproduced one at a time.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use ordered_float::OrderedFloat;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::SolverConfig;
use crate::heuristics::Algorithm;
use crate::instance::Graph;
use crate::solver::solve;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm short name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Number of nodes
    pub nodes: usize,
    /// Final tour length
    pub length: f64,
    /// Computation time in seconds
    pub time: f64,
    /// Number of iterations reported by the algorithm
    pub iterations: Option<usize>,
    /// Seed of the run's generator
    pub seed: u64,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    /// Number of completed runs
    pub num_runs: usize,
    pub avg_length: f64,
    pub best_length: f64,
    pub worst_length: f64,
    /// Sample standard deviation of the length, 0 for a single run
    pub std_length: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per (instance, algorithm) pair
    pub num_runs: usize,
    /// Run `r` is seeded with `base_seed + r`
    pub base_seed: u64,
    /// Run combinations on the rayon thread pool
    pub parallel: bool,
    /// Algorithms to compare
    pub algorithms: Vec<Algorithm>,
    /// Parameters handed to every algorithm
    pub solver: SolverConfig,
    /// Show a progress bar on stderr
    pub show_progress: bool,
    /// Output directory
    pub output_dir: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            base_seed: 42,
            parallel: true,
            algorithms: Algorithm::ALL.to_vec(),
            solver: SolverConfig::default(),
            show_progress: true,
            output_dir: "results".to_string(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    fn run_one(&self, graph: &Graph, algorithm: Algorithm, run: usize) -> Option<AlgorithmResult> {
        let seed = self.config.base_seed.wrapping_add(run as u64);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        match solve(graph, algorithm, &self.config.solver, &mut rng) {
            Ok(solution) => Some(AlgorithmResult {
                algorithm: solution.algorithm,
                instance: graph.name.clone(),
                nodes: graph.num_nodes(),
                length: solution.length,
                time: solution.computation_time,
                iterations: solution.iterations,
                seed,
            }),
            Err(e) => {
                warn!("{} on '{}' (run {}) failed: {}", algorithm, graph.name, run, e);
                None
            }
        }
    }

    /// Run every configured algorithm `num_runs` times on each instance.
    /// Failed runs are logged and left out of the results.
    pub fn run_on_instances(&mut self, instances: &[Graph]) {
        let mut jobs: Vec<(usize, Algorithm, usize)> = Vec::new();
        for g in 0..instances.len() {
            for &algorithm in &self.config.algorithms {
                for run in 0..self.config.num_runs {
                    jobs.push((g, algorithm, run));
                }
            }
        }

        info!(
            "Benchmark: {} instances, {} algorithms, {} runs each ({} jobs)",
            instances.len(),
            self.config.algorithms.len(),
            self.config.num_runs,
            jobs.len()
        );

        let progress = if self.config.show_progress {
            let pb = ProgressBar::new(jobs.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            {
                pb.set_style(style);
            }
            pb
        } else {
            ProgressBar::hidden()
        };

        let this = &*self;
        let run_job = |&(g, algorithm, run): &(usize, Algorithm, usize)| {
            let result = this.run_one(&instances[g], algorithm, run);
            progress.inc(1);
            result
        };

        let outcomes: Vec<Option<AlgorithmResult>> = if self.config.parallel {
            jobs.par_iter().map(run_job).collect()
        } else {
            jobs.iter().map(run_job).collect()
        };
        progress.finish_with_message("done");

        self.results.extend(outcomes.into_iter().flatten());
    }

    /// Compute statistics for each algorithm, best average length first.
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut by_algorithm: HashMap<&str, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            by_algorithm.entry(result.algorithm.as_str()).or_default().push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = by_algorithm
            .into_iter()
            .map(|(algorithm, results)| {
                let lengths: Vec<f64> = results.iter().map(|r| r.length).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();

                let std_length = if lengths.len() > 1 { lengths.iter().std_dev() } else { 0.0 };
                let best_length = Iterator::min(lengths.iter().map(|&l| OrderedFloat(l))).map_or(f64::NAN, |v| v.0);
                let worst_length = Iterator::max(lengths.iter().map(|&l| OrderedFloat(l))).map_or(f64::NAN, |v| v.0);

                AlgorithmStatistics {
                    algorithm: algorithm.to_string(),
                    num_runs: results.len(),
                    avg_length: lengths.iter().mean(),
                    best_length,
                    worst_length,
                    std_length,
                    avg_time: times.iter().mean(),
                    total_time: times.iter().sum(),
                }
            })
            .collect();

        statistics.sort_by_key(|s| OrderedFloat(s.avg_length));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("        TSP Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!("Generated: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str(&format!(
            "Runs per pair: {}, base seed: {}\n\n",
            self.config.num_runs, self.config.base_seed
        ));

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<10} {:>6} {:>14} {:>14} {:>14} {:>12}\n",
            "Algorithm", "Runs", "Avg Length", "Best Length", "Std Dev", "Avg Time"
        ));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<10} {:>6} {:>14.2} {:>14.2} {:>14.2} {:>12.4}\n",
                stat.algorithm, stat.num_runs, stat.avg_length, stat.best_length, stat.std_length, stat.avg_time
            ));
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        report.push_str("\nBest Tour per Instance:\n");
        let mut instance_best: HashMap<&str, &AlgorithmResult> = HashMap::new();
        for result in &self.results {
            let entry = instance_best.entry(result.instance.as_str()).or_insert(result);
            if result.length < entry.length {
                *entry = result;
            }
        }

        let mut instances: Vec<_> = instance_best.into_iter().collect();
        instances.sort_by_key(|(name, _)| *name);
        for (instance, best) in instances {
            report.push_str(&format!(
                "  {} ({} nodes): {:.2} ({}, seed {})\n",
                instance, best.nodes, best.length, best.algorithm, best.seed
            ));
        }

        report
    }

    /// Write `results.csv`, `statistics.csv` and `report.txt` into the
    /// output directory.
    pub fn save(&self) -> std::io::Result<Vec<PathBuf>> {
        let dir = Path::new(&self.config.output_dir);
        std::fs::create_dir_all(dir)?;

        let results = dir.join("results.csv");
        let statistics = dir.join("statistics.csv");
        let report = dir.join("report.txt");

        self.export_to_csv(&results)?;
        self.export_statistics_csv(&statistics)?;
        std::fs::write(&report, self.generate_report())?;

        Ok(vec![results, statistics, report])
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(parallel: bool) -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs: 2,
            base_seed: 7,
            parallel,
            algorithms: Algorithm::ALL.to_vec(),
            solver: SolverConfig {
                population_size: 4,
                max_generations: 10,
                initial_temperature: 5.0,
                cooling_rate: 0.8,
                max_anneal_iterations: 20,
                kmax: 2,
                max_vns_iterations: 2,
                max_lk_iterations: 50,
                ..Default::default()
            },
            show_progress: false,
            output_dir: std::env::temp_dir()
                .join(format!("tsp_bench_test_{}_{}", std::process::id(), parallel))
                .to_string_lossy()
                .into_owned(),
        }
    }

    fn instances() -> Vec<Graph> {
        let mut ring = Graph::from_coordinates(
            &(0..8)
                .map(|i| {
                    let a = i as f64 * std::f64::consts::PI / 4.0;
                    (a.cos(), a.sin())
                })
                .collect::<Vec<_>>(),
        );
        ring.name = "ring".to_string();
        let mut square = Graph::from_coordinates(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        square.name = "square".to_string();
        vec![ring, square]
    }

    fn result(algorithm: &str, length: f64, time: f64) -> AlgorithmResult {
        AlgorithmResult {
            algorithm: algorithm.to_string(),
            instance: "x".to_string(),
            nodes: 5,
            length,
            time,
            iterations: None,
            seed: 0,
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
        assert_eq!(config.algorithms.len(), 4);
    }

    #[test]
    fn test_every_combination_is_run() {
        let mut bench = Benchmark::new(quick_config(false));
        bench.run_on_instances(&instances());
        assert_eq!(bench.results().len(), 2 * 4 * 2);
        assert!(bench.results().iter().all(|r| r.length >= 0.0));
        assert!(bench.results().iter().any(|r| r.seed == 8));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential = Benchmark::new(quick_config(false));
        sequential.run_on_instances(&instances());
        let mut parallel = Benchmark::new(quick_config(true));
        parallel.run_on_instances(&instances());

        let lengths = |b: &Benchmark| b.results().iter().map(|r| r.length).collect::<Vec<_>>();
        assert_eq!(lengths(&sequential), lengths(&parallel));
    }

    #[test]
    fn test_capacity_failures_are_skipped() {
        let mut config = quick_config(false);
        config.solver.max_nodes = 5;
        let mut bench = Benchmark::new(config);
        bench.run_on_instances(&instances());
        assert!(bench.results().iter().all(|r| r.instance == "square"));
        assert_eq!(bench.results().len(), 4 * 2);
    }

    #[test]
    fn test_statistics_aggregation() {
        let mut bench = Benchmark::new(quick_config(false));
        bench.results = vec![
            result("VNS", 10.0, 1.0),
            result("VNS", 14.0, 3.0),
            result("LK", 20.0, 0.5),
        ];

        let stats = bench.compute_statistics();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].algorithm, "VNS");
        assert_eq!(stats[0].num_runs, 2);
        assert!((stats[0].avg_length - 12.0).abs() < 1e-12);
        assert_eq!(stats[0].best_length, 10.0);
        assert_eq!(stats[0].worst_length, 14.0);
        assert!((stats[0].std_length - 8f64.sqrt()).abs() < 1e-12);
        assert!((stats[0].total_time - 4.0).abs() < 1e-12);
        assert_eq!(stats[1].std_length, 0.0);
    }

    #[test]
    fn test_save_writes_all_outputs() {
        let mut bench = Benchmark::new(quick_config(false));
        bench.results = vec![result("GPX", 3.0, 0.1)];

        let paths = bench.save().unwrap();
        assert_eq!(paths.len(), 3);

        let csv_text = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(csv_text.starts_with("algorithm,instance,nodes,length,time,iterations,seed"));
        let report = std::fs::read_to_string(&paths[2]).unwrap();
        assert!(report.contains("Generated: "));
        assert!(report.contains("  x (5 nodes): 3.00 (GPX, seed 0)"));

        std::fs::remove_dir_all(&bench.config.output_dir).unwrap();
    }
}
