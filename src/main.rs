//! TSP metaheuristics - Command Line Interface

use clap::{Parser, Subcommand, ValueEnum};
use tsp_metaheuristics::benchmark::{Benchmark, BenchmarkConfig};
use tsp_metaheuristics::config::{SolverConfig, DEFAULT_MAX_NODES};
use tsp_metaheuristics::error::TspError;
use tsp_metaheuristics::heuristics;
use tsp_metaheuristics::instance::{load_instances_from_dir, Graph};
use tsp_metaheuristics::report::write_report;
use tsp_metaheuristics::solver::{seeded_rng, solve};
use tsp_metaheuristics::visualization::Visualizer;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tsp-metaheuristics")]
#[command(version = "1.0")]
#[command(about = "Metaheuristics for the Euclidean Traveling Salesman Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance with one algorithm
    Solve {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "vns")]
        algorithm: Algorithm,

        /// Configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed, overrides the configuration
        #[arg(short, long)]
        seed: Option<u64>,

        /// Directory for the result report
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Write an SVG drawing of the tour
        #[arg(long)]
        svg: Option<PathBuf>,
    },

    /// Run every algorithm on a directory of instances
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of runs per algorithm and instance
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Base seed, run r uses seed + r
        #[arg(short, long)]
        seed: Option<u64>,

        /// Run combinations one after another
        #[arg(long)]
        sequential: bool,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Compare all algorithms on one instance
    Compare {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Number of runs
        #[arg(short, long, default_value = "10")]
        runs: usize,

        /// Configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Lin-Kernighan edge exchange
    Lk,
    /// Variable Neighborhood Search
    Vns,
    /// Partition crossover genetic search
    Gpx,
    /// Simulated annealing on 2-opt
    Sa2opt,
}

impl From<Algorithm> for heuristics::Algorithm {
    fn from(a: Algorithm) -> Self {
        match a {
            Algorithm::Lk => heuristics::Algorithm::LinKernighan,
            Algorithm::Vns => heuristics::Algorithm::Vns,
            Algorithm::Gpx => heuristics::Algorithm::PartitionCrossover,
            Algorithm::Sa2opt => heuristics::Algorithm::TwoOptAnnealing,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve { instance, algorithm, config, seed, output, svg } => {
            solve_instance(&instance, algorithm.into(), config.as_deref(), seed, &output, svg)
        }

        Commands::Benchmark { dir, output, runs, config, seed, sequential } => {
            run_benchmark(&dir, &output, runs, config.as_deref(), seed, sequential)
        }

        Commands::Analyze { instance } => analyze_instance(&instance),

        Commands::Compare { instance, runs, config, output } => {
            compare_algorithms(&instance, runs, config.as_deref(), output)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<SolverConfig, TspError> {
    let mut config = match path {
        Some(path) => SolverConfig::load(path)?,
        None => SolverConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    Ok(config)
}

fn solve_instance(
    path: &Path,
    algorithm: heuristics::Algorithm,
    config: Option<&Path>,
    seed: Option<u64>,
    output: &Path,
    svg: Option<PathBuf>,
) -> Result<(), TspError> {
    let config = load_config(config, seed)?;

    println!("Loading instance from {:?}...", path);
    let graph = Graph::from_file(path)?;
    println!("Loaded {} nodes", graph.num_nodes());

    let (mut rng, seed) = seeded_rng(config.seed);
    println!("Solving with {} (seed {})...", algorithm, seed);
    let solution = solve(&graph, algorithm, &config, &mut rng)?;

    println!("\n========== Solution ==========");
    println!("Algorithm: {}", solution.algorithm);
    println!("Final tour length: {:.6}", solution.length);
    println!("Time: {:.4}s", solution.computation_time);
    if let Some(iterations) = solution.iterations {
        println!("Iterations: {}", iterations);
    }

    let instance_file = path.to_string_lossy();
    let report = write_report(output, &graph, &solution, &instance_file)?;
    println!("Report saved to {:?}", report);

    if let Some(svg_path) = svg {
        let vis = Visualizer::new();
        vis.save_svg(&vis.generate_svg(&graph, &solution), &svg_path)?;
        println!("Visualization saved to {:?}", svg_path);
    }

    println!(
        "\n{} executed successfully, with execution time: {:.6} seconds",
        solution.algorithm, solution.computation_time
    );
    Ok(())
}

fn run_benchmark(
    dir: &Path,
    output: &Path,
    runs: usize,
    config: Option<&Path>,
    seed: Option<u64>,
    sequential: bool,
) -> Result<(), TspError> {
    let solver = load_config(config, seed)?;

    println!("Loading instances from {:?}...", dir);
    let instances: Vec<Graph> = load_instances_from_dir(dir)?.into_iter().map(|(_, g)| g).collect();
    println!("Found {} instances", instances.len());
    if instances.is_empty() {
        return Ok(());
    }

    let bench_config = BenchmarkConfig {
        num_runs: runs,
        base_seed: solver.seed.unwrap_or(42),
        parallel: !sequential,
        solver,
        output_dir: output.to_string_lossy().into_owned(),
        ..Default::default()
    };

    let mut benchmark = Benchmark::new(bench_config);
    benchmark.run_on_instances(&instances);

    println!("\n{}", benchmark.generate_report());
    for path in benchmark.save()? {
        println!("Saved {:?}", path);
    }
    Ok(())
}

fn analyze_instance(path: &Path) -> Result<(), TspError> {
    let graph = Graph::from_file(path)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", graph.statistics());

    if graph.num_nodes() > DEFAULT_MAX_NODES {
        println!(
            "Warning: {} nodes exceeds the default capacity bound of {}",
            graph.num_nodes(),
            DEFAULT_MAX_NODES
        );
    }
    Ok(())
}

fn compare_algorithms(path: &Path, runs: usize, config: Option<&Path>, output: Option<PathBuf>) -> Result<(), TspError> {
    let solver = load_config(config, None)?;
    let graph = Graph::from_file(path)?;

    println!("Comparing algorithms on {} (n={})...\n", graph.name, graph.num_nodes());

    let mut benchmark = Benchmark::new(BenchmarkConfig {
        num_runs: runs,
        base_seed: solver.seed.unwrap_or(42),
        solver,
        show_progress: false,
        ..Default::default()
    });
    benchmark.run_on_instances(std::slice::from_ref(&graph));

    println!("{}", benchmark.generate_report());

    if let Some(output) = output {
        benchmark.export_to_csv(&output)?;
        println!("Results saved to {:?}", output);
    }
    Ok(())
}
