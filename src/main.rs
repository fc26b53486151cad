//! Dutch Merchant route learner - Command Line Interface
//!
//! Trains a routing policy on a single instance and reports the best route.

use clap::{Parser, Subcommand};
use merchant_route_rl::config::{SolverConfig, TemperatureDecay};
use merchant_route_rl::instance::Instance;
use merchant_route_rl::rl::Solver;
use merchant_route_rl::scoring::{EvaluatorName, GreedyTradeScorer};
use merchant_route_rl::DefaultBackend;

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "merchant-route-rl")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Per-instance policy-gradient route search for the Dutch Merchant problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a policy on an instance and print the best route
    Solve {
        /// Path to the instance JSON file
        #[arg(short, long)]
        instance: PathBuf,

        /// Solver configuration JSON file (missing fields keep their defaults)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of training epochs
        #[arg(long)]
        epochs: Option<usize>,

        /// Episodes per epoch
        #[arg(long)]
        episodes: Option<usize>,

        /// Temperature interpolation between start and end temperature
        #[arg(long, value_enum)]
        decay: Option<TemperatureDecay>,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Route evaluator
        #[arg(short, long, value_enum, default_value = "InfiniteCapacityDebtEvaluator")]
        evaluator: EvaluatorName,

        /// Output solution to file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the training log (JSON) to file
        #[arg(long)]
        log: Option<PathBuf>,

        /// Export the episode history as CSV
        #[arg(long)]
        history_csv: Option<PathBuf>,

        /// Load policy parameters from this checkpoint
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Save the trained policy parameters to this checkpoint
        #[arg(long)]
        save_checkpoint: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            config,
            epochs,
            episodes,
            decay,
            seed,
            evaluator,
            output,
            log,
            history_csv,
            checkpoint,
            save_checkpoint,
            verbose,
        } => {
            let mut solver_config = match config {
                Some(path) => match SolverConfig::from_file(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        eprintln!("Error loading configuration: {}", e);
                        std::process::exit(1);
                    }
                },
                None => SolverConfig::default(),
            };

            if let Some(epochs) = epochs {
                solver_config.num_epochs = epochs;
            }
            if let Some(episodes) = episodes {
                solver_config.episodes_per_epoch = episodes;
            }
            if let Some(decay) = decay {
                solver_config.temperature_decay = decay;
            }
            if let Some(seed) = seed {
                solver_config.seed = seed;
            }
            if log.is_some() {
                solver_config.log_path = log;
            }
            if checkpoint.is_some() {
                solver_config.checkpoint_path = checkpoint;
            }
            solver_config.evaluator = evaluator;
            solver_config.progress = !verbose;

            solve_instance(&instance, solver_config, output, history_csv, save_checkpoint, verbose);
        }

        Commands::Analyze { instance } => {
            analyze_instance(&instance);
        }
    }
}

fn load_instance(path: &PathBuf) -> Instance {
    match Instance::from_file(path) {
        Ok(inst) => inst,
        Err(e) => {
            eprintln!("Error loading instance: {}", e);
            std::process::exit(1);
        }
    }
}

fn solve_instance(
    path: &PathBuf,
    config: SolverConfig,
    output: Option<PathBuf>,
    history_csv: Option<PathBuf>,
    save_checkpoint: Option<PathBuf>,
    verbose: bool,
) {
    println!("Loading instance from {:?}...", path);
    let instance = load_instance(path);

    if verbose {
        println!("{}", instance.statistics());
        println!(
            "Epochs: {}, episodes per epoch: {}, temperature {} -> {} ({:?})",
            config.num_epochs,
            config.episodes_per_epoch,
            config.start_temp,
            config.end_temp,
            config.temperature_decay
        );
    }

    let mut solver = match Solver::<DefaultBackend>::new(config, Default::default()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    println!("Training with evaluator {}...", solver.config().evaluator);
    let scorer = GreedyTradeScorer::new(&instance);
    let solution = match solver.solve(&instance, &scorer) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Solver error: {}", e);
            std::process::exit(1);
        }
    };

    println!("\n{}", solution);
    println!(
        "Total travel time: {:.2} / {:.2}",
        solution.total_time(&instance),
        instance.time_limit
    );

    if let Some(out_path) = output {
        let written = serde_json::to_string_pretty(&solution)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&out_path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("Solution saved to {:?}", out_path),
            Err(e) => eprintln!("Failed to write solution: {}", e),
        }
    }

    if let Some(csv_path) = history_csv {
        if let Some(log) = solver.training_log() {
            match log.export_csv(&csv_path) {
                Ok(()) => println!("Episode history saved to {:?}", csv_path),
                Err(e) => eprintln!("Failed to write episode history: {}", e),
            }
        }
    }

    if let Some(ckpt_path) = save_checkpoint {
        match solver.save_checkpoint(&ckpt_path) {
            Ok(()) => println!("Checkpoint saved to {:?}", ckpt_path),
            Err(e) => eprintln!("Failed to save checkpoint: {}", e),
        }
    }
}

fn analyze_instance(path: &PathBuf) {
    let instance = load_instance(path);

    println!("{}", instance.statistics());
    println!(
        "Feature vector length: {}",
        merchant_route_rl::rl::feature_dim(instance.n_ports, instance.n_goods)
    );
}
