//! Dutch Merchant route learner
//!
//! Searches for a profitable closed trading tour over a set of ports under a
//! travel-time budget. A small autoregressive policy is trained from scratch on
//! each instance with REINFORCE, a moving-average baseline, an annealed
//! exploration temperature and replay of the best routes found.
//!
//! # Example
//!
//! ```no_run
//! use merchant_route_rl::config::SolverConfig;
//! use merchant_route_rl::instance::Instance;
//! use merchant_route_rl::rl::Solver;
//! use merchant_route_rl::scoring::{EvaluatorName, GreedyTradeScorer};
//! use merchant_route_rl::DefaultBackend;
//!
//! let instance = Instance::from_file("instance.json").unwrap();
//! let config = SolverConfig {
//!     evaluator: EvaluatorName::InfiniteCapacityDebtEvaluator,
//!     ..Default::default()
//! };
//!
//! let mut solver = Solver::<DefaultBackend>::new(config, Default::default()).unwrap();
//! let solution = solver.solve(&instance, &GreedyTradeScorer::new(&instance)).unwrap();
//!
//! println!("Reward: {:.2}", solution.reward);
//! ```

pub mod config;
pub mod error;
pub mod instance;
pub mod rl;
pub mod scoring;
pub mod solution;
pub mod training_log;

pub use config::{SolverConfig, TemperatureDecay};
pub use error::{Result, SolverError};
pub use instance::Instance;
pub use scoring::{EvaluatorName, GreedyTradeScorer, RouteScore, RouteScorer};
pub use solution::Solution;

/// CPU backend with automatic differentiation
pub type DefaultBackend = burn::backend::Autodiff<burn::backend::NdArray>;
