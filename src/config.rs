//! Solver configuration and the exploration temperature schedule.

use crate::error::{Result, SolverError};
use crate::scoring::EvaluatorName;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Interpolation used to anneal the temperature from `start_temp` to `end_temp`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureDecay {
    /// start + (end - start) * progress
    Linear,
    /// start * (end / start) ^ progress
    Exponential,
}

/// Policy-gradient solver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Width E of the port embedding (the context embedding is 2E wide)
    pub embedding_dim: usize,
    /// Width H of the hidden layers
    pub hidden_dim: usize,
    /// Maximum number of ports chosen per episode
    pub max_steps: usize,
    /// Number of training epochs per solve call
    pub num_epochs: usize,
    /// Episodes per epoch
    pub episodes_per_epoch: usize,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Decay of the reward baseline moving average
    pub baseline_decay: f64,
    /// Temperature at epoch 0
    pub start_temp: f64,
    /// Temperature at the last epoch
    pub end_temp: f64,
    /// Temperature interpolation
    pub temperature_decay: TemperatureDecay,
    /// Capacity of the elite memory (0 disables replay)
    pub memory_size: usize,
    /// Replay the elite memory every this many epochs (0 disables replay)
    pub replay_frequency: usize,
    /// Temperature used while reproducing elite routes
    pub replay_temperature: f64,
    /// Evaluator requested from the route scorer
    pub evaluator: EvaluatorName,
    /// Random seed for weight initialization and sampling
    pub seed: u64,
    /// Checkpoint loaded when a fresh policy is created
    pub checkpoint_path: Option<PathBuf>,
    /// Where the training log is written at the end of a solve call
    pub log_path: Option<PathBuf>,
    /// Log an epoch summary every this many epochs
    pub log_interval: usize,
    /// Show a progress bar over epochs
    pub progress: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            embedding_dim: 128,
            hidden_dim: 256,
            max_steps: 50,
            num_epochs: 1000,
            episodes_per_epoch: 10,
            learning_rate: 1e-4,
            baseline_decay: 0.99,
            start_temp: 200.0,
            end_temp: 0.1,
            temperature_decay: TemperatureDecay::Linear,
            memory_size: 10,
            replay_frequency: 10,
            replay_temperature: 1.0,
            evaluator: EvaluatorName::LpProfitCalculator,
            seed: 42,
            checkpoint_path: None,
            log_path: None,
            log_interval: 10,
            progress: false,
        }
    }
}

impl SolverConfig {
    /// Load a configuration from a JSON file; missing fields keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: SolverConfig = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 || self.hidden_dim == 0 {
            return Err(SolverError::InvalidConfig(
                "embedding_dim and hidden_dim must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.baseline_decay) {
            return Err(SolverError::InvalidConfig(format!(
                "baseline_decay must lie in [0, 1], got {}",
                self.baseline_decay
            )));
        }
        if !(self.learning_rate > 0.0) {
            return Err(SolverError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        for (name, temp) in [
            ("start_temp", self.start_temp),
            ("end_temp", self.end_temp),
            ("replay_temperature", self.replay_temperature),
        ] {
            if !temp.is_finite() || temp < 0.0 {
                return Err(SolverError::InvalidConfig(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, temp
                )));
            }
        }
        if self.temperature_decay == TemperatureDecay::Exponential
            && (self.start_temp <= 0.0 || self.end_temp <= 0.0)
        {
            return Err(SolverError::InvalidConfig(
                "exponential decay needs strictly positive start_temp and end_temp".to_string(),
            ));
        }
        Ok(())
    }

    /// Exploration temperature for an epoch.
    ///
    /// Equals `start_temp` at epoch 0 and `end_temp` at epoch `num_epochs - 1`.
    /// A single-epoch run uses `end_temp`.
    pub fn temperature(&self, epoch: usize) -> f64 {
        if self.num_epochs <= 1 {
            return self.end_temp;
        }
        let last = self.num_epochs - 1;
        if epoch >= last {
            return self.end_temp;
        }
        let progress = epoch as f64 / last as f64;
        match self.temperature_decay {
            TemperatureDecay::Linear => {
                self.start_temp + (self.end_temp - self.start_temp) * progress
            }
            TemperatureDecay::Exponential => {
                self.start_temp * (self.end_temp / self.start_temp).powf(progress)
            }
        }
    }

    /// Whether elite replay runs after this epoch
    pub fn is_replay_epoch(&self, epoch: usize) -> bool {
        self.replay_frequency > 0 && (epoch + 1) % self.replay_frequency == 0
    }
}
