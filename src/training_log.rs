//! Per-episode training history and epoch summaries.

use crate::error::Result;
use crate::instance::PortId;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// One sampled episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub epoch: usize,
    pub episode: usize,
    pub reward: f64,
    pub solution: Vec<PortId>,
}

/// Reward statistics over the episodes of one epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch: usize,
    pub temperature: f64,
    pub mean_reward: f64,
    pub std_reward: f64,
    pub max_reward: f64,
    pub best_reward: Option<f64>,
    pub baseline: f64,
    pub replayed: usize,
}

impl EpochSummary {
    pub fn from_rewards(
        epoch: usize,
        temperature: f64,
        rewards: &[f64],
        best_reward: Option<f64>,
        baseline: f64,
    ) -> Self {
        let (mean_reward, std_reward, max_reward) = match rewards.len() {
            0 => (0.0, 0.0, 0.0),
            1 => (rewards[0], 0.0, rewards[0]),
            _ => (rewards.mean(), rewards.std_dev(), Statistics::max(rewards)),
        };

        EpochSummary {
            epoch,
            temperature,
            mean_reward,
            std_reward,
            max_reward,
            best_reward,
            baseline,
            replayed: 0,
        }
    }
}

/// Flat CSV row of the episode history
#[derive(Serialize)]
struct HistoryRow<'a> {
    epoch: usize,
    episode: usize,
    reward: f64,
    route: &'a str,
}

/// Everything recorded during one solve call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingLog {
    pub history: Vec<EpisodeRecord>,
    pub epochs: Vec<EpochSummary>,
    pub extra_data: serde_json::Value,
}

impl TrainingLog {
    pub fn new() -> Self {
        TrainingLog {
            history: Vec::new(),
            epochs: Vec::new(),
            extra_data: serde_json::json!({
                "created_at": chrono::Local::now().to_rfc3339(),
            }),
        }
    }

    pub fn record_episode(&mut self, epoch: usize, episode: usize, reward: f64, solution: &[PortId]) {
        self.history.push(EpisodeRecord {
            epoch,
            episode,
            reward,
            solution: solution.to_vec(),
        });
    }

    pub fn record_epoch(&mut self, summary: EpochSummary) {
        self.epochs.push(summary);
    }

    /// Attach a metadata field under `extra_data`
    pub fn set_extra<V: Serialize>(&mut self, key: &str, value: V) -> Result<()> {
        let value = serde_json::to_value(value)?;
        match self.extra_data.as_object_mut() {
            Some(map) => {
                map.insert(key.to_string(), value);
            }
            None => {
                let mut map = serde_json::Map::new();
                map.insert(key.to_string(), value);
                self.extra_data = serde_json::Value::Object(map);
            }
        }
        Ok(())
    }

    pub fn best_episode(&self) -> Option<&EpisodeRecord> {
        self.history
            .iter()
            .filter(|r| !r.reward.is_nan())
            .fold(None, |best: Option<&EpisodeRecord>, r| match best {
                Some(b) if b.reward >= r.reward => Some(b),
                _ => Some(r),
            })
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// Export the episode history as CSV, routes joined with `-`
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &self.history {
            let route = record
                .solution
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("-");
            writer.serialize(HistoryRow {
                epoch: record.epoch,
                episode: record.episode,
                reward: record.reward,
                route: &route,
            })?;
        }

        writer.flush()?;
        Ok(())
    }
}
