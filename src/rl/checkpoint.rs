//! Saving and restoring policy parameters.
//!
//! Checkpoints are named MessagePack records. A checkpoint is either a
//! [`TrainingCheckpoint`] wrapping the model record together with the instance
//! dimensions it was trained for, or a bare model record. Loading tries the
//! wrapper first and falls back to the bare record.

use crate::error::{Result, SolverError};
use crate::rl::agent::{AgentModel, AgentModelRecord};
use crate::rl::encoder::feature_dim;
use burn::prelude::*;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Record, Recorder};
use std::path::Path;

#[derive(Record)]
pub struct TrainingCheckpoint<B: Backend> {
    pub model_state_dict: AgentModelRecord<B>,
    pub n_ports: usize,
    pub n_goods: usize,
}

fn recorder() -> NamedMpkFileRecorder<FullPrecisionSettings> {
    NamedMpkFileRecorder::<FullPrecisionSettings>::new()
}

/// Write the model parameters and the dimensions they belong to.
pub fn save<B: Backend>(
    model: &AgentModel<B>,
    n_ports: usize,
    n_goods: usize,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let checkpoint = TrainingCheckpoint {
        model_state_dict: model.clone().into_record(),
        n_ports,
        n_goods,
    };
    recorder()
        .record(checkpoint, path.to_path_buf())
        .map_err(|e| SolverError::Checkpoint(e.to_string()))
}

/// Load parameters for an `n_ports` x `n_goods` model from `path`.
///
/// Returns the loaded model, or an error if the file cannot be read or its
/// parameters belong to a model of different dimensions. `model` itself is
/// never modified.
pub fn load<B: Backend>(
    model: &AgentModel<B>,
    path: &Path,
    n_ports: usize,
    n_goods: usize,
    device: &B::Device,
) -> Result<AgentModel<B>> {
    let wrapped: std::result::Result<TrainingCheckpoint<B>, _> =
        recorder().load(path.to_path_buf(), device);

    let record = match wrapped {
        Ok(checkpoint) => {
            if checkpoint.n_ports != n_ports {
                return Err(SolverError::mismatch("n_ports", n_ports, checkpoint.n_ports));
            }
            if checkpoint.n_goods != n_goods {
                return Err(SolverError::mismatch("n_goods", n_goods, checkpoint.n_goods));
            }
            checkpoint.model_state_dict
        }
        Err(wrapped_err) => {
            log::debug!("not a wrapped checkpoint ({}), trying a bare model record", wrapped_err);
            recorder()
                .load::<AgentModelRecord<B>>(path.to_path_buf(), device)
                .map_err(|e| SolverError::Checkpoint(e.to_string()))?
        }
    };

    let loaded = model.clone().load_record(record);
    let input_dim = feature_dim(n_ports, n_goods);
    if loaded.encoder.input_dim() != input_dim {
        return Err(SolverError::mismatch("encoder input", input_dim, loaded.encoder.input_dim()));
    }
    if loaded.policy.n_ports() != n_ports {
        return Err(SolverError::mismatch("policy output", n_ports, loaded.policy.n_ports()));
    }
    Ok(loaded)
}
