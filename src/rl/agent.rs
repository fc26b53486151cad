//! Decision agent: builds routes port by port with the policy network.
//!
//! An episode walks the `Start -> Step* -> Close` state machine held by
//! [`EpisodeState`]. At each step the legality mask forbids visited ports and
//! ports from which the start port can no longer be reached within the time
//! budget. The agent either samples the next port from the temperature-scaled
//! policy (recording its log-probability for REINFORCE) or picks the best
//! scoring port. Replay drives the same state machine through a stored route
//! and records log-probabilities under the current parameters.

use crate::error::{Result, SolverError};
use crate::instance::{Instance, PortId};
use crate::rl::encoder::InstanceEncoder;
use crate::rl::policy::{mask_tensor, PolicyNetwork};
use burn::prelude::*;
use burn::tensor::activation::log_softmax;
use ordered_float::OrderedFloat;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

const MIN_TEMPERATURE: f64 = 1e-6;

/// Trainable parameters: instance encoder and policy network.
#[derive(Module, Debug)]
pub struct AgentModel<B: Backend> {
    pub encoder: InstanceEncoder<B>,
    pub policy: PolicyNetwork<B>,
}

impl<B: Backend> AgentModel<B> {
    pub fn new(
        n_ports: usize,
        n_goods: usize,
        embedding_dim: usize,
        hidden_dim: usize,
        device: &B::Device,
    ) -> Self {
        AgentModel {
            encoder: InstanceEncoder::new(n_ports, n_goods, embedding_dim, hidden_dim, device),
            policy: PolicyNetwork::new(n_ports, embedding_dim, hidden_dim, device),
        }
    }
}

/// How the next port is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decoding {
    /// Categorical sampling at the given temperature; log-probabilities are recorded
    Sample { temperature: f64 },
    /// Highest score; nothing is recorded
    Greedy,
}

/// Running state of one episode
#[derive(Debug, Clone)]
pub struct EpisodeState {
    start: PortId,
    current: PortId,
    elapsed: f64,
    visited: Vec<bool>,
    route: Vec<PortId>,
}

impl EpisodeState {
    /// `Start`: at the start port, no time spent
    pub fn start(instance: &Instance) -> Self {
        let start = instance.start_port;
        let mut visited = vec![false; instance.n_ports];
        visited[start] = true;
        EpisodeState {
            start,
            current: start,
            elapsed: 0.0,
            visited,
            route: vec![start],
        }
    }

    pub fn current(&self) -> PortId {
        self.current
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Ports chosen so far, excluding the start port
    pub fn steps(&self) -> usize {
        self.route.len() - 1
    }

    /// Forbidden ports for the next step (true = forbidden).
    ///
    /// A port is legal when unvisited and the detour through it still returns
    /// to the start port within the time limit.
    pub fn legality_mask(&self, instance: &Instance) -> Vec<bool> {
        (0..instance.n_ports)
            .map(|port| {
                if self.visited[port] {
                    return true;
                }
                let arrival = self.elapsed + instance.travel(self.current, port);
                arrival + instance.travel(port, self.start) > instance.time_limit
            })
            .collect()
    }

    /// `Step`: move to `port`
    pub fn advance(&mut self, instance: &Instance, port: PortId) {
        self.elapsed += instance.travel(self.current, port);
        self.visited[port] = true;
        self.route.push(port);
        self.current = port;
    }

    /// `Close`: append the start port, whether or not the last leg fits the budget.
    pub fn close(mut self) -> Vec<PortId> {
        self.route.push(self.start);
        self.route
    }
}

fn has_legal_move(mask: &[bool]) -> bool {
    mask.iter().any(|&forbidden| !forbidden)
}

/// Autoregressive route builder around an [`AgentModel`].
pub struct DecisionAgent<B: Backend> {
    n_ports: usize,
    n_goods: usize,
    max_steps: usize,
    device: B::Device,
    instance: Option<Instance>,
    context: Option<Tensor<B, 2>>,
    saved_log_probs: Vec<Tensor<B, 1>>,
}

impl<B: Backend> DecisionAgent<B> {
    pub fn new(n_ports: usize, n_goods: usize, max_steps: usize, device: B::Device) -> Self {
        DecisionAgent {
            n_ports,
            n_goods,
            max_steps,
            device,
            instance: None,
            context: None,
            saved_log_probs: Vec::new(),
        }
    }

    /// Number of log-probabilities recorded for the current trajectory
    pub fn trajectory_len(&self) -> usize {
        self.saved_log_probs.len()
    }

    /// Load an instance and compute a fresh context embedding.
    ///
    /// Called before every episode so that each optimizer step differentiates
    /// through a graph built with the current parameters.
    pub fn receive_instance(&mut self, model: &AgentModel<B>, instance: &Instance) -> Result<()> {
        if instance.n_ports != self.n_ports {
            return Err(SolverError::mismatch("n_ports", self.n_ports, instance.n_ports));
        }
        if instance.n_goods != self.n_goods {
            return Err(SolverError::mismatch("n_goods", self.n_goods, instance.n_goods));
        }
        instance.validate()?;

        self.context = Some(model.encoder.encode(instance, &self.device));
        self.instance = Some(instance.clone());
        self.saved_log_probs.clear();
        Ok(())
    }

    /// Pick the next port from `current` given a forbidden-port mask.
    ///
    /// Returns the chosen port and, when sampling, its log-probability.
    pub fn select_action<R: Rng>(
        &self,
        model: &AgentModel<B>,
        current: PortId,
        mask: &[bool],
        decoding: Decoding,
        rng: &mut R,
    ) -> Result<(PortId, Option<Tensor<B, 1>>)> {
        let context = self.context.clone().ok_or(SolverError::NoInstanceLoaded)?;
        let logits = model
            .policy
            .forward(context, current, Some(mask_tensor(mask, &self.device)));

        match decoding {
            Decoding::Greedy => {
                let scores = tensor_values(logits)?;
                let best = scores
                    .iter()
                    .enumerate()
                    .filter(|&(port, _)| !mask[port])
                    .max_by_key(|&(_, &score)| OrderedFloat(score))
                    .map(|(port, _)| port)
                    .ok_or_else(|| SolverError::Sampling("no legal port to choose".to_string()))?;
                Ok((best, None))
            }
            Decoding::Sample { temperature } => {
                let log_probs = log_softmax(logits.div_scalar(temperature.max(MIN_TEMPERATURE)), 1);
                let weights: Vec<f64> = tensor_values(log_probs.clone())?
                    .into_iter()
                    .map(|lp| (lp as f64).exp())
                    .collect();
                let dist = WeightedIndex::new(&weights)
                    .map_err(|e| SolverError::Sampling(e.to_string()))?;
                let port = dist.sample(rng);
                Ok((port, Some(pick(log_probs, port))))
            }
        }
    }

    /// Generate a complete closed route.
    pub fn generate_solution<R: Rng>(
        &mut self,
        model: &AgentModel<B>,
        decoding: Decoding,
        rng: &mut R,
    ) -> Result<Vec<PortId>> {
        let instance = self.instance.as_ref().ok_or(SolverError::NoInstanceLoaded)?;
        let mut state = EpisodeState::start(instance);
        let mut log_probs = Vec::new();

        while state.steps() < self.max_steps {
            let mask = state.legality_mask(instance);
            if !has_legal_move(&mask) {
                break;
            }

            let (next, log_prob) = self.select_action(model, state.current(), &mask, decoding, rng)?;
            if let Some(log_prob) = log_prob {
                log_probs.push(log_prob);
            }
            state.advance(instance, next);
        }

        if matches!(decoding, Decoding::Sample { .. }) {
            self.saved_log_probs = log_probs;
        }
        Ok(state.close())
    }

    /// Force the agent through a stored route.
    ///
    /// Records the log-probability of every interior port of `route` under the
    /// current parameters. Stops early when a port is not legal from the
    /// reproduced state or the step budget is spent. Returns how many
    /// log-probabilities were recorded.
    pub fn reproduce_solution(
        &mut self,
        model: &AgentModel<B>,
        route: &[PortId],
        temperature: f64,
    ) -> Result<usize> {
        let instance = self.instance.as_ref().ok_or(SolverError::NoInstanceLoaded)?;
        let context = self.context.clone().ok_or(SolverError::NoInstanceLoaded)?;
        let mut state = EpisodeState::start(instance);
        let mut log_probs = Vec::new();

        let interior = if route.len() >= 2 { &route[1..route.len() - 1] } else { &[][..] };
        for &port in interior {
            if state.steps() >= self.max_steps || port >= instance.n_ports {
                break;
            }
            let mask = state.legality_mask(instance);
            if mask[port] {
                log::debug!("replayed route leaves the legal set at port {}", port);
                break;
            }

            let logits = model.policy.forward(
                context.clone(),
                state.current(),
                Some(mask_tensor(&mask, &self.device)),
            );
            let scaled = logits.div_scalar(temperature.max(MIN_TEMPERATURE));
            log_probs.push(pick(log_softmax(scaled, 1), port));
            state.advance(instance, port);
        }

        let recorded = log_probs.len();
        self.saved_log_probs = log_probs;
        Ok(recorded)
    }

    /// REINFORCE loss `-sum(log_prob) * (reward - baseline)`; clears the trajectory.
    pub fn compute_loss_with_baseline(&mut self, reward: f64, baseline: f64) -> Result<Tensor<B, 1>> {
        if self.saved_log_probs.is_empty() {
            return Err(SolverError::EmptyTrajectory);
        }
        let advantage = reward - baseline;
        let log_probs = std::mem::take(&mut self.saved_log_probs);
        Ok(Tensor::cat(log_probs, 0).sum().mul_scalar(-advantage))
    }

    /// REINFORCE loss without a baseline
    pub fn compute_loss(&mut self, reward: f64) -> Result<Tensor<B, 1>> {
        self.compute_loss_with_baseline(reward, 0.0)
    }

    /// Drop any recorded log-probabilities
    pub fn clear_trajectory(&mut self) {
        self.saved_log_probs.clear();
    }
}

/// Log-probability of one port as a one-element tensor.
fn pick<B: Backend>(log_probs: Tensor<B, 2>, port: PortId) -> Tensor<B, 1> {
    log_probs.slice([0..1, port..port + 1]).reshape([1])
}

fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| SolverError::Tensor(format!("{:?}", e)))
}
