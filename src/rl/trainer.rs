//! REINFORCE training loop over a single instance.
//!
//! A [`Solver`] owns the policy parameters between calls. Each call to
//! [`Solver::solve`] runs a fresh [`TrainingSession`]: temperature-annealed
//! sampling episodes with a moving-average baseline, periodic replay of the
//! best routes found so far, then a greedy decode of the trained policy.

use crate::config::SolverConfig;
use crate::error::{Result, SolverError};
use crate::instance::{Instance, PortId};
use crate::rl::agent::{AgentModel, Decoding, DecisionAgent};
use crate::rl::baseline::RewardBaseline;
use crate::rl::checkpoint;
use crate::rl::memory::EliteMemory;
use crate::scoring::RouteScorer;
use crate::solution::Solution;
use crate::training_log::{EpochSummary, TrainingLog};
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use std::time::Instant;

/// Label of a solution taken from the sampled episodes
pub const BEST_SAMPLED: &str = "REINFORCE-best";
/// Label of a solution produced by the final greedy decode
pub const GREEDY: &str = "REINFORCE-greedy";

/// Trained parameters and the instance dimensions they fit
pub struct PolicyState<B: Backend> {
    pub model: AgentModel<B>,
    pub n_ports: usize,
    pub n_goods: usize,
}

/// Policy-gradient route solver.
pub struct Solver<B: AutodiffBackend> {
    config: SolverConfig,
    device: B::Device,
    state: Option<PolicyState<B>>,
    last_log: Option<TrainingLog>,
}

impl<B: AutodiffBackend> Solver<B> {
    pub fn new(config: SolverConfig, device: B::Device) -> Result<Self> {
        config.validate()?;
        Ok(Solver {
            config,
            device,
            state: None,
            last_log: None,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn policy_state(&self) -> Option<&PolicyState<B>> {
        self.state.as_ref()
    }

    /// Log of the most recent solve call
    pub fn training_log(&self) -> Option<&TrainingLog> {
        self.last_log.as_ref()
    }

    /// Train on `instance` and return the best route found.
    pub fn solve(&mut self, instance: &Instance, scorer: &dyn RouteScorer) -> Result<Solution> {
        instance.validate()?;
        let start = Instant::now();
        log::info!(
            "Training on {} ({} ports, {} goods) for {} epochs",
            instance.name,
            instance.n_ports,
            instance.n_goods,
            self.config.num_epochs
        );

        let model = self.prepare_policy(instance);
        let optimizer = AdamConfig::new().init::<B, AgentModel<B>>();
        let mut session =
            TrainingSession::new(&self.config, instance, scorer, model, optimizer, self.device.clone());

        let outcome = session.train().and_then(|_| session.finish());
        let (model, mut training_log) = session.into_parts();
        self.state = Some(PolicyState {
            model,
            n_ports: instance.n_ports,
            n_goods: instance.n_goods,
        });

        let mut solution = outcome?;
        solution.computation_time = start.elapsed().as_secs_f64();
        training_log.set_extra("computation_time", solution.computation_time)?;
        training_log.set_extra("final_algorithm", &solution.algorithm)?;
        training_log.set_extra("final_reward", solution.reward)?;

        if let Some(path) = &self.config.log_path {
            match training_log.write_json(path) {
                Ok(()) => log::info!("Training log written to {:?}", path),
                Err(e) => log::warn!("Could not write training log to {:?}: {}", path, e),
            }
        }
        self.last_log = Some(training_log);

        log::info!(
            "Finished in {:.2}s: reward {:.2} ({})",
            solution.computation_time,
            solution.reward,
            solution.algorithm
        );
        Ok(solution)
    }

    /// Write the current policy parameters as a checkpoint.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let state = self
            .state
            .as_ref()
            .ok_or_else(|| SolverError::Checkpoint("no trained policy to save".to_string()))?;
        checkpoint::save(&state.model, state.n_ports, state.n_goods, path.as_ref())
    }

    /// Reuse the stored policy when dimensions match, otherwise build a new one.
    fn prepare_policy(&mut self, instance: &Instance) -> AgentModel<B> {
        if let Some(state) = self.state.take() {
            if state.n_ports == instance.n_ports && state.n_goods == instance.n_goods {
                log::debug!("Reusing policy from the previous call");
                return state.model;
            }
            log::info!(
                "Instance dimensions changed from {}x{} to {}x{}, building a new policy",
                state.n_ports,
                state.n_goods,
                instance.n_ports,
                instance.n_goods
            );
        }

        B::seed(self.config.seed);
        let model = AgentModel::new(
            instance.n_ports,
            instance.n_goods,
            self.config.embedding_dim,
            self.config.hidden_dim,
            &self.device,
        );

        let path = match &self.config.checkpoint_path {
            Some(path) => path,
            None => return model,
        };
        match checkpoint::load(&model, path, instance.n_ports, instance.n_goods, &self.device) {
            Ok(loaded) => {
                log::info!("Loaded checkpoint from {:?}", path);
                loaded
            }
            Err(e) => {
                log::warn!("Could not load checkpoint {:?}: {}. Keeping fresh weights", path, e);
                model
            }
        }
    }
}

/// Mutable state of one solve call
pub struct TrainingSession<'a, B: AutodiffBackend, O> {
    config: &'a SolverConfig,
    instance: &'a Instance,
    scorer: &'a dyn RouteScorer,
    device: B::Device,
    model: AgentModel<B>,
    optimizer: O,
    agent: DecisionAgent<B>,
    baseline: RewardBaseline,
    memory: EliteMemory,
    rng: ChaCha8Rng,
    best: Option<(f64, Vec<PortId>)>,
    episodes: usize,
    log: TrainingLog,
}

impl<'a, B, O> TrainingSession<'a, B, O>
where
    B: AutodiffBackend,
    O: Optimizer<AgentModel<B>, B>,
{
    pub fn new(
        config: &'a SolverConfig,
        instance: &'a Instance,
        scorer: &'a dyn RouteScorer,
        model: AgentModel<B>,
        optimizer: O,
        device: B::Device,
    ) -> Self {
        let agent = DecisionAgent::new(
            instance.n_ports,
            instance.n_goods,
            config.max_steps,
            device.clone(),
        );
        TrainingSession {
            config,
            instance,
            scorer,
            device,
            model,
            optimizer,
            agent,
            baseline: RewardBaseline::new(config.baseline_decay),
            memory: EliteMemory::new(config.memory_size),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            best: None,
            episodes: 0,
            log: TrainingLog::new(),
        }
    }

    pub fn baseline(&self) -> f64 {
        self.baseline.value()
    }

    pub fn memory(&self) -> &EliteMemory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut EliteMemory {
        &mut self.memory
    }

    /// Best sampled route so far and its reward
    pub fn best(&self) -> Option<(f64, &[PortId])> {
        self.best.as_ref().map(|(reward, route)| (*reward, route.as_slice()))
    }

    /// Run every epoch of the schedule
    pub fn train(&mut self) -> Result<()> {
        let config = self.config;
        let progress = if config.progress {
            let bar = ProgressBar::new(config.num_epochs as u64);
            bar.set_style(
                ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} epochs {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        for epoch in 0..config.num_epochs {
            let temperature = config.temperature(epoch);
            let mut rewards = Vec::with_capacity(config.episodes_per_epoch);

            for episode in 0..config.episodes_per_epoch {
                if let Some(reward) = self.run_episode(epoch, episode, temperature)? {
                    rewards.push(reward);
                }
            }

            let replayed = if config.is_replay_epoch(epoch) && !self.memory.is_empty() {
                self.replay()?
            } else {
                0
            };

            let best_reward = self.best.as_ref().map(|(r, _)| *r);
            let mut summary =
                EpochSummary::from_rewards(epoch, temperature, &rewards, best_reward, self.baseline.value());
            summary.replayed = replayed;

            if config.log_interval > 0 && (epoch % config.log_interval == 0 || epoch + 1 == config.num_epochs) {
                log::info!(
                    "Epoch {:>4} | T {:>8.3} | mean {:>10.2} | std {:>8.2} | best {:>10.2} | baseline {:>10.2}",
                    epoch,
                    temperature,
                    summary.mean_reward,
                    summary.std_reward,
                    best_reward.unwrap_or(f64::NAN),
                    summary.baseline
                );
            }
            if let Some(best) = best_reward {
                progress.set_message(format!("best {:.2}", best));
            }
            progress.inc(1);
            self.log.record_epoch(summary);
        }

        progress.finish_and_clear();
        Ok(())
    }

    /// Sample one route, score it and take a policy-gradient step.
    ///
    /// Returns `None` when the scorer gave a non-finite reward; such episodes
    /// leave the parameters, the baseline and the memory untouched.
    pub fn run_episode(&mut self, epoch: usize, episode: usize, temperature: f64) -> Result<Option<f64>> {
        self.agent.receive_instance(&self.model, self.instance)?;
        let route = self.agent.generate_solution(
            &self.model,
            Decoding::Sample { temperature },
            &mut self.rng,
        )?;
        let reward = self.score(&route)?;
        self.episodes += 1;
        if !reward.is_finite() {
            log::warn!("Ignoring non-finite reward {} for route {:?}", reward, route);
            self.agent.clear_trajectory();
            return Ok(None);
        }
        self.log.record_episode(epoch, episode, reward, &route);

        let improved = match &self.best {
            Some((best, _)) => reward > *best,
            None => true,
        };
        if improved {
            log::debug!("New best reward {:.2} at epoch {}: {:?}", reward, epoch, route);
            self.best = Some((reward, route.clone()));
        }
        self.memory.insert(reward, &route);

        if self.agent.trajectory_len() > 0 {
            let loss = self
                .agent
                .compute_loss_with_baseline(reward, self.baseline.value())?;
            self.apply_gradients(loss);
        } else {
            log::debug!("Episode {} of epoch {} closed without a move", episode, epoch);
        }
        self.baseline.update(reward);
        Ok(Some(reward))
    }

    /// Reproduce every stored elite route and update toward its reward.
    ///
    /// Returns the number of routes that produced an update.
    pub fn replay(&mut self) -> Result<usize> {
        let entries = self.memory.entries().to_vec();
        let mut replayed = 0;

        for entry in entries {
            self.agent.receive_instance(&self.model, self.instance)?;
            let recorded =
                self.agent
                    .reproduce_solution(&self.model, &entry.route, self.config.replay_temperature)?;
            if recorded == 0 {
                log::debug!("Skipping replay of {:?}: nothing to reproduce", entry.route);
                self.agent.clear_trajectory();
                continue;
            }

            let loss = self
                .agent
                .compute_loss_with_baseline(entry.reward, self.baseline.value())?;
            self.apply_gradients(loss);
            self.baseline.update(entry.reward);
            replayed += 1;
        }

        Ok(replayed)
    }

    /// Greedy decode with the trained policy, then pick the final answer.
    ///
    /// The best sampled route wins only if strictly better than the greedy one,
    /// or if the greedy route did not get a finite reward.
    pub fn finish(&mut self) -> Result<Solution> {
        let inference = self.model.valid();
        let mut agent = DecisionAgent::<B::InnerBackend>::new(
            self.instance.n_ports,
            self.instance.n_goods,
            self.config.max_steps,
            self.device.clone(),
        );
        agent.receive_instance(&inference, self.instance)?;
        let route = agent.generate_solution(&inference, Decoding::Greedy, &mut self.rng)?;
        let greedy_reward = self.score(&route)?;
        log::info!("Greedy decode reward {:.2}: {:?}", greedy_reward, route);

        self.log.set_extra("instance", &self.instance.name)?;
        self.log.set_extra("n_ports", self.instance.n_ports)?;
        self.log.set_extra("n_goods", self.instance.n_goods)?;
        self.log.set_extra("evaluator", self.config.evaluator)?;
        self.log.set_extra("config", self.config)?;
        self.log.set_extra("episodes", self.episodes)?;
        self.log.set_extra("greedy_reward", greedy_reward)?;
        self.log.set_extra("best_sampled_reward", self.best.as_ref().map(|(r, _)| *r))?;

        let mut solution = match &self.best {
            Some((reward, best_route)) if *reward > greedy_reward || !greedy_reward.is_finite() => {
                Solution::from_route(best_route.clone(), *reward, BEST_SAMPLED)
            }
            _ => Solution::from_route(route, greedy_reward, GREEDY),
        };
        solution.iterations = Some(self.episodes);
        Ok(solution)
    }

    pub fn into_parts(self) -> (AgentModel<B>, TrainingLog) {
        (self.model, self.log)
    }

    fn score(&self, route: &[PortId]) -> Result<f64> {
        Ok(self.scorer.score_route(route, self.config.evaluator)?.reward)
    }

    fn apply_gradients(&mut self, loss: Tensor<B, 1>) {
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self
            .optimizer
            .step(self.config.learning_rate, self.model.clone(), grads);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::tests::{four_port_instance, two_port_instance};
    use crate::scoring::{EvaluatorName, GreedyTradeScorer};
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::ElementConversion;

    type TestBackend = Autodiff<NdArray>;

    /// Four unit-distance ports with small prices and budget.
    fn small_valued_instance() -> Instance {
        let mut instance = four_port_instance();
        for row in instance.buy_price.iter_mut().chain(instance.sell_price.iter_mut()) {
            for price in row.iter_mut() {
                *price /= 100.0;
            }
        }
        instance.time_limit = 10.0;
        instance.initial_capital = 10.0;
        instance
    }

    fn session<'a>(
        config: &'a SolverConfig,
        instance: &'a Instance,
        scorer: &'a dyn RouteScorer,
    ) -> TrainingSession<'a, TestBackend, impl Optimizer<AgentModel<TestBackend>, TestBackend>> {
        let device = Default::default();
        let model = AgentModel::<TestBackend>::new(
            instance.n_ports,
            instance.n_goods,
            config.embedding_dim,
            config.hidden_dim,
            &device,
        );
        let optimizer = AdamConfig::new().init::<TestBackend, AgentModel<TestBackend>>();
        TrainingSession::new(config, instance, scorer, model, optimizer, device)
    }

    /// Summed log-probability of the interior of `route` under the current policy.
    fn route_log_prob<O>(session: &mut TrainingSession<'_, TestBackend, O>, route: &[PortId]) -> f64
    where
        O: Optimizer<AgentModel<TestBackend>, TestBackend>,
    {
        session.agent.receive_instance(&session.model, session.instance).unwrap();
        let recorded = session
            .agent
            .reproduce_solution(&session.model, route, session.config.replay_temperature)
            .unwrap();
        assert_eq!(recorded, route.len() - 2);
        let loss = session.agent.compute_loss_with_baseline(1.0, 0.0).unwrap();
        -loss.into_scalar().elem::<f64>()
    }

    fn small_config() -> SolverConfig {
        SolverConfig {
            embedding_dim: 4,
            hidden_dim: 8,
            max_steps: 10,
            num_epochs: 3,
            episodes_per_epoch: 4,
            learning_rate: 1e-3,
            baseline_decay: 0.9,
            start_temp: 5.0,
            end_temp: 0.5,
            memory_size: 3,
            replay_frequency: 1,
            evaluator: EvaluatorName::InfiniteCapacityDebtEvaluator,
            seed: 7,
            ..Default::default()
        }
    }

    #[test]
    fn test_two_port_solve() {
        let instance = two_port_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let mut solver = Solver::<TestBackend>::new(small_config(), Default::default()).unwrap();

        let solution = solver.solve(&instance, &scorer).unwrap();
        assert_eq!(solution.route, vec![0, 1, 0]);
        assert_eq!(solution.reward, 18.0);
        assert_eq!(solution.iterations, Some(12));

        let log = solver.training_log().unwrap();
        assert_eq!(log.history.len(), 12);
        assert_eq!(log.epochs.len(), 3);
        assert!(log.history.iter().all(|r| r.reward == 18.0));
    }

    #[test]
    fn test_four_port_solution_is_at_least_best_sampled() {
        let instance = four_port_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let mut solver = Solver::<TestBackend>::new(small_config(), Default::default()).unwrap();

        let solution = solver.solve(&instance, &scorer).unwrap();
        assert_eq!(solution.route[0], 0);
        assert_eq!(*solution.route.last().unwrap(), 0);
        assert!(solution.has_distinct_interior());
        assert!(solution.route.len() <= small_config().max_steps + 2);

        let best = solver.training_log().unwrap().best_episode().unwrap().reward;
        assert!(solution.reward >= best);
    }

    #[test]
    fn test_ties_go_to_greedy() {
        let instance = four_port_instance();
        let scorer = |_: &[PortId], _: EvaluatorName| 1.0;
        let mut solver = Solver::<TestBackend>::new(small_config(), Default::default()).unwrap();

        let solution = solver.solve(&instance, &scorer).unwrap();
        assert_eq!(solution.algorithm, GREEDY);
        assert_eq!(solution.reward, 1.0);
    }

    #[test]
    fn test_episodes_without_moves() {
        let mut instance = four_port_instance();
        instance.time_limit = 1.5;
        let scorer = GreedyTradeScorer::new(&instance);
        let mut solver = Solver::<TestBackend>::new(small_config(), Default::default()).unwrap();

        let solution = solver.solve(&instance, &scorer).unwrap();
        assert_eq!(solution.route, vec![0, 0]);
        assert_eq!(solution.reward, instance.initial_capital);

        // replay had nothing to reproduce
        let log = solver.training_log().unwrap();
        assert!(log.epochs.iter().all(|e| e.replayed == 0));
        assert!(log.epochs.last().unwrap().baseline > 0.0);
    }

    #[test]
    fn test_policy_state_follows_dimensions() {
        let mut solver = Solver::<TestBackend>::new(small_config(), Default::default()).unwrap();
        assert!(solver.policy_state().is_none());
        assert!(solver.save_checkpoint(std::env::temp_dir().join("unused")).is_err());

        let four = four_port_instance();
        solver.solve(&four, &GreedyTradeScorer::new(&four)).unwrap();
        let state = solver.policy_state().unwrap();
        assert_eq!((state.n_ports, state.n_goods), (4, 2));

        let two = two_port_instance();
        solver.solve(&two, &GreedyTradeScorer::new(&two)).unwrap();
        let state = solver.policy_state().unwrap();
        assert_eq!((state.n_ports, state.n_goods), (2, 1));
    }

    #[test]
    fn test_replay_moves_baseline_toward_stored_reward() {
        let config = SolverConfig {
            memory_size: 1,
            baseline_decay: 0.5,
            ..small_config()
        };
        let instance = four_port_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let device = Default::default();
        let model = AgentModel::<TestBackend>::new(4, 2, 4, 8, &device);
        let optimizer = AdamConfig::new().init::<TestBackend, AgentModel<TestBackend>>();
        let mut session = TrainingSession::new(&config, &instance, &scorer, model, optimizer, device);

        assert!(session.memory_mut().insert(100.0, &[0, 1, 2, 0]));
        assert_eq!(session.replay().unwrap(), 1);
        assert!((session.baseline() - 50.0).abs() < 1e-9);

        // a route that cannot be reproduced leaves the baseline alone
        let mut session_with_bad_route = {
            let model = AgentModel::<TestBackend>::new(4, 2, 4, 8, &Default::default());
            let optimizer = AdamConfig::new().init::<TestBackend, AgentModel<TestBackend>>();
            TrainingSession::new(&config, &instance, &scorer, model, optimizer, Default::default())
        };
        session_with_bad_route.memory_mut().insert(100.0, &[0, 0]);
        assert_eq!(session_with_bad_route.replay().unwrap(), 0);
        assert_eq!(session_with_bad_route.baseline(), 0.0);
    }

    #[test]
    fn test_training_log_is_written() {
        let dir = std::env::temp_dir().join(format!("merchant-route-rl-trainer-{}", std::process::id()));
        let config = SolverConfig {
            log_path: Some(dir.join("training.json")),
            ..small_config()
        };
        let instance = two_port_instance();
        let mut solver = Solver::<TestBackend>::new(config, Default::default()).unwrap();
        solver.solve(&instance, &GreedyTradeScorer::new(&instance)).unwrap();

        let written = TrainingLog::from_file(dir.join("training.json")).unwrap();
        assert_eq!(written.history.len(), 12);
        assert_eq!(written.extra_data["greedy_reward"], 18.0);
    }

    #[test]
    fn test_unreadable_checkpoint_keeps_fresh_weights() {
        let config = SolverConfig {
            checkpoint_path: Some(std::env::temp_dir().join("merchant-route-rl-missing-checkpoint")),
            ..small_config()
        };
        let instance = two_port_instance();
        let mut solver = Solver::<TestBackend>::new(config, Default::default()).unwrap();
        let solution = solver.solve(&instance, &GreedyTradeScorer::new(&instance)).unwrap();
        assert_eq!(solution.reward, 18.0);
    }

    #[test]
    fn test_checkpoint_round_trip_through_solver() {
        let path = std::env::temp_dir()
            .join(format!("merchant-route-rl-solver-{}", std::process::id()))
            .join("policy");
        let instance = two_port_instance();

        let mut solver = Solver::<TestBackend>::new(small_config(), Default::default()).unwrap();
        solver.solve(&instance, &GreedyTradeScorer::new(&instance)).unwrap();
        solver.save_checkpoint(&path).unwrap();

        let device = Default::default();
        let fresh = AgentModel::<TestBackend>::new(2, 1, 4, 8, &device);
        assert!(checkpoint::load(&fresh, &path, 2, 1, &device).is_ok());
    }

    #[test]
    fn test_positive_advantage_raises_route_probability() {
        let config = SolverConfig {
            learning_rate: 5e-4,
            ..small_config()
        };
        let instance = small_valued_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let mut session = session(&config, &instance, &scorer);
        let route = [0, 2, 1, 0];

        let before = route_log_prob(&mut session, &route);
        session.agent.receive_instance(&session.model, &instance).unwrap();
        session
            .agent
            .reproduce_solution(&session.model, &route, config.replay_temperature)
            .unwrap();
        let loss = session.agent.compute_loss_with_baseline(10.0, 0.0).unwrap();
        session.apply_gradients(loss);
        let after = route_log_prob(&mut session, &route);

        assert!(after.is_finite());
        assert!(after > before, "log-prob {} did not rise above {}", after, before);
    }

    #[test]
    fn test_replay_raises_elite_route_probability() {
        let config = SolverConfig {
            learning_rate: 5e-4,
            ..small_config()
        };
        let instance = small_valued_instance();
        let scorer = GreedyTradeScorer::new(&instance);
        let mut session = session(&config, &instance, &scorer);
        let route = [0, 3, 1, 0];

        assert!(session.memory_mut().insert(100.0, &route));
        let before = route_log_prob(&mut session, &route);
        assert_eq!(session.replay().unwrap(), 1);
        let after = route_log_prob(&mut session, &route);

        assert!(after > before, "log-prob {} did not rise above {}", after, before);
    }

    #[test]
    fn test_non_finite_reward_is_skipped() {
        let config = small_config();
        let instance = four_port_instance();
        let scorer = |_: &[PortId], _: EvaluatorName| f64::NAN;
        let mut session = session(&config, &instance, &scorer);

        assert_eq!(session.run_episode(0, 0, 1.0).unwrap(), None);
        assert_eq!(session.baseline(), 0.0);
        assert!(session.memory().is_empty());
        assert!(session.best().is_none());
        assert_eq!(session.agent.trajectory_len(), 0);
    }

    #[test]
    fn test_solve_survives_nan_rewards() {
        let instance = four_port_instance();
        let scorer = |route: &[PortId], _: EvaluatorName| {
            if route.get(1) == Some(&1) {
                f64::NAN
            } else {
                route.len() as f64
            }
        };
        let mut solver = Solver::<TestBackend>::new(small_config(), Default::default()).unwrap();

        let solution = solver.solve(&instance, &scorer).unwrap();
        assert!(solution.reward.is_finite());
        assert_ne!(solution.route[1], 1);
        assert!(instance.is_closed_route(&solution.route));

        let log = solver.training_log().unwrap();
        assert!(log.history.iter().all(|r| r.reward.is_finite()));
        assert!(log.epochs.iter().all(|e| e.baseline.is_finite()));
    }
}
