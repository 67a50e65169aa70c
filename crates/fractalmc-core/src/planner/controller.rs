use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace, warn};

use crate::{
    config::PlannerConfig,
    env::{Action, ActionSpace, Environment},
    error::PlanError,
    model::Model,
    planner::{
        resources::{Adjustment, ResourceLimits, Resources},
        status::{CycleReport, CycleStatus},
    },
    swarm::{
        population::{PopulationSettings, WalkerPopulation},
        stats::CycleStats,
    },
    tree::{ids::NodeId, trajectory::TrajectoryTree},
};

/// Best walker seen during the current cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestWalker {
    pub node: NodeId,
    pub reward: f64,
}

/// Action-value estimate read off a converged population.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionDistribution {
    Discrete {
        /// Share of voting walkers descending from each first action.
        probabilities: Vec<f64>,
        /// Best reward among walkers descending from each first action, 0 if none.
        max_rewards: Vec<f64>,
    },
    Continuous {
        /// Mean of the origin action vectors.
        mean: Vec<f64>,
    },
}

/// Fractal Monte Carlo planner.
///
/// Owns the environment, the model, the episode's trajectory tree and the
/// walker population of the latest cycle.
pub struct FractalMc<E: Environment, M> {
    pub(crate) env: E,
    pub(crate) model: M,
    pub(crate) config: PlannerConfig,
    pub(crate) action_space: ActionSpace,
    settings: PopulationSettings,
    limits: ResourceLimits,
    resources: Resources,
    pub(crate) population: WalkerPopulation<E::State, E::Observation>,
    pub(crate) tree: TrajectoryTree<E::State>,
    rng: ChaCha8Rng,
    last_cycle: Option<CycleReport>,
    pub(crate) best: Option<BestWalker>,
    pub(crate) sample_history: Vec<usize>,
    pub(crate) agent_reward: f64,
    pub(crate) last_action: Option<Action>,
}

impl<E, M> FractalMc<E, M>
where
    E: Environment,
    M: Model<E::Observation>,
{
    /// Build a planner, resolving the model's action space once.
    pub fn new(env: E, model: M, config: PlannerConfig) -> Result<Self, PlanError> {
        config.validate()?;

        let action_space = model.action_space().clone();
        action_space.validate().map_err(PlanError::ActionSpace)?;
        let env_space = env.action_space();
        if !env_space.is_compatible_with(&action_space) {
            return Err(PlanError::ActionSpaceMismatch {
                env: env_space.to_string(),
                model: action_space.to_string(),
            });
        }

        let settings = config.population_settings()?;
        let resources = Resources::initial(&config);
        let limits = ResourceLimits::from_config(&config);

        Ok(FractalMc {
            population: WalkerPopulation::new(resources.n_walkers, settings),
            tree: TrajectoryTree::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            env,
            model,
            config,
            action_space,
            settings,
            limits,
            resources,
            last_cycle: None,
            best: None,
            sample_history: Vec::new(),
            agent_reward: 0.0,
            last_action: None,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }

    pub fn population(&self) -> &WalkerPopulation<E::State, E::Observation> {
        &self.population
    }

    pub fn tree(&self) -> &TrajectoryTree<E::State> {
        &self.tree
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Report of the most recent planning cycle.
    pub fn last_cycle(&self) -> Option<&CycleReport> {
        self.last_cycle.as_ref()
    }

    /// Status of the most recent planning cycle.
    pub fn status(&self) -> CycleStatus {
        self.last_cycle
            .map_or(CycleStatus::Playing, |report| report.status)
    }

    /// Best walker tracked during the last cycle; needs `keep_best`.
    pub fn best(&self) -> Option<&BestWalker> {
        self.best.as_ref()
    }

    /// Samples spent by each decision that re-tuned parameters.
    pub fn sample_history(&self) -> &[usize] {
        &self.sample_history
    }

    /// Reward collected by the real agent in the current episode.
    pub fn agent_reward(&self) -> f64 {
        self.agent_reward
    }

    pub fn last_action(&self) -> Option<&Action> {
        self.last_action.as_ref()
    }

    /// Plan from a standalone state, recorded as a new root of the tree.
    pub fn run_swarm(
        &mut self,
        state: &E::State,
        observation: &E::Observation,
    ) -> Result<CycleReport, PlanError> {
        let root = self.tree.append_child(
            None,
            state.clone(),
            self.action_space.noop(),
            0,
        )?;
        self.plan_from(root, state, observation)
    }

    /// Evolve a fresh population from `state` until a stop condition fires.
    ///
    /// Iteration 0 steps and fixes origins, iteration 1 only steps, later
    /// iterations decide clones, step, then clone, so walkers that are about
    /// to be replaced still get one more move. Stop conditions are checked
    /// after each iteration, so origins are always fixed.
    pub(crate) fn plan_from(
        &mut self,
        root: NodeId,
        state: &E::State,
        observation: &E::Observation,
    ) -> Result<CycleReport, PlanError> {
        self.population = WalkerPopulation::new(self.resources.n_walkers, self.settings);
        self.population
            .reset(state.clone(), observation.clone(), root)?;
        self.best = None;

        let mut stats = CycleStats::default();
        let status = loop {
            if stats.iterations > 1 {
                self.population
                    .clone_condition(self.resources.balance, &mut self.rng);
            }
            stats = self.population.step_walkers(
                &mut self.env,
                &mut self.model,
                &mut self.tree,
                &mut self.rng,
                stats,
            )?;
            if stats.iterations > 1 {
                self.population.clone_walkers();
            } else if stats.iterations == 0 {
                self.population.fix_origins();
            }
            stats = stats.next_iteration();

            if self.config.keep_best {
                self.track_best();
            }
            if let Some(every) = self.config.render_every {
                if stats.iterations % every == 0 {
                    self.env
                        .render()
                        .map_err(|err| PlanError::Environment(Box::new(err)))?;
                }
            }

            trace!(
                iteration = stats.iterations,
                samples = stats.samples,
                best_reward = stats.best_reward,
                "evolution iteration complete"
            );

            let status = self.stop_condition(&stats);
            if status.is_stopped() {
                break status;
            }
        };

        debug!(
            root = root.index(),
            status = %status,
            samples = stats.samples,
            iterations = stats.iterations,
            best_reward = stats.best_reward,
            "planning cycle finished"
        );

        let report = CycleReport {
            root,
            status,
            stats,
        };
        self.last_cycle = Some(report);
        Ok(report)
    }

    /// Check budget, score ceiling and extinction, in that priority.
    pub fn stop_condition(&self, stats: &CycleStats) -> CycleStatus {
        let score_reached = match (self.config.reward_limit, self.population.best_reward()) {
            (Some(limit), Some(best)) => best >= limit,
            _ => false,
        };

        if stats.samples >= self.resources.max_samples_step {
            CycleStatus::SampleLimit
        } else if score_reached {
            CycleStatus::ScoreLimit
        } else if self.population.all_terminal() {
            CycleStatus::Extinct
        } else {
            CycleStatus::Playing
        }
    }

    fn track_best(&mut self) {
        let Some(i) = self.population.best_walker() else {
            return;
        };
        let walker = &self.population.walkers()[i];
        let improved = self.best.is_none_or(|best| walker.reward() > best.reward);
        if improved {
            self.best = Some(BestWalker {
                node: walker.node(),
                reward: walker.reward(),
            });
        }
    }

    /// Recommend the action for the state the last cycle planned from.
    ///
    /// Discrete spaces take the plurality of origin actions among live
    /// walkers (ties go to the lowest index); continuous spaces average the
    /// origin action vectors.
    pub fn weight_actions(&self) -> Result<Action, PlanError> {
        match &self.action_space {
            ActionSpace::Discrete { n } => {
                let counts = self.origin_counts(*n, true)?;
                plurality(&counts)
                    .map(Action::Discrete)
                    .ok_or(PlanError::EmptyPlan)
            }
            ActionSpace::Continuous { low, .. } => self.mean_origin_action(low.len()),
        }
    }

    /// Run a cycle from `state`, re-tune, and export the action-value estimate.
    pub fn estimate_distributions(
        &mut self,
        state: &E::State,
        observation: &E::Observation,
    ) -> Result<ActionDistribution, PlanError> {
        self.run_swarm(state, observation)?;
        self.update_parameters();
        self.action_distribution()
    }

    /// Action-value estimate of the current population.
    ///
    /// Discrete probabilities are origin frequencies over every walker,
    /// terminal or not.
    pub fn action_distribution(&self) -> Result<ActionDistribution, PlanError> {
        match &self.action_space {
            ActionSpace::Discrete { n } => {
                let counts = self.origin_counts(*n, false)?;
                let total: usize = counts.iter().sum();
                let probabilities = counts
                    .iter()
                    .map(|c| *c as f64 / total as f64)
                    .collect();
                Ok(ActionDistribution::Discrete {
                    probabilities,
                    max_rewards: self.max_rewards_per_action(*n)?,
                })
            }
            ActionSpace::Continuous { low, .. } => {
                let mean = match self.mean_origin_action(low.len())? {
                    Action::Continuous(mean) => mean,
                    Action::Discrete(_) => Vec::new(),
                };
                Ok(ActionDistribution::Continuous { mean })
            }
        }
    }

    /// Re-tune population size and sampling budget from the last cycle.
    pub fn update_parameters(&mut self) -> Adjustment {
        if let Some(report) = self.last_cycle {
            self.sample_history.push(report.stats.samples);
        }
        let mean_elapsed = self.population.mean_elapsed();
        let adjustment = self.resources.update(mean_elapsed, &self.limits);
        debug!(
            balance = self.resources.balance,
            n_walkers = self.resources.n_walkers,
            max_samples_step = self.resources.max_samples_step,
            ?adjustment,
            "planner parameters updated"
        );
        adjustment
    }

    /// Origin action of every walker allowed to vote.
    ///
    /// With `live_only`, terminal walkers are left out unless every walker
    /// is terminal.
    fn voting_actions(&self, live_only: bool) -> Result<Vec<&Action>, PlanError> {
        let walkers = self.population.walkers();
        let any_live = walkers.iter().any(|w| !w.is_terminal() && w.origin().is_some());

        let mut actions = Vec::with_capacity(walkers.len());
        for walker in walkers {
            if live_only && any_live && walker.is_terminal() {
                continue;
            }
            if let Some(origin) = walker.origin() {
                actions.push(self.tree.node(origin)?.action());
            }
        }

        if actions.is_empty() {
            warn!("planning cycle produced no origin actions");
            return Err(PlanError::EmptyPlan);
        }
        Ok(actions)
    }

    fn origin_counts(&self, n_actions: usize, live_only: bool) -> Result<Vec<usize>, PlanError> {
        let mut counts = vec![0usize; n_actions];
        for action in self.voting_actions(live_only)? {
            match action.index() {
                Some(index) if index < n_actions => counts[index] += 1,
                _ => {
                    return Err(PlanError::ActionSpace(format!(
                        "origin action {action:?} is outside discrete({n_actions})"
                    )));
                }
            }
        }
        Ok(counts)
    }

    fn mean_origin_action(&self, dims: usize) -> Result<Action, PlanError> {
        let actions = self.voting_actions(false)?;
        let mut sum = vec![0.0; dims];
        for action in &actions {
            match action.as_vector() {
                Some(values) if values.len() == dims => {
                    for (acc, v) in sum.iter_mut().zip(values) {
                        *acc += v;
                    }
                }
                _ => {
                    return Err(PlanError::ActionSpace(format!(
                        "origin action {action:?} is not a {dims}-dimensional vector"
                    )));
                }
            }
        }
        let count = actions.len() as f64;
        Ok(Action::Continuous(sum.into_iter().map(|v| v / count).collect()))
    }

    fn max_rewards_per_action(&self, n_actions: usize) -> Result<Vec<f64>, PlanError> {
        let mut best: Vec<Option<f64>> = vec![None; n_actions];
        for walker in self.population.walkers() {
            let Some(origin) = walker.origin() else {
                continue;
            };
            if let Some(index) = self.tree.node(origin)?.action().index() {
                if let Some(slot) = best.get_mut(index) {
                    *slot = Some(slot.map_or(walker.reward(), |r| r.max(walker.reward())));
                }
            }
        }
        Ok(best.into_iter().map(|r| r.unwrap_or(0.0)).collect())
    }
}

/// Index with the most votes, lowest index on ties. `None` without votes.
pub fn plurality(counts: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (i, count) in counts.iter().copied().enumerate() {
        best = match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((i, count)),
        };
    }
    best.filter(|(_, count)| *count > 0).map(|(i, _)| i)
}
