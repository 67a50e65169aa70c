use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::{
    env::Environment,
    error::PlanError,
    model::{Model, RepeatSampler},
    swarm::{
        stats::CycleStats,
        virtual_reward::{clone_probability, distance, virtual_rewards},
        walker::Walker,
    },
    tree::{ids::NodeId, trajectory::TrajectoryTree},
};

/// How a step's reward is folded into a walker's score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardMode {
    /// Add every step reward to the lineage score.
    #[default]
    Accumulate,
    /// Keep only the reward of the latest step.
    Instantaneous,
}

impl RewardMode {
    fn apply(self, current: f64, step_reward: f64) -> f64 {
        match self {
            RewardMode::Accumulate => current + step_reward,
            RewardMode::Instantaneous => step_reward,
        }
    }
}

/// Knobs the population needs from the planner configuration.
#[derive(Debug, Clone, Copy)]
pub struct PopulationSettings {
    pub reward_mode: RewardMode,
    pub repeat: RepeatSampler,
    /// Terminal walkers at or above this score count as winners, not deaths.
    pub win_threshold: Option<f64>,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        PopulationSettings {
            reward_mode: RewardMode::Accumulate,
            repeat: RepeatSampler::fixed(1),
            win_threshold: None,
        }
    }
}

/// Clone decisions computed from one frozen view of the population.
#[derive(Debug, Clone, PartialEq)]
pub struct ClonePlan {
    pub companions: Vec<usize>,
    pub will_clone: Vec<bool>,
}

impl ClonePlan {
    /// How many walkers are going to be overwritten.
    pub fn clone_count(&self) -> usize {
        self.will_clone.iter().filter(|flag| **flag).count()
    }
}

#[derive(Debug, Clone)]
/// Fixed-size set of walkers evolved by stepping and cloning.
pub struct WalkerPopulation<S, O> {
    size: usize,
    settings: PopulationSettings,
    pub(crate) walkers: Vec<Walker<S, O>>,
    pub(crate) pending: Option<ClonePlan>,
}

impl<S, O> WalkerPopulation<S, O>
where
    S: Clone,
    O: Clone + AsRef<[f64]>,
{
    /// Create an empty population of `size` slots; `reset` fills them.
    pub fn new(size: usize, settings: PopulationSettings) -> Self {
        WalkerPopulation {
            size,
            settings,
            walkers: Vec::with_capacity(size),
            pending: None,
        }
    }

    /// Number of slots.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.walkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walkers.is_empty()
    }

    pub fn walkers(&self) -> &[Walker<S, O>] {
        &self.walkers
    }

    pub fn settings(&self) -> &PopulationSettings {
        &self.settings
    }

    /// Pending clone decisions, if `clone_condition` ran since the last clone.
    pub fn pending_clones(&self) -> Option<&ClonePlan> {
        self.pending.as_ref()
    }

    /// Put every slot on `state`, sitting on tree node `root`.
    pub fn reset(&mut self, state: S, observation: O, root: NodeId) -> Result<(), PlanError> {
        if let Some(bad) = observation.as_ref().iter().position(|v| !v.is_finite()) {
            return Err(PlanError::InvalidState(format!(
                "observation feature {bad} is not finite"
            )));
        }

        self.walkers.clear();
        self.walkers.extend(
            (0..self.size).map(|_| Walker::new(state.clone(), observation.clone(), root)),
        );
        self.pending = None;
        Ok(())
    }

    pub fn rewards(&self) -> Vec<f64> {
        self.walkers.iter().map(|w| w.reward).collect()
    }

    pub fn elapsed_times(&self) -> Vec<u64> {
        self.walkers.iter().map(|w| w.elapsed).collect()
    }

    pub fn origins(&self) -> Vec<Option<NodeId>> {
        self.walkers.iter().map(|w| w.origin).collect()
    }

    pub fn terminals(&self) -> Vec<bool> {
        self.walkers.iter().map(|w| w.terminal).collect()
    }

    pub fn nodes(&self) -> Vec<NodeId> {
        self.walkers.iter().map(|w| w.node).collect()
    }

    pub fn all_terminal(&self) -> bool {
        self.walkers.iter().all(|w| w.terminal)
    }

    /// Mean repeat-steps walked; 0 for an empty population.
    pub fn mean_elapsed(&self) -> f64 {
        if self.walkers.is_empty() {
            return 0.0;
        }
        self.walkers.iter().map(|w| w.elapsed as f64).sum::<f64>() / self.walkers.len() as f64
    }

    /// Slot with the highest reward, lowest slot on ties.
    pub fn best_walker(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, walker) in self.walkers.iter().enumerate() {
            best = match best {
                Some((_, reward)) if reward >= walker.reward => best,
                _ => Some((i, walker.reward)),
            };
        }
        best.map(|(i, _)| i)
    }

    pub fn best_reward(&self) -> Option<f64> {
        self.best_walker().map(|i| self.walkers[i].reward)
    }

    /// Fix every walker's origin to the node it currently sits on.
    /// Called once, right after the first evolution iteration.
    pub fn fix_origins(&mut self) {
        for walker in &mut self.walkers {
            walker.origin = Some(walker.node);
        }
    }

    /// Advance every live walker by one sampled action and repeat-count.
    ///
    /// Each transition is appended to `tree` under the walker's current node.
    /// The budget is not enforced here; the caller checks its stop condition.
    pub fn step_walkers<E, M>(
        &mut self,
        env: &mut E,
        model: &mut M,
        tree: &mut TrajectoryTree<S>,
        rng: &mut ChaCha8Rng,
        stats: CycleStats,
    ) -> Result<CycleStats, PlanError>
    where
        E: Environment<State = S, Observation = O>,
        M: Model<O>,
    {
        let live: Vec<usize> = (0..self.walkers.len())
            .filter(|i| !self.walkers[*i].terminal)
            .collect();
        if live.is_empty() {
            return Ok(stats);
        }

        let actions = {
            let observations: Vec<&O> = live.iter().map(|i| &self.walkers[*i].observation).collect();
            model
                .predict(&observations, rng)
                .map_err(|err| PlanError::Model(Box::new(err)))?
        };
        if actions.len() != live.len() {
            return Err(PlanError::ModelOutput {
                expected: live.len(),
                actual: actions.len(),
            });
        }

        for (i, action) in live.iter().copied().zip(actions) {
            let repeat = self.settings.repeat.sample(rng);
            let walker = &mut self.walkers[i];
            let transition = env
                .step(&walker.state, &action, repeat)
                .map_err(|err| PlanError::Environment(Box::new(err)))?;

            let terminal = transition.is_terminal();
            let node = tree.append_child(Some(walker.node), transition.state.clone(), action, repeat)?;

            walker.reward = self.settings.reward_mode.apply(walker.reward, transition.reward);
            walker.elapsed += u64::from(repeat);
            walker.terminal = match self.settings.win_threshold {
                Some(threshold) if terminal && walker.reward >= threshold => false,
                _ => terminal,
            };
            walker.state = transition.state;
            walker.observation = transition.observation;
            walker.node = node;
        }

        let best = self.best_reward().unwrap_or(f64::NEG_INFINITY);
        Ok(stats.record_step(live.len(), best))
    }

    /// Pair every walker with a random companion and decide who clones.
    ///
    /// Companions are drawn from live walkers when there are any. Dead
    /// walkers always clone. All decisions are taken from the current
    /// population before anything is overwritten.
    pub fn clone_condition(&mut self, balance: f64, rng: &mut ChaCha8Rng) -> &ClonePlan {
        let n = self.walkers.len();
        let alive: Vec<usize> = (0..n).filter(|i| !self.walkers[*i].terminal).collect();

        let companions: Vec<usize> = (0..n)
            .map(|_| {
                if alive.is_empty() {
                    rng.gen_range(0..n)
                } else {
                    alive[rng.gen_range(0..alive.len())]
                }
            })
            .collect();

        let distances: Vec<f64> = companions
            .iter()
            .enumerate()
            .map(|(i, c)| {
                distance(
                    self.walkers[i].observation.as_ref(),
                    self.walkers[*c].observation.as_ref(),
                )
            })
            .collect();
        let scores = virtual_rewards(&self.rewards(), &distances, balance);

        let will_clone: Vec<bool> = (0..n)
            .map(|i| {
                let p = clone_probability(scores[i], scores[companions[i]]);
                let draw: f64 = rng.gen_range(0.0..1.0);
                self.walkers[i].terminal || p > draw
            })
            .collect();

        self.pending.insert(ClonePlan {
            companions,
            will_clone,
        })
    }

    /// Apply the pending clone decisions, returning how many walkers changed.
    ///
    /// The next generation is built from the untouched current one, so a
    /// walker cloned from a slot that is itself being overwritten still
    /// receives that slot's pre-clone record.
    pub fn clone_walkers(&mut self) -> usize {
        let Some(plan) = self.pending.take() else {
            return 0;
        };

        let next: Vec<Walker<S, O>> = (0..self.walkers.len())
            .map(|i| {
                let source = if plan.will_clone[i] {
                    plan.companions[i]
                } else {
                    i
                };
                self.walkers[source].clone()
            })
            .collect();
        self.walkers = next;
        plan.clone_count()
    }
}
