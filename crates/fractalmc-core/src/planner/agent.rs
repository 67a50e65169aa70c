use std::{thread, time::Duration};

use tracing::info;

use crate::{
    env::{Action, Environment, Transition},
    error::PlanError,
    model::Model,
    planner::controller::FractalMc,
    tree::{ids::NodeId, trajectory::BranchStep},
};

/// Summary of one `run_agent` episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    /// Planned decisions taken, warm-up frames excluded.
    pub steps: usize,
    /// Reward collected by the real agent, warm-up frames included.
    pub total_reward: f64,
    /// Whether the environment reported the episode over.
    pub terminal: bool,
    /// Tree node of the final real state.
    pub last_node: NodeId,
    /// Samples consumed by all planning cycles.
    pub samples: usize,
}

impl<E, M> FractalMc<E, M>
where
    E: Environment,
    M: Model<E::Observation>,
{
    /// Play one episode: plan, act with `min_dt`, record, repeat.
    ///
    /// Stops when the environment reports a terminal state, the agent reward
    /// reaches `reward_limit`, or the planners have spent `samples_limit`.
    /// The tree is cleared first and holds the whole episode afterwards.
    pub fn run_agent(&mut self, render: bool) -> Result<EpisodeReport, PlanError> {
        self.tree.reset();
        self.sample_history.clear();
        self.agent_reward = 0.0;
        self.last_action = None;

        let (mut state, mut observation) = self
            .env
            .reset()
            .map_err(|err| PlanError::Environment(Box::new(err)))?;
        let noop = self.action_space.noop();
        let repeat = self.config.min_dt;
        let mut node = self.tree.append_child(None, state.clone(), noop.clone(), 0)?;
        let mut terminal = false;

        for _ in 0..self.config.skip_initial_frames {
            let transition = self.real_step(&state, &noop)?;
            node = self
                .tree
                .append_child(Some(node), transition.state.clone(), noop.clone(), repeat)?;
            self.agent_reward += transition.reward;
            self.last_action = Some(noop.clone());
            terminal = transition.is_terminal();
            state = transition.state;
            observation = transition.observation;
            if terminal {
                break;
            }
        }

        let mut steps = 0;
        let mut samples = 0;
        while !terminal && !self.reward_reached() && !self.samples_exhausted(samples) {
            let cycle = self.plan_from(node, &state, &observation)?;
            samples += cycle.stats.samples;
            let action = self.weight_actions()?;

            let transition = self.real_step(&state, &action)?;
            node = self
                .tree
                .append_child(Some(node), transition.state.clone(), action.clone(), repeat)?;
            self.agent_reward += transition.reward;
            terminal = transition.is_terminal();
            state = transition.state;
            observation = transition.observation;
            steps += 1;

            info!(
                step = steps,
                action = ?action,
                reward = transition.reward,
                total_reward = self.agent_reward,
                status = %cycle.status,
                samples = cycle.stats.samples,
                "agent step"
            );

            if render {
                self.env
                    .render()
                    .map_err(|err| PlanError::Environment(Box::new(err)))?;
            }
            if self.config.update_parameters {
                self.update_parameters();
            }
            self.last_action = Some(action);
        }

        info!(
            steps,
            total_reward = self.agent_reward,
            terminal,
            samples,
            "episode finished"
        );

        Ok(EpisodeReport {
            steps,
            total_reward: self.agent_reward,
            terminal,
            last_node: node,
            samples,
        })
    }

    /// Branch from the root down to `index`.
    ///
    /// Defaults to the tracked best walker with `keep_best`, then to the
    /// highest-reward walker of the last cycle, then to the newest node.
    pub fn recover_game(
        &self,
        index: Option<NodeId>,
    ) -> Result<Vec<BranchStep<E::State>>, PlanError> {
        let target = match index {
            Some(index) => index,
            None => self.default_recover_target().ok_or(PlanError::EmptyPlan)?,
        };
        Ok(self.tree.get_branch(target)?)
    }

    /// Replay the branch ending at `index` (default: newest node) against the
    /// environment, rendering every frame. Returns the number of frames.
    pub fn render_game(
        &mut self,
        index: Option<NodeId>,
        frame_delay: Duration,
    ) -> Result<usize, PlanError> {
        let target = match index {
            Some(index) => index,
            None => self.tree.last_node().ok_or(PlanError::EmptyPlan)?,
        };
        let branch = self.tree.get_branch(target)?;

        for pair in branch.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            self.env
                .step(&from.state, &to.action, to.repeat)
                .map_err(|err| PlanError::Environment(Box::new(err)))?;
            self.env
                .render()
                .map_err(|err| PlanError::Environment(Box::new(err)))?;
            if !frame_delay.is_zero() {
                thread::sleep(frame_delay);
            }
        }

        Ok(branch.len().saturating_sub(1))
    }

    fn default_recover_target(&self) -> Option<NodeId> {
        if self.config.keep_best {
            if let Some(best) = self.best {
                return Some(best.node);
            }
        }
        self.population
            .best_walker()
            .map(|i| self.population.walkers()[i].node())
            .or_else(|| self.tree.last_node())
    }

    fn real_step(
        &mut self,
        state: &E::State,
        action: &Action,
    ) -> Result<Transition<E::State, E::Observation>, PlanError> {
        self.env
            .step(state, action, self.config.min_dt)
            .map_err(|err| PlanError::Environment(Box::new(err)))
    }

    fn reward_reached(&self) -> bool {
        self.config
            .reward_limit
            .is_some_and(|limit| self.agent_reward >= limit)
    }

    fn samples_exhausted(&self, samples: usize) -> bool {
        self.config
            .samples_limit
            .is_some_and(|limit| samples >= limit)
    }
}
