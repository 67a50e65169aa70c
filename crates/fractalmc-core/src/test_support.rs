use std::{collections::VecDeque, convert::Infallible};

use rand_chacha::ChaCha8Rng;

use crate::{
    env::{Action, ActionSpace, Environment, Transition},
    model::Model,
};

/// Integer line: 0 stays, 1 moves right, 2 moves left, once per repeat.
/// Reward is the signed displacement; `|position| >= goal` is terminal.
#[derive(Debug, Clone)]
pub struct LineEnv {
    pub goal: i64,
    pub steps: usize,
    pub renders: usize,
}

impl LineEnv {
    pub fn new(goal: i64) -> Self {
        LineEnv {
            goal,
            steps: 0,
            renders: 0,
        }
    }
}

impl Environment for LineEnv {
    type State = i64;
    type Observation = Vec<f64>;
    type Error = Infallible;

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 3 }
    }

    fn reset(&mut self) -> Result<(i64, Vec<f64>), Infallible> {
        Ok((0, vec![0.0]))
    }

    fn step(
        &mut self,
        state: &i64,
        action: &Action,
        repeat: u32,
    ) -> Result<Transition<i64, Vec<f64>>, Infallible> {
        self.steps += 1;
        let delta = match action.index() {
            Some(1) => 1,
            Some(2) => -1,
            _ => 0,
        };
        let mut position = *state;
        let mut reward = 0.0;
        for _ in 0..repeat {
            if position.abs() >= self.goal {
                break;
            }
            position += delta;
            reward += delta as f64;
        }
        let terminal = position.abs() >= self.goal;
        Ok(Transition::new(position, vec![position as f64], reward, terminal))
    }

    fn render(&mut self) -> Result<(), Infallible> {
        self.renders += 1;
        Ok(())
    }
}

/// Continuous drift: position moves by the action value per repeat.
#[derive(Debug, Clone, Default)]
pub struct DriftEnv;

impl Environment for DriftEnv {
    type State = f64;
    type Observation = Vec<f64>;
    type Error = Infallible;

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Continuous {
            low: vec![-1.0],
            high: vec![1.0],
        }
    }

    fn reset(&mut self) -> Result<(f64, Vec<f64>), Infallible> {
        Ok((0.0, vec![0.0]))
    }

    fn step(
        &mut self,
        state: &f64,
        action: &Action,
        repeat: u32,
    ) -> Result<Transition<f64, Vec<f64>>, Infallible> {
        let velocity = action.as_vector().map_or(0.0, |v| v[0]);
        let position = state + velocity * repeat as f64;
        Ok(Transition::new(position, vec![position], velocity, false))
    }
}

/// Replays scripted action rows, one row per `predict` call, then repeats
/// `fallback` for every walker.
#[derive(Debug, Clone)]
pub struct ScriptedModel {
    space: ActionSpace,
    script: VecDeque<Vec<usize>>,
    fallback: usize,
}

impl ScriptedModel {
    pub fn new(n: usize, script: Vec<Vec<usize>>, fallback: usize) -> Self {
        ScriptedModel {
            space: ActionSpace::Discrete { n },
            script: script.into(),
            fallback,
        }
    }
}

impl<O> Model<O> for ScriptedModel {
    type Error = Infallible;

    fn action_space(&self) -> &ActionSpace {
        &self.space
    }

    fn predict(
        &mut self,
        observations: &[&O],
        _rng: &mut ChaCha8Rng,
    ) -> Result<Vec<Action>, Infallible> {
        let row = self.script.pop_front().unwrap_or_default();
        Ok((0..observations.len())
            .map(|i| Action::Discrete(row.get(i).copied().unwrap_or(self.fallback)))
            .collect())
    }
}
