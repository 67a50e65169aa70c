/// Counters of one planning cycle, threaded explicitly through each iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleStats {
    /// Environment calls made by walkers so far.
    pub samples: usize,
    /// Completed evolution iterations.
    pub iterations: usize,
    /// Highest cumulative reward any walker held during the cycle.
    pub best_reward: f64,
}

impl Default for CycleStats {
    fn default() -> Self {
        CycleStats {
            samples: 0,
            iterations: 0,
            best_reward: f64::NEG_INFINITY,
        }
    }
}

impl CycleStats {
    /// Count `advanced` walker steps and fold in the population's best reward.
    pub fn record_step(mut self, advanced: usize, best_reward: f64) -> Self {
        self.samples += advanced;
        self.best_reward = self.best_reward.max(best_reward);
        self
    }

    /// Mark one more iteration as completed.
    pub fn next_iteration(mut self) -> Self {
        self.iterations += 1;
        self
    }
}
