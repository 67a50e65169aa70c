use crate::config::PlannerConfig;

/// Guards `balance` against division by zero when shrinking the budget.
const MIN_BALANCE: f64 = 1e-7;

/// Fixed bounds the adaptive controller works within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub max_walkers: usize,
    /// Largest allowed per-cycle budget, `None` for unbounded.
    pub sample_cap: Option<usize>,
    pub time_horizon: usize,
    pub min_horizon: usize,
}

impl ResourceLimits {
    pub fn from_config(config: &PlannerConfig) -> Self {
        ResourceLimits {
            max_walkers: config.n_walkers,
            sample_cap: config.max_samples_step,
            time_horizon: config.time_horizon,
            min_horizon: config.min_horizon,
        }
    }
}

/// Which knob an update turned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    Walkers { from: usize, to: usize },
    Samples { from: usize, to: usize },
}

/// Values re-tuned between decisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resources {
    /// Population size used by the next cycle.
    pub n_walkers: usize,
    /// Sampling budget of the next cycle.
    pub max_samples_step: usize,
    /// Achieved depth over target depth; also the virtual reward exponent.
    pub balance: f64,
}

impl Resources {
    /// Starting point: full population, budget of `n_walkers * time_horizon`
    /// capped by `max_samples_step`.
    pub fn initial(config: &PlannerConfig) -> Self {
        let horizon_budget = config.n_walkers.saturating_mul(config.time_horizon);
        let max_samples_step = config
            .max_samples_step
            .map_or(horizon_budget, |cap| cap.min(horizon_budget));
        Resources {
            n_walkers: config.n_walkers,
            max_samples_step,
            balance: config.balance,
        }
    }

    /// Steer the mean walker depth toward `time_horizon`.
    ///
    /// On target or beyond, add walkers until the cap and then cut samples.
    /// Short of target, add samples until the cap and then cut walkers.
    pub fn update(&mut self, mean_elapsed: f64, limits: &ResourceLimits) -> Adjustment {
        self.balance = (mean_elapsed / limits.time_horizon as f64).max(0.0);

        if self.balance >= 1.0 {
            if self.n_walkers == limits.max_walkers {
                self.update_samples(limits)
            } else {
                self.update_walkers(limits)
            }
        } else if limits.sample_cap == Some(self.max_samples_step) {
            self.update_walkers(limits)
        } else {
            self.update_samples(limits)
        }
    }

    fn update_samples(&mut self, limits: &ResourceLimits) -> Adjustment {
        let from = self.max_samples_step;
        let cap = limits.sample_cap.unwrap_or(usize::MAX);
        let wanted = (from as f64 / self.balance.max(MIN_BALANCE)).ceil();
        let clipped = if wanted >= cap as f64 {
            cap
        } else {
            (wanted as usize).max(2)
        };
        let floor = self.n_walkers.saturating_mul(limits.min_horizon);
        self.max_samples_step = clipped.max(floor);
        Adjustment::Samples {
            from,
            to: self.max_samples_step,
        }
    }

    fn update_walkers(&mut self, limits: &ResourceLimits) -> Adjustment {
        let from = self.n_walkers;
        let wanted = (from as f64 * self.balance).ceil();
        self.n_walkers = if wanted >= limits.max_walkers as f64 {
            limits.max_walkers
        } else {
            (wanted as usize).max(2)
        };
        Adjustment::Walkers {
            from,
            to: self.n_walkers,
        }
    }
}
