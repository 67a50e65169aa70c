use crate::{Adjustment, PlannerConfig, ResourceLimits, Resources};

fn setup(min_horizon: usize) -> (Resources, ResourceLimits) {
    let config = PlannerConfig {
        n_walkers: 10,
        time_horizon: 10,
        min_horizon,
        max_samples_step: Some(50),
        ..PlannerConfig::default()
    };
    (Resources::initial(&config), ResourceLimits::from_config(&config))
}

#[test]
fn initial_budget_is_capped_by_the_horizon_and_the_cap() {
    let (resources, _) = setup(1);
    assert_eq!(resources.max_samples_step, 50);

    let uncapped = PlannerConfig {
        n_walkers: 4,
        time_horizon: 3,
        ..PlannerConfig::default()
    };
    assert_eq!(Resources::initial(&uncapped).max_samples_step, 12);
}

#[test]
fn on_target_depth_leaves_everything_in_place() {
    let (mut resources, limits) = setup(1);

    let adjustment = resources.update(10.0, &limits);

    assert_eq!(adjustment, Adjustment::Samples { from: 50, to: 50 });
    assert_eq!(resources.n_walkers, 10);
    assert_eq!(resources.balance, 1.0);
}

#[test]
fn deep_walkers_at_full_population_cut_the_budget() {
    let (mut resources, limits) = setup(1);

    let adjustment = resources.update(20.0, &limits);

    assert_eq!(adjustment, Adjustment::Samples { from: 50, to: 25 });
    assert_eq!(resources.balance, 2.0);
}

#[test]
fn budget_cut_respects_the_minimum_horizon() {
    let (mut resources, limits) = setup(4);

    resources.update(20.0, &limits);

    assert_eq!(resources.max_samples_step, 40);
}

#[test]
fn deep_walkers_below_the_cap_grow_the_population() {
    let (mut resources, limits) = setup(1);
    resources.n_walkers = 5;

    let adjustment = resources.update(15.0, &limits);

    assert_eq!(adjustment, Adjustment::Walkers { from: 5, to: 8 });
}

#[test]
fn shallow_walkers_at_the_budget_cap_shrink_the_population() {
    let (mut resources, limits) = setup(1);

    let adjustment = resources.update(5.0, &limits);
    assert_eq!(adjustment, Adjustment::Walkers { from: 10, to: 5 });

    let adjustment = resources.update(0.0, &limits);
    assert_eq!(adjustment, Adjustment::Walkers { from: 5, to: 2 });
}

#[test]
fn shallow_walkers_below_the_budget_cap_raise_the_budget() {
    let (mut resources, limits) = setup(1);
    resources.max_samples_step = 20;

    let adjustment = resources.update(5.0, &limits);
    assert_eq!(adjustment, Adjustment::Samples { from: 20, to: 40 });

    let adjustment = resources.update(2.0, &limits);
    assert_eq!(adjustment, Adjustment::Samples { from: 40, to: 50 });

    let adjustment = resources.update(2.0, &limits);
    assert_eq!(adjustment, Adjustment::Walkers { from: 10, to: 2 });
}
