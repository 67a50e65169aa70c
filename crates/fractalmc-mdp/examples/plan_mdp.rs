use std::path::PathBuf;

use fractalmc_core::{Environment, FractalMc, PlannerConfig, RandomModel};
use fractalmc_mdp::{MdpSimulator, compile_yaml};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("crates/fractalmc-mdp/examples/sample.mdp.yaml"));

    let compiled = compile_yaml(&path)?;
    let simulator = MdpSimulator::new(compiled, 12345);
    let model = RandomModel::new(simulator.action_space());
    let config = PlannerConfig {
        n_walkers: 32,
        reward_limit: Some(5.0),
        max_samples_step: Some(640),
        time_horizon: 6,
        update_parameters: true,
        ..PlannerConfig::from_default_yaml()?
    };

    let mut planner = FractalMc::new(simulator, model, config)?;
    let report = planner.run_agent(true)?;

    let path: Vec<&str> = planner
        .recover_game(Some(report.last_node))?
        .iter()
        .map(|step| planner.env().mdp().state_id(step.state).unwrap_or("?"))
        .collect();

    println!(
        "steps={} total_reward={:.3} terminal={} samples={}",
        report.steps, report.total_reward, report.terminal, report.samples
    );
    println!("path={}", path.join(" -> "));
    Ok(())
}
