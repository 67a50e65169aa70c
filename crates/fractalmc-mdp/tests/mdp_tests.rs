use fractalmc_core::{Action, ActionSpace, Environment, FractalMc, PlannerConfig, RandomModel};
use fractalmc_mdp::{
    MdpBuilder, MdpError, MdpSimulator, MdpSpec, StateKey, compile_yaml, parse_yaml, save_yaml,
};

const VALID_MDP_YAML: &str = r#"
version: 1
start: s0
states:
  - id: s0
    terminal: false
    actions:
      - id: a0
        outcomes:
          - next: s1
            prob: 0.7
            reward: 1.0
          - next: s0
            prob: 0.3
            reward: 0.0
      - id: a1
        outcomes:
          - next: s2
            prob: 1.0
            reward: -0.2
  - id: s1
    terminal: true
  - id: s2
    terminal: false
    actions: []
"#;

#[test]
fn yaml_parse_and_compile_success() {
    let spec: MdpSpec = serde_yaml::from_str(VALID_MDP_YAML).expect("valid yaml");
    let compiled = spec.compile().expect("compile should succeed");
    let start = compiled.start();

    assert_eq!(compiled.state_count(), 3);
    assert_eq!(start.index(), 0);
    assert_eq!(compiled.state_id(start), Some("s0"));
}

#[test]
fn validation_fails_for_probability_sum() {
    let yaml = r#"
start: s0
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: 0.9
            reward: 1.0
"#;

    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");

    assert!(matches!(err, MdpError::ProbabilitySum { .. }));
}

#[test]
fn validation_fails_for_unknown_state_reference() {
    let yaml = r#"
start: s0
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: missing
            prob: 1.0
            reward: 1.0
"#;

    let spec: MdpSpec = serde_yaml::from_str(yaml).expect("valid syntax");
    let err = spec.compile().expect_err("compile should fail");

    assert!(matches!(err, MdpError::UnknownNextState { .. }));
}

#[test]
fn sampling_is_deterministic_for_fixed_seed() {
    let yaml = r#"
start: s0
states:
  - id: s0
    actions:
      - id: a0
        outcomes:
          - next: s0
            prob: 0.6
            reward: 0.0
          - next: s1
            prob: 0.4
            reward: 1.0
  - id: s1
    terminal: true
"#;

    let spec = parse_yaml(yaml).expect("valid syntax");
    let compiled = spec.compile().expect("compile should succeed");

    let mut sim_a = MdpSimulator::new(compiled.clone(), 42);
    let mut sim_b = MdpSimulator::new(compiled, 42);

    let mut trace_a = Vec::new();
    let mut trace_b = Vec::new();

    for _ in 0..20 {
        trace_a.push(sim_a.sample_step(StateKey::from(0), 0));
        trace_b.push(sim_b.sample_step(StateKey::from(0), 0));
    }

    assert_eq!(trace_a, trace_b);
}

const CHAIN_MDP_YAML: &str = r#"
start: s0
states:
  - id: s0
    features: [0.0]
    actions:
      - id: jump
        outcomes: [{ next: bad, prob: 1.0, reward: 0.0 }]
      - id: forward
        outcomes: [{ next: s1, prob: 1.0, reward: 1.0 }]
  - id: s1
    features: [1.0]
    actions:
      - id: jump
        outcomes: [{ next: bad, prob: 1.0, reward: 0.0 }]
      - id: forward
        outcomes: [{ next: s2, prob: 1.0, reward: 1.0 }]
  - id: s2
    features: [2.0]
    actions:
      - id: jump
        outcomes: [{ next: bad, prob: 1.0, reward: 0.0 }]
      - id: forward
        outcomes: [{ next: s3, prob: 1.0, reward: 1.0 }]
  - id: s3
    features: [3.0]
    actions:
      - id: jump
        outcomes: [{ next: bad, prob: 1.0, reward: 0.0 }]
      - id: forward
        outcomes: [{ next: s4, prob: 1.0, reward: 1.0 }]
  - id: s4
    features: [4.0]
    actions:
      - id: jump
        outcomes: [{ next: bad, prob: 1.0, reward: 0.0 }]
      - id: forward
        outcomes: [{ next: s5, prob: 1.0, reward: 1.0 }]
  - id: s5
    features: [5.0]
    actions:
      - id: stay
        outcomes: [{ next: s5, prob: 1.0, reward: 0.0 }]
      - id: wait
        outcomes: [{ next: s5, prob: 1.0, reward: 0.0 }]
  - id: bad
    features: [-1.0]
    terminal: true
"#;

fn chain_simulator() -> MdpSimulator {
    let compiled = parse_yaml(CHAIN_MDP_YAML)
        .expect("valid syntax")
        .compile()
        .expect("compile should succeed");
    MdpSimulator::new(compiled, 7)
}

#[test]
fn simulator_resets_to_the_start_features() {
    let mut simulator = chain_simulator();

    let (state, observation) = simulator.reset().expect("reset");

    assert_eq!(simulator.mdp().state_id(state), Some("s0"));
    assert_eq!(observation, vec![0.0]);
    assert_eq!(simulator.action_space(), ActionSpace::Discrete { n: 2 });
}

#[test]
fn repeat_applies_the_action_several_times() {
    let mut simulator = chain_simulator();
    let (start, _) = simulator.reset().expect("reset");

    let transition = simulator
        .step(&start, &Action::Discrete(1), 3)
        .expect("step");

    assert_eq!(simulator.mdp().state_id(transition.state), Some("s3"));
    assert_eq!(transition.observation, vec![3.0]);
    assert_eq!(transition.reward, 3.0);
    assert!(!transition.terminal);
}

#[test]
fn repeat_stops_at_a_terminal_state() {
    let mut simulator = chain_simulator();
    let (start, _) = simulator.reset().expect("reset");

    let transition = simulator
        .step(&start, &Action::Discrete(0), 4)
        .expect("step");

    assert_eq!(simulator.mdp().state_id(transition.state), Some("bad"));
    assert!(transition.terminal);
    assert_eq!(transition.reward, 0.0);
    simulator.render().expect("render");
}

#[test]
fn out_of_range_action_is_a_terminal_no_op() {
    let mut simulator = chain_simulator();
    let (start, _) = simulator.reset().expect("reset");

    let transition = simulator
        .step(&start, &Action::Discrete(7), 1)
        .expect("step");

    assert_eq!(transition.state, start);
    assert_eq!(transition.reward, 0.0);
    assert!(transition.terminal);
}

#[test]
fn simulator_rejects_continuous_actions_and_unknown_states() {
    let mut simulator = chain_simulator();
    let (start, _) = simulator.reset().expect("reset");

    let err = simulator
        .step(&start, &Action::Continuous(vec![0.5]), 1)
        .expect_err("continuous action should fail");
    assert!(matches!(err, MdpError::ContinuousAction { .. }));

    let err = simulator
        .step(&StateKey::from(99), &Action::Discrete(0), 1)
        .expect_err("unknown state should fail");
    assert!(matches!(err, MdpError::UnknownStateKey { key: 99 }));
}

#[test]
fn states_without_features_observe_their_index() {
    let compiled = parse_yaml(VALID_MDP_YAML)
        .expect("valid syntax")
        .compile()
        .expect("compile should succeed");
    let key = compiled.state_key("s2").expect("s2 exists");

    assert_eq!(compiled.observation(key), Some(vec![2.0]));
    assert_eq!(compiled.max_actions(), 2);
}

#[test]
fn validation_fails_for_inconsistent_features() {
    let missing = r#"
start: s0
states:
  - id: s0
    features: [0.0, 1.0]
    actions:
      - id: a0
        outcomes: [{ next: s1, prob: 1.0, reward: 0.0 }]
  - id: s1
    terminal: true
"#;
    let err = parse_yaml(missing)
        .expect("valid syntax")
        .compile()
        .expect_err("compile should fail");
    assert!(matches!(err, MdpError::MissingFeatures { ref state } if state == "s1"));

    let wrong_size = missing.replace("    terminal: true", "    features: [1.0]\n    terminal: true");
    let err = parse_yaml(&wrong_size)
        .expect("valid syntax")
        .compile()
        .expect_err("compile should fail");
    assert!(matches!(
        err,
        MdpError::FeatureDimension {
            expected: 2,
            actual: 1,
            ..
        }
    ));

    let not_finite = missing.replace("    terminal: true", "    features: [1.0, .nan]\n    terminal: true");
    let err = parse_yaml(&not_finite)
        .expect("valid syntax")
        .compile()
        .expect_err("compile should fail");
    assert!(matches!(err, MdpError::InvalidFeature { index: 1, .. }));
}

#[test]
fn builder_attaches_features() {
    let mut builder = MdpBuilder::new();
    builder.set_start("s0").add_state("s0", false).add_state("s1", true);
    builder
        .add_action("s0", "go")
        .expect("known state")
        .add_outcome("s0", "go", "s1", 1.0, 1.0)
        .expect("known action");
    builder
        .set_features("s0", vec![0.5])
        .expect("known state")
        .set_features("s1", vec![1.5])
        .expect("known state");

    let compiled = builder.compile().expect("compile should succeed");

    assert_eq!(compiled.observation(compiled.start()), Some(vec![0.5]));
    assert!(matches!(
        MdpBuilder::new().set_features("nowhere", vec![0.0]),
        Err(MdpError::BuilderUnknownState { .. })
    ));
}

#[test]
fn planner_walks_the_chain_to_the_reward_limit() {
    let simulator = chain_simulator();
    let model = RandomModel::new(simulator.action_space());
    let config = PlannerConfig {
        n_walkers: 32,
        reward_limit: Some(5.0),
        max_samples_step: Some(320),
        ..PlannerConfig::default()
    };
    let mut planner = FractalMc::new(simulator, model, config).expect("planner");

    let report = planner.run_agent(false).expect("episode");

    assert_eq!(report.steps, 5);
    assert_eq!(report.total_reward, 5.0);
    assert!(!report.terminal);

    let states: Vec<&str> = planner
        .recover_game(Some(report.last_node))
        .expect("branch")
        .iter()
        .map(|step| planner.env().mdp().state_id(step.state).unwrap_or("?"))
        .collect();
    assert_eq!(states, vec!["s0", "s1", "s2", "s3", "s4", "s5"]);
}

#[test]
fn saved_yaml_compiles_back_with_features() {
    let spec = parse_yaml(CHAIN_MDP_YAML).expect("valid syntax");
    let path = std::env::temp_dir().join(format!("fractalmc-chain-{}.mdp.yaml", std::process::id()));

    save_yaml(&path, &spec).expect("save should succeed");
    let compiled = compile_yaml(&path).expect("saved file should compile");
    std::fs::remove_file(&path).expect("cleanup");

    let bad = compiled.state_key("bad").expect("bad exists");
    assert_eq!(compiled.state_count(), 7);
    assert_eq!(compiled.observation(bad), Some(vec![-1.0]));
    assert_eq!(compiled.is_terminal(bad), Some(true));
}

#[test]
fn invalid_specs_are_not_saved() {
    let mut spec = parse_yaml(CHAIN_MDP_YAML).expect("valid syntax");
    spec.start = "nowhere".to_string();
    let path = std::env::temp_dir().join(format!("fractalmc-invalid-{}.mdp.yaml", std::process::id()));

    let err = save_yaml(&path, &spec).expect_err("save should fail");

    assert!(matches!(err, MdpError::UnknownStartState { .. }));
    assert!(!path.exists());
}
