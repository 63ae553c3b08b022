use qlearning_robot::action_selection::{DecayMode, Mode};
use qlearning_robot::env::{Direction, Environment, GridMaze};
use qlearning_robot::{Agent, AgentConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Move {
    Forward,
    Back,
}

/// One state, two moves with fixed rewards.
struct Stub {
    forward: f64,
    back: f64,
}

impl Stub {
    fn new() -> Self {
        Self {
            forward: 1.0,
            back: -1.0,
        }
    }
}

impl Environment for Stub {
    type State = &'static str;
    type Action = Move;

    fn valid_actions(&self) -> Vec<Move> {
        vec![Move::Forward, Move::Back]
    }

    fn sense_state(&self) -> &'static str {
        "S"
    }

    fn move_robot(&mut self, action: Move) -> f64 {
        match action {
            Move::Forward => self.forward,
            Move::Back => self.back,
        }
    }
}

fn config(epsilon0: f64) -> AgentConfig {
    AgentConfig {
        alpha: 0.5,
        gamma: 0.9,
        epsilon0,
        epsilon_atten: 0.9,
        decay_mode: DecayMode::Exponential,
        seed: Some(2024),
    }
}

fn values(agent: &Agent<Stub>) -> (f64, f64) {
    let table = agent.q_table();
    (
        table.value(&"S", &Move::Forward).unwrap(),
        table.value(&"S", &Move::Back).unwrap(),
    )
}

#[test]
fn greedy_learner_settles_on_forward() {
    let mut env = Stub::new();
    let mut agent = Agent::new(&env, config(0.0)).unwrap();
    agent.set_status(true, false);

    let (action, reward) = agent.update(&mut env).unwrap();
    assert_eq!((action, reward), (Move::Forward, 1.0));
    let (forward, back) = values(&agent);
    assert!(forward > back, "forward={} back={}", forward, back);

    for _ in 0..4 {
        let (action, _) = agent.update(&mut env).unwrap();
        assert_eq!(action, Move::Forward);
    }
    assert_eq!(agent.q_table().len(), 1);
}

#[test]
fn exponential_decay_over_three_learning_steps() {
    let mut env = Stub::new();
    let mut agent = Agent::new(&env, config(0.5)).unwrap();
    agent.set_mode(Mode::Learning);
    for _ in 0..3 {
        agent.update(&mut env).unwrap();
    }
    assert!((agent.epsilon() - 0.3645).abs() < 1e-9, "{}", agent.epsilon());
    assert_eq!(agent.step_count(), 3);
}

#[test]
fn linear_decay_runs_below_zero() {
    let mut env = Stub::new();
    let config = AgentConfig {
        epsilon0: 0.02,
        epsilon_atten: 0.01,
        decay_mode: DecayMode::Linear,
        ..config(0.0)
    };
    let mut agent = Agent::new(&env, config).unwrap();
    agent.set_mode(Mode::Learning);
    for _ in 0..5 {
        agent.update(&mut env).unwrap();
    }
    assert!((agent.epsilon() - -0.03).abs() < 1e-9, "{}", agent.epsilon());
    assert_eq!(agent.step_count(), 5);
    for _ in 0..50 {
        assert_eq!(agent.update(&mut env).unwrap().0, Move::Forward);
    }
}

#[test]
fn nothing_is_learned_without_learning_mode() {
    let mut env = Stub::new();
    let mut agent = Agent::new(&env, config(0.5)).unwrap();
    for (learning, testing) in [(false, false), (false, true), (true, true)] {
        agent.set_status(learning, testing);
        for _ in 0..20 {
            agent.update(&mut env).unwrap();
        }
        assert_eq!(values(&agent), (0.0, 0.0));
        assert_eq!(agent.epsilon(), 0.5);
        assert_eq!(agent.step_count(), 0);
    }
}

#[test]
fn testing_is_greedy_and_repeatable_whatever_epsilon() {
    let mut env = Stub {
        forward: -1.0,
        back: 2.0,
    };
    let mut agent = Agent::new(&env, config(1.0)).unwrap();
    agent.set_mode(Mode::Learning);
    for _ in 0..50 {
        agent.update(&mut env).unwrap();
    }
    let (forward, back) = values(&agent);
    assert!(back > forward);
    assert!(agent.epsilon() > 0.0);

    agent.set_mode(Mode::Testing);
    let best = agent.get_max_action(&"S").unwrap();
    assert_eq!(best, Move::Back);
    for _ in 0..100 {
        assert_eq!(agent.choose_action().unwrap(), best);
    }
}

#[test]
fn reset_keeps_what_was_learned() {
    let mut env = Stub::new();
    let mut agent = Agent::new(&env, config(0.5)).unwrap();
    agent.set_mode(Mode::Learning);
    for _ in 0..10 {
        agent.update(&mut env).unwrap();
    }
    let before = values(&agent);
    let epsilon = agent.epsilon();

    agent.reset(&env);
    assert_eq!(values(&agent), before);
    assert_eq!(agent.epsilon(), epsilon);
    assert_eq!(agent.step_count(), 10);
    assert_eq!(agent.mode(), Mode::Learning);
}

#[test]
fn every_visited_state_gets_a_full_zeroed_row() {
    let mut env = GridMaze::new(&GridMaze::MAP_MEDIUM).unwrap();
    let mut agent = Agent::new(&env, config(0.0)).unwrap();
    agent.set_mode(Mode::Neutral);
    for _ in 0..500 {
        agent.update(&mut env).unwrap();
    }
    assert!(agent.q_table().len() > 1);
    for (_state, row) in agent.q_table().iter() {
        assert_eq!(row.keys().copied().collect::<Vec<_>>(), Direction::ALL.to_vec());
        assert!(row.values().all(|v| *v == 0.0));
    }
}
