use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{EnumEpsilonDecay, EpsilonDecay, Mode};
use crate::q_table::{max_entry, Row};

/// Epsilon-greedy action selection with its own exploration schedule.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    initial_epsilon: f64,
    epsilon: f64,
    epsilon_decay: EnumEpsilonDecay,
    steps: u64,
    rng: StdRng,
}

impl EpsilonGreedy {
    /// Without a seed the generator is drawn from OS entropy.
    pub fn new(epsilon: f64, epsilon_decay: EnumEpsilonDecay, seed: Option<u64>) -> Self {
        Self {
            initial_epsilon: epsilon,
            epsilon,
            epsilon_decay,
            steps: 0,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn should_explore(&mut self) -> bool {
        self.rng.gen::<f64>() < self.epsilon
    }

    fn random_action<A: Copy>(&mut self, actions: &[A]) -> Option<A> {
        if actions.is_empty() {
            return None;
        }
        Some(actions[self.rng.gen_range(0..actions.len())])
    }

    /// Picks an action for a state whose values are `row`. `actions` is the
    /// full valid-action set the random branches draw from.
    pub fn get_action<A: Copy>(&mut self, mode: Mode, actions: &[A], row: &Row<A>) -> Option<A> {
        match mode {
            Mode::Testing => max_entry(row).map(|(action, _)| action),
            Mode::Learning => {
                if self.should_explore() {
                    self.random_action(actions)
                } else {
                    max_entry(row).map(|(action, _)| action)
                }
            }
            Mode::Neutral => self.random_action(actions),
        }
    }

    /// Advances the schedule by one step and returns the new ε. Testing
    /// pins ε to zero.
    pub fn update(&mut self, mode: Mode) -> f64 {
        self.epsilon = match mode {
            Mode::Testing => 0.0,
            _ => self.epsilon_decay.decay(self.epsilon),
        };
        self.steps += 1;
        self.epsilon
    }

    pub fn reset(&mut self) {
        self.epsilon = self.initial_epsilon;
        self.steps = 0;
    }
}
