use std::fmt::{self, Debug};

use tracing::trace;

use crate::action_selection::{EpsilonGreedy, Mode};
use crate::config::AgentConfig;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::q_table::QTable;

fn missing_row<S: Debug>(state: &S) -> Error {
    Error::MissingRow(format!("{:?}", state))
}

/// Tabular Q-learning robot.
///
/// The robot owns its table and its random source. The environment is only
/// borrowed for the duration of each call.
pub struct Agent<E: Environment> {
    q_table: QTable<E::State, E::Action>,
    state: E::State,
    action: Option<E::Action>,
    alpha: f64,
    gamma: f64,
    action_selection: EpsilonGreedy,
    mode: Mode,
}

impl<E: Environment> Debug for Agent<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("states", &self.q_table.len())
            .field("state", &self.state)
            .field("action", &self.action)
            .field("alpha", &self.alpha)
            .field("gamma", &self.gamma)
            .field("action_selection", &self.action_selection)
            .field("mode", &self.mode)
            .finish()
    }
}

impl<E: Environment> Agent<E> {
    /// Reads the valid actions once and syncs with the current state of
    /// `env`. The robot starts in [`Mode::Neutral`].
    pub fn new(env: &E, config: AgentConfig) -> Result<Self> {
        config.validate()?;
        let q_table: QTable<E::State, E::Action> = QTable::new(env.valid_actions())?;
        let mut agent: Agent<E> = Self {
            q_table,
            state: env.sense_state(),
            action: None,
            alpha: config.alpha,
            gamma: config.gamma,
            action_selection: EpsilonGreedy::new(
                config.epsilon0,
                config.epsilon_decay(),
                config.seed,
            ),
            mode: Mode::Neutral,
        };
        agent.reset(env);
        Ok(agent)
    }

    /// Re-senses the current state and makes sure it has a row. The table,
    /// ε and the step counter are left alone.
    pub fn reset(&mut self, env: &E) {
        self.state = self.sense_state(env);
        self.q_table.ensure_row(&self.state);
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn set_status(&mut self, learning: bool, testing: bool) {
        self.set_mode(Mode::from_flags(learning, testing));
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn sense_state(&self, env: &E) -> E::State {
        env.sense_state()
    }

    pub fn get_max_action(&self, state: &E::State) -> Result<E::Action> {
        self.q_table
            .get_max_action(state)
            .ok_or_else(|| missing_row(state))
    }

    /// Action for the current state under the current mode.
    pub fn choose_action(&mut self) -> Result<E::Action> {
        let row = self
            .q_table
            .row_of(&self.state)
            .ok_or_else(|| missing_row(&self.state))?;
        self.action_selection
            .get_action(self.mode, self.q_table.actions(), row)
            .ok_or(Error::EmptyActionSet)
    }

    /// Advances the exploration schedule one step and returns ε.
    pub fn update_parameter(&mut self) -> f64 {
        self.action_selection.update(self.mode)
    }

    /// One-step Q-learning update of `Q[state][action]`, bootstrapping from
    /// the best value of `next_state`. Does nothing outside learning mode.
    pub fn update_q_table(
        &mut self,
        reward: f64,
        action: E::Action,
        next_state: &E::State,
    ) -> Result<()> {
        if !self.mode.learns() {
            return Ok(());
        }
        let future_q_value: f64 = self
            .q_table
            .max_value(next_state)
            .ok_or_else(|| missing_row(next_state))?;
        let (alpha, gamma) = (self.alpha, self.gamma);
        let value: &mut f64 = self
            .q_table
            .row_of_mut(&self.state)
            .and_then(|row| row.get_mut(&action))
            .ok_or_else(|| missing_row(&self.state))?;
        *value = (1.0 - alpha) * *value + alpha * (reward + gamma * future_q_value);
        Ok(())
    }

    /// One full step: sense, act, observe and, when learning, learn.
    pub fn update(&mut self, env: &mut E) -> Result<(E::Action, f64)> {
        self.reset(env);

        let action: E::Action = self.choose_action()?;
        self.action = Some(action);
        let reward: f64 = env.move_robot(action);

        let next_state: E::State = self.sense_state(env);
        self.q_table.ensure_row(&next_state);

        if self.mode.learns() {
            self.update_q_table(reward, action, &next_state)?;
            self.update_parameter();
        }
        trace!(
            "{:?} -> {:?} -> {:?} reward={} epsilon={}",
            self.state,
            action,
            next_state,
            reward,
            self.epsilon()
        );
        Ok((action, reward))
    }

    pub fn q_table(&self) -> &QTable<E::State, E::Action> {
        &self.q_table
    }

    pub fn valid_actions(&self) -> &[E::Action] {
        self.q_table.actions()
    }

    pub fn state(&self) -> &E::State {
        &self.state
    }

    /// Action taken by the latest [`Agent::update`].
    pub fn action(&self) -> Option<E::Action> {
        self.action
    }

    pub fn epsilon(&self) -> f64 {
        self.action_selection.epsilon()
    }

    pub fn step_count(&self) -> u64 {
        self.action_selection.steps()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Restores ε0 and the step counter. Table values are kept.
    pub fn reset_exploration(&mut self) {
        self.action_selection.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two cells; any move from cell 0 lands on cell 1 and vice versa.
    struct Flip {
        cell: u8,
    }

    impl Environment for Flip {
        type State = u8;
        type Action = char;

        fn valid_actions(&self) -> Vec<char> {
            vec!['a', 'b']
        }

        fn sense_state(&self) -> u8 {
            self.cell
        }

        fn move_robot(&mut self, _action: char) -> f64 {
            self.cell = 1 - self.cell;
            1.0
        }
    }

    fn agent(env: &Flip) -> Agent<Flip> {
        let config = AgentConfig {
            alpha: 0.5,
            gamma: 0.9,
            seed: Some(7),
            ..Default::default()
        };
        Agent::new(env, config).unwrap()
    }

    #[test]
    fn construction_creates_the_initial_row_only() {
        let env = Flip { cell: 0 };
        let agent = agent(&env);
        assert_eq!(agent.q_table().len(), 1);
        assert!(agent.q_table().contains(&0));
        assert_eq!(agent.mode(), Mode::Neutral);
        assert_eq!(agent.action(), None);
    }

    #[test]
    fn invalid_config_fails_construction() {
        let env = Flip { cell: 0 };
        let config = AgentConfig {
            alpha: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            Agent::new(&env, config),
            Err(Error::InvalidHyperparameter { name: "alpha", .. })
        ));
    }

    #[test]
    fn td_update_matches_hand_computation() {
        let env = Flip { cell: 0 };
        let mut agent = agent(&env);
        agent.q_table.ensure_row(&1);
        agent.q_table.row_of_mut(&0).unwrap()[&'a'] = 2.0;
        agent.q_table.row_of_mut(&1).unwrap()[&'b'] = 4.0;

        agent.set_mode(Mode::Learning);
        agent.update_q_table(1.0, 'a', &1).unwrap();
        let value = agent.q_table().value(&0, &'a').unwrap();
        assert!((value - 3.3).abs() < 1e-12, "{}", value);
    }

    #[test]
    fn td_update_is_a_no_op_outside_learning() {
        let env = Flip { cell: 0 };
        let mut agent = agent(&env);
        agent.q_table.ensure_row(&1);
        for mode in [Mode::Neutral, Mode::Testing] {
            agent.set_mode(mode);
            agent.update_q_table(5.0, 'a', &1).unwrap();
            assert_eq!(agent.q_table().value(&0, &'a'), Some(0.0));
        }
    }

    #[test]
    fn td_update_reports_missing_next_row() {
        let env = Flip { cell: 0 };
        let mut agent = agent(&env);
        agent.set_mode(Mode::Learning);
        assert!(matches!(
            agent.update_q_table(1.0, 'a', &9),
            Err(Error::MissingRow(_))
        ));
        assert!(matches!(agent.get_max_action(&9), Err(Error::MissingRow(_))));
    }

    #[test]
    fn update_ensures_rows_for_both_states() {
        let mut env = Flip { cell: 0 };
        let mut agent = agent(&env);
        agent.update(&mut env).unwrap();
        assert!(agent.q_table().contains(&0));
        assert!(agent.q_table().contains(&1));
        assert_eq!(*agent.state(), 0);
        assert!(agent.action().is_some());
    }

    /// One cell that no move ever leaves.
    struct Still;

    impl Environment for Still {
        type State = u8;
        type Action = char;

        fn valid_actions(&self) -> Vec<char> {
            vec!['u', 'r', 'd', 'l']
        }

        fn sense_state(&self) -> u8 {
            0
        }

        fn move_robot(&mut self, _action: char) -> f64 {
            0.0
        }
    }

    #[test]
    fn learning_choices_leave_the_greedy_action_at_the_expected_rate() {
        let config = AgentConfig {
            epsilon0: 0.3,
            seed: Some(11),
            ..Default::default()
        };
        let mut agent = Agent::new(&Still, config).unwrap();
        agent.q_table.row_of_mut(&0).unwrap()[&'d'] = 1.0;
        agent.set_mode(Mode::Learning);

        let trials = 10_000;
        let off_greedy = (0..trials)
            .filter(|_| agent.choose_action().unwrap() != 'd')
            .count();
        // exploration picks one of the other three actions 3 times in 4
        let rate = off_greedy as f64 / trials as f64;
        assert!((rate - 0.225).abs() < 0.02, "off-greedy rate {}", rate);
        assert_eq!(agent.step_count(), 0);
    }

    #[test]
    fn testing_before_any_training_is_greedy_and_keeps_the_counter() {
        let config = AgentConfig {
            epsilon0: 1.0,
            seed: Some(5),
            ..Default::default()
        };
        let mut env = Still;
        let mut agent = Agent::new(&env, config).unwrap();
        agent.set_mode(Mode::Testing);
        for _ in 0..100 {
            assert_eq!(agent.update(&mut env).unwrap().0, 'u');
        }
        assert_eq!(agent.step_count(), 0);
        assert_eq!(agent.epsilon(), 1.0);
    }

    #[test]
    fn set_status_uses_flag_precedence() {
        let env = Flip { cell: 0 };
        let mut agent = agent(&env);
        agent.set_status(true, true);
        assert_eq!(agent.mode(), Mode::Testing);
        agent.set_status(true, false);
        assert_eq!(agent.mode(), Mode::Learning);
        agent.set_status(false, false);
        assert_eq!(agent.mode(), Mode::Neutral);
    }
}
