mod direction;
mod grid_maze;

use std::fmt::Debug;
use std::hash::Hash;

pub use direction::{Direction, ParseDirectionError};
pub use grid_maze::{GridMaze, MazeError, Position};

/// The world a robot lives in, seen only through sensing and moving.
pub trait Environment {
    type State: Hash + Eq + Clone + Debug;
    type Action: Hash + Eq + Copy + Debug;

    /// Every action the robot may take. The returned order is the order used
    /// to break ties between equally valued actions.
    fn valid_actions(&self) -> Vec<Self::Action>;

    fn sense_state(&self) -> Self::State;

    /// Executes `action` and reports the reward. A move that cannot be
    /// carried out still yields a reward (usually a penalty).
    fn move_robot(&mut self, action: Self::Action) -> f64;

    /// Puts the robot back at its starting point. Only the runner calls it.
    fn restart(&mut self) {}

    fn is_terminal(&self) -> bool {
        false
    }
}
