mod epsilon_decay;
mod epsilon_greedy;

pub use epsilon_decay::{
    DecayMode, EnumEpsilonDecay, EpsilonDecay, ExponentialDecay, LinearDecay, ParseDecayModeError,
};
pub use epsilon_greedy::EpsilonGreedy;

/// What the robot is doing with its table.
///
/// `Neutral` walks at random and learns nothing, `Learning` explores and
/// updates values, `Testing` follows the greedy policy without learning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Neutral,
    Learning,
    Testing,
}

impl Mode {
    /// Maps the two-flag form onto a mode. `testing` takes precedence, so
    /// both flags set means testing.
    pub fn from_flags(learning: bool, testing: bool) -> Self {
        if testing {
            Mode::Testing
        } else if learning {
            Mode::Learning
        } else {
            Mode::Neutral
        }
    }

    pub fn learns(&self) -> bool {
        matches!(self, Mode::Learning)
    }
}
