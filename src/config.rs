use crate::action_selection::{DecayMode, EnumEpsilonDecay};
use crate::error::{Error, Result};

/// Hyperparameters of a learning robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    /// Learning rate, in `(0, 1]`.
    pub alpha: f64,
    /// Discount factor, in `[0, 1]`.
    pub gamma: f64,
    pub epsilon0: f64,
    /// Decay factor (exponential) or decay step (linear).
    pub epsilon_atten: f64,
    pub decay_mode: DecayMode,
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.9,
            epsilon0: 0.5,
            epsilon_atten: 0.99,
            decay_mode: DecayMode::Exponential,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(Error::InvalidHyperparameter {
                name: "alpha",
                value: self.alpha,
            });
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(Error::InvalidHyperparameter {
                name: "gamma",
                value: self.gamma,
            });
        }
        if !self.epsilon0.is_finite() {
            return Err(Error::InvalidHyperparameter {
                name: "epsilon0",
                value: self.epsilon0,
            });
        }
        if !self.epsilon_atten.is_finite() {
            return Err(Error::InvalidHyperparameter {
                name: "epsilon_atten",
                value: self.epsilon_atten,
            });
        }
        Ok(())
    }

    pub fn epsilon_decay(&self) -> EnumEpsilonDecay {
        self.decay_mode.schedule(self.epsilon_atten)
    }
}
