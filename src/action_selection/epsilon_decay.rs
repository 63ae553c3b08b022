use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use thiserror::Error;

#[enum_dispatch]
pub trait EpsilonDecay {
    fn decay(&self, epsilon: f64) -> f64;
}

/// `ε ← ε · factor`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialDecay {
    pub factor: f64,
}

impl ExponentialDecay {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl EpsilonDecay for ExponentialDecay {
    fn decay(&self, epsilon: f64) -> f64 {
        epsilon * self.factor
    }
}

/// `ε ← ε − step`. There is no floor: ε keeps falling below zero, at which
/// point exploration simply never triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDecay {
    pub step: f64,
}

impl LinearDecay {
    pub fn new(step: f64) -> Self {
        Self { step }
    }
}

impl EpsilonDecay for LinearDecay {
    fn decay(&self, epsilon: f64) -> f64 {
        epsilon - self.step
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[enum_dispatch(EpsilonDecay)]
pub enum EnumEpsilonDecay {
    ExponentialDecay(ExponentialDecay),
    LinearDecay(LinearDecay),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecayMode {
    #[default]
    Exponential,
    Linear,
}

impl DecayMode {
    /// Builds the schedule for this mode; `atten` is the factor for
    /// exponential decay and the step for linear decay.
    pub fn schedule(&self, atten: f64) -> EnumEpsilonDecay {
        match self {
            DecayMode::Exponential => ExponentialDecay::new(atten).into(),
            DecayMode::Linear => LinearDecay::new(atten).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown decay mode {0:?}, expected exp or linear")]
pub struct ParseDecayModeError(String);

impl FromStr for DecayMode {
    type Err = ParseDecayModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exp" | "exponential" => Ok(DecayMode::Exponential),
            "linear" => Ok(DecayMode::Linear),
            other => Err(ParseDecayModeError(other.to_string())),
        }
    }
}

impl fmt::Display for DecayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecayMode::Exponential => f.write_str("exp"),
            DecayMode::Linear => f.write_str("linear"),
        }
    }
}
