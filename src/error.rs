use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("the environment reported no valid actions")]
    EmptyActionSet,

    #[error("invalid hyperparameter {name}: {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    /// A table read or write touched a state that never went through `ensure_row`.
    #[error("no q-table row for state {0}")]
    MissingRow(String),

    #[error("progress bar failure: {0}")]
    Progress(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
