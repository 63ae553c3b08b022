pub mod action_selection;
pub mod config;
pub mod env;
pub mod error;
pub mod q_table;
pub mod runner;
pub mod utils;

mod agent;

pub use action_selection::Mode;
pub use agent::Agent;
pub use config::AgentConfig;
pub use error::{Error, Result};
pub use q_table::QTable;
pub use runner::{EpochReport, RunConfig, Runner};
