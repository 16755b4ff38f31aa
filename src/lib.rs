//! Keyfill library
//!
//! Configuration, the CLI and the in-process simulator, exposed for integration testing.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fixtures;
pub mod simulate;

pub use config::AppConfig;
pub use errors::ConfigError;
pub use simulate::{run_simulation, PromptChoice, Scenario, SimulationReport};
