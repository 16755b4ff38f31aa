pub mod app;
pub mod commands;
pub mod context;
pub mod detect;
pub mod dispatch;
pub mod env;
pub mod generate;
pub mod matching;
pub mod output;
pub mod runtime;
pub mod simulate;

pub use detect::{cmd_detect, DetectArgs};
pub use generate::{cmd_generate, GenerateArgs};
pub use matching::{cmd_match, MatchArgs};
pub use simulate::{cmd_simulate, SimulateArgs};
