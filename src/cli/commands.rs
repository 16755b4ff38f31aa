use clap::Subcommand;

use super::detect::DetectArgs;
use super::generate::GenerateArgs;
use super::matching::MatchArgs;
use super::simulate::SimulateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Generate passwords with the configured policy
    Generate(GenerateArgs),

    /// List stored credentials matching a page URL
    Match(MatchArgs),

    /// Detect login forms in a page fixture
    Detect(DetectArgs),

    /// Run the page and vault agents against fixture files
    Simulate(SimulateArgs),
}
