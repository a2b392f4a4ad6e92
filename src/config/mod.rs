pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::LayoutConfig;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "jenga-stacks")]
#[command(about = "Builds Jenga stack scene data from student assessment records")]
pub struct CliConfig {
    /// Assessment API endpoint returning a JSON array of records
    #[arg(
        long,
        default_value = "https://ga1vqcu3o1.execute-api.us-east-1.amazonaws.com/Assessment/stack"
    )]
    pub api_endpoint: String,

    /// Directory receiving scene.json and placements.csv
    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "1.1")]
    pub block_height: f32,

    #[arg(long, default_value = "1.1")]
    pub block_width: f32,

    #[arg(long, default_value = "15")]
    pub distance_between_stacks: f32,

    #[arg(long, default_value = "3")]
    pub blocks_per_row: usize,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory stats per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn layout(&self) -> LayoutConfig {
        let defaults = LayoutConfig::default();
        LayoutConfig {
            block_height: self.block_height,
            block_width: self.block_width,
            first_stack_pos: defaults.first_stack_pos,
            first_stack_rot: defaults.first_stack_rot,
            distance_between_stacks: self.distance_between_stacks,
            blocks_per_row: self.blocks_per_row,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_dimension("block_height", self.block_height)?;
        validation::validate_positive_dimension("block_width", self.block_width)?;
        validation::validate_positive_dimension(
            "distance_between_stacks",
            self.distance_between_stacks,
        )?;
        validation::validate_positive_number("blocks_per_row", self.blocks_per_row, 1)?;
        Ok(())
    }
}
