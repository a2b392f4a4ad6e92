pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use core::{etl::EtlEngine, layout::layout, pipeline::StackPipeline};
pub use domain::model::{
    AssessmentRecord, BlockKind, BlockPlacement, LayoutConfig, Scene, SceneFile, StackCenter,
    StackLabel,
};
pub use utils::error::{Result, StackError};
