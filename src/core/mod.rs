pub mod etl;
pub mod layout;
pub mod pipeline;

pub use crate::domain::model::{
    AssessmentRecord, BlockKind, BlockPlacement, LayoutConfig, Scene, SceneFile, StackCenter,
    StackLabel,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
