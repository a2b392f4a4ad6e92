use chrono::{DateTime, Utc};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One student-assessment record as returned by the assessment API.
///
/// Field names arrive in PascalCase from some deployments and all-lowercase
/// from others; the aliases accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssessmentRecord {
    #[serde(alias = "id")]
    pub id: i64,
    #[serde(alias = "subject")]
    pub subject: String,
    #[serde(alias = "grade")]
    pub grade: String,
    #[serde(alias = "mastery")]
    pub mastery: i64,
    #[serde(alias = "domainid")]
    pub domain_id: String,
    #[serde(alias = "domain")]
    pub domain: String,
    #[serde(alias = "cluster")]
    pub cluster: String,
    #[serde(alias = "standardid")]
    pub standard_id: String,
    #[serde(alias = "standarddescription")]
    pub standard_description: String,
}

impl AssessmentRecord {
    /// Two records describe the same standard when every field except
    /// id and mastery matches. Such records collapse into a single block.
    pub fn same_standard(&self, other: &Self) -> bool {
        self.subject == other.subject
            && self.grade == other.grade
            && self.domain_id == other.domain_id
            && self.domain == other.domain
            && self.cluster == other.cluster
            && self.standard_id == other.standard_id
            && self.standard_description == other.standard_description
    }
}

/// Visual block category derived from the mastery code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Glass,
    Wood,
    Stone,
}

impl BlockKind {
    /// Mastery codes outside 0..=2 have no block representation.
    pub fn from_mastery(mastery: i64) -> Option<Self> {
        match mastery {
            0 => Some(BlockKind::Glass),
            1 => Some(BlockKind::Wood),
            2 => Some(BlockKind::Stone),
            _ => None,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Glass => "glass",
            BlockKind::Wood => "wood",
            BlockKind::Stone => "stone",
        };
        write!(f, "{}", name)
    }
}

/// One block to instantiate: transform plus the record it visualizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockPlacement {
    pub position: Vec3,
    pub rotation: Quat,
    pub kind: BlockKind,
    pub record: AssessmentRecord,
}

/// Floating grade label placed above and behind the first block of a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackLabel {
    pub position: Vec3,
    pub text: String,
}

/// Camera focal point for one completed stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackCenter {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Everything the layout pass produces, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub placements: Vec<BlockPlacement>,
    pub labels: Vec<StackLabel>,
    pub centers: Vec<StackCenter>,
}

/// On-disk form of a scene, with provenance for the consuming renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    #[serde(flatten)]
    pub scene: Scene,
}

/// Caller-supplied layout constants. Defaults: 1.1-unit blocks, first
/// stack at (0, 0.55, 0) with a 90° yaw, 15 units between stacks,
/// 3 blocks per row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub block_height: f32,
    pub block_width: f32,
    pub first_stack_pos: Vec3,
    pub first_stack_rot: Quat,
    pub distance_between_stacks: f32,
    pub blocks_per_row: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            block_height: 1.1,
            block_width: 1.1,
            first_stack_pos: Vec3::new(0.0, 0.55, 0.0),
            first_stack_rot: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            distance_between_stacks: 15.0,
            blocks_per_row: 3,
        }
    }
}
