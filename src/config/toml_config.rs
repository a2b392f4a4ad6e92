use crate::domain::model::LayoutConfig;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, StackError};
use crate::utils::validation::{self, Validate};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File-based configuration for unattended runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub layout: LayoutTable,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: String,
}

/// All layout fields are optional; missing ones fall back to the
/// `LayoutConfig` defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutTable {
    pub block_height: Option<f32>,
    pub block_width: Option<f32>,
    pub first_stack: Option<[f32; 3]>,
    pub distance_between_stacks: Option<f32>,
    pub blocks_per_row: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StackError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| StackError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `${VAR}` placeholders resolve against the process environment.
    /// Unknown variables stay as written so a later parse or validation
    /// error points at them.
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn layout(&self) -> LayoutConfig {
        let defaults = LayoutConfig::default();
        LayoutConfig {
            block_height: self.layout.block_height.unwrap_or(defaults.block_height),
            block_width: self.layout.block_width.unwrap_or(defaults.block_width),
            first_stack_pos: self
                .layout
                .first_stack
                .map(Vec3::from_array)
                .unwrap_or(defaults.first_stack_pos),
            first_stack_rot: defaults.first_stack_rot,
            distance_between_stacks: self
                .layout
                .distance_between_stacks
                .unwrap_or(defaults.distance_between_stacks),
            blocks_per_row: self.layout.blocks_per_row.unwrap_or(defaults.blocks_per_row),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.endpoint", &self.source.endpoint)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;

        let layout = self.layout();
        validation::validate_positive_dimension("layout.block_height", layout.block_height)?;
        validation::validate_positive_dimension("layout.block_width", layout.block_width)?;
        validation::validate_positive_dimension(
            "layout.distance_between_stacks",
            layout.distance_between_stacks,
        )?;
        validation::validate_positive_number("layout.blocks_per_row", layout.blocks_per_row, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[pipeline]
name = "assessment-stacks"
description = "Nightly scene build"

[source]
endpoint = "https://example.com/Assessment/stack"

[layout]
blocks_per_row = 4
distance_between_stacks = 20.0
first_stack = [0.0, 0.55, 0.0]

[load]
output_path = "./scenes"

[monitoring]
enabled = true
log_format = "json"
"#;

    #[test]
    fn test_parse_sample_config() {
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.pipeline.name, "assessment-stacks");
        assert_eq!(config.api_endpoint(), "https://example.com/Assessment/stack");
        assert_eq!(config.output_path(), "./scenes");
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
        assert!(config.validate().is_ok());

        let layout = config.layout();
        assert_eq!(layout.blocks_per_row, 4);
        assert_eq!(layout.distance_between_stacks, 20.0);
        // Unspecified fields keep their defaults.
        assert_eq!(layout.block_height, LayoutConfig::default().block_height);
    }

    #[test]
    fn test_missing_layout_table_uses_defaults() {
        let minimal = r#"
[pipeline]
name = "minimal"

[source]
endpoint = "https://example.com/stack"

[load]
output_path = "./out"
"#;
        let config = TomlConfig::from_toml_str(minimal).unwrap();
        assert_eq!(config.layout(), LayoutConfig::default());
        assert!(!config.monitoring_enabled());
        assert!(!config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("JENGA_STACKS_TEST_ENDPOINT", "https://env.example.com/stack");
        let with_var = r#"
[pipeline]
name = "env"

[source]
endpoint = "${JENGA_STACKS_TEST_ENDPOINT}"

[load]
output_path = "./out"
"#;
        let config = TomlConfig::from_toml_str(with_var).unwrap();
        assert_eq!(config.api_endpoint(), "https://env.example.com/stack");
    }

    #[test]
    fn test_unknown_env_var_is_left_in_place() {
        let with_var = r#"
[pipeline]
name = "env"

[source]
endpoint = "${JENGA_STACKS_TEST_UNSET_VAR}"

[load]
output_path = "./out"
"#;
        let config = TomlConfig::from_toml_str(with_var).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = TomlConfig::from_toml_str("not toml at all [");
        assert!(matches!(result, Err(StackError::ConfigError { .. })));
    }
}
