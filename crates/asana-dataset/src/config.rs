use crate::{BuilderConfig, DatasetError};
use asana_pose::PoseConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything a dataset run needs besides its input and output paths.
///
/// ```json
/// {
///   "model": "models/movenet_thunder.onnx",
///   "input_size": 256,
///   "pose": { "tracker": { "torso_expansion_ratio": 1.9 } },
///   "builder": { "detection_threshold": 0.1 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub model: Option<PathBuf>,
    /// Square detector input side in pixels.
    pub input_size: usize,
    pub pose: PoseConfig,
    pub builder: BuilderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: None,
            input_size: 192,
            pose: PoseConfig::default(),
            builder: BuilderConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DatasetError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.input_size == 0 {
            return Err(DatasetError::Config("input_size must be positive".into()));
        }
        self.pose.tracker.validate()?;
        self.pose.normalizer.validate()?;
        self.builder.validate()
    }
}
