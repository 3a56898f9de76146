use crate::PoseError;
use crate::normalizer::{MIN_POSE_SIZE, TORSO_MULTIPLIER};
use crate::tracker::{BODY_EXPANSION_RATIO, MIN_CROP_KEYPOINT_SCORE, TORSO_EXPANSION_RATIO};
use serde::{Deserialize, Serialize};

/// Crop tracker tuning. Defaults reproduce the reference MoveNet cropping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Confidence floor for torso visibility (exclusive) and body extent (inclusive).
    pub min_crop_keypoint_score: f32,
    pub torso_expansion_ratio: f32,
    pub body_expansion_ratio: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            min_crop_keypoint_score: MIN_CROP_KEYPOINT_SCORE,
            torso_expansion_ratio: TORSO_EXPANSION_RATIO,
            body_expansion_ratio: BODY_EXPANSION_RATIO,
        }
    }
}

impl TrackerConfig {
    pub fn with_min_crop_keypoint_score(mut self, score: f32) -> Self {
        self.min_crop_keypoint_score = score;
        self
    }

    pub fn with_expansion_ratios(mut self, torso: f32, body: f32) -> Self {
        self.torso_expansion_ratio = torso;
        self.body_expansion_ratio = body;
        self
    }

    pub fn validate(&self) -> Result<(), PoseError> {
        if !(0.0..=1.0).contains(&self.min_crop_keypoint_score) {
            return Err(PoseError::Config(format!(
                "min_crop_keypoint_score must be in [0, 1], got {}",
                self.min_crop_keypoint_score
            )));
        }
        if !(self.torso_expansion_ratio > 0.0 && self.body_expansion_ratio > 0.0) {
            return Err(PoseError::Config(format!(
                "expansion ratios must be positive, got torso={} body={}",
                self.torso_expansion_ratio, self.body_expansion_ratio
            )));
        }
        Ok(())
    }
}

/// Landmark normalization parameters.
///
/// Changing these changes the embedding: a classifier trained with one
/// setting must be served with the same setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub torso_multiplier: f32,
    pub min_pose_size: f32,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            torso_multiplier: TORSO_MULTIPLIER,
            min_pose_size: MIN_POSE_SIZE,
        }
    }
}

impl NormalizerConfig {
    pub fn validate(&self) -> Result<(), PoseError> {
        if !(self.torso_multiplier > 0.0 && self.min_pose_size > 0.0) {
            return Err(PoseError::Config(format!(
                "torso_multiplier and min_pose_size must be positive, got {} and {}",
                self.torso_multiplier, self.min_pose_size
            )));
        }
        Ok(())
    }
}

/// Tracker and normalizer settings read from one JSON document.
///
/// ```json
/// { "tracker": { "torso_expansion_ratio": 2.0 }, "normalizer": {} }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    pub tracker: TrackerConfig,
    pub normalizer: NormalizerConfig,
}

impl PoseConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PoseError> {
        let config: PoseConfig = serde_json::from_str(json)?;
        config.tracker.validate()?;
        config.normalizer.validate()?;
        Ok(config)
    }
}
