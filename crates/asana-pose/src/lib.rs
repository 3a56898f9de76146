//! Single-person pose tracking and pose embeddings.
//!
//! [`CropRegionTracker`] keeps a per-stream crop around the subject so a
//! fixed-size keypoint model sees the body at useful resolution, and the
//! [`normalizer`] turns a detected [`Person`] into a translation- and
//! scale-invariant [`Embedding`] for pose classification.

pub mod body_part;
pub mod config;
pub mod crop_region;
pub mod detector;
pub mod embedding;
pub mod error;
pub mod keypoint;
pub mod normalizer;
pub mod practice;
pub mod tracker;

#[cfg(feature = "onnx")]
pub mod movenet;

pub use body_part::BodyPart;
pub use config::{NormalizerConfig, PoseConfig, TrackerConfig};
pub use crop_region::{CropRegion, init_crop_region};
pub use detector::KeypointDetector;
pub use embedding::{Axis, EMBEDDING_SIZE, EMBEDDING_VERSION, Embedding, feature_index, feature_name};
pub use error::PoseError;
pub use keypoint::{Keypoint, Landmarks, Person, RawPose};
pub use normalizer::{center_point, embed, embed_landmarks, normalize, pose_size};
pub use practice::{FrameOutcome, PoseClassifier, PracticeSession, PracticeSummary};
pub use tracker::{CropRegionTracker, TorsoAndBodyRange};

#[cfg(feature = "onnx")]
pub use movenet::{MoveNetDetector, MoveNetInput};
