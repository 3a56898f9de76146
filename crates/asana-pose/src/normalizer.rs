//! Translation- and scale-invariant landmark normalization.
//!
//! The same transform feeds classifier training and live inference, so both
//! go through [`embed_landmarks_with`]. Keypoint scores are ignored.

use crate::embedding::{EMBEDDING_SIZE, Embedding};
use crate::{BodyPart, Landmarks, NormalizerConfig, Person, PoseError};
use asana_base::Vec2;

/// Torso length is scaled by this before comparing with the farthest joint.
pub const TORSO_MULTIPLIER: f32 = 2.5;
/// Pose sizes below this cannot be normalized.
pub const MIN_POSE_SIZE: f32 = 1e-6;

pub fn center_point(landmarks: &Landmarks, left: BodyPart, right: BodyPart) -> Vec2<f32> {
    landmarks[left.index()].midpoint(landmarks[right.index()])
}

/// Scale of the pose: the larger of the torso length times `torso_multiplier`
/// and the distance from the hip center to the farthest landmark.
pub fn pose_size(landmarks: &Landmarks, torso_multiplier: f32) -> f32 {
    let hips_center = center_point(landmarks, BodyPart::LeftHip, BodyPart::RightHip);
    let shoulders_center = center_point(landmarks, BodyPart::LeftShoulder, BodyPart::RightShoulder);
    let torso_size = shoulders_center.distance_to(hips_center);

    landmarks
        .iter()
        .map(|landmark| landmark.distance_to(hips_center))
        .fold(torso_size * torso_multiplier, f32::max)
}

pub fn normalize(landmarks: &Landmarks) -> Result<Landmarks, PoseError> {
    normalize_with(landmarks, &NormalizerConfig::default())
}

/// Move the hip center to the origin and divide by [`pose_size`].
pub fn normalize_with(landmarks: &Landmarks, config: &NormalizerConfig) -> Result<Landmarks, PoseError> {
    if let Some(part) = BodyPart::ALL
        .into_iter()
        .find(|part| !landmarks[part.index()].is_finite())
    {
        return Err(PoseError::InvalidInput(format!(
            "non-finite landmark for {}",
            part.name()
        )));
    }

    let hips_center = center_point(landmarks, BodyPart::LeftHip, BodyPart::RightHip);
    let size = pose_size(landmarks, config.torso_multiplier);
    if size.is_nan() || size < config.min_pose_size {
        return Err(PoseError::DegenerateGeometry { pose_size: size });
    }

    Ok(landmarks.map(|landmark| (landmark - hips_center) / size))
}

pub fn embed(person: &Person) -> Result<Embedding, PoseError> {
    embed_landmarks(&person.landmarks())
}

pub fn embed_with(person: &Person, config: &NormalizerConfig) -> Result<Embedding, PoseError> {
    embed_landmarks_with(&person.landmarks(), config)
}

pub fn embed_landmarks(landmarks: &Landmarks) -> Result<Embedding, PoseError> {
    embed_landmarks_with(landmarks, &NormalizerConfig::default())
}

/// Normalize and flatten to `[x0, y0, x1, y1, ...]` in `BodyPart` order.
pub fn embed_landmarks_with(
    landmarks: &Landmarks,
    config: &NormalizerConfig,
) -> Result<Embedding, PoseError> {
    let normalized = normalize_with(landmarks, config)?;

    let mut features = [0.0; EMBEDDING_SIZE];
    for (pair, landmark) in features.chunks_exact_mut(2).zip(normalized.iter()) {
        pair[0] = landmark.x;
        pair[1] = landmark.y;
    }
    Ok(Embedding(features))
}
