//! Scoring of a live practice session against one target pose.
//!
//! A frame only counts when enough of the body is visible. Visible frames are
//! classified, and the session tracks how long the target pose is held.

use crate::embedding::Embedding;
use crate::normalizer::embed_with;
use crate::{NormalizerConfig, Person, PoseError};
use std::time::Duration;

/// A keypoint is considered detected above this score.
pub const DISPLAY_KEYPOINT_SCORE: f32 = 0.4;
/// More undetected keypoints than this and the frame is skipped.
pub const MAX_UNDETECTED_KEYPOINTS: usize = 4;
/// Target class probability needed to count as holding the pose.
pub const HOLD_CONFIDENCE: f32 = 0.97;

/// Pose classifier over embeddings.
pub trait PoseClassifier {
    /// Class probabilities, indexed by class number.
    fn predict(&mut self, embedding: &Embedding) -> Result<Vec<f32>, PoseError>;
}

impl<C: PoseClassifier + ?Sized> PoseClassifier for Box<C> {
    fn predict(&mut self, embedding: &Embedding) -> Result<Vec<f32>, PoseError> {
        (**self).predict(embedding)
    }
}

/// Keypoints that would not be drawn: low score, and always the eyes.
pub fn undetected_keypoints(person: &Person) -> usize {
    person
        .keypoints()
        .iter()
        .filter(|kp| kp.body_part.is_eye() || kp.score <= DISPLAY_KEYPOINT_SCORE || kp.score.is_nan())
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Too few keypoints detected, frame not classified.
    NotVisible,
    /// Classified, but the target pose is not held.
    Searching { confidence: f32 },
    /// Target pose held for `hold` so far.
    Holding { confidence: f32, hold: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PracticeSummary {
    pub best_hold: Duration,
    /// Mean of `confidence * 100` over classified frames, 0 if there were none.
    pub average_accuracy: f32,
    pub frames: usize,
    pub classified_frames: usize,
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    target_class: usize,
    normalizer: NormalizerConfig,
    hold_start: Option<Duration>,
    best_hold: Duration,
    accuracy_sum: f64,
    classified_frames: usize,
    frames: usize,
}

impl PracticeSession {
    pub fn new(target_class: usize) -> Self {
        Self {
            target_class,
            normalizer: NormalizerConfig::default(),
            hold_start: None,
            best_hold: Duration::ZERO,
            accuracy_sum: 0.0,
            classified_frames: 0,
            frames: 0,
        }
    }

    pub fn with_normalizer(mut self, normalizer: NormalizerConfig) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn target_class(&self) -> usize {
        self.target_class
    }

    pub fn best_hold(&self) -> Duration {
        self.best_hold
    }

    pub fn is_holding(&self) -> bool {
        self.hold_start.is_some()
    }

    /// Score one frame. `at` is the frame time since the session started.
    pub fn observe<C: PoseClassifier + ?Sized>(
        &mut self,
        person: &Person,
        at: Duration,
        classifier: &mut C,
    ) -> Result<FrameOutcome, PoseError> {
        self.frames += 1;

        let undetected = undetected_keypoints(person);
        if undetected > MAX_UNDETECTED_KEYPOINTS {
            log::trace!("{} keypoints undetected, frame skipped", undetected);
            self.hold_start = None;
            return Ok(FrameOutcome::NotVisible);
        }

        let embedding = embed_with(person, &self.normalizer)?;
        let probabilities = classifier.predict(&embedding)?;
        let confidence = probabilities
            .get(self.target_class)
            .copied()
            .ok_or_else(|| {
                PoseError::InvalidInput(format!(
                    "classifier returned {} classes, target is class {}",
                    probabilities.len(),
                    self.target_class
                ))
            })?;

        self.accuracy_sum += f64::from(confidence) * 100.0;
        self.classified_frames += 1;

        if confidence > HOLD_CONFIDENCE {
            let start = *self.hold_start.get_or_insert_with(|| {
                log::debug!("pose {} held from {:?}", self.target_class, at);
                at
            });
            let hold = at.saturating_sub(start);
            self.best_hold = self.best_hold.max(hold);
            Ok(FrameOutcome::Holding { confidence, hold })
        } else {
            if let Some(start) = self.hold_start.take() {
                log::debug!("pose {} released after {:?}", self.target_class, at.saturating_sub(start));
            }
            Ok(FrameOutcome::Searching { confidence })
        }
    }

    pub fn finish(self) -> PracticeSummary {
        let average_accuracy = if self.classified_frames > 0 {
            (self.accuracy_sum / self.classified_frames as f64) as f32
        } else {
            0.0
        };
        PracticeSummary {
            best_hold: self.best_hold,
            average_accuracy,
            frames: self.frames,
            classified_frames: self.classified_frames,
        }
    }
}
