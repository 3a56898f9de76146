use crate::{BodyPart, CropRegion, PoseError};
use asana_base::Vec2;

/// Keypoint positions only, indexed by `BodyPart`.
pub type Landmarks = [Vec2<f32>; BodyPart::COUNT];

/// A single joint with position and detector confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub body_part: BodyPart,
    /// `x` and `y`, in pixels for a `Person` built by the tracker.
    pub position: Vec2<f32>,
    /// Detector confidence in [0.0, 1.0].
    pub score: f32,
}

impl Keypoint {
    pub fn new(body_part: BodyPart, x: f32, y: f32, score: f32) -> Self {
        Self {
            body_part,
            position: Vec2::new(x, y),
            score,
        }
    }
}

/// Raw detector rows `(y, x, score)` in normalized coordinates.
///
/// Straight after the detector the coordinates are relative to the crop; after
/// [`RawPose::remap`] they are relative to the full image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPose {
    rows: [[f32; 3]; BodyPart::COUNT],
}

impl RawPose {
    pub fn new(rows: [[f32; 3]; BodyPart::COUNT]) -> Self {
        Self { rows }
    }

    /// Build from detector output, rejecting anything that is not 17 rows.
    pub fn from_rows(rows: &[[f32; 3]]) -> Result<Self, PoseError> {
        let rows: [[f32; 3]; BodyPart::COUNT] = rows.try_into().map_err(|_| {
            PoseError::InvalidInput(format!(
                "expected {} keypoint rows, got {}",
                BodyPart::COUNT,
                rows.len()
            ))
        })?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[[f32; 3]; BodyPart::COUNT] {
        &self.rows
    }

    pub fn y(&self, part: BodyPart) -> f32 {
        self.rows[part.index()][0]
    }

    pub fn x(&self, part: BodyPart) -> f32 {
        self.rows[part.index()][1]
    }

    pub fn score(&self, part: BodyPart) -> f32 {
        self.rows[part.index()][2]
    }

    /// Map crop-local coordinates to image-relative coordinates.
    pub fn remap(&self, region: &CropRegion) -> RawPose {
        let mut rows = self.rows;
        for row in rows.iter_mut() {
            row[0] = region.y_min + region.height * row[0];
            row[1] = region.x_min + region.width * row[1];
        }
        RawPose { rows }
    }
}

/// One detected person: exactly 17 keypoints, index-aligned to `BodyPart`.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    keypoints: [Keypoint; BodyPart::COUNT],
}

impl Person {
    /// Fails if any keypoint sits at the wrong index for its body part.
    pub fn new(keypoints: [Keypoint; BodyPart::COUNT]) -> Result<Self, PoseError> {
        for (index, keypoint) in keypoints.iter().enumerate() {
            if keypoint.body_part.index() != index {
                return Err(PoseError::InvalidInput(format!(
                    "keypoint {} is {:?}, expected {:?}",
                    index,
                    keypoint.body_part,
                    BodyPart::ALL[index]
                )));
            }
        }
        Ok(Self { keypoints })
    }

    /// Denormalize image-relative detector rows into pixel keypoints.
    pub fn from_raw(raw: &RawPose, image_height: usize, image_width: usize) -> Person {
        let keypoints = BodyPart::ALL.map(|part| {
            Keypoint::new(
                part,
                raw.x(part) * image_width as f32,
                raw.y(part) * image_height as f32,
                raw.score(part),
            )
        });
        Person { keypoints }
    }

    /// Build from `(x, y, score)` rows, the layout of the persisted dataset.
    pub fn from_xys_rows(rows: &[[f32; 3]]) -> Result<Person, PoseError> {
        if rows.len() != BodyPart::COUNT {
            return Err(PoseError::InvalidInput(format!(
                "expected {} keypoints, got {}",
                BodyPart::COUNT,
                rows.len()
            )));
        }
        let keypoints = BodyPart::ALL.map(|part| {
            let [x, y, score] = rows[part.index()];
            Keypoint::new(part, x, y, score)
        });
        Ok(Person { keypoints })
    }

    /// `(x, y, score)` rows in `BodyPart` order.
    pub fn to_xys_rows(&self) -> [[f32; 3]; BodyPart::COUNT] {
        self.keypoints
            .map(|kp| [kp.position.x, kp.position.y, kp.score])
    }

    pub fn keypoints(&self) -> &[Keypoint; BodyPart::COUNT] {
        &self.keypoints
    }

    pub fn keypoint(&self, part: BodyPart) -> &Keypoint {
        &self.keypoints[part.index()]
    }

    /// Positions without scores.
    pub fn landmarks(&self) -> Landmarks {
        self.keypoints.map(|kp| kp.position)
    }

    pub fn min_score(&self) -> f32 {
        self.keypoints
            .iter()
            .map(|kp| kp.score)
            .fold(f32::INFINITY, f32::min)
    }
}

impl TryFrom<Vec<Keypoint>> for Person {
    type Error = PoseError;

    fn try_from(keypoints: Vec<Keypoint>) -> Result<Self, Self::Error> {
        let count = keypoints.len();
        let keypoints: [Keypoint; BodyPart::COUNT] = keypoints.try_into().map_err(|_| {
            PoseError::InvalidInput(format!(
                "expected {} keypoints, got {}",
                BodyPart::COUNT,
                count
            ))
        })?;
        Person::new(keypoints)
    }
}
