use crate::crop_region::check_dimensions;
use crate::{
    BodyPart, CropRegion, KeypointDetector, Person, PoseError, RawPose, TrackerConfig,
    init_crop_region,
};
use asana_base::Tensor;
use asana_image::crop_and_resize;

/// Confidence floor separating a usable torso anchor from noise.
pub const MIN_CROP_KEYPOINT_SCORE: f32 = 0.2;
/// Margin applied to the torso extent when sizing the next crop.
pub const TORSO_EXPANSION_RATIO: f32 = 1.9;
/// Margin applied to the confident full-body extent when sizing the next crop.
pub const BODY_EXPANSION_RATIO: f32 = 1.2;

/// How far the joints reach from the hip center, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TorsoAndBodyRange {
    pub max_torso_yrange: f32,
    pub max_torso_xrange: f32,
    pub max_body_yrange: f32,
    pub max_body_xrange: f32,
}

/// Per-stream crop tracker.
///
/// Holds the crop region to request on the next frame. Frames of one stream
/// must go through the same tracker in order; independent streams each get
/// their own tracker.
#[derive(Debug, Clone, Default)]
pub struct CropRegionTracker {
    config: TrackerConfig,
    current_region: Option<CropRegion>,
    frame_size: Option<(usize, usize)>,
}

impl CropRegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackerConfig) -> Result<Self, PoseError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Region that the next `detect` call will crop, if any.
    pub fn current_region(&self) -> Option<CropRegion> {
        self.current_region
    }

    /// `(height, width)` of the most recent frame.
    pub fn frame_size(&self) -> Option<(usize, usize)> {
        self.frame_size
    }

    /// Forget the tracked region; the next frame starts from the full frame.
    pub fn reset(&mut self) {
        self.current_region = None;
    }

    /// At least one hip and at least one shoulder are confidently detected.
    pub fn torso_visible(&self, keypoints: &RawPose) -> bool {
        let floor = self.config.min_crop_keypoint_score;
        let confident = |part| keypoints.score(part) > floor;

        (confident(BodyPart::LeftHip) || confident(BodyPart::RightHip))
            && (confident(BodyPart::LeftShoulder) || confident(BodyPart::RightShoulder))
    }

    /// Extents of the torso joints (any score) and of all confident joints
    /// (score at or above the floor) around `(center_y, center_x)`.
    ///
    /// `keypoints` are image-relative; the result is in pixels.
    pub fn determine_torso_and_body_range(
        &self,
        keypoints: &RawPose,
        image_height: usize,
        image_width: usize,
        center_y: f32,
        center_x: f32,
    ) -> TorsoAndBodyRange {
        let h = image_height as f32;
        let w = image_width as f32;
        let offset = |part| {
            (
                (center_y - keypoints.y(part) * h).abs(),
                (center_x - keypoints.x(part) * w).abs(),
            )
        };

        let mut range = TorsoAndBodyRange::default();
        for part in BodyPart::TORSO {
            let (dy, dx) = offset(part);
            range.max_torso_yrange = range.max_torso_yrange.max(dy);
            range.max_torso_xrange = range.max_torso_xrange.max(dx);
        }

        for part in BodyPart::ALL {
            if keypoints.score(part) < self.config.min_crop_keypoint_score {
                continue;
            }
            let (dy, dx) = offset(part);
            range.max_body_yrange = range.max_body_yrange.max(dy);
            range.max_body_xrange = range.max_body_xrange.max(dx);
        }

        range
    }

    /// Crop region for the next frame given this frame's image-relative keypoints.
    ///
    /// Falls back to [`init_crop_region`] when the torso is not visible, when the
    /// hip center is not inside the frame, or when the subject no longer fits a
    /// local crop.
    pub fn determine_crop_region(
        &self,
        keypoints: &RawPose,
        image_height: usize,
        image_width: usize,
    ) -> Result<CropRegion, PoseError> {
        check_dimensions(image_height, image_width)?;

        if !self.torso_visible(keypoints) {
            log::debug!("torso not visible, using full-frame crop region");
            return init_crop_region(image_height, image_width);
        }

        let h = image_height as f32;
        let w = image_width as f32;
        let center_y = (keypoints.y(BodyPart::LeftHip) + keypoints.y(BodyPart::RightHip)) * h / 2.0;
        let center_x = (keypoints.x(BodyPart::LeftHip) + keypoints.x(BodyPart::RightHip)) * w / 2.0;

        let range =
            self.determine_torso_and_body_range(keypoints, image_height, image_width, center_y, center_x);

        let torso = self.config.torso_expansion_ratio;
        let body = self.config.body_expansion_ratio;
        let candidate = [
            range.max_torso_xrange * torso,
            range.max_torso_yrange * torso,
            range.max_body_yrange * body,
            range.max_body_xrange * body,
        ]
        .into_iter()
        .fold(0.0_f32, f32::max);

        let nearest_edge = [center_x, w - center_x, center_y, h - center_y]
            .into_iter()
            .fold(f32::INFINITY, f32::min);
        let crop_length_half = candidate.min(nearest_edge);

        // Hip center on or past the frame border leaves no room for a crop.
        if crop_length_half.is_nan() || crop_length_half <= 0.0 {
            log::debug!("hip center ({:.1}, {:.1}) outside the frame, resetting crop region", center_y, center_x);
            return init_crop_region(image_height, image_width);
        }
        if crop_length_half > w.max(h) / 2.0 {
            log::debug!(
                "crop half-size {:.1}px exceeds half the image, resetting crop region",
                crop_length_half
            );
            return init_crop_region(image_height, image_width);
        }

        let crop_length = crop_length_half * 2.0;
        Ok(CropRegion::from_min_size(
            (center_y - crop_length_half) / h,
            (center_x - crop_length_half) / w,
            crop_length / h,
            crop_length / w,
        ))
    }

    /// Detect the person in `image` and update the tracked region.
    ///
    /// `image` is `[H, W, 3]` RGB. With `reset`, or when nothing is tracked
    /// yet, the full-frame region is used. Detector errors are returned as-is
    /// and leave the tracked region untouched.
    pub fn detect<D: KeypointDetector + ?Sized>(
        &mut self,
        image: &Tensor<u8>,
        detector: &mut D,
        reset: bool,
    ) -> Result<Person, PoseError> {
        let (image_height, image_width) = match image.hwc() {
            Some((h, w, 3)) => (h, w),
            _ => {
                return Err(PoseError::InvalidInput(format!(
                    "expected [H, W, 3] image, got {:?}",
                    image.shape
                )));
            }
        };
        check_dimensions(image_height, image_width)?;
        self.frame_size = Some((image_height, image_width));

        let region = match self.current_region {
            Some(region) if !reset => region,
            _ => init_crop_region(image_height, image_width)?,
        };

        let (input_height, input_width) = detector.input_size();
        let input = crop_and_resize(image, region.as_crop_box(), input_height, input_width)?;

        let rows = detector.detect_raw(&input)?;
        let raw = RawPose::from_rows(&rows).inspect_err(|_| {
            log::warn!(
                "detector returned {} keypoint rows, expected {}",
                rows.len(),
                BodyPart::COUNT
            );
        })?;

        let keypoints = raw.remap(&region);
        self.current_region = Some(self.determine_crop_region(&keypoints, image_height, image_width)?);

        Ok(Person::from_raw(&keypoints, image_height, image_width))
    }
}
