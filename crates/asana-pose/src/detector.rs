use crate::PoseError;
use asana_base::Tensor;

/// Single-person keypoint model with a fixed-size RGB input.
///
/// The tracker crops, pads and resizes the frame to `input_size()` before
/// calling `detect_raw`, and maps the returned coordinates back to the frame.
pub trait KeypointDetector {
    /// Model input as `(height, width)`.
    fn input_size(&self) -> (usize, usize);

    /// Run the model on an `[height, width, 3]` RGB tensor of `input_size()`.
    ///
    /// Returns one `(y, x, score)` row per `BodyPart`, with coordinates
    /// normalized to the input crop. Returning anything but 17 rows is a
    /// contract violation and is reported by the caller as `InvalidInput`.
    fn detect_raw(&mut self, input: &Tensor<u8>) -> Result<Vec<[f32; 3]>, PoseError>;
}

impl<D: KeypointDetector + ?Sized> KeypointDetector for Box<D> {
    fn input_size(&self) -> (usize, usize) {
        (**self).input_size()
    }

    fn detect_raw(&mut self, input: &Tensor<u8>) -> Result<Vec<[f32; 3]>, PoseError> {
        (**self).detect_raw(input)
    }
}
