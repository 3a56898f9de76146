use crate::PoseError;
use asana_image::CropBox;

/// Region of the source image submitted to the detector, in normalized
/// coordinates (fractions of image height / width).
///
/// Edges may extend past `[0, 1]`: the requested crop is then padded when it
/// is materialized. `y_max` and `x_max` are always derived from min + size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub y_min: f32,
    pub x_min: f32,
    pub y_max: f32,
    pub x_max: f32,
    pub height: f32,
    pub width: f32,
}

impl CropRegion {
    pub fn from_min_size(y_min: f32, x_min: f32, height: f32, width: f32) -> Self {
        Self {
            y_min,
            x_min,
            y_max: y_min + height,
            x_max: x_min + width,
            height,
            width,
        }
    }

    pub fn as_crop_box(&self) -> CropBox {
        CropBox::new(self.y_min, self.x_min, self.y_max, self.x_max)
    }
}

pub(crate) fn check_dimensions(image_height: usize, image_width: usize) -> Result<(), PoseError> {
    if image_height == 0 || image_width == 0 {
        return Err(PoseError::InvalidInput(format!(
            "image dimensions must be positive, got {}x{}",
            image_height, image_width
        )));
    }
    Ok(())
}

/// Default full-frame region: the centered square whose side is the longer
/// image dimension, so the whole image fits and the short axis is padded.
///
/// Used on the first frame, after a reset, and whenever tracking is abandoned.
pub fn init_crop_region(image_height: usize, image_width: usize) -> Result<CropRegion, PoseError> {
    check_dimensions(image_height, image_width)?;
    let h = image_height as f32;
    let w = image_width as f32;

    let region = if image_width > image_height {
        CropRegion::from_min_size((h / 2.0 - w / 2.0) / h, 0.0, w / h, 1.0)
    } else {
        CropRegion::from_min_size(0.0, (w / 2.0 - h / 2.0) / w, 1.0, h / w)
    };
    Ok(region)
}
